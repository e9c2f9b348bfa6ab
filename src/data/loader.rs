//! JSON dataset loading. A missing file falls back to seeded sample data so
//! the server always has something to triage; a file that exists but fails
//! to parse is a hard error.

use super::generator::SampleGenerator;
use crate::model::{Alert, Incident, MetricSet};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use std::path::Path;
use thiserror::Error;

/// Seed used when synthesizing a missing file, so fallback data is stable
/// across restarts.
const FALLBACK_SEED: u64 = 42;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed data file {path}: {source}")]
    Malformed {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// The full in-memory dataset the triage session works from.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub incidents: Vec<Incident>,
    pub alerts: Vec<Alert>,
    pub metrics: MetricSet,
}

/// Load incidents, alerts, and metrics from `dir`, generating any file that
/// is absent.
pub fn load_all(dir: &Path, now: DateTime<Utc>) -> Result<Dataset, LoadError> {
    let incidents = match read_json(&dir.join("sample_incidents.json"))? {
        Some(incidents) => incidents,
        None => {
            tracing::info!(dir = %dir.display(), "No incident file, generating sample incidents");
            SampleGenerator::new(FALLBACK_SEED).incidents(25, now)
        }
    };

    let alerts = match read_json(&dir.join("sample_alerts.json"))? {
        Some(alerts) => alerts,
        None => {
            tracing::info!(dir = %dir.display(), "No alert file, generating sample alerts");
            SampleGenerator::new(FALLBACK_SEED).alerts(12, now)
        }
    };

    let metrics = match read_json(&dir.join("sample_metrics.json"))? {
        Some(metrics) => metrics,
        None => {
            tracing::info!(dir = %dir.display(), "No metrics file, generating sample metrics");
            SampleGenerator::new(FALLBACK_SEED).metrics(now)
        }
    };

    Ok(Dataset {
        incidents,
        alerts,
        metrics,
    })
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, LoadError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&content)
        .map(Some)
        .map_err(|source| LoadError::Malformed {
            path: path.display().to_string(),
            source,
        })
}
