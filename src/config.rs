//! Triage thresholds. Defaults are the ITIL-derived demo constants; a TOML
//! file can override any of them.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed config {path}: {source}")]
    Malformed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TriageConfig {
    /// Minimum similarity for two incidents to be considered related.
    pub correlation_threshold: f64,
    /// Score at or above which confidence is High (autonomous action allowed).
    pub high_confidence_threshold: f64,
    /// Score at or above which confidence is Medium; below it, Low.
    pub low_confidence_threshold: f64,

    /// Z-score above which a metric reading is anomalous.
    pub anomaly_z_threshold: f64,
    /// Severity score at or above which an alert is Critical.
    pub critical_threshold: f64,
    /// Severity score at or above which an alert is Warning.
    pub warning_threshold: f64,

    /// Minimum incidents for a recurring pattern (ITIL standard).
    pub pattern_threshold: usize,
    /// Sliding window for temporal pattern analysis, in hours.
    pub pattern_window_hours: i64,
    /// Pattern confidence required for autonomous problem creation.
    pub pattern_confidence_threshold: f64,
    /// High-severity incidents required for autonomous problem creation.
    pub high_severity_threshold: usize,
    /// Estimated affected users required for autonomous problem creation.
    pub user_impact_threshold: usize,

    /// Systems whose involvement escalates correlation decisions.
    pub critical_systems: Vec<String>,
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            correlation_threshold: 0.4,
            high_confidence_threshold: 0.8,
            low_confidence_threshold: 0.6,
            anomaly_z_threshold: 2.0,
            critical_threshold: 0.9,
            warning_threshold: 0.8,
            pattern_threshold: 3,
            pattern_window_hours: 24,
            pattern_confidence_threshold: 0.8,
            high_severity_threshold: 2,
            user_impact_threshold: 100,
            critical_systems: [
                "prod-db-01",
                "prod-web-01",
                "prod-web-02",
                "load-balancer",
                "auth-service",
                "payment-gateway",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

impl TriageConfig {
    /// Load from a TOML file. A missing file is not an error; a file that
    /// exists but fails to parse is.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Malformed {
            path: path.display().to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_itil_demo_constants() {
        let cfg = TriageConfig::default();
        assert_eq!(cfg.correlation_threshold, 0.4);
        assert_eq!(cfg.anomaly_z_threshold, 2.0);
        assert_eq!(cfg.pattern_threshold, 3);
        assert!(cfg.critical_systems.iter().any(|s| s == "payment-gateway"));
    }

    #[test]
    fn partial_toml_overrides_only_named_fields() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "correlation_threshold = 0.5").unwrap();
        let cfg = TriageConfig::load(f.path()).unwrap();
        assert_eq!(cfg.correlation_threshold, 0.5);
        assert_eq!(cfg.pattern_threshold, 3);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let cfg = TriageConfig::load(Path::new("does/not/exist.toml")).unwrap();
        assert_eq!(cfg.correlation_threshold, 0.4);
    }

    #[test]
    fn malformed_toml_is_an_error() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "correlation_threshold = [not toml").unwrap();
        assert!(TriageConfig::load(f.path()).is_err());
    }
}
