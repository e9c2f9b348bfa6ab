use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single observation in a metric time series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricPoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
    #[serde(default)]
    pub resource: String,
}

/// Metric name to its time-ordered observations. BTreeMap keeps iteration
/// order stable so analysis output is deterministic.
pub type MetricSet = BTreeMap<String, Vec<MetricPoint>>;
