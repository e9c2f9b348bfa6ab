//! Per-metric anomaly analysis: z-score against the series baseline plus a
//! fixed threshold table per metric name.

use super::stats::{self, Trend};
use crate::config::TriageConfig;
use crate::model::{MetricPoint, MetricSet};
use serde::Serialize;

/// Analysis result for one metric.
#[derive(Debug, Clone, Serialize)]
pub struct MetricAnalysis {
    pub metric_name: String,
    pub current_value: f64,
    pub threshold_value: f64,
    pub is_anomaly: bool,
    pub severity_score: f64,
    pub trend: Trend,
    pub prediction: String,
    pub confidence: f64,
}

/// Fixed alerting threshold for a metric name. Unknown metrics default to 80.
pub fn metric_threshold(metric_name: &str) -> f64 {
    match metric_name {
        "cpu_utilization" => 85.0,
        "memory_usage" => 90.0,
        "disk_usage" => 85.0,
        "network_throughput" => 80.0,
        "error_rate" => 5.0,
        "response_time" => 2000.0,
        _ => 80.0,
    }
}

/// Analyze every metric series in the set. Empty series are skipped.
pub fn analyze_metrics(metrics: &MetricSet, config: &TriageConfig) -> Vec<MetricAnalysis> {
    metrics
        .iter()
        .filter(|(_, points)| !points.is_empty())
        .map(|(name, points)| analyze_single(name, points, config))
        .collect()
}

fn analyze_single(name: &str, points: &[MetricPoint], config: &TriageConfig) -> MetricAnalysis {
    let values: Vec<f64> = points.iter().map(|p| p.value).collect();
    let threshold_value = metric_threshold(name);

    if values.len() < 2 {
        return MetricAnalysis {
            metric_name: name.to_string(),
            current_value: values.first().copied().unwrap_or(0.0),
            threshold_value,
            is_anomaly: false,
            severity_score: 0.0,
            trend: Trend::Stable,
            prediction: "Insufficient data".to_string(),
            confidence: 0.0,
        };
    }

    let current_value = *values.last().expect("len checked above");
    let z = stats::z_score(&values, current_value);

    let mut is_anomaly = z > config.anomaly_z_threshold;
    let mut severity_score = (z / 3.0).min(1.0);

    // Threshold breaches are anomalous regardless of spread. Strictly
    // greater-than: a reading exactly at the threshold does not flag.
    if current_value > threshold_value {
        is_anomaly = true;
        severity_score = severity_score.max(current_value / 100.0);
    }

    let trend = stats::trend(&values);
    let (prediction, confidence) = predict(name, trend, severity_score);

    MetricAnalysis {
        metric_name: name.to_string(),
        current_value,
        threshold_value,
        is_anomaly,
        severity_score,
        trend,
        prediction,
        confidence,
    }
}

/// Prediction text per metric/trend, and a confidence score from base 0.7
/// with severity bonuses.
fn predict(metric_name: &str, trend: Trend, severity_score: f64) -> (String, f64) {
    let prediction = match (metric_name, trend) {
        ("cpu_utilization", Trend::Increasing) => {
            "CPU usage trending upward - potential performance degradation".to_string()
        }
        ("cpu_utilization", Trend::Decreasing) => {
            "CPU usage normalizing - system recovering".to_string()
        }
        ("cpu_utilization", Trend::Stable) => "CPU usage stable within normal range".to_string(),
        ("memory_usage", Trend::Increasing) => {
            "Memory usage climbing - possible memory leak detected".to_string()
        }
        ("memory_usage", Trend::Decreasing) => {
            "Memory usage decreasing - system optimization effective".to_string()
        }
        ("memory_usage", Trend::Stable) => {
            "Memory usage stable - no immediate concerns".to_string()
        }
        ("disk_usage", Trend::Increasing) => {
            "Disk space consumption accelerating - storage cleanup needed".to_string()
        }
        ("disk_usage", Trend::Decreasing) => {
            "Disk usage optimized - cleanup activities successful".to_string()
        }
        ("disk_usage", Trend::Stable) => {
            "Disk usage stable - adequate storage available".to_string()
        }
        (name, Trend::Increasing) => format!("{name} trending upward - monitoring required"),
        (name, Trend::Decreasing) => format!("{name} improving - positive trend"),
        (name, Trend::Stable) => format!("{name} stable - no action needed"),
    };

    let base_confidence = 0.7;
    let confidence = if severity_score > 0.8 {
        (base_confidence + 0.2f64).min(0.95)
    } else if severity_score > 0.5 {
        base_confidence + 0.1
    } else {
        base_confidence
    };

    (prediction, confidence)
}
