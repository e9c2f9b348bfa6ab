//! Descriptive statistics for a metric value series.

use serde::{Deserialize, Serialize};

/// Direction a metric is heading, from the slope of its recent values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n-1 denominator). Zero for fewer than two
/// samples.
pub fn sample_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let sum_sq: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    (sum_sq / (values.len() - 1) as f64).sqrt()
}

/// Absolute z-score of `value` against the series. Zero when the series has
/// no spread.
pub fn z_score(values: &[f64], value: f64) -> f64 {
    let std = sample_std_dev(values);
    if std > 0.0 {
        (value - mean(values)).abs() / std
    } else {
        0.0
    }
}

/// Least-squares slope over the series, with x = 0..n.
pub fn slope(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let nf = n as f64;
    let sum_x: f64 = (0..n).map(|i| i as f64).sum();
    let sum_y: f64 = values.iter().sum();
    let sum_xy: f64 = values.iter().enumerate().map(|(i, y)| i as f64 * y).sum();
    let sum_x2: f64 = (0..n).map(|i| (i as f64).powi(2)).sum();

    let denominator = nf * sum_x2 - sum_x * sum_x;
    if denominator.abs() < f64::EPSILON {
        return 0.0;
    }
    (nf * sum_xy - sum_x * sum_y) / denominator
}

/// Classify the trend of the last 5 values: slope past +/-1.0 per step is
/// increasing/decreasing, anything flatter is stable. Fewer than 3 values is
/// always stable.
pub fn trend(values: &[f64]) -> Trend {
    if values.len() < 3 {
        return Trend::Stable;
    }
    let recent = &values[values.len().saturating_sub(5)..];
    let s = slope(recent);
    if s > 1.0 {
        Trend::Increasing
    } else if s < -1.0 {
        Trend::Decreasing
    } else {
        Trend::Stable
    }
}
