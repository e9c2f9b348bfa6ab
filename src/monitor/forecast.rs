//! Breach forecasting and recurring-spike detection over metric history.

use super::analyzer::metric_threshold;
use super::stats;
use crate::model::MetricSet;
use chrono::Timelike;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    High,
    Medium,
}

/// A metric predicted to cross its threshold within the horizon.
#[derive(Debug, Clone, Serialize)]
pub struct BreachForecast {
    pub metric_name: String,
    pub current_value: f64,
    pub predicted_value: f64,
    pub threshold: f64,
    pub risk: RiskLevel,
    /// Estimated hours until the threshold is crossed at the current slope.
    pub time_to_threshold_hours: f64,
    pub confidence: f64,
    pub recommended_action: String,
}

/// A metric with threshold breaches recurring at the same hour of day.
#[derive(Debug, Clone, Serialize)]
pub struct SpikePattern {
    pub metric_name: String,
    pub hour: u32,
    pub occurrences: usize,
    pub risk: RiskLevel,
    pub description: String,
    pub recommendation: String,
}

/// Linear extrapolation of each metric's last 10 points over `horizon_hours`.
/// Only metrics whose predicted value crosses the threshold are reported,
/// highest risk and soonest breach first.
pub fn forecast_breaches(metrics: &MetricSet, horizon_hours: usize) -> Vec<BreachForecast> {
    let mut forecasts = Vec::new();

    for (name, points) in metrics {
        if points.len() < 3 {
            continue;
        }
        let recent: Vec<f64> = points
            .iter()
            .skip(points.len().saturating_sub(10))
            .map(|p| p.value)
            .collect();

        let n = recent.len() as f64;
        let slope = stats::slope(&recent);
        let intercept = (recent.iter().sum::<f64>() - slope * (0.0 + n - 1.0) * n / 2.0) / n;

        let predicted = slope * (n + horizon_hours as f64) + intercept;
        let threshold = metric_threshold(name);
        if predicted <= threshold {
            continue;
        }

        let risk = if predicted > threshold * 1.1 {
            RiskLevel::High
        } else {
            RiskLevel::Medium
        };

        forecasts.push(BreachForecast {
            metric_name: name.clone(),
            current_value: *recent.last().expect("len checked above"),
            predicted_value: predicted,
            threshold,
            risk,
            time_to_threshold_hours: time_to_threshold(&recent, slope, intercept, threshold),
            confidence: (0.5 + recent.len() as f64 / 20.0).min(0.9),
            recommended_action: predictive_action(name),
        });
    }

    forecasts.sort_by(|a, b| {
        (b.risk == RiskLevel::High)
            .cmp(&(a.risk == RiskLevel::High))
            .then(a.time_to_threshold_hours.total_cmp(&b.time_to_threshold_hours))
    });
    forecasts
}

/// Solve `slope * x + intercept = threshold` relative to the latest point.
/// Flat or falling series never reach the threshold.
fn time_to_threshold(values: &[f64], slope: f64, intercept: f64, threshold: f64) -> f64 {
    if slope <= 0.0 {
        return f64::INFINITY;
    }
    let current_x = (values.len() - 1) as f64;
    let threshold_x = (threshold - intercept) / slope;
    (threshold_x - current_x).max(0.0)
}

fn predictive_action(metric_name: &str) -> String {
    match metric_name {
        "cpu_utilization" => "Scale up compute resources or optimize high-CPU processes".into(),
        "memory_usage" => "Increase memory allocation or restart memory-intensive services".into(),
        "disk_usage" => "Clean up disk space or provision additional storage".into(),
        "network_throughput" => "Optimize network configuration or increase bandwidth".into(),
        "error_rate" => "Review recent deployments and application logs".into(),
        "response_time" => "Optimize database queries and application performance".into(),
        name => format!("Monitor {name} closely and prepare mitigation plan"),
    }
}

/// Capacity planning buckets derived from utilization levels and trends.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CapacityPlan {
    pub immediate_actions: Vec<String>,
    pub short_term_planning: Vec<String>,
    pub long_term_planning: Vec<String>,
    pub cost_optimization: Vec<String>,
}

impl CapacityPlan {
    pub fn is_empty(&self) -> bool {
        self.immediate_actions.is_empty()
            && self.short_term_planning.is_empty()
            && self.long_term_planning.is_empty()
            && self.cost_optimization.is_empty()
    }
}

/// Bucket each metric with at least 5 points into one capacity action tier:
/// current above 90 is urgent, above 75 and climbing needs short-term
/// planning, a 60+ average goes to quarterly planning, and consistently
/// low usage (max under 30, average under 20) is a downsizing candidate.
pub fn capacity_recommendations(metrics: &MetricSet) -> CapacityPlan {
    let mut plan = CapacityPlan::default();

    for (name, points) in metrics {
        if points.len() < 5 {
            continue;
        }
        let values: Vec<f64> = points.iter().map(|p| p.value).collect();
        let current = *values.last().expect("len checked above");
        let avg = values.iter().sum::<f64>() / values.len() as f64;
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        if current > 90.0 {
            plan.immediate_actions.push(format!(
                "URGENT: {name} at {current:.1}% - immediate capacity increase needed"
            ));
        } else if current > 75.0 && stats::trend(&values) == stats::Trend::Increasing {
            plan.short_term_planning.push(format!(
                "{name} trending up (current: {current:.1}%) - plan capacity increase within 30 days"
            ));
        } else if avg > 60.0 {
            plan.long_term_planning.push(format!(
                "{name} average utilization {avg:.1}% - consider capacity planning for next quarter"
            ));
        } else if max < 30.0 && avg < 20.0 {
            plan.cost_optimization.push(format!(
                "{name} underutilized (avg: {avg:.1}%, max: {max:.1}%) - consider downsizing"
            ));
        }
    }

    plan
}

/// Find threshold breaches recurring at the same hour of day. Needs at least
/// 10 data points and 3 breaches; 2+ breaches sharing an hour qualify.
pub fn recurring_spikes(metrics: &MetricSet) -> Vec<SpikePattern> {
    let mut patterns = Vec::new();

    for (name, points) in metrics {
        if points.len() < 10 {
            continue;
        }
        let threshold = metric_threshold(name);
        let spike_hours: Vec<u32> = points
            .iter()
            .filter(|p| p.value > threshold)
            .map(|p| p.timestamp.hour())
            .collect();
        if spike_hours.len() < 3 {
            continue;
        }

        let mut counts = [0usize; 24];
        for &hour in &spike_hours {
            counts[hour as usize] += 1;
        }
        let (hour, count) = counts
            .iter()
            .enumerate()
            .max_by_key(|(_, &c)| c)
            .map(|(h, &c)| (h as u32, c))
            .expect("24 fixed buckets");

        if count >= 2 {
            patterns.push(SpikePattern {
                metric_name: name.clone(),
                hour,
                occurrences: count,
                risk: if count >= 3 {
                    RiskLevel::High
                } else {
                    RiskLevel::Medium
                },
                description: format!("Recurring spikes around {hour:02}:00"),
                recommendation: format!(
                    "Investigate scheduled processes or peak usage at {hour:02}:00"
                ),
            });
        }
    }

    patterns
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MetricPoint;
    use chrono::{Duration, TimeZone, Utc};

    fn hourly(name: &str, values: &[f64]) -> MetricSet {
        let base = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let points = values
            .iter()
            .enumerate()
            .map(|(i, &value)| MetricPoint {
                timestamp: base + Duration::hours(i as i64),
                value,
                resource: String::new(),
            })
            .collect();
        let mut set = MetricSet::new();
        set.insert(name.to_string(), points);
        set
    }

    #[test]
    fn climbing_series_forecasts_a_breach() {
        // ~2 points per hour of climb; well under the 85 threshold today,
        // over it within 4 hours.
        let set = hourly(
            "cpu_utilization",
            &[70.0, 72.0, 74.0, 76.0, 78.0, 80.0, 82.0],
        );
        let forecasts = forecast_breaches(&set, 4);
        assert_eq!(forecasts.len(), 1);
        let f = &forecasts[0];
        assert!(f.predicted_value > 85.0);
        assert!(f.time_to_threshold_hours > 0.0);
        assert!(f.time_to_threshold_hours < 4.0);
    }

    #[test]
    fn flat_series_forecasts_nothing() {
        let set = hourly("cpu_utilization", &[50.0, 50.0, 50.0, 50.0, 50.0]);
        assert!(forecast_breaches(&set, 4).is_empty());
    }

    #[test]
    fn high_risk_sorts_before_medium() {
        let mut set = hourly("cpu_utilization", &[70.0, 74.0, 78.0, 80.0, 82.0]);
        set.extend(hourly("memory_usage", &[60.0, 70.0, 80.0, 90.0, 100.0]));
        let forecasts = forecast_breaches(&set, 6);
        assert!(forecasts.len() >= 2);
        // The steep memory climb lands far past 1.1x threshold.
        assert_eq!(forecasts[0].metric_name, "memory_usage");
        assert_eq!(forecasts[0].risk, RiskLevel::High);
    }

    #[test]
    fn spikes_at_the_same_hour_form_a_pattern() {
        // 24h of calm values with breaches at hour 14 across... a single day
        // only has one 14:00, so spread three days of hourly data.
        let base = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let mut points = Vec::new();
        for h in 0..72 {
            let ts = base + Duration::hours(h);
            let value = if ts.hour() == 14 { 95.0 } else { 50.0 };
            points.push(MetricPoint {
                timestamp: ts,
                value,
                resource: String::new(),
            });
        }
        let mut set = MetricSet::new();
        set.insert("cpu_utilization".to_string(), points);

        let patterns = recurring_spikes(&set);
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].hour, 14);
        assert_eq!(patterns[0].occurrences, 3);
        assert_eq!(patterns[0].risk, RiskLevel::High);
    }

    #[test]
    fn capacity_buckets_are_mutually_exclusive() {
        let mut set = hourly("cpu_utilization", &[50.0, 50.0, 50.0, 50.0, 95.0]);
        set.extend(hourly("memory_usage", &[70.0, 72.0, 74.0, 76.0, 78.0]));
        set.extend(hourly("disk_usage", &[65.0, 65.0, 65.0, 65.0, 65.0]));
        set.extend(hourly("network_throughput", &[15.0, 18.0, 20.0, 16.0, 14.0]));

        let plan = capacity_recommendations(&set);
        assert_eq!(
            plan.immediate_actions,
            vec!["URGENT: cpu_utilization at 95.0% - immediate capacity increase needed"]
        );
        assert_eq!(
            plan.short_term_planning,
            vec!["memory_usage trending up (current: 78.0%) - plan capacity increase within 30 days"]
        );
        assert_eq!(
            plan.long_term_planning,
            vec!["disk_usage average utilization 65.0% - consider capacity planning for next quarter"]
        );
        assert_eq!(
            plan.cost_optimization,
            vec!["network_throughput underutilized (avg: 16.6%, max: 20.0%) - consider downsizing"]
        );
    }

    #[test]
    fn urgent_wins_over_the_other_capacity_tiers() {
        // Climbing past 90 with a high average still lands in exactly one tier.
        let set = hourly("cpu_utilization", &[80.0, 84.0, 88.0, 92.0, 96.0]);
        let plan = capacity_recommendations(&set);
        assert_eq!(plan.immediate_actions.len(), 1);
        assert!(plan.short_term_planning.is_empty());
        assert!(plan.long_term_planning.is_empty());
    }

    #[test]
    fn short_series_gets_no_capacity_recommendation() {
        let set = hourly("cpu_utilization", &[95.0, 95.0, 95.0, 95.0]);
        assert!(capacity_recommendations(&set).is_empty());
    }

    #[test]
    fn two_breaches_are_not_enough() {
        let set = hourly(
            "cpu_utilization",
            &[50.0, 95.0, 50.0, 95.0, 50.0, 50.0, 50.0, 50.0, 50.0, 50.0],
        );
        assert!(recurring_spikes(&set).is_empty());
    }
}
