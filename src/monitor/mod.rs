//! Proactive monitoring -- metric anomaly scoring, top-issue triage,
//! autonomous preventive actions, and breach forecasting.

pub mod analyzer;
pub mod forecast;
pub mod stats;
pub mod triage;

pub use analyzer::{analyze_metrics, MetricAnalysis};
pub use forecast::{
    capacity_recommendations, forecast_breaches, recurring_spikes, BreachForecast, CapacityPlan,
    RiskLevel, SpikePattern,
};
pub use stats::Trend;
pub use triage::{alert_severity, autonomous_decisions, top_issues, MonitorAction, PreventiveDecision};
