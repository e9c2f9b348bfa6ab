use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Severity for proactive monitoring alerts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertSeverity {
    Critical,
    Warning,
    Info,
}

/// Alert lifecycle states. Like incident status, settable freely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertStatus {
    Active,
    Acknowledged,
    Resolved,
    Suppressed,
}

fn default_impact() -> String {
    "Medium".to_string()
}

fn default_auto() -> bool {
    true
}

/// A proactive monitoring alert tied to a metric breach.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    pub title: String,
    pub description: String,
    pub severity: AlertSeverity,
    pub status: AlertStatus,
    pub affected_resources: Vec<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub resolved_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub metric_name: String,
    #[serde(default)]
    pub threshold_value: Option<f64>,
    #[serde(default)]
    pub current_value: Option<f64>,

    #[serde(default)]
    pub recommended_actions: Vec<String>,
    #[serde(default = "default_impact")]
    pub business_impact: String,
    /// Rank within the "top 3 issues" list, when selected.
    #[serde(default)]
    pub priority_rank: Option<usize>,

    #[serde(default = "default_auto")]
    pub auto_generated: bool,
    #[serde(default)]
    pub confidence_score: Option<f64>,
}

impl Alert {
    /// Active critical alerts ranked in the top 3.
    pub fn is_top_priority(&self) -> bool {
        self.severity == AlertSeverity::Critical
            && self.status == AlertStatus::Active
            && self.priority_rank.is_some_and(|r| r <= 3)
    }

    /// Immediate escalation is required when any critical condition holds:
    /// critical severity, production wording, a database resource, or the
    /// current value running 50% past its threshold.
    pub fn escalation_required(&self) -> bool {
        if self.severity == AlertSeverity::Critical {
            return true;
        }
        if self.description.to_lowercase().contains("production") {
            return true;
        }
        if self
            .affected_resources
            .iter()
            .any(|r| r.to_lowercase().contains("database") || r.to_lowercase().contains("db"))
        {
            return true;
        }
        match (self.current_value, self.threshold_value) {
            (Some(current), Some(threshold)) => current > threshold * 1.5,
            _ => false,
        }
    }
}
