use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// ITIL-aligned severity tiers. P1 is a complete outage, P4 is cosmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    P1,
    P2,
    P3,
    P4,
}

impl Severity {
    /// P1/P2 incidents count as "high severity" in every decision table.
    pub fn is_high(self) -> bool {
        matches!(self, Severity::P1 | Severity::P2)
    }

    /// ITIL SLA resolution target for this tier.
    pub fn sla_target_hours(self) -> i64 {
        match self {
            Severity::P1 => 4,
            Severity::P2 => 8,
            Severity::P3 => 24,
            Severity::P4 => 72,
        }
    }

    /// One tier up, saturating at P1. Used by the escalate-severity action.
    pub fn escalated(self) -> Severity {
        match self {
            Severity::P1 | Severity::P2 => Severity::P1,
            Severity::P3 => Severity::P2,
            Severity::P4 => Severity::P3,
        }
    }
}

/// Incident lifecycle states. No transition graph is enforced: any caller
/// may set any status, matching the permissive ITSM tooling this models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IncidentStatus {
    New,
    #[serde(rename = "In Progress")]
    InProgress,
    Pending,
    Resolved,
    Closed,
}

fn default_level() -> String {
    "Medium".to_string()
}

fn default_category() -> String {
    "Infrastructure".to_string()
}

fn default_subcategory() -> String {
    "Server".to_string()
}

/// A single reported service disruption.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Incident {
    pub id: String,
    pub title: String,
    pub description: String,
    pub severity: Severity,
    pub status: IncidentStatus,
    pub affected_system: String,
    pub user_group: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub resolved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub correlation_group: Option<String>,
    #[serde(default)]
    pub problem_id: Option<String>,

    // ITIL classification fields
    #[serde(default = "default_level")]
    pub impact: String,
    #[serde(default = "default_level")]
    pub urgency: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default = "default_subcategory")]
    pub subcategory: String,
    #[serde(default)]
    pub assigned_to: Option<String>,

    // Agent decision tracking
    #[serde(default)]
    pub correlation_confidence: Option<f64>,
    #[serde(default)]
    pub auto_created: bool,
}

impl Incident {
    /// Resolved and Closed incidents are excluded from correlation.
    pub fn is_open(&self) -> bool {
        !matches!(
            self.status,
            IncidentStatus::Resolved | IncidentStatus::Closed
        )
    }

    /// Mark resolved, stamping `resolved_at` alongside the status change.
    pub fn resolve(&mut self, at: DateTime<Utc>) {
        self.status = IncidentStatus::Resolved;
        self.resolved_at = Some(at);
    }

    /// An open incident is at risk once 75% of its SLA window has elapsed.
    pub fn sla_at_risk(&self, now: DateTime<Utc>) -> bool {
        if !self.is_open() {
            return false;
        }
        let elapsed_hours = (now - self.created_at).num_seconds() as f64 / 3600.0;
        elapsed_hours > self.severity.sla_target_hours() as f64 * 0.75
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn incident(severity: Severity, status: IncidentStatus, age_hours: i64) -> Incident {
        Incident {
            id: "INC-0001".into(),
            title: "Email service unavailable".into(),
            description: "Users unable to send or receive emails".into(),
            severity,
            status,
            affected_system: "Email Server".into(),
            user_group: "Sales Team".into(),
            created_at: Utc::now() - Duration::hours(age_hours),
            resolved_at: None,
            correlation_group: None,
            problem_id: None,
            impact: "Medium".into(),
            urgency: "Medium".into(),
            category: "Infrastructure".into(),
            subcategory: "Email".into(),
            assigned_to: None,
            correlation_confidence: None,
            auto_created: false,
        }
    }

    #[test]
    fn sla_risk_respects_severity_tier() {
        let now = Utc::now();
        // P1 target is 4h; 3h elapsed is past the 75% mark.
        assert!(incident(Severity::P1, IncidentStatus::New, 3 + 1).sla_at_risk(now));
        // P4 target is 72h; 10h elapsed is comfortably inside.
        assert!(!incident(Severity::P4, IncidentStatus::New, 10).sla_at_risk(now));
        // Resolved incidents are never at risk.
        assert!(!incident(Severity::P1, IncidentStatus::Resolved, 100).sla_at_risk(now));
    }

    #[test]
    fn escalation_saturates_at_p1() {
        assert_eq!(Severity::P4.escalated(), Severity::P3);
        assert_eq!(Severity::P3.escalated(), Severity::P2);
        assert_eq!(Severity::P1.escalated(), Severity::P1);
    }

    #[test]
    fn status_serializes_with_itil_labels() {
        let json = serde_json::to_string(&IncidentStatus::InProgress).unwrap();
        assert_eq!(json, "\"In Progress\"");
        let back: IncidentStatus = serde_json::from_str("\"In Progress\"").unwrap();
        assert_eq!(back, IncidentStatus::InProgress);
    }
}
