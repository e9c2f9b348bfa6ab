//! Ephemeral decision records produced by a single scoring pass. These are
//! value objects: created, logged, rendered, and never updated afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Three-tier confidence bucket gating autonomous vs. human-reviewed action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    /// Bucket a continuous score: >=0.8 High, >=0.6 Medium, else Low.
    pub fn from_score(score: f64) -> Self {
        if score >= 0.8 {
            Confidence::High
        } else if score >= 0.6 {
            Confidence::Medium
        } else {
            Confidence::Low
        }
    }
}

/// The four-way outcome of the correlation decision table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationAction {
    GroupIncidents,
    CreateProblem,
    EscalateSeverity,
    NoAction,
}

/// Escalation-risk forecast attached to a correlation outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscalationForecast {
    pub probability: f64,
    pub confidence: f64,
    pub reasoning: String,
    pub similar_escalations: usize,
    pub total_similar: usize,
}

/// Result of correlating one target incident against the pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationOutcome {
    pub id: Uuid,
    pub incident_id: String,
    pub similar_incidents: Vec<String>,
    pub correlation_score: f64,
    pub confidence: Confidence,
    pub action: CorrelationAction,
    pub reasoning: String,
    pub created_at: DateTime<Utc>,
    pub auto_executed: bool,
    #[serde(default)]
    pub escalation: Option<EscalationForecast>,
}

impl CorrelationOutcome {
    /// The autonomy gate: execute without a human iff confidence is High
    /// and the correlation score is strictly above 0.7.
    pub fn should_execute_autonomously(&self) -> bool {
        self.confidence == Confidence::High && self.correlation_score > 0.7
    }

    /// Escalating actions and low-confidence results go to a human.
    pub fn requires_human_approval(&self) -> bool {
        matches!(
            self.action,
            CorrelationAction::EscalateSeverity | CorrelationAction::CreateProblem
        ) || self.confidence == Confidence::Low
    }
}

/// One entry in the monitoring agent's top-issues list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringOutcome {
    pub id: Uuid,
    pub alert_id: String,
    pub anomaly_detected: bool,
    pub alert_severity: super::alert::AlertSeverity,
    pub severity_score: f64,
    pub confidence: Confidence,
    pub recommended_actions: Vec<String>,
    pub business_impact: String,
    pub priority_rank: Option<usize>,
    pub reasoning: String,
    pub created_at: DateTime<Utc>,
    pub auto_executed: bool,
}

impl MonitoringOutcome {
    /// Whether this belongs on the top-3 issues board.
    pub fn is_top_priority_issue(&self) -> bool {
        self.anomaly_detected && self.severity_score > 0.8 && self.confidence == Confidence::High
    }
}

/// Result of evaluating one incident pattern for problem creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemOutcome {
    pub id: Uuid,
    pub pattern_id: String,
    pub related_incidents: Vec<String>,
    pub pattern_confidence: f64,
    pub should_create_problem: bool,
    pub root_cause_hypothesis: String,
    pub preventive_measures: Vec<String>,
    pub reasoning: String,
    pub created_at: DateTime<Utc>,
    pub auto_executed: bool,
}

impl ProblemOutcome {
    /// ITIL problem-creation gate: 3+ related incidents, confidence strictly
    /// above 0.8, and the should-create flag from the criteria check.
    pub fn meets_creation_criteria(&self) -> bool {
        self.related_incidents.len() >= 3
            && self.pattern_confidence > 0.8
            && self.should_create_problem
    }
}
