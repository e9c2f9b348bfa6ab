use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// ITIL problem lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProblemStatus {
    New,
    Investigating,
    #[serde(rename = "Known Error")]
    KnownError,
    Resolved,
    Closed,
}

/// Problem priority by business impact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProblemPriority {
    Critical,
    High,
    Medium,
    Low,
}

/// A record for a suspected root cause linking multiple incidents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Problem {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: ProblemStatus,
    pub priority: ProblemPriority,
    pub related_incidents: Vec<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub resolved_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub root_cause: Option<String>,
    #[serde(default)]
    pub contributing_factors: Vec<String>,

    #[serde(default)]
    pub preventive_measures: Vec<String>,
    #[serde(default)]
    pub assigned_team: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,

    #[serde(default)]
    pub auto_created: bool,
    #[serde(default)]
    pub pattern_confidence: Option<f64>,
}

impl Problem {
    /// Add an incident, ignoring duplicates.
    pub fn add_related_incident(&mut self, incident_id: &str) {
        if !self.related_incidents.iter().any(|id| id == incident_id) {
            self.related_incidents.push(incident_id.to_string());
        }
    }

    /// ITIL closure criteria: resolved, with a root cause, at least one
    /// preventive measure, and a resolution timestamp.
    pub fn meets_closure_criteria(&self) -> bool {
        self.status == ProblemStatus::Resolved
            && self.root_cause.is_some()
            && !self.preventive_measures.is_empty()
            && self.resolved_at.is_some()
    }
}
