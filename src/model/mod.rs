//! Typed ITSM records -- incidents, alerts, problems, metrics, and the
//! ephemeral decision records produced by the triage agents.

pub mod alert;
pub mod incident;
pub mod metric;
pub mod outcome;
pub mod problem;

pub use alert::{Alert, AlertSeverity, AlertStatus};
pub use incident::{Incident, IncidentStatus, Severity};
pub use metric::{MetricPoint, MetricSet};
pub use outcome::{
    Confidence, CorrelationAction, CorrelationOutcome, EscalationForecast, MonitoringOutcome,
    ProblemOutcome,
};
pub use problem::{Problem, ProblemPriority, ProblemStatus};
