//! The problem-creation decision: ITIL criteria check, root-cause and
//! preventive-measure lookup, and construction of the problem record.

use super::patterns::{IncidentPattern, PatternKind};
use crate::config::TriageConfig;
use crate::model::{Problem, ProblemOutcome, ProblemPriority, ProblemStatus};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// ITIL problem-creation criteria: minimum incident count, high pattern
/// confidence, and either enough high-severity incidents or enough users
/// affected.
pub fn meets_problem_criteria(pattern: &IncidentPattern<'_>, config: &TriageConfig) -> bool {
    if pattern.incidents.len() < config.pattern_threshold {
        return false;
    }
    if pattern.confidence < config.pattern_confidence_threshold {
        return false;
    }
    pattern.high_severity_count >= config.high_severity_threshold
        || pattern.estimated_users_affected >= config.user_impact_threshold
}

/// Evaluate one pattern for problem creation.
pub fn decide(
    pattern: &IncidentPattern<'_>,
    config: &TriageConfig,
    now: DateTime<Utc>,
) -> ProblemOutcome {
    let should_create = meets_problem_criteria(pattern, config);

    let mut outcome = ProblemOutcome {
        id: Uuid::new_v4(),
        pattern_id: pattern.id.clone(),
        related_incidents: pattern.incidents.iter().map(|i| i.id.clone()).collect(),
        pattern_confidence: pattern.confidence,
        should_create_problem: should_create,
        root_cause_hypothesis: root_cause_hypothesis(pattern),
        preventive_measures: preventive_measures(pattern),
        reasoning: decision_reasoning(pattern, should_create, config),
        created_at: now,
        auto_executed: false,
    };
    outcome.auto_executed = outcome.meets_creation_criteria();

    if outcome.auto_executed {
        tracing::info!(pattern = %pattern.description, "Autonomous problem creation");
    } else {
        tracing::info!(pattern = %pattern.description, "Human review required");
    }
    outcome
}

/// Static root-cause text keyed by pattern type and key. Not inference.
fn root_cause_hypothesis(pattern: &IncidentPattern<'_>) -> String {
    match pattern.kind {
        PatternKind::System => format!(
            "Underlying infrastructure issue with {} causing recurring failures",
            pattern.key
        ),
        PatternKind::Symptom => match pattern.key.as_str() {
            "timeout" => "Network latency or resource contention issues".to_string(),
            "connection" => "Network connectivity or service availability problems".to_string(),
            "slow" => "Performance degradation due to resource constraints".to_string(),
            "memory" => "Memory leak or insufficient memory allocation".to_string(),
            "cpu" => "CPU bottleneck or inefficient processing".to_string(),
            "disk" => "Storage capacity or I/O performance issues".to_string(),
            key => format!("Recurring {key} issues indicate systemic problem"),
        },
        PatternKind::Temporal => {
            "Time-clustered incidents suggest common trigger event or cascading failure"
                .to_string()
        }
    }
}

fn preventive_measures(pattern: &IncidentPattern<'_>) -> Vec<String> {
    match pattern.kind {
        PatternKind::System => vec![
            format!("Conduct comprehensive health check of {}", pattern.key),
            format!("Review {} configuration and capacity planning", pattern.key),
            format!("Implement enhanced monitoring for {}", pattern.key),
            "Schedule preventive maintenance window".to_string(),
        ],
        PatternKind::Symptom => match pattern.key.as_str() {
            "timeout" => vec![
                "Review and optimize timeout configurations".into(),
                "Implement connection pooling and retry logic".into(),
                "Monitor network latency and bandwidth".into(),
            ],
            "memory" => vec![
                "Implement memory leak detection tools".into(),
                "Review application memory management".into(),
                "Schedule regular service restarts".into(),
            ],
            "cpu" => vec![
                "Optimize high-CPU processes and queries".into(),
                "Implement CPU usage monitoring and alerting".into(),
                "Consider horizontal scaling options".into(),
            ],
            key => vec![
                format!("Implement monitoring for {key} symptoms"),
                "Conduct root cause analysis".into(),
                "Develop standard operating procedures".into(),
            ],
        },
        PatternKind::Temporal => vec![
            "Implement comprehensive incident correlation monitoring".into(),
            "Review change management processes".into(),
            "Enhance system dependency mapping".into(),
            "Develop incident response playbooks".into(),
        ],
    }
}

fn decision_reasoning(
    pattern: &IncidentPattern<'_>,
    should_create: bool,
    config: &TriageConfig,
) -> String {
    if should_create {
        format!(
            "Pattern meets ITIL problem creation criteria: {} incidents, {} high-severity, \
             ~{} users affected, confidence: {:.2}",
            pattern.incidents.len(),
            pattern.high_severity_count,
            pattern.estimated_users_affected,
            pattern.confidence
        )
    } else {
        format!(
            "Pattern does not meet autonomous creation criteria: {} incidents (need {}), \
             confidence: {:.2} (need {})",
            pattern.incidents.len(),
            config.pattern_threshold,
            pattern.confidence,
            config.pattern_confidence_threshold
        )
    }
}

/// Build the problem record for an approved outcome. Priority follows the
/// high-severity count among the related incidents.
pub fn create_problem(
    outcome: &ProblemOutcome,
    high_severity_count: usize,
    now: DateTime<Utc>,
) -> Problem {
    let priority = if high_severity_count >= 2 {
        ProblemPriority::Critical
    } else if high_severity_count >= 1 {
        ProblemPriority::High
    } else {
        ProblemPriority::Medium
    };

    Problem {
        id: format!("PRB-{}", now.format("%Y%m%d%H%M%S")),
        title: format!("Recurring incidents: {}", outcome.root_cause_hypothesis),
        description: format!(
            "Problem created from pattern analysis of {} related incidents",
            outcome.related_incidents.len()
        ),
        status: ProblemStatus::Investigating,
        priority,
        related_incidents: outcome.related_incidents.clone(),
        created_at: now,
        resolved_at: None,
        root_cause: Some(outcome.root_cause_hypothesis.clone()),
        contributing_factors: Vec::new(),
        preventive_measures: outcome.preventive_measures.clone(),
        assigned_team: Some("Infrastructure Team".to_string()),
        owner: Some("Problem Manager".to_string()),
        auto_created: true,
        pattern_confidence: Some(outcome.pattern_confidence),
    }
}
