//! The correlation decision table: maps scored matches to one of four
//! enumerated actions, with a confidence bucket and an escalation forecast.

use super::ScoredMatch;
use crate::config::TriageConfig;
use crate::model::{
    Confidence, CorrelationAction, CorrelationOutcome, EscalationForecast, Incident,
};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Evaluate the decision table for one target incident.
///
/// Rules, in order:
/// 1. no candidates -> NoAction at High confidence
/// 2. 3+ candidates at High confidence -> CreateProblem
/// 3. 2+ candidates on critical systems, confidence not Low -> CreateProblem
/// 4. 2+ high-severity candidates with a low-severity target -> EscalateSeverity
/// 5. otherwise -> GroupIncidents
pub fn decide(
    target: &Incident,
    matches: &[ScoredMatch<'_>],
    config: &TriageConfig,
    now: DateTime<Utc>,
) -> CorrelationOutcome {
    if matches.is_empty() {
        return CorrelationOutcome {
            id: Uuid::new_v4(),
            incident_id: target.id.clone(),
            similar_incidents: Vec::new(),
            correlation_score: 0.0,
            confidence: Confidence::High,
            action: CorrelationAction::NoAction,
            reasoning: "No similar incidents found".to_string(),
            created_at: now,
            auto_executed: false,
            escalation: None,
        };
    }

    // Matches arrive sorted descending, so the head carries the max score.
    let max_score = matches[0].score;
    let confidence = if max_score >= config.high_confidence_threshold {
        Confidence::High
    } else if max_score >= config.low_confidence_threshold {
        Confidence::Medium
    } else {
        Confidence::Low
    };

    let action = determine_action(target, matches, confidence, config);
    let escalation = predict_escalation(target, matches, config);

    let mut reasoning = decision_reasoning(matches, action, max_score);
    if escalation.probability > 0.5 {
        reasoning.push_str(&format!(
            " | Escalation risk: {:.0}%",
            escalation.probability * 100.0
        ));
    }

    let mut outcome = CorrelationOutcome {
        id: Uuid::new_v4(),
        incident_id: target.id.clone(),
        similar_incidents: matches.iter().map(|m| m.incident.id.clone()).collect(),
        correlation_score: max_score,
        confidence,
        action,
        reasoning,
        created_at: now,
        auto_executed: false,
        escalation: Some(escalation),
    };
    outcome.auto_executed = outcome.should_execute_autonomously();
    outcome
}

fn determine_action(
    target: &Incident,
    matches: &[ScoredMatch<'_>],
    confidence: Confidence,
    config: &TriageConfig,
) -> CorrelationAction {
    let high_severity_count = matches
        .iter()
        .filter(|m| m.incident.severity.is_high())
        .count();

    // ITIL problem management: 3+ related incidents suggest a problem.
    if matches.len() >= 3 && confidence == Confidence::High {
        return CorrelationAction::CreateProblem;
    }

    // 2+ incidents touching critical systems also warrant a problem record.
    let critical_count = matches
        .iter()
        .filter(|m| {
            config
                .critical_systems
                .iter()
                .any(|sys| m.incident.affected_system.contains(sys.as_str()))
        })
        .count();
    if critical_count >= 2 && confidence != Confidence::Low {
        return CorrelationAction::CreateProblem;
    }

    if high_severity_count >= 2 && !target.severity.is_high() {
        return CorrelationAction::EscalateSeverity;
    }

    CorrelationAction::GroupIncidents
}

fn decision_reasoning(
    matches: &[ScoredMatch<'_>],
    action: CorrelationAction,
    max_score: f64,
) -> String {
    let count = matches.len();
    match action {
        CorrelationAction::CreateProblem => format!(
            "Found {count} similar incidents with {max_score:.2} similarity. \
             Meets ITIL criteria for problem creation (3+ related incidents)."
        ),
        CorrelationAction::EscalateSeverity => {
            let high = matches
                .iter()
                .filter(|m| m.incident.severity.is_high())
                .count();
            format!(
                "Found {high} high-severity similar incidents. \
                 Recommending severity escalation for broader impact."
            )
        }
        CorrelationAction::GroupIncidents => format!(
            "Found {count} similar incidents with {max_score:.2} similarity. \
             Grouping for coordinated response."
        ),
        CorrelationAction::NoAction => "No correlation action required.".to_string(),
    }
}

/// Forecast how likely the target is to escalate, from the severity mix of
/// its similar incidents.
pub fn predict_escalation(
    target: &Incident,
    matches: &[ScoredMatch<'_>],
    config: &TriageConfig,
) -> EscalationForecast {
    if matches.is_empty() {
        return EscalationForecast {
            probability: 0.0,
            confidence: 0.0,
            reasoning: "No historical data available".to_string(),
            similar_escalations: 0,
            total_similar: 0,
        };
    }

    let total = matches.len();
    let escalated = matches
        .iter()
        .filter(|m| m.incident.severity.is_high())
        .count();

    let mut probability = escalated as f64 / total as f64;
    if config
        .critical_systems
        .iter()
        .any(|sys| sys == &target.affected_system)
    {
        probability += 0.2;
    }
    if !target.severity.is_high() && probability > 0.6 {
        probability += 0.1;
    }
    let probability = probability.min(1.0);

    let avg_similarity = matches.iter().map(|m| m.score).sum::<f64>() / total as f64;
    let confidence = (avg_similarity * (total as f64 / 10.0)).min(0.95);

    EscalationForecast {
        probability,
        confidence,
        reasoning: format!(
            "Based on {escalated}/{total} similar incidents that escalated \
             (avg similarity: {avg_similarity:.2})"
        ),
        similar_escalations: escalated,
        total_similar: total,
    }
}
