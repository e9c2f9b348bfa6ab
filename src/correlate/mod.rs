//! Incident correlation -- pairwise similarity scoring and the four-way
//! decision table that turns scored matches into an action.

pub mod batch;
pub mod decision;
pub mod similarity;

pub use decision::{decide, predict_escalation};

use crate::config::TriageConfig;
use crate::model::Incident;

/// A candidate incident with its similarity score against the target.
#[derive(Debug, Clone)]
pub struct ScoredMatch<'a> {
    pub incident: &'a Incident,
    pub score: f64,
    pub reasoning: String,
}

/// Score every open incident in the pool against the target, keep those at
/// or above the correlation threshold, sorted by score descending.
pub fn find_similar<'a>(
    target: &Incident,
    pool: &'a [Incident],
    config: &TriageConfig,
) -> Vec<ScoredMatch<'a>> {
    let mut matches: Vec<ScoredMatch<'a>> = pool
        .iter()
        .filter(|other| other.id != target.id && other.is_open())
        .filter_map(|other| {
            let score = similarity::similarity(target, other);
            (score >= config.correlation_threshold).then(|| ScoredMatch {
                incident: other,
                score,
                reasoning: similarity::similarity_reasoning(target, other, score),
            })
        })
        .collect();

    matches.sort_by(|a, b| b.score.total_cmp(&a.score));
    matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{IncidentStatus, Severity};
    use chrono::{TimeZone, Utc};

    pub(crate) fn incident(id: &str, title: &str, desc: &str, system: &str) -> Incident {
        Incident {
            id: id.into(),
            title: title.into(),
            description: desc.into(),
            severity: Severity::P3,
            status: IncidentStatus::New,
            affected_system: system.into(),
            user_group: "Engineering".into(),
            created_at: Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
            resolved_at: None,
            correlation_group: None,
            problem_id: None,
            impact: "Medium".into(),
            urgency: "Medium".into(),
            category: "Infrastructure".into(),
            subcategory: "Server".into(),
            assigned_to: None,
            correlation_confidence: None,
            auto_created: false,
        }
    }

    #[test]
    fn resolved_incidents_are_excluded() {
        let target = incident("INC-1", "Email down", "email outage for all users", "Email Server");
        let mut twin = incident("INC-2", "Email down", "email outage for all users", "Email Server");
        twin.status = IncidentStatus::Resolved;
        let pool = vec![twin];

        let matches = find_similar(&target, &pool, &TriageConfig::default());
        assert!(matches.is_empty());
    }

    #[test]
    fn self_is_excluded() {
        let target = incident("INC-1", "Email down", "email outage", "Email Server");
        let pool = vec![target.clone()];
        let matches = find_similar(&target, &pool, &TriageConfig::default());
        assert!(matches.is_empty());
    }

    #[test]
    fn scoring_and_decision_compose_through_the_module_surface() {
        let target = incident("INC-1", "Email down", "email outage for all users", "Email Server");
        let pool = vec![incident(
            "INC-2",
            "Email down",
            "email outage for all users",
            "Email Server",
        )];
        let config = TriageConfig::default();
        let matches = find_similar(&target, &pool, &config);
        let outcome = decide(
            &target,
            &matches,
            &config,
            Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
        );
        assert_eq!(outcome.similar_incidents, vec!["INC-2".to_string()]);
        let forecast = predict_escalation(&target, &matches, &config);
        assert_eq!(forecast.total_similar, 1);
    }

    #[test]
    fn matches_sorted_by_score_descending() {
        let target = incident(
            "INC-1",
            "Database connection errors",
            "Application showing database connection failures",
            "Database Server",
        );
        let near = incident(
            "INC-2",
            "Database connection errors",
            "Application showing database connection failures",
            "Database Server",
        );
        let far = incident(
            "INC-3",
            "Database query timeout",
            "Database queries timing out after 30 seconds",
            "Database Server",
        );
        let pool = vec![far, near];

        let matches = find_similar(&target, &pool, &TriageConfig::default());
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].incident.id, "INC-2");
        assert!(matches[0].score >= matches[1].score);
    }
}
