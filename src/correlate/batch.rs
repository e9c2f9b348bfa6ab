//! Batch correlation: the full pairwise similarity matrix and greedy
//! threshold clustering over a whole incident list.

use super::similarity::similarity;
use crate::config::TriageConfig;
use crate::model::Incident;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// One cluster of mutually-similar incidents.
#[derive(Debug, Clone, Serialize)]
pub struct ClusterGroup {
    pub group_id: String,
    pub incident_ids: Vec<String>,
    pub size: usize,
    pub avg_similarity: f64,
}

/// Full batch analysis output.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    /// incident id -> (other id -> similarity)
    pub matrix: HashMap<String, HashMap<String, f64>>,
    pub groups: Vec<ClusterGroup>,
    pub total_incidents: usize,
    pub grouped_incidents: usize,
    pub ungrouped_incidents: usize,
}

/// Build the pairwise matrix and cluster greedily: each unprocessed incident
/// seeds a group that absorbs every other unprocessed incident at or above
/// the correlation threshold.
pub fn batch_analysis(incidents: &[Incident], config: &TriageConfig) -> BatchReport {
    let mut matrix: HashMap<String, HashMap<String, f64>> = HashMap::new();
    for a in incidents {
        let row = matrix.entry(a.id.clone()).or_default();
        for b in incidents {
            if a.id != b.id {
                row.insert(b.id.clone(), similarity(a, b));
            }
        }
    }

    let mut groups = Vec::new();
    let mut processed: HashSet<&str> = HashSet::new();

    for seed in incidents {
        if processed.contains(seed.id.as_str()) {
            continue;
        }
        processed.insert(seed.id.as_str());
        let mut member_ids = vec![seed.id.clone()];

        for other in incidents {
            if processed.contains(other.id.as_str()) {
                continue;
            }
            let score = matrix[&seed.id].get(&other.id).copied().unwrap_or(0.0);
            if score >= config.correlation_threshold {
                member_ids.push(other.id.clone());
                processed.insert(other.id.as_str());
            }
        }

        if member_ids.len() > 1 {
            let avg_similarity = member_ids[1..]
                .iter()
                .map(|id| matrix[&seed.id].get(id).copied().unwrap_or(0.0))
                .sum::<f64>()
                / (member_ids.len() - 1) as f64;
            groups.push(ClusterGroup {
                group_id: format!("GRP-{}", groups.len() + 1),
                size: member_ids.len(),
                incident_ids: member_ids,
                avg_similarity,
            });
        }
    }

    let grouped: usize = groups.iter().map(|g| g.size).sum();
    BatchReport {
        matrix,
        groups,
        total_incidents: incidents.len(),
        grouped_incidents: grouped,
        ungrouped_incidents: incidents.len() - grouped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{IncidentStatus, Severity};
    use chrono::{TimeZone, Utc};

    fn incident(id: &str, title: &str, desc: &str, system: &str) -> Incident {
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
    fn related_incidents_cluster_and_loners_stay_out() {
        let incidents = vec![
            incident(
                "INC-1",
                "Email service unavailable",
                "Users unable to send or receive emails",
                "Email Server",
            ),
            incident(
                "INC-2",
                "Email connection timeout",
                "Email client showing connection timeout errors",
                "Email Server",
            ),
            incident(
                "INC-3",
                "Badge reader offline",
                "Lobby badge reader not accepting cards",
                "Facilities",
            ),
        ];

        let report = batch_analysis(&incidents, &TriageConfig::default());
        assert_eq!(report.total_incidents, 3);
        assert_eq!(report.groups.len(), 1);
        let group = &report.groups[0];
        assert_eq!(group.size, 2);
        assert!(group.incident_ids.contains(&"INC-1".to_string()));
        assert!(group.incident_ids.contains(&"INC-2".to_string()));
        assert!(group.avg_similarity >= 0.4);
        assert_eq!(report.ungrouped_incidents, 1);
    }

    #[test]
    fn matrix_is_symmetric_in_shape() {
        let incidents = vec![
            incident("INC-1", "A thing broke", "it is broken", "S1"),
            incident("INC-2", "Another thing", "also broken", "S2"),
        ];
        let report = batch_analysis(&incidents, &TriageConfig::default());
        assert!(report.matrix["INC-1"].contains_key("INC-2"));
        assert!(report.matrix["INC-2"].contains_key("INC-1"));
    }
}
