//! Partition an incident list into three pattern families: by affected
//! system, by symptom keyword, and by temporal clustering.

use crate::config::TriageConfig;
use crate::model::Incident;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Symptom keywords scanned against title + description.
const SYMPTOM_KEYWORDS: &[&str] = &[
    "timeout",
    "connection",
    "slow",
    "error",
    "failure",
    "unavailable",
    "crash",
    "memory",
    "cpu",
    "disk",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternKind {
    System,
    Symptom,
    Temporal,
}

/// A qualifying group of incidents sharing a system, symptom, or time window.
#[derive(Debug, Clone)]
pub struct IncidentPattern<'a> {
    pub id: String,
    pub kind: PatternKind,
    pub key: String,
    pub description: String,
    pub incidents: Vec<&'a Incident>,
    pub confidence: f64,
    pub high_severity_count: usize,
    pub estimated_users_affected: usize,
    pub time_span_hours: f64,
    pub affected_systems: Vec<String>,
}

/// Detect all qualifying patterns (group size >= the pattern threshold)
/// across the three families. `now` anchors the recency boost so results are
/// reproducible in tests.
pub fn detect_patterns<'a>(
    incidents: &'a [Incident],
    config: &TriageConfig,
    now: DateTime<Utc>,
) -> Vec<IncidentPattern<'a>> {
    if incidents.len() < config.pattern_threshold {
        return Vec::new();
    }

    let mut patterns = Vec::new();
    patterns.extend(system_patterns(incidents, config, now));
    patterns.extend(symptom_patterns(incidents, config, now));
    patterns.extend(temporal_patterns(incidents, config, now));
    patterns
}

fn system_patterns<'a>(
    incidents: &'a [Incident],
    config: &TriageConfig,
    now: DateTime<Utc>,
) -> Vec<IncidentPattern<'a>> {
    let mut groups: BTreeMap<&str, Vec<&Incident>> = BTreeMap::new();
    for incident in incidents {
        groups
            .entry(incident.affected_system.as_str())
            .or_default()
            .push(incident);
    }

    groups
        .into_iter()
        .filter(|(_, members)| members.len() >= config.pattern_threshold)
        .map(|(system, members)| {
            build_pattern(
                PatternKind::System,
                system,
                format!("Multiple incidents affecting {system}"),
                members,
                now,
            )
        })
        .collect()
}

fn symptom_patterns<'a>(
    incidents: &'a [Incident],
    config: &TriageConfig,
    now: DateTime<Utc>,
) -> Vec<IncidentPattern<'a>> {
    let mut patterns = Vec::new();
    for &symptom in SYMPTOM_KEYWORDS {
        let members: Vec<&Incident> = incidents
            .iter()
            .filter(|inc| {
                inc.title.to_lowercase().contains(symptom)
                    || inc.description.to_lowercase().contains(symptom)
            })
            .collect();
        if members.len() >= config.pattern_threshold {
            patterns.push(build_pattern(
                PatternKind::Symptom,
                symptom,
                format!("Multiple incidents with '{symptom}' symptoms"),
                members,
                now,
            ));
        }
    }
    patterns
}

/// Sliding window over incidents sorted by creation time. Windows that do
/// not extend past the previous one are subsets and are skipped.
fn temporal_patterns<'a>(
    incidents: &'a [Incident],
    config: &TriageConfig,
    now: DateTime<Utc>,
) -> Vec<IncidentPattern<'a>> {
    let mut sorted: Vec<&Incident> = incidents.iter().collect();
    sorted.sort_by_key(|inc| inc.created_at);

    let window = Duration::hours(config.pattern_window_hours);
    let mut patterns = Vec::new();
    let mut last_end = 0usize;

    for start in 0..sorted.len() {
        let cutoff = sorted[start].created_at + window;
        let mut end = start;
        while end < sorted.len() && sorted[end].created_at <= cutoff {
            end += 1;
        }

        if end - start >= config.pattern_threshold && end > last_end {
            last_end = end;
            let members = sorted[start..end].to_vec();
            patterns.push(build_pattern(
                PatternKind::Temporal,
                &format!("{}h_cluster", config.pattern_window_hours),
                format!(
                    "{} incidents within {} hours",
                    members.len(),
                    config.pattern_window_hours
                ),
                members,
                now,
            ));
        }
    }
    patterns
}

fn build_pattern<'a>(
    kind: PatternKind,
    key: &str,
    description: String,
    members: Vec<&'a Incident>,
    now: DateTime<Utc>,
) -> IncidentPattern<'a> {
    let high_severity_count = members.iter().filter(|i| i.severity.is_high()).count();

    let mut user_groups: Vec<&str> = members.iter().map(|i| i.user_group.as_str()).collect();
    user_groups.sort_unstable();
    user_groups.dedup();
    // Rough impact estimate: 50 users per distinct group.
    let estimated_users_affected = user_groups.len() * 50;

    let mut systems: Vec<String> = members
        .iter()
        .map(|i| i.affected_system.clone())
        .collect();
    systems.sort_unstable();
    systems.dedup();

    let kind_label = match kind {
        PatternKind::System => "system",
        PatternKind::Symptom => "symptom",
        PatternKind::Temporal => "temporal",
    };

    IncidentPattern {
        id: format!("{kind_label}_{key}_{}", now.format("%Y%m%d%H%M%S")),
        kind,
        key: key.to_string(),
        description,
        confidence: pattern_confidence(&members, kind, now),
        high_severity_count,
        estimated_users_affected,
        time_span_hours: time_span_hours(&members),
        affected_systems: systems,
        incidents: members,
    }
}

/// Confidence: base 0.5 plus capped boosts for group size, high-severity
/// members, recency, and pattern type; clamped to 1.0.
fn pattern_confidence(members: &[&Incident], kind: PatternKind, now: DateTime<Utc>) -> f64 {
    let mut confidence = 0.5;

    confidence += (members.len() as f64 * 0.05).min(0.3);

    let high_severity = members.iter().filter(|i| i.severity.is_high()).count();
    confidence += (high_severity as f64 * 0.1).min(0.2);

    let recent = members
        .iter()
        .filter(|i| (now - i.created_at).num_seconds() < 86_400)
        .count();
    confidence += (recent as f64 * 0.05).min(0.15);

    confidence += match kind {
        PatternKind::System => 0.1,
        PatternKind::Temporal => 0.05,
        PatternKind::Symptom => 0.0,
    };

    confidence.min(1.0)
}

fn time_span_hours(members: &[&Incident]) -> f64 {
    let times: Vec<DateTime<Utc>> = members.iter().map(|i| i.created_at).collect();
    match (times.iter().min(), times.iter().max()) {
        (Some(min), Some(max)) if members.len() >= 2 => {
            (*max - *min).num_seconds() as f64 / 3600.0
        }
        _ => 0.0,
    }
}
