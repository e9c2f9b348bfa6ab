//! Keyword-based incident similarity.
//!
//! Jaccard overlap of title+description tokens, plus fixed additive boosts
//! for matching metadata, temporal proximity, shared technical terms, and
//! exact phrase matches. Always returns a value in [0, 1].

use crate::model::Incident;
use std::collections::HashSet;

/// Shared technical terms and their weights. High-weight terms name core
/// system components; lower weights are common symptoms.
const TECHNICAL_TERMS: &[(&str, f64)] = &[
    ("database", 0.4),
    ("server", 0.4),
    ("network", 0.4),
    ("authentication", 0.4),
    ("timeout", 0.3),
    ("connection", 0.3),
    ("slow", 0.3),
    ("error", 0.3),
    ("failure", 0.3),
    ("unavailable", 0.3),
    ("memory", 0.3),
    ("cpu", 0.3),
    ("disk", 0.3),
    ("email", 0.2),
    ("login", 0.2),
    ("backup", 0.2),
    ("storage", 0.2),
    ("application", 0.2),
    ("performance", 0.2),
    ("latency", 0.2),
    ("crash", 0.2),
    ("restart", 0.2),
];

/// Phrases that strongly indicate the same failure mode.
const SHARED_PHRASES: &[&str] = &[
    "connection timeout",
    "slow response",
    "server error",
    "database error",
    "email delivery",
    "login failed",
];

fn tokens(text: &str) -> HashSet<String> {
    text.split_whitespace()
        .map(|w| w.to_lowercase())
        .collect()
}

fn combined_text(incident: &Incident) -> String {
    format!("{} {}", incident.title, incident.description)
}

/// Jaccard similarity of the two token sets plus technical-term and phrase
/// boosts, clamped to 1.0.
fn keyword_similarity(text1: &str, text2: &str) -> f64 {
    let words1 = tokens(text1);
    let words2 = tokens(text2);

    if words1.is_empty() || words2.is_empty() {
        return 0.0;
    }

    let intersection: HashSet<&String> = words1.intersection(&words2).collect();
    let union_len = words1.union(&words2).count();
    let mut score = intersection.len() as f64 / union_len as f64;

    for (term, weight) in TECHNICAL_TERMS {
        if intersection.iter().any(|w| w.as_str() == *term) {
            score += weight;
        }
    }

    let lower1 = text1.to_lowercase();
    let lower2 = text2.to_lowercase();
    if SHARED_PHRASES
        .iter()
        .any(|phrase| lower1.contains(phrase) && lower2.contains(phrase))
    {
        score += 0.2;
    }

    score.min(1.0)
}

/// Pairwise similarity between two incidents, in [0, 1].
///
/// Text overlap is the base; same affected system adds 0.2, same user group
/// adds 0.1, and temporal proximity adds 0.1 (within 1 hour) or 0.05
/// (within 24 hours).
pub fn similarity(a: &Incident, b: &Incident) -> f64 {
    let mut score = keyword_similarity(&combined_text(a), &combined_text(b));

    if a.affected_system == b.affected_system {
        score += 0.2;
    }
    if a.user_group == b.user_group {
        score += 0.1;
    }

    let time_diff_secs = (a.created_at - b.created_at).num_seconds().abs();
    if time_diff_secs < 3600 {
        score += 0.1;
    } else if time_diff_secs < 86_400 {
        score += 0.05;
    }

    score.min(1.0)
}

/// Human-readable account of which boosts fired. Cosmetic output only.
pub fn similarity_reasoning(a: &Incident, b: &Incident, score: f64) -> String {
    let mut reasons = Vec::new();

    if a.affected_system == b.affected_system {
        reasons.push(format!("same affected system ({})", a.affected_system));
    }
    if a.user_group == b.user_group {
        reasons.push(format!("same user group ({})", a.user_group));
    }

    let words1 = tokens(&a.description);
    let words2 = tokens(&b.description);
    let common: Vec<&String> = words1.intersection(&words2).collect();
    if common.len() > 2 {
        let mut key_words: Vec<&str> = common
            .iter()
            .filter(|w| w.len() > 4)
            .map(|w| w.as_str())
            .collect();
        key_words.sort_unstable();
        key_words.truncate(3);
        if !key_words.is_empty() {
            reasons.push(format!("common symptoms: {}", key_words.join(", ")));
        }
    }

    let time_diff_secs = (a.created_at - b.created_at).num_seconds().abs();
    if time_diff_secs < 3600 {
        reasons.push("occurred within 1 hour".to_string());
    } else if time_diff_secs < 86_400 {
        reasons.push("occurred within 24 hours".to_string());
    }

    if reasons.is_empty() {
        format!("Text similarity: {score:.2}")
    } else {
        format!("Text similarity: {score:.2} ({})", reasons.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{IncidentStatus, Severity};
    use chrono::{Duration, TimeZone, Utc};

    fn incident(title: &str, desc: &str, system: &str, group: &str, hour_offset: i64) -> Incident {
        Incident {
            id: format!("INC-{title}"),
            title: title.into(),
            description: desc.into(),
            severity: Severity::P3,
            status: IncidentStatus::New,
            affected_system: system.into(),
            user_group: group.into(),
            created_at: Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()
                + Duration::hours(hour_offset),
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
    fn identical_incidents_saturate() {
        let a = incident(
            "Email service unavailable",
            "Users unable to send or receive emails",
            "Email Server",
            "Sales Team",
            0,
        );
        let b = a.clone();
        assert!(similarity(&a, &b) >= 0.9);
    }

    #[test]
    fn fully_disjoint_incidents_score_zero() {
        // Disjoint systems, groups, and words, created more than a day apart
        // so the temporal boost cannot fire either.
        let a = incident("Printer jammed", "Paper stuck inside tray", "Print Hub", "HR", 0);
        let b = incident(
            "VPN degraded",
            "Remote tunnel latency climbing steadily",
            "Gateway",
            "Finance",
            48,
        );
        assert_eq!(similarity(&a, &b), 0.0);
    }

    #[test]
    fn score_is_clamped_despite_stacked_boosts() {
        // Every boost fires: same system, group, hour, many technical terms.
        let text = "database server network authentication timeout connection error";
        let a = incident(text, text, "Database Server", "Engineering", 0);
        let b = incident(text, text, "Database Server", "Engineering", 0);
        let score = similarity(&a, &b);
        assert!(score <= 1.0);
        assert!(score >= 0.99);
    }

    #[test]
    fn temporal_proximity_tiers() {
        let a = incident("Disk alarm", "volume nearly full", "File Server", "Ops", 0);
        let within_hour = incident("Storage warning", "volume nearly full", "NAS", "HR", 0);
        let within_day = incident("Storage warning", "volume nearly full", "NAS", "HR", 12);
        let far = incident("Storage warning", "volume nearly full", "NAS", "HR", 72);

        let near_score = similarity(&a, &within_hour);
        let day_score = similarity(&a, &within_day);
        let far_score = similarity(&a, &far);
        assert!(near_score > day_score);
        assert!(day_score > far_score);
    }

    #[test]
    fn shared_phrase_adds_boost() {
        let a = incident(
            "App failing",
            "intermittent connection timeout observed on checkout",
            "Web Application",
            "Ops",
            0,
        );
        let b = incident(
            "Orders stuck",
            "backend reports connection timeout under load",
            "Order Service",
            "Sales Team",
            100,
        );
        let with_phrase = similarity(&a, &b);

        let c = incident(
            "Orders stuck",
            "backend reports connection drops under load",
            "Order Service",
            "Sales Team",
            100,
        );
        let without_phrase = similarity(&a, &c);
        assert!(with_phrase > without_phrase);
    }

    #[test]
    fn reasoning_names_fired_boosts() {
        let a = incident(
            "Email slow",
            "delivery queues backing up badly",
            "Email Server",
            "Sales Team",
            0,
        );
        let b = incident(
            "Email stuck",
            "delivery queues backing up badly",
            "Email Server",
            "Sales Team",
            0,
        );
        let text = similarity_reasoning(&a, &b, similarity(&a, &b));
        assert!(text.contains("same affected system"));
        assert!(text.contains("same user group"));
        assert!(text.contains("within 1 hour"));
    }
}
