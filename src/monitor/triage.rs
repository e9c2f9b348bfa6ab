//! Top-issue triage: rank anomalies, build monitoring outcomes, and pick the
//! autonomous preventive action for each.

use super::analyzer::MetricAnalysis;
use crate::config::TriageConfig;
use crate::model::{AlertSeverity, Confidence, MonitoringOutcome};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The three fixed preventive actions the agent may take on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonitorAction {
    CreateCriticalIncident,
    CreatePreventiveTicket,
    SendAlertNotification,
}

/// The autonomous-action decision for one top issue.
#[derive(Debug, Clone, Serialize)]
pub struct PreventiveDecision {
    pub alert_id: String,
    pub action: Option<MonitorAction>,
    pub reasoning: String,
    pub timestamp: DateTime<Utc>,
}

/// Select the top 3 issues: anomalies only, ranked by severity score.
pub fn top_issues(
    analyses: &[MetricAnalysis],
    config: &TriageConfig,
    now: DateTime<Utc>,
) -> Vec<MonitoringOutcome> {
    let mut anomalies: Vec<&MetricAnalysis> =
        analyses.iter().filter(|a| a.is_anomaly).collect();
    anomalies.sort_by(|a, b| b.severity_score.total_cmp(&a.severity_score));

    anomalies
        .iter()
        .take(3)
        .enumerate()
        .map(|(i, analysis)| {
            let confidence = if analysis.confidence >= config.high_confidence_threshold {
                Confidence::High
            } else if analysis.confidence >= config.low_confidence_threshold {
                Confidence::Medium
            } else {
                Confidence::Low
            };

            MonitoringOutcome {
                id: Uuid::new_v4(),
                alert_id: format!("MON-{}-{}", now.format("%Y%m%d%H%M%S"), i + 1),
                anomaly_detected: true,
                alert_severity: alert_severity(analysis.severity_score, config),
                severity_score: analysis.severity_score,
                confidence,
                recommended_actions: recommended_actions(analysis),
                business_impact: business_impact(analysis),
                priority_rank: Some(i + 1),
                reasoning: monitoring_reasoning(analysis),
                created_at: now,
                auto_executed: false,
            }
        })
        .collect()
}

/// Alert severity label for a severity score, at the configured cutoffs.
pub fn alert_severity(severity_score: f64, config: &TriageConfig) -> AlertSeverity {
    if severity_score >= config.critical_threshold {
        AlertSeverity::Critical
    } else if severity_score >= config.warning_threshold {
        AlertSeverity::Warning
    } else {
        AlertSeverity::Info
    }
}

/// Actionable recommendations per metric, with urgency prefixes, capped at 4.
fn recommended_actions(analysis: &MetricAnalysis) -> Vec<String> {
    let mut actions: Vec<String> = match analysis.metric_name.as_str() {
        "cpu_utilization" => vec![
            "Check for runaway processes using top/htop".into(),
            "Review recent deployments for performance issues".into(),
            "Consider scaling up server resources".into(),
            "Investigate high CPU consuming applications".into(),
        ],
        "memory_usage" => vec![
            "Investigate potential memory leaks in applications".into(),
            "Restart services with high memory consumption".into(),
            "Review application logs for memory-related errors".into(),
            "Consider increasing available memory".into(),
        ],
        "disk_usage" => vec![
            "Clean up temporary files and logs".into(),
            "Archive old data to secondary storage".into(),
            "Review disk usage by directory (du -sh /*)".into(),
            "Plan for additional storage capacity".into(),
        ],
        name => vec![
            format!("Monitor {name} closely"),
            "Review system logs for related errors".into(),
            "Consider preventive maintenance".into(),
        ],
    };

    if analysis.severity_score > 0.9 {
        actions.insert(0, "URGENT: Immediate investigation required".into());
    } else if analysis.severity_score > 0.8 {
        actions.insert(0, "HIGH PRIORITY: Address within 1 hour".into());
    }

    actions.truncate(4);
    actions
}

fn business_impact(analysis: &MetricAnalysis) -> String {
    if analysis.severity_score >= 0.9 {
        "High - Service degradation likely".to_string()
    } else if analysis.severity_score >= 0.7 {
        "Medium - User experience may be affected".to_string()
    } else {
        "Low - Monitoring recommended".to_string()
    }
}

fn monitoring_reasoning(analysis: &MetricAnalysis) -> String {
    let mut parts = vec![format!(
        "{} at {:.1}",
        analysis.metric_name, analysis.current_value
    )];
    if analysis.current_value > analysis.threshold_value {
        parts.push(format!(
            "exceeds threshold ({:.1})",
            analysis.threshold_value
        ));
    }
    match analysis.trend {
        super::stats::Trend::Increasing => parts.push("trending increasing".into()),
        super::stats::Trend::Decreasing => parts.push("trending decreasing".into()),
        super::stats::Trend::Stable => {}
    }
    if analysis.severity_score > 0.8 {
        parts.push("high severity detected".into());
    } else if analysis.severity_score > 0.5 {
        parts.push("moderate severity".into());
    }
    parts.push(format!("Prediction: {}", analysis.prediction));
    parts.join("; ")
}

/// Pick autonomous actions for the top issues. High confidence with severity
/// at or above 0.8 acts on its own; everything else is flagged for review.
/// Issues that act are marked `auto_executed` in place.
pub fn autonomous_decisions(
    issues: &mut [MonitoringOutcome],
    now: DateTime<Utc>,
) -> Vec<PreventiveDecision> {
    issues
        .iter_mut()
        .map(|issue| {
            if issue.confidence == Confidence::High && issue.severity_score >= 0.8 {
                let (action, reasoning) = if issue.severity_score >= 0.9 {
                    (
                        MonitorAction::CreateCriticalIncident,
                        "Critical severity with high confidence - creating incident automatically",
                    )
                } else if issue.priority_rank.is_some_and(|r| r <= 2) {
                    (
                        MonitorAction::CreatePreventiveTicket,
                        "Top priority issue with high confidence - creating preventive maintenance ticket",
                    )
                } else {
                    (
                        MonitorAction::SendAlertNotification,
                        "High confidence anomaly - sending proactive alert",
                    )
                };
                issue.auto_executed = true;
                tracing::info!(alert_id = %issue.alert_id, ?action, "Autonomous preventive action");
                PreventiveDecision {
                    alert_id: issue.alert_id.clone(),
                    action: Some(action),
                    reasoning: reasoning.to_string(),
                    timestamp: now,
                }
            } else {
                tracing::info!(alert_id = %issue.alert_id, "Human review required");
                PreventiveDecision {
                    alert_id: issue.alert_id.clone(),
                    action: None,
                    reasoning: format!(
                        "Confidence {:?} - requires human review",
                        issue.confidence
                    ),
                    timestamp: now,
                }
            }
        })
        .collect()
}
