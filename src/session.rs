//! In-memory triage session: owns the dataset, runs the three agents, applies
//! their autonomous actions, and keeps the decision logs the API serves.

use crate::config::TriageConfig;
use crate::correlate::{self, batch::BatchReport};
use crate::data::Dataset;
use crate::model::{
    Alert, CorrelationAction, CorrelationOutcome, Incident, IncidentStatus, MetricSet,
    MonitoringOutcome, Problem, ProblemOutcome, ProblemPriority, ProblemStatus, Severity,
};
use crate::monitor::{
    self, BreachForecast, CapacityPlan, MonitorAction, PreventiveDecision, SpikePattern,
};
use crate::problem;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("unknown incident {0}")]
    UnknownIncident(String),
}

/// One full monitoring pass: ranked issues, the autonomous decisions taken
/// on them, and the predictive supplements.
#[derive(Debug, Clone, Serialize)]
pub struct MonitoringRun {
    pub top_issues: Vec<MonitoringOutcome>,
    pub decisions: Vec<PreventiveDecision>,
    pub forecasts: Vec<BreachForecast>,
    pub recurring_spikes: Vec<SpikePattern>,
    pub capacity: CapacityPlan,
}

pub struct Session {
    pub config: TriageConfig,
    pub incidents: Vec<Incident>,
    pub alerts: Vec<Alert>,
    pub metrics: MetricSet,
    pub problems: Vec<Problem>,
    pub correlation_log: Vec<CorrelationOutcome>,
    pub monitoring_log: Vec<MonitoringOutcome>,
    pub problem_log: Vec<ProblemOutcome>,
}

impl Session {
    pub fn new(config: TriageConfig, dataset: Dataset) -> Self {
        Self {
            config,
            incidents: dataset.incidents,
            alerts: dataset.alerts,
            metrics: dataset.metrics,
            problems: Vec::new(),
            correlation_log: Vec::new(),
            monitoring_log: Vec::new(),
            problem_log: Vec::new(),
        }
    }

    /// Correlate one incident against the pool. Autonomous outcomes are
    /// applied to session state before returning.
    pub fn correlate_incident(
        &mut self,
        id: &str,
        now: DateTime<Utc>,
    ) -> Result<CorrelationOutcome, SessionError> {
        let target = self
            .incidents
            .iter()
            .find(|i| i.id == id)
            .cloned()
            .ok_or_else(|| SessionError::UnknownIncident(id.to_string()))?;

        let matches = correlate::find_similar(&target, &self.incidents, &self.config);
        let outcome = correlate::decide(&target, &matches, &self.config, now);

        if outcome.auto_executed {
            self.apply_correlation(&outcome, now);
        }
        self.correlation_log.push(outcome.clone());
        Ok(outcome)
    }

    /// Pairwise similarity matrix and greedy clustering over all incidents.
    pub fn batch_correlation(&self) -> BatchReport {
        correlate::batch::batch_analysis(&self.incidents, &self.config)
    }

    fn apply_correlation(&mut self, outcome: &CorrelationOutcome, now: DateTime<Utc>) {
        let mut involved: Vec<String> = outcome.similar_incidents.clone();
        involved.push(outcome.incident_id.clone());

        match outcome.action {
            CorrelationAction::GroupIncidents => {
                let group_id = format!("GRP-{}", now.format("%Y%m%d%H%M%S"));
                for incident in &mut self.incidents {
                    if involved.contains(&incident.id) {
                        incident.correlation_group = Some(group_id.clone());
                        incident.correlation_confidence = Some(outcome.correlation_score);
                    }
                }
                tracing::info!(%group_id, members = involved.len(), "Incidents grouped");
            }
            CorrelationAction::CreateProblem => {
                let high_severity = self
                    .incidents
                    .iter()
                    .filter(|i| involved.contains(&i.id) && i.severity.is_high())
                    .count();
                let target_system = self
                    .incidents
                    .iter()
                    .find(|i| i.id == outcome.incident_id)
                    .map(|i| i.affected_system.clone())
                    .unwrap_or_default();

                let problem = Problem {
                    id: self.next_problem_id(now),
                    title: format!("Recurring incidents affecting {target_system}"),
                    description: format!(
                        "Problem created from correlation of {} related incidents",
                        involved.len()
                    ),
                    status: ProblemStatus::Investigating,
                    priority: if high_severity >= 2 {
                        ProblemPriority::Critical
                    } else if high_severity >= 1 {
                        ProblemPriority::High
                    } else {
                        ProblemPriority::Medium
                    },
                    related_incidents: involved.clone(),
                    created_at: now,
                    resolved_at: None,
                    root_cause: None,
                    contributing_factors: Vec::new(),
                    preventive_measures: Vec::new(),
                    assigned_team: Some("Infrastructure Team".to_string()),
                    owner: Some("Problem Manager".to_string()),
                    auto_created: true,
                    pattern_confidence: Some(outcome.correlation_score),
                };
                for incident in &mut self.incidents {
                    if involved.contains(&incident.id) {
                        incident.problem_id = Some(problem.id.clone());
                    }
                }
                tracing::info!(problem_id = %problem.id, "Problem created from correlation");
                self.problems.push(problem);
            }
            CorrelationAction::EscalateSeverity => {
                if let Some(incident) = self
                    .incidents
                    .iter_mut()
                    .find(|i| i.id == outcome.incident_id)
                {
                    let from = incident.severity;
                    incident.severity = incident.severity.escalated();
                    tracing::info!(
                        incident_id = %incident.id,
                        ?from,
                        to = ?incident.severity,
                        "Severity escalated"
                    );
                }
            }
            CorrelationAction::NoAction => {}
        }
    }

    /// Run the monitoring agent: anomaly analysis, top-3 triage, autonomous
    /// preventive actions, and the predictive supplements. A critical-incident
    /// decision appends a new auto-created P1 incident.
    pub fn run_monitoring(&mut self, now: DateTime<Utc>) -> MonitoringRun {
        let analyses = monitor::analyze_metrics(&self.metrics, &self.config);
        let mut top_issues = monitor::top_issues(&analyses, &self.config, now);
        let decisions = monitor::autonomous_decisions(&mut top_issues, now);

        for decision in &decisions {
            if decision.action == Some(MonitorAction::CreateCriticalIncident) {
                if let Some(issue) = top_issues.iter().find(|i| i.alert_id == decision.alert_id) {
                    let incident = self.critical_incident_from(issue, now);
                    tracing::info!(incident_id = %incident.id, "Critical incident auto-created");
                    self.incidents.push(incident);
                }
            }
        }

        self.monitoring_log.extend(top_issues.iter().cloned());
        MonitoringRun {
            top_issues,
            decisions,
            forecasts: monitor::forecast_breaches(&self.metrics, 4),
            recurring_spikes: monitor::recurring_spikes(&self.metrics),
            capacity: monitor::capacity_recommendations(&self.metrics),
        }
    }

    fn critical_incident_from(&self, issue: &MonitoringOutcome, now: DateTime<Utc>) -> Incident {
        Incident {
            id: format!("INC-{:04}", 1000 + self.incidents.len()),
            title: format!("Critical anomaly: {}", issue.alert_id),
            description: issue.reasoning.clone(),
            severity: Severity::P1,
            status: IncidentStatus::New,
            affected_system: "Monitoring System".to_string(),
            user_group: "Operations".to_string(),
            created_at: now,
            resolved_at: None,
            correlation_group: None,
            problem_id: None,
            impact: "High".to_string(),
            urgency: "High".to_string(),
            category: "Infrastructure".to_string(),
            subcategory: "Monitoring".to_string(),
            assigned_to: None,
            correlation_confidence: None,
            auto_created: true,
        }
    }

    /// Run the problem agent over all incidents. Qualifying patterns become
    /// problem records with their incidents linked.
    pub fn run_problem_analysis(&mut self, now: DateTime<Utc>) -> Vec<ProblemOutcome> {
        let planned: Vec<(ProblemOutcome, usize)> = {
            let patterns = problem::detect_patterns(&self.incidents, &self.config, now);
            patterns
                .iter()
                .map(|p| (problem::decide(p, &self.config, now), p.high_severity_count))
                .collect()
        };

        let mut outcomes = Vec::with_capacity(planned.len());
        for (outcome, high_severity) in planned {
            if outcome.auto_executed {
                let mut record = problem::create_problem(&outcome, high_severity, now);
                record.id = self.next_problem_id(now);
                for incident in &mut self.incidents {
                    if record.related_incidents.contains(&incident.id) {
                        incident.problem_id = Some(record.id.clone());
                    }
                }
                tracing::info!(problem_id = %record.id, "Problem auto-created from pattern");
                self.problems.push(record);
            }
            self.problem_log.push(outcome.clone());
            outcomes.push(outcome);
        }
        outcomes
    }

    /// Timestamp-based problem ids with a numeric suffix when several land
    /// in the same second.
    fn next_problem_id(&self, now: DateTime<Utc>) -> String {
        let base = format!("PRB-{}", now.format("%Y%m%d%H%M%S"));
        if !self.problems.iter().any(|p| p.id == base) {
            return base;
        }
        let mut n = 2;
        loop {
            let candidate = format!("{base}-{n}");
            if !self.problems.iter().any(|p| p.id == candidate) {
                return candidate;
            }
            n += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Confidence, MetricPoint};
    use chrono::{Duration, TimeZone};

    fn incident(id: &str, title: &str, desc: &str, system: &str, severity: Severity) -> Incident {
        Incident {
            id: id.into(),
            title: title.into(),
            description: desc.into(),
            severity,
            status: IncidentStatus::New,
            affected_system: system.into(),
            user_group: "Engineering".into(),
            created_at: Utc.with_ymd_and_hms(2025, 6, 1, 11, 0, 0).unwrap(),
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

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn session(incidents: Vec<Incident>) -> Session {
        Session::new(
            TriageConfig::default(),
            Dataset {
                incidents,
                ..Dataset::default()
            },
        )
    }

    #[test]
    fn unknown_incident_is_an_error() {
        let mut s = session(vec![]);
        let err = s.correlate_incident("INC-404", now()).unwrap_err();
        assert!(matches!(err, SessionError::UnknownIncident(_)));
    }

    #[test]
    fn near_identical_pair_groups_autonomously() {
        let mut s = session(vec![
            incident(
                "INC-1",
                "Email service unavailable",
                "Users unable to send or receive emails through Outlook",
                "Email Server",
                Severity::P3,
            ),
            incident(
                "INC-2",
                "Email service unavailable",
                "Users unable to send or receive emails through Outlook",
                "Email Server",
                Severity::P3,
            ),
        ]);

        let outcome = s.correlate_incident("INC-1", now()).unwrap();
        assert_eq!(outcome.action, CorrelationAction::GroupIncidents);
        assert_eq!(outcome.confidence, Confidence::High);
        assert!(outcome.auto_executed);

        let group: Vec<_> = s
            .incidents
            .iter()
            .filter_map(|i| i.correlation_group.as_deref())
            .collect();
        assert_eq!(group.len(), 2);
        assert_eq!(group[0], group[1]);
    }

    #[test]
    fn no_candidates_is_a_clean_no_action() {
        let mut s = session(vec![incident(
            "INC-1",
            "Badge reader offline",
            "Lobby badge reader not accepting cards",
            "Facilities",
            Severity::P4,
        )]);
        let outcome = s.correlate_incident("INC-1", now()).unwrap();
        assert_eq!(outcome.action, CorrelationAction::NoAction);
        assert!(s.incidents[0].correlation_group.is_none());
    }

    #[test]
    fn severe_metric_breach_creates_critical_incident() {
        let base = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let points: Vec<MetricPoint> = [50.0, 50.0, 50.0, 50.0, 96.0]
            .iter()
            .enumerate()
            .map(|(i, &value)| MetricPoint {
                timestamp: base + Duration::hours(i as i64),
                value,
                resource: "prod-web-01".into(),
            })
            .collect();
        let mut metrics = MetricSet::new();
        metrics.insert("cpu_utilization".into(), points);

        let mut s = Session::new(
            TriageConfig::default(),
            Dataset {
                metrics,
                ..Dataset::default()
            },
        );
        let run = s.run_monitoring(now());

        assert_eq!(run.top_issues.len(), 1);
        assert!(run.top_issues[0].auto_executed);
        assert_eq!(
            run.decisions[0].action,
            Some(MonitorAction::CreateCriticalIncident)
        );
        assert_eq!(s.incidents.len(), 1);
        let created = &s.incidents[0];
        assert_eq!(created.severity, Severity::P1);
        assert!(created.auto_created);
    }

    #[test]
    fn monitoring_run_carries_capacity_recommendations() {
        let base = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let points: Vec<MetricPoint> = [88.0, 90.0, 91.0, 92.0, 94.0]
            .iter()
            .enumerate()
            .map(|(i, &value)| MetricPoint {
                timestamp: base + Duration::hours(i as i64),
                value,
                resource: "prod-db-01".into(),
            })
            .collect();
        let mut metrics = MetricSet::new();
        metrics.insert("disk_usage".into(), points);

        let mut s = Session::new(
            TriageConfig::default(),
            Dataset {
                metrics,
                ..Dataset::default()
            },
        );
        let run = s.run_monitoring(now());
        assert_eq!(
            run.capacity.immediate_actions,
            vec!["URGENT: disk_usage at 94.0% - immediate capacity increase needed"]
        );
    }

    #[test]
    fn problem_analysis_links_incidents_to_the_new_record() {
        let mut incidents: Vec<Incident> = (0..4)
            .map(|i| {
                incident(
                    &format!("INC-{i}"),
                    "Database connection errors",
                    "Application showing database connection failures",
                    "prod-db-01",
                    if i < 2 { Severity::P1 } else { Severity::P3 },
                )
            })
            .collect();
        for (i, inc) in incidents.iter_mut().enumerate() {
            inc.user_group = format!("Group {i}");
        }

        let mut s = session(incidents);
        let outcomes = s.run_problem_analysis(now());

        assert!(outcomes.iter().any(|o| o.auto_executed));
        assert!(!s.problems.is_empty());
        // Incidents point at the most recent problem that absorbed them.
        let problem_id = s.problems.last().unwrap().id.clone();
        let linked = s
            .incidents
            .iter()
            .filter(|i| i.problem_id.as_deref() == Some(problem_id.as_str()))
            .count();
        assert!(linked >= s.config.pattern_threshold);
    }

    #[test]
    fn problem_ids_stay_unique_within_a_second() {
        let s = session(vec![]);
        let first = s.next_problem_id(now());
        let mut s2 = session(vec![]);
        s2.problems.push(Problem {
            id: first.clone(),
            title: String::new(),
            description: String::new(),
            status: ProblemStatus::Investigating,
            priority: ProblemPriority::Medium,
            related_incidents: vec![],
            created_at: now(),
            resolved_at: None,
            root_cause: None,
            contributing_factors: vec![],
            preventive_measures: vec![],
            assigned_team: None,
            owner: None,
            auto_created: true,
            pattern_confidence: None,
        });
        let second = s2.next_problem_id(now());
        assert_ne!(first, second);
    }
}
