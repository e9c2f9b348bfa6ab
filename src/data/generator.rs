//! Seeded sample-data generation. Every draw goes through one `StdRng` so a
//! fixed seed reproduces the exact dataset, which the demo scenarios and
//! tests rely on.

use crate::model::{
    Alert, AlertSeverity, AlertStatus, Incident, IncidentStatus, MetricPoint, MetricSet, Severity,
};
use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::io::Write;
use std::path::Path;

struct IncidentTemplate {
    title: &'static str,
    description: &'static str,
    system: &'static str,
    severity: Severity,
}

const INCIDENT_TEMPLATES: &[IncidentTemplate] = &[
    IncidentTemplate {
        title: "Email service unavailable",
        description: "Users unable to send or receive emails through Outlook",
        system: "Email Server",
        severity: Severity::P2,
    },
    IncidentTemplate {
        title: "Email connection timeout",
        description: "Email client showing connection timeout errors",
        system: "Email Server",
        severity: Severity::P3,
    },
    IncidentTemplate {
        title: "Slow email delivery",
        description: "Emails taking longer than usual to send and receive",
        system: "Email Server",
        severity: Severity::P3,
    },
    IncidentTemplate {
        title: "Database connection errors",
        description: "Application showing database connection failures",
        system: "Database Server",
        severity: Severity::P1,
    },
    IncidentTemplate {
        title: "Database query timeout",
        description: "Database queries timing out after 30 seconds",
        system: "Database Server",
        severity: Severity::P2,
    },
    IncidentTemplate {
        title: "Web application slow response",
        description: "Web application pages loading slowly for all users",
        system: "Web Application",
        severity: Severity::P2,
    },
];

struct AlertTemplate {
    title: &'static str,
    description: &'static str,
    severity: AlertSeverity,
    metric: &'static str,
    resources: &'static [&'static str],
    actions: &'static [&'static str],
}

const ALERT_TEMPLATES: &[AlertTemplate] = &[
    AlertTemplate {
        title: "High CPU Usage Detected",
        description: "CPU usage on production server exceeded 85% threshold",
        severity: AlertSeverity::Warning,
        metric: "cpu_utilization",
        resources: &["prod-web-01", "prod-web-02"],
        actions: &[
            "Check for runaway processes",
            "Scale up server resources",
            "Investigate recent deployments",
        ],
    },
    AlertTemplate {
        title: "Database Connection Pool Exhausted",
        description: "Database connection pool reached maximum capacity",
        severity: AlertSeverity::Critical,
        metric: "db_connections",
        resources: &["prod-db-01"],
        actions: &[
            "Review active connections",
            "Restart connection pool",
            "Check for long-running queries",
        ],
    },
    AlertTemplate {
        title: "Disk Space Low",
        description: "Available disk space below 10% on file server",
        severity: AlertSeverity::Warning,
        metric: "disk_usage",
        resources: &["file-server-01"],
        actions: &[
            "Clean up temporary files",
            "Archive old log files",
            "Add additional storage",
        ],
    },
];

const USER_GROUPS: &[&str] = &[
    "Sales Team",
    "Engineering",
    "Customer Support",
    "Finance",
    "HR",
    "Marketing",
    "Operations",
];

const IMPACT_LEVELS: &[&str] = &["High", "Medium", "Low"];

pub struct SampleGenerator {
    rng: StdRng,
}

impl SampleGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Incidents spread over the 48 hours before `now`, drawn from templates
    /// that deliberately overlap so the correlation demo has material.
    pub fn incidents(&mut self, count: usize, now: DateTime<Utc>) -> Vec<Incident> {
        let base_time = now - Duration::days(2);
        let mut incidents = Vec::with_capacity(count);

        for i in 0..count {
            let template = &INCIDENT_TEMPLATES[self.rng.gen_range(0..INCIDENT_TEMPLATES.len())];
            let created_at = base_time
                + Duration::hours(self.rng.gen_range(0..=48))
                + Duration::minutes(self.rng.gen_range(0..60));

            let mut incident = Incident {
                id: format!("INC-{:04}", 1000 + i),
                title: template.title.to_string(),
                description: template.description.to_string(),
                severity: template.severity,
                status: if self.rng.gen_bool(0.5) {
                    IncidentStatus::New
                } else {
                    IncidentStatus::InProgress
                },
                affected_system: template.system.to_string(),
                user_group: self.pick(USER_GROUPS),
                created_at,
                resolved_at: None,
                correlation_group: None,
                problem_id: None,
                impact: self.pick(IMPACT_LEVELS),
                urgency: self.pick(IMPACT_LEVELS),
                category: "Infrastructure".to_string(),
                subcategory: template
                    .system
                    .split_whitespace()
                    .next()
                    .unwrap_or("Server")
                    .to_string(),
                assigned_to: None,
                correlation_confidence: None,
                auto_created: false,
            };

            // Roughly a third resolve within SLA, for historical texture.
            if self.rng.gen_bool(0.3) {
                let hours = self.rng.gen_range(1..=incident.severity.sla_target_hours());
                incident.resolve(created_at + Duration::hours(hours));
            }

            incidents.push(incident);
        }
        incidents
    }

    /// Monitoring alerts over the last 12 hours, with the most critical three
    /// given priority ranks.
    pub fn alerts(&mut self, count: usize, now: DateTime<Utc>) -> Vec<Alert> {
        let base_time = now - Duration::hours(12);
        let mut alerts = Vec::with_capacity(count);

        for i in 0..count {
            let template = &ALERT_TEMPLATES[self.rng.gen_range(0..ALERT_TEMPLATES.len())];
            alerts.push(Alert {
                id: format!("ALT-{:04}", 2000 + i),
                title: template.title.to_string(),
                description: template.description.to_string(),
                severity: template.severity,
                status: AlertStatus::Active,
                affected_resources: template.resources.iter().map(|s| s.to_string()).collect(),
                created_at: base_time
                    + Duration::hours(self.rng.gen_range(0..=12))
                    + Duration::minutes(self.rng.gen_range(0..60)),
                resolved_at: None,
                metric_name: template.metric.to_string(),
                threshold_value: Some(self.rng.gen_range(80.0..95.0)),
                current_value: Some(self.rng.gen_range(85.0..100.0)),
                recommended_actions: template.actions.iter().map(|s| s.to_string()).collect(),
                business_impact: self.pick(IMPACT_LEVELS),
                priority_rank: None,
                auto_generated: true,
                confidence_score: Some(self.rng.gen_range(0.7..0.95)),
            });
        }

        // Criticals outrank warnings when assigning the top-3 slots.
        let mut order: Vec<usize> = (0..alerts.len())
            .filter(|&i| alerts[i].severity == AlertSeverity::Critical)
            .collect();
        order.extend((0..alerts.len()).filter(|&i| alerts[i].severity != AlertSeverity::Critical));
        for (rank, &idx) in order.iter().take(3).enumerate() {
            alerts[idx].priority_rank = Some(rank + 1);
        }

        alerts
    }

    /// 24 hours of hourly metrics ending at `now`: a CPU spike in the
    /// afternoon hours, memory climbing like a leak, disk creeping upward.
    pub fn metrics(&mut self, now: DateTime<Utc>) -> MetricSet {
        let base_time = now - Duration::hours(24);
        let mut cpu = Vec::with_capacity(24);
        let mut memory = Vec::with_capacity(24);
        let mut disk = Vec::with_capacity(24);

        for hour in 0..24i64 {
            let timestamp = base_time + Duration::hours(hour);

            let mut cpu_base: f64 = 45.0 + self.rng.gen_range(-10.0..10.0);
            if (14..=16).contains(&hour) {
                cpu_base += 30.0;
            }
            cpu.push(MetricPoint {
                timestamp,
                value: (cpu_base + self.rng.gen_range(-5.0..5.0)).clamp(0.0, 100.0),
                resource: "prod-web-01".to_string(),
            });

            let memory_base = 60.0 + hour as f64 * 1.5 + self.rng.gen_range(-5.0..5.0);
            memory.push(MetricPoint {
                timestamp,
                value: memory_base.clamp(0.0, 100.0),
                resource: "prod-app-01".to_string(),
            });

            let disk_base = 75.0 + hour as f64 * 0.5 + self.rng.gen_range(-2.0..2.0);
            disk.push(MetricPoint {
                timestamp,
                value: disk_base.clamp(0.0, 100.0),
                resource: "file-server-01".to_string(),
            });
        }

        let mut set = MetricSet::new();
        set.insert("cpu_utilization".to_string(), cpu);
        set.insert("memory_usage".to_string(), memory);
        set.insert("disk_usage".to_string(), disk);
        set
    }

    /// Write the standard demo dataset (25 incidents, 12 alerts, 24h of
    /// metrics) as pretty-printed JSON under `dir`.
    pub fn save(&mut self, dir: &Path, now: DateTime<Utc>) -> std::io::Result<()> {
        std::fs::create_dir_all(dir)?;

        let incidents = self.incidents(25, now);
        write_json(&dir.join("sample_incidents.json"), &incidents)?;

        let alerts = self.alerts(12, now);
        write_json(&dir.join("sample_alerts.json"), &alerts)?;

        let metrics = self.metrics(now);
        write_json(&dir.join("sample_metrics.json"), &metrics)?;

        tracing::info!(
            dir = %dir.display(),
            incidents = incidents.len(),
            alerts = alerts.len(),
            "Sample data generated"
        );
        Ok(())
    }

    fn pick(&mut self, options: &[&str]) -> String {
        options
            .choose(&mut self.rng)
            .copied()
            .unwrap_or_default()
            .to_string()
    }
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> std::io::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    let mut file = std::fs::File::create(path)?;
    file.write_all(json.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn same_seed_reproduces_the_dataset() {
        let a = SampleGenerator::new(7).incidents(25, now());
        let b = SampleGenerator::new(7).incidents(25, now());
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.id, y.id);
            assert_eq!(x.title, y.title);
            assert_eq!(x.created_at, y.created_at);
            assert_eq!(x.user_group, y.user_group);
        }
    }

    #[test]
    fn different_seeds_diverge() {
        let a = SampleGenerator::new(7).incidents(25, now());
        let b = SampleGenerator::new(8).incidents(25, now());
        let identical = a
            .iter()
            .zip(&b)
            .all(|(x, y)| x.created_at == y.created_at && x.user_group == y.user_group);
        assert!(!identical);
    }

    #[test]
    fn resolved_incidents_carry_timestamps() {
        let incidents = SampleGenerator::new(1).incidents(50, now());
        for incident in &incidents {
            match incident.status {
                IncidentStatus::Resolved => {
                    assert!(incident.resolved_at.is_some());
                    assert!(incident.resolved_at.unwrap() > incident.created_at);
                }
                _ => assert!(incident.resolved_at.is_none()),
            }
        }
    }

    #[test]
    fn metrics_cover_24_hours_and_stay_in_range() {
        let set = SampleGenerator::new(3).metrics(now());
        assert_eq!(set.len(), 3);
        for points in set.values() {
            assert_eq!(points.len(), 24);
            for p in points {
                assert!(p.value >= 0.0 && p.value <= 100.0);
            }
        }
        // Memory climbs: last reading well above first.
        let memory = &set["memory_usage"];
        assert!(memory[23].value > memory[0].value);
    }

    #[test]
    fn top_three_alerts_get_ranks_criticals_first() {
        let alerts = SampleGenerator::new(5).alerts(12, now());
        let ranked: Vec<&Alert> = alerts.iter().filter(|a| a.priority_rank.is_some()).collect();
        assert_eq!(ranked.len(), 3);
        // Any ranked warning must not precede an unranked critical.
        let unranked_criticals = alerts
            .iter()
            .filter(|a| a.severity == AlertSeverity::Critical && a.priority_rank.is_none())
            .count();
        let ranked_warnings = ranked
            .iter()
            .filter(|a| a.severity != AlertSeverity::Critical)
            .count();
        assert!(unranked_criticals == 0 || ranked_warnings == 0);
    }
}
