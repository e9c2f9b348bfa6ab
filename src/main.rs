use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use opstriage::config::TriageConfig;
use opstriage::session::Session;

#[derive(Parser)]
#[command(
    name = "opstriage",
    about = "Deterministic ITSM triage agents: correlation, monitoring, problem management",
    version,
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        /// Bind address
        #[arg(long, default_value = "0.0.0.0:8080")]
        bind: String,

        /// Directory holding the sample JSON dataset
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,

        /// Optional TOML config with threshold overrides
        #[arg(long, default_value = "opstriage.toml")]
        config: PathBuf,
    },

    /// Correlate one incident against the loaded dataset
    Correlate {
        /// Incident id, e.g. INC-1003
        incident: String,

        #[arg(long, default_value = "data")]
        data_dir: PathBuf,

        #[arg(long, default_value = "opstriage.toml")]
        config: PathBuf,
    },

    /// Run the proactive monitoring agent over the metric dataset
    Monitor {
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,

        #[arg(long, default_value = "opstriage.toml")]
        config: PathBuf,
    },

    /// Run problem-pattern analysis over the incident dataset
    Problems {
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,

        #[arg(long, default_value = "opstriage.toml")]
        config: PathBuf,
    },

    /// Generate a seeded sample dataset
    GenerateData {
        /// RNG seed; a fixed seed reproduces the dataset exactly
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Output directory
        #[arg(long, default_value = "data")]
        output: PathBuf,
    },
}

fn load_session(data_dir: &std::path::Path, config_path: &std::path::Path) -> Result<Session> {
    let config = TriageConfig::load(config_path)?;
    let dataset = opstriage::data::load_all(data_dir, Utc::now())?;
    Ok(Session::new(config, dataset))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            bind,
            data_dir,
            config,
        } => {
            tracing::info!(%bind, "Starting OpsTriage server");
            opstriage::serve(&bind, &data_dir, &config).await?;
        }
        Commands::Correlate {
            incident,
            data_dir,
            config,
        } => {
            let mut session = load_session(&data_dir, &config)?;
            let outcome = session.correlate_incident(&incident, Utc::now())?;

            println!("\n=== Correlation Report: {} ===", incident);
            println!("Action:     {:?}", outcome.action);
            println!("Score:      {:.2}", outcome.correlation_score);
            println!("Confidence: {:?}", outcome.confidence);
            println!("Autonomous: {}", if outcome.auto_executed { "yes" } else { "no (human review)" });
            if !outcome.similar_incidents.is_empty() {
                println!("\nSimilar incidents:");
                for id in &outcome.similar_incidents {
                    println!(" - {}", id);
                }
            }
            if let Some(escalation) = &outcome.escalation {
                println!(
                    "\nEscalation risk: {:.0}% (confidence {:.2})",
                    escalation.probability * 100.0,
                    escalation.confidence
                );
            }
            println!("\nReasoning: {}", outcome.reasoning);
            println!("==============================\n");
        }
        Commands::Monitor { data_dir, config } => {
            let mut session = load_session(&data_dir, &config)?;
            let run = session.run_monitoring(Utc::now());

            if run.top_issues.is_empty() {
                println!("No anomalies detected.");
            } else {
                println!("\nTop issues");
                println!("{:<6} | {:<22} | {:<8} | {:<10} | Action", "Rank", "Alert", "Severity", "Confidence");
                println!("{:-<6}-|-{:-<22}-|-{:-<8}-|-{:-<10}-|-{:-<30}", "", "", "", "", "");
                for (issue, decision) in run.top_issues.iter().zip(&run.decisions) {
                    let action = match decision.action {
                        Some(a) => format!("{:?}", a),
                        None => "human review".to_string(),
                    };
                    println!(
                        "{:<6} | {:<22} | {:<8.2} | {:<10} | {}",
                        issue.priority_rank.unwrap_or(0),
                        issue.alert_id,
                        issue.severity_score,
                        format!("{:?}", issue.confidence),
                        action
                    );
                }
            }

            if !run.forecasts.is_empty() {
                println!("\nPredicted breaches (next 4h):");
                for f in &run.forecasts {
                    println!(
                        " - {} -> {:.1} (threshold {:.1}, {:?} risk, ~{:.1}h)",
                        f.metric_name, f.predicted_value, f.threshold, f.risk, f.time_to_threshold_hours
                    );
                }
            }
            if !run.recurring_spikes.is_empty() {
                println!("\nRecurring spikes:");
                for s in &run.recurring_spikes {
                    println!(" - {}: {}", s.metric_name, s.description);
                }
            }
            if !run.capacity.is_empty() {
                println!("\nCapacity planning:");
                let tiers = [
                    ("Immediate", &run.capacity.immediate_actions),
                    ("Within 30 days", &run.capacity.short_term_planning),
                    ("Next quarter", &run.capacity.long_term_planning),
                    ("Cost optimization", &run.capacity.cost_optimization),
                ];
                for (label, items) in tiers {
                    for item in items {
                        println!(" - [{}] {}", label, item);
                    }
                }
            }
            println!();
        }
        Commands::Problems { data_dir, config } => {
            let mut session = load_session(&data_dir, &config)?;
            let outcomes = session.run_problem_analysis(Utc::now());

            if outcomes.is_empty() {
                println!("No recurring patterns found.");
            } else {
                println!("\nPattern analysis: {} patterns", outcomes.len());
                for outcome in &outcomes {
                    let status = if outcome.auto_executed {
                        "PROBLEM CREATED"
                    } else if outcome.should_create_problem {
                        "recommended"
                    } else {
                        "below criteria"
                    };
                    println!(
                        " - {} ({} incidents, confidence {:.2}): {}",
                        outcome.pattern_id,
                        outcome.related_incidents.len(),
                        outcome.pattern_confidence,
                        status
                    );
                }
                if !session.problems.is_empty() {
                    println!("\nProblems created:");
                    for p in &session.problems {
                        println!(" - {} [{:?}] {}", p.id, p.priority, p.title);
                    }
                }
            }
            println!();
        }
        Commands::GenerateData { seed, output } => {
            tracing::info!(seed, output = %output.display(), "Generating sample data");
            let mut generator = opstriage::data::SampleGenerator::new(seed);
            generator.save(&output, Utc::now())?;
            println!("Sample data written to {}/", output.display());
        }
    }

    Ok(())
}
