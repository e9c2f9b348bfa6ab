//! OpsTriage -- deterministic ITSM triage agents over an in-memory dataset.
//!
//! Three rule-based agents work a shared incident/alert/metric dataset:
//! incident correlation, proactive monitoring, and problem management. Every
//! decision is scored, logged, and gated so only high-confidence outcomes
//! execute without a human.

pub mod api;
pub mod config;
pub mod correlate;
pub mod data;
pub mod model;
pub mod monitor;
pub mod problem;
pub mod session;

use anyhow::Result;
use std::path::Path;

/// Start the OpsTriage server: load (or generate) the dataset, build the
/// session, and serve the API.
pub async fn serve(bind: &str, data_dir: &Path, config_path: &Path) -> Result<()> {
    let config = config::TriageConfig::load(config_path)?;

    let now = chrono::Utc::now();
    tracing::info!(dir = %data_dir.display(), "Loading dataset");
    let dataset = data::load_all(data_dir, now)?;
    tracing::info!(
        incidents = dataset.incidents.len(),
        alerts = dataset.alerts.len(),
        metrics = dataset.metrics.len(),
        "Dataset ready"
    );

    let session = session::Session::new(config, dataset);
    let app = api::router(api::state::AppState::new(session));

    let addr: std::net::SocketAddr = bind.parse()?;
    tracing::info!(%addr, "OpsTriage listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
