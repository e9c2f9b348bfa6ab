//! API route definitions.

use super::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde_json::{json, Value};

use crate::session::SessionError;

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/incidents", get(list_incidents))
        .route("/incidents/{id}", get(get_incident))
        .route("/alerts", get(list_alerts))
        .route("/metrics", get(list_metrics))
        .route("/problems", get(list_problems))
        .route("/decisions", get(list_decisions))
        .route("/correlate/{id}", post(correlate_incident))
        .route("/correlate/batch", post(correlate_batch))
        .route("/monitor/run", post(run_monitoring))
        .route("/problems/analyze", post(analyze_problems))
}

fn envelope(data: Value, meta: Value) -> Json<Value> {
    Json(json!({ "data": data, "meta": meta }))
}

fn meta() -> Value {
    json!({
        "timestamp": Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION")
    })
}

fn not_found(id: &str) -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": format!("unknown incident {id}") })),
    )
}

async fn health() -> Json<Value> {
    envelope(
        json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }),
        meta(),
    )
}

async fn list_incidents(State(state): State<AppState>) -> Json<Value> {
    let session = state.session.read().await;
    envelope(
        json!(session.incidents),
        json!({ "total": session.incidents.len() }),
    )
}

async fn get_incident(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let session = state.session.read().await;
    match session.incidents.iter().find(|i| i.id == id) {
        Some(incident) => Ok(envelope(json!(incident), meta())),
        None => Err(not_found(&id)),
    }
}

async fn list_alerts(State(state): State<AppState>) -> Json<Value> {
    let session = state.session.read().await;
    envelope(json!(session.alerts), json!({ "total": session.alerts.len() }))
}

async fn list_metrics(State(state): State<AppState>) -> Json<Value> {
    let session = state.session.read().await;
    envelope(
        json!(session.metrics),
        json!({ "metrics": session.metrics.len() }),
    )
}

async fn list_problems(State(state): State<AppState>) -> Json<Value> {
    let session = state.session.read().await;
    envelope(
        json!(session.problems),
        json!({ "total": session.problems.len() }),
    )
}

async fn list_decisions(State(state): State<AppState>) -> Json<Value> {
    let session = state.session.read().await;
    envelope(
        json!({
            "correlation": session.correlation_log,
            "monitoring": session.monitoring_log,
            "problem": session.problem_log,
        }),
        json!({
            "total": session.correlation_log.len()
                + session.monitoring_log.len()
                + session.problem_log.len()
        }),
    )
}

async fn correlate_incident(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let mut session = state.session.write().await;
    match session.correlate_incident(&id, Utc::now()) {
        Ok(outcome) => Ok(envelope(json!(outcome), meta())),
        Err(SessionError::UnknownIncident(id)) => Err(not_found(&id)),
    }
}

async fn correlate_batch(State(state): State<AppState>) -> Json<Value> {
    let session = state.session.read().await;
    let report = session.batch_correlation();
    let total = report.total_incidents;
    envelope(json!(report), json!({ "total_incidents": total }))
}

async fn run_monitoring(State(state): State<AppState>) -> Json<Value> {
    let mut session = state.session.write().await;
    let run = session.run_monitoring(Utc::now());
    let top = run.top_issues.len();
    envelope(json!(run), json!({ "top_issues": top }))
}

async fn analyze_problems(State(state): State<AppState>) -> Json<Value> {
    let mut session = state.session.write().await;
    let outcomes = session.run_problem_analysis(Utc::now());
    let patterns = outcomes.len();
    let created = outcomes.iter().filter(|o| o.auto_executed).count();
    envelope(
        json!(outcomes),
        json!({ "patterns": patterns, "problems_created": created }),
    )
}
