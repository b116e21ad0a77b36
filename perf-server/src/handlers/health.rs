//! Health check handler

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    environment: String,
    artifact_id: Option<String>,
    feature_version: u8,
    n_trees: usize,
    inference_count: u64,
    avg_latency_ms: f64,
    timestamp: i64,
}

pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    let status = state.engine.status();

    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        environment: state.config.environment.clone(),
        artifact_id: status.artifact_id,
        feature_version: status.feature_version,
        n_trees: status.n_trees,
        inference_count: status.inference_count,
        avg_latency_ms: status.avg_latency_ms,
        timestamp: chrono::Utc::now().timestamp(),
    })
}
