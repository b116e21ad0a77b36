//! Prediction handler

use axum::{extract::State, Json};
use perf_core::StudentRecord;

use crate::extract::ValidatedJson;
use crate::models::{PredictRequest, PredictResponse};
use crate::{AppResult, AppState};

/// Classify one student
pub async fn predict(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<PredictRequest>,
) -> AppResult<Json<PredictResponse>> {
    let record = StudentRecord::from(req);
    let result = state.engine.predict(&record)?;

    tracing::debug!(
        "Predicted {} for {}/{} (probabilities: {})",
        result.label,
        record.gender,
        record.department,
        result.probabilities.is_some()
    );

    Ok(Json(PredictResponse::from(result)))
}
