//! POST /predict

use axum::{extract::rejection::JsonRejection, extract::State, routing::post, Json, Router};
use myp_common::FeatureInput;
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::prediction::{self, PredictionResult};
use crate::AppState;

/// POST /predict
///
/// Readiness is checked before the body is decoded, so a degraded service
/// answers 503 whether or not the body is valid.
pub async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<FeatureInput>, JsonRejection>,
) -> ApiResult<Json<PredictionResult>> {
    let model = state.model.ready().ok_or(ApiError::ModelUnavailable)?;
    let Json(input) = payload?;

    let result = prediction::predict(model, &input)?;
    debug!(
        "POST /predict -> {} [{}, {}]",
        result.predicted_year, result.confidence_interval.lower, result.confidence_interval.upper
    );
    Ok(Json(result))
}

/// Build prediction routes
pub fn predict_routes() -> Router<AppState> {
    Router::new().route("/predict", post(predict))
}
