//! Health check endpoint
//!
//! Always answers 200; `status` reports whether predictions are possible.

use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::AppState;

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    pub module: String,
    pub version: String,
    pub model_loaded: bool,
    pub model_path: String,
    pub features_required: Vec<String>,
    pub dropped_features: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degraded_reason: Option<String>,
    pub uptime_seconds: i64,
    pub endpoints: Vec<String>,
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let model = &state.model;
    let dropped_features = model
        .ready()
        .map(|m| m.artifact().dropped_features.clone())
        .unwrap_or_default();

    Json(HealthResponse {
        status: if model.is_ready() { "online" } else { "degraded" }.to_string(),
        message: "Music Release Year Prediction API".to_string(),
        module: "myp-api".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        model_loaded: model.is_ready(),
        model_path: state.model_path.display().to_string(),
        features_required: model.feature_names().to_vec(),
        dropped_features,
        degraded_reason: model.degraded_reason().map(str::to_string),
        uptime_seconds: (Utc::now() - state.startup_time).num_seconds(),
        endpoints: vec![
            "GET /".to_string(),
            "GET /health".to_string(),
            "POST /predict".to_string(),
        ],
    })
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
