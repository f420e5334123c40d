//! Prediction path: validate → assemble → invoke → shape
//!
//! Pure with respect to shared state: the loaded model is only read, so
//! concurrent requests need no coordination.

use myp_common::{FeatureInput, ModelMetrics, TrainedModel, YEAR_RANGE};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::error::{ApiError, ApiResult};

/// Response body for POST /predict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub predicted_year: i32,
    pub confidence_interval: ConfidenceInterval,
    pub model_info: ModelInfo,
}

/// `predicted_year ± band`, band = training RMSE in whole years
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub lower: i32,
    pub upper: i32,
}

/// Held-out evaluation numbers recorded in the artifact
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub r2_score: f64,
    pub mae: f64,
    pub rmse: f64,
}

impl From<&ModelMetrics> for ModelInfo {
    fn from(metrics: &ModelMetrics) -> Self {
        Self {
            r2_score: round_to(metrics.r2_score, 4),
            mae: round_to(metrics.mae, 2),
            rmse: round_to(metrics.rmse, 2),
        }
    }
}

fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}

/// Run one prediction against a loaded model
pub fn predict(model: &TrainedModel, input: &FeatureInput) -> ApiResult<PredictionResult> {
    let features = input.validate().map_err(ApiError::Validation)?;

    let raw = model.predict(&features).map_err(|e| {
        error!("Prediction failed: {}", e);
        ApiError::Prediction(
            "Prediction failed: the model could not evaluate this input".to_string(),
        )
    })?;

    let predicted_year = (raw.round() as i32).clamp(*YEAR_RANGE.start(), *YEAR_RANGE.end());
    let metrics = model.metrics();
    let band = metrics.band_years();
    debug!("Predicted {:.2} -> {} (±{})", raw, predicted_year, band);

    Ok(PredictionResult {
        predicted_year,
        confidence_interval: ConfidenceInterval {
            lower: predicted_year.saturating_sub(band),
            upper: predicted_year.saturating_add(band),
        },
        model_info: ModelInfo::from(metrics),
    })
}
