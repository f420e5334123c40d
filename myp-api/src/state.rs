//! Model load state
//!
//! Loading happens once, before the listener is bound. The outcome is either
//! `Ready` (model + feature list accepted) or `Degraded` (anything else).
//! There is no transition out of `Degraded`; fixing the artifact requires a
//! restart.

use myp_common::{ArtifactPaths, TrainedModel};
use tracing::{error, info};

#[derive(Debug)]
pub enum ModelState {
    Ready(TrainedModel),
    Degraded { reason: String },
}

impl ModelState {
    /// Load both artifacts; never fails, degrades instead
    pub fn load(paths: &ArtifactPaths) -> Self {
        match paths.load() {
            Ok(model) => {
                let metrics = model.metrics();
                info!("✓ Model loaded successfully from {}", paths.model.display());
                info!("✓ Feature names: {:?}", model.feature_names());
                info!(
                    "Model metrics: R² {:.4}, MAE {:.2}, RMSE {:.2} (band ±{} years)",
                    metrics.r2_score,
                    metrics.mae,
                    metrics.rmse,
                    metrics.band_years()
                );
                ModelState::Ready(model)
            }
            Err(e) => {
                error!("Failed to load model: {}", e);
                error!("Serving in degraded mode; /predict will return 503 until restart");
                ModelState::Degraded { reason: e.to_string() }
            }
        }
    }

    pub fn ready(&self) -> Option<&TrainedModel> {
        match self {
            ModelState::Ready(model) => Some(model),
            ModelState::Degraded { .. } => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.ready().is_some()
    }

    /// Feature order the model expects; empty when degraded
    pub fn feature_names(&self) -> &[String] {
        self.ready().map(|m| m.feature_names()).unwrap_or(&[])
    }

    pub fn degraded_reason(&self) -> Option<&str> {
        match self {
            ModelState::Ready(_) => None,
            ModelState::Degraded { reason } => Some(reason),
        }
    }
}
