//! myp-api library - Music release year prediction service
//!
//! Loads the trained model once at startup and serves predictions over HTTP.
//! If the artifacts are missing or inconsistent the service still starts, in
//! a degraded state where `/health` works and `/predict` answers 503.

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use chrono::{DateTime, Utc};
use myp_common::ArtifactPaths;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;
pub mod prediction;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::ModelState;

/// Application state shared across HTTP handlers
///
/// Built once before the listener is bound and never mutated afterwards.
#[derive(Clone)]
pub struct AppState {
    /// Loaded model, or the reason it could not be loaded
    pub model: Arc<ModelState>,
    /// Model artifact location, reported by /health
    pub model_path: PathBuf,
    /// Directory holding index.html and the UI assets
    pub static_dir: PathBuf,
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(model: ModelState, model_path: PathBuf, static_dir: PathBuf) -> Self {
        Self {
            model: Arc::new(model),
            model_path,
            static_dir,
            startup_time: Utc::now(),
        }
    }

    /// Load the artifacts and build the state in one step
    pub fn load(paths: &ArtifactPaths, static_dir: PathBuf) -> Self {
        Self::new(ModelState::load(paths), paths.model.clone(), static_dir)
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::health_routes())
        .merge(api::predict_routes())
        .merge(api::ui_routes(&state.static_dir))
        .layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
