//! UI serving routes
//!
//! Serves the slider page and its assets from the configured static
//! directory. A missing asset is a plain 404.

use std::path::Path;

use axum::Router;
use tower_http::services::{ServeDir, ServeFile};

use crate::AppState;

/// GET / and GET /static/*
pub fn ui_routes(static_dir: &Path) -> Router<AppState> {
    Router::new()
        .route_service("/", ServeFile::new(static_dir.join("index.html")))
        .nest_service("/static", ServeDir::new(static_dir))
}
