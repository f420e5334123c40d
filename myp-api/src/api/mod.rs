//! HTTP API handlers for myp-api

pub mod health;
pub mod predict;
pub mod ui;

pub use health::health_routes;
pub use predict::predict_routes;
pub use ui::ui_routes;
