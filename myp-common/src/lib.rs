//! # MYP Common Library
//!
//! Shared code for the music release year predictor:
//! - Feature schema and request validation
//! - Regression forest (fit and predict)
//! - Evaluation metrics
//! - Model artifact format (the training → serving contract)
//! - Configuration loading

use std::ops::RangeInclusive;

pub mod artifact;
pub mod config;
pub mod error;
pub mod features;
pub mod forest;
pub mod metrics;

pub use artifact::{ArtifactPaths, ModelArtifact, TrainedModel};
pub use error::{Error, Result};
pub use features::{FeatureInput, FeatureVector, Violation, FEATURES};
pub use metrics::ModelMetrics;

/// Release years accepted for training and reported by serving
pub const YEAR_RANGE: RangeInclusive<i32> = 1900..=2024;
