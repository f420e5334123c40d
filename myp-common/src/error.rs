//! Common error types for MYP

use std::path::PathBuf;
use thiserror::Error;

/// Common result type for MYP operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the training and serving binaries
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encode/decode error (wraps serde_json::Error)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Artifact file missing at the expected location
    #[error("Artifact not found: {}", .0.display())]
    ArtifactMissing(PathBuf),

    /// Artifact present but unusable (wrong version, inconsistent feature list, ...)
    #[error("Invalid artifact: {0}")]
    Artifact(String),

    /// Invalid input passed to a model or helper
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
