//! Error types for myp-train
//!
//! Every variant aborts the run; no artifact written before the failure is
//! considered valid.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrainingError {
    /// Dataset file could not be opened
    #[error("Cannot read dataset {}: {source}", path.display())]
    DatasetIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Dataset is not well-formed CSV
    #[error("Malformed dataset: {0}")]
    Csv(#[from] csv::Error),

    /// Neither `year` nor `release_date` present
    #[error("Dataset has neither a 'year' nor a 'release_date' column")]
    MissingTarget,

    /// None of the canonical feature columns present
    #[error("Dataset has none of the expected feature columns")]
    NoFeatures,

    /// Too few rows survive cleaning to split and fit
    #[error("Not enough usable rows: {0}")]
    InsufficientData(String),

    /// Artifact, config, or model error from myp-common
    #[error(transparent)]
    Common(#[from] myp_common::Error),
}

/// Result type for training operations
pub type TrainingResult<T> = Result<T, TrainingError>;
