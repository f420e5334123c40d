//! myp-train library interface
//!
//! Exposes the dataset loader and the training pipeline for integration
//! testing; the `myp-train` binary is a thin CLI over [`pipeline::run`].

pub mod dataset;
pub mod error;
pub mod pipeline;

pub use crate::dataset::{Dataset, LoadStats, Split};
pub use crate::error::{TrainingError, TrainingResult};
pub use crate::pipeline::{run, train, TrainingOptions, TrainingReport};
