//! Training pipeline: dataset → fitted forest → evaluated artifact on disk

use myp_common::forest::{ForestParams, RandomForest};
use myp_common::{ArtifactPaths, ModelArtifact, ModelMetrics};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

use crate::dataset::Dataset;
use crate::error::TrainingResult;

/// Everything one training run needs
#[derive(Debug, Clone)]
pub struct TrainingOptions {
    pub dataset_path: PathBuf,
    pub artifacts: ArtifactPaths,
    pub params: ForestParams,
    pub test_fraction: f64,
}

/// Outcome of a run, logged at the end
#[derive(Debug, Clone, Serialize)]
pub struct TrainingReport {
    pub feature_names: Vec<String>,
    pub dropped_features: Vec<String>,
    pub metrics: ModelMetrics,
    /// (feature, importance), most important first
    pub feature_importances: Vec<(String, f64)>,
    pub elapsed_secs: f64,
}

impl TrainingReport {
    /// Log metrics and the top `top` features
    pub fn log_summary(&self, top: usize) {
        let rule = "=".repeat(50);
        info!("{}", rule);
        info!("Model Evaluation Metrics:");
        info!("{}", rule);
        info!("R² Score: {:.4}", self.metrics.r2_score);
        info!("MAE: {:.2} years", self.metrics.mae);
        info!("RMSE: {:.2} years", self.metrics.rmse);
        info!("{}", rule);

        info!("Top {} most important features:", top.min(self.feature_importances.len()));
        for (rank, (name, importance)) in self.feature_importances.iter().take(top).enumerate() {
            info!("  {}. {:<18} {:.4}", rank + 1, name, importance);
        }
    }
}

/// Load, clean, fit, evaluate, and persist
pub fn run(options: &TrainingOptions) -> TrainingResult<TrainingReport> {
    let dataset = Dataset::from_path(&options.dataset_path)?;
    let (artifact, report) = train(&dataset, &options.params, options.test_fraction)?;

    options.artifacts.save(&artifact)?;
    info!("✓ Model saved to {}", options.artifacts.model.display());
    info!("✓ Feature names saved to {}", options.artifacts.feature_names.display());

    Ok(report)
}

/// Fit and evaluate on an in-memory dataset
pub fn train(
    dataset: &Dataset,
    params: &ForestParams,
    test_fraction: f64,
) -> TrainingResult<(ModelArtifact, TrainingReport)> {
    info!("Using features: {:?}", dataset.feature_names);
    info!("Total samples: {}", dataset.len());

    let split = dataset.split(test_fraction, params.seed)?;
    info!("Training samples: {}", split.train_y.len());
    info!("Test samples: {}", split.test_y.len());

    info!(
        "Training random forest ({} trees, max depth {})...",
        params.n_trees, params.tree.max_depth
    );
    let started = Instant::now();
    let forest = RandomForest::fit(&split.train_x, &split.train_y, params)?;
    let elapsed_secs = started.elapsed().as_secs_f64();
    info!("Fit {} trees in {:.1}s", forest.n_trees(), elapsed_secs);

    info!("Evaluating model...");
    let predictions = forest.predict_many(&split.test_x)?;
    let metrics = ModelMetrics::evaluate(&split.test_y, &predictions, split.train_y.len())?;

    let mut feature_importances: Vec<(String, f64)> = dataset
        .feature_names
        .iter()
        .cloned()
        .zip(forest.feature_importances().iter().copied())
        .collect();
    feature_importances.sort_by(|a, b| b.1.total_cmp(&a.1));

    let artifact = ModelArtifact::new(
        dataset.feature_names.clone(),
        dataset.dropped_features.clone(),
        metrics,
        *params,
        forest,
    );
    let report = TrainingReport {
        feature_names: dataset.feature_names.clone(),
        dropped_features: dataset.dropped_features.clone(),
        metrics,
        feature_importances,
        elapsed_secs,
    };

    Ok((artifact, report))
}
