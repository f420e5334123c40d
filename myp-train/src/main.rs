//! myp-train - offline training pipeline
//!
//! Fits the release year model on a labeled CSV dataset and writes the two
//! artifacts the prediction service loads at startup:
//! - `models/music_year_model.json` (forest + metrics + feature order)
//! - `models/feature_names.json` (ordered feature-name list)
//!
//! Exits non-zero on any failure; artifacts from a failed run are not valid.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use myp_common::config::{resolve_config_path, TomlConfig, CONFIG_ENV_VAR};
use myp_train::{run, TrainingOptions};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Command-line arguments for myp-train
#[derive(Parser, Debug)]
#[command(name = "myp-train")]
#[command(about = "Train the music release year prediction model")]
#[command(version)]
struct Args {
    /// Config file (defaults to ./myp.toml when present)
    #[arg(short, long, env = CONFIG_ENV_VAR)]
    config: Option<PathBuf>,

    /// Labeled CSV dataset
    #[arg(short, long, env = "MYP_DATASET")]
    dataset: Option<PathBuf>,

    /// Where to write the model artifact
    #[arg(long, env = "MYP_MODEL_PATH")]
    model_out: Option<PathBuf>,

    /// Where to write the feature-name list
    #[arg(long, env = "MYP_FEATURE_NAMES_PATH")]
    features_out: Option<PathBuf>,

    /// Number of trees in the ensemble
    #[arg(long)]
    trees: Option<usize>,

    /// Maximum tree depth
    #[arg(long)]
    max_depth: Option<usize>,

    /// Seed for the split and bootstrap sampling
    #[arg(long)]
    seed: Option<u64>,

    /// Share of rows held out for evaluation
    #[arg(long)]
    test_fraction: Option<f64>,

    /// Also write the training report as JSON
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = resolve_config_path(args.config.as_deref());
    let mut config = TomlConfig::load(config_path.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .init();

    info!(
        "Starting myp-train v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    match &config_path {
        Some(path) => info!("Config: {}", path.display()),
        None => warn!("No config file found; using built-in defaults"),
    }

    // CLI / env overrides on top of the TOML values
    if let Some(dataset) = args.dataset {
        config.training.dataset_path = dataset;
    }
    if let Some(model) = args.model_out {
        config.artifacts.model = model;
    }
    if let Some(feature_names) = args.features_out {
        config.artifacts.feature_names = feature_names;
    }
    if let Some(trees) = args.trees {
        config.training.n_trees = trees;
    }
    if let Some(max_depth) = args.max_depth {
        config.training.max_depth = max_depth;
    }
    if let Some(seed) = args.seed {
        config.training.seed = seed;
    }
    if let Some(test_fraction) = args.test_fraction {
        config.training.test_fraction = test_fraction;
    }
    config.training.validate()?;

    let options = TrainingOptions {
        dataset_path: config.training.dataset_path.clone(),
        artifacts: config.artifacts.clone(),
        params: config.training.forest_params(),
        test_fraction: config.training.test_fraction,
    };

    let report = match run(&options) {
        Ok(report) => report,
        Err(e) => {
            error!("Training failed: {}", e);
            return Err(e.into());
        }
    };
    report.log_summary(5);

    if let Some(path) = args.report {
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(&path, json)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        info!("Report written to {}", path.display());
    }

    Ok(())
}
