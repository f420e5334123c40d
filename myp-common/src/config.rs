//! Configuration loading and config file resolution
//!
//! Values are resolved in this order (first wins):
//! 1. Command-line argument
//! 2. Environment variable (both handled by each binary's clap `Args`)
//! 3. TOML config file
//! 4. Compiled defaults
//!
//! The config file itself is found via `--config` / `MYP_CONFIG`, then
//! `./myp.toml`, then `<user config dir>/myp/myp.toml`. A missing config file
//! is not an error; an explicit file that cannot be read or parsed is.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::artifact::ArtifactPaths;
use crate::forest::{ForestParams, TreeParams};
use crate::{Error, Result};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "MYP_CONFIG";

/// Config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "myp.toml";

/// Contents of `myp.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub server: ServerConfig,
    pub artifacts: ArtifactPaths,
    pub training: TrainingConfig,
    pub logging: LoggingConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory holding index.html and the UI assets
    pub static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            static_dir: PathBuf::from("static"),
        }
    }
}

/// Training pipeline settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub dataset_path: PathBuf,
    pub n_trees: usize,
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Share of rows held out for evaluation
    pub test_fraction: f64,
    pub seed: u64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        let forest = ForestParams::default();
        Self {
            dataset_path: PathBuf::from("data/data.csv"),
            n_trees: forest.n_trees,
            max_depth: forest.tree.max_depth,
            min_samples_split: forest.tree.min_samples_split,
            min_samples_leaf: forest.tree.min_samples_leaf,
            test_fraction: 0.2,
            seed: forest.seed,
        }
    }
}

impl TrainingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.n_trees == 0 {
            return Err(Error::Config("training.n_trees must be at least 1".to_string()));
        }
        if self.min_samples_split < 2 {
            return Err(Error::Config("training.min_samples_split must be at least 2".to_string()));
        }
        if self.min_samples_leaf == 0 {
            return Err(Error::Config("training.min_samples_leaf must be at least 1".to_string()));
        }
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(Error::Config(format!(
                "training.test_fraction must be between 0 and 1 (exclusive), got {}",
                self.test_fraction
            )));
        }
        Ok(())
    }

    pub fn forest_params(&self) -> ForestParams {
        ForestParams {
            n_trees: self.n_trees,
            tree: TreeParams {
                max_depth: self.max_depth,
                min_samples_split: self.min_samples_split,
                min_samples_leaf: self.min_samples_leaf,
            },
            seed: self.seed,
            bootstrap: true,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error); `RUST_LOG` takes precedence
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl TomlConfig {
    /// Parse TOML text
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Invalid TOML: {}", e)))
    }

    /// Read and parse a specific file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Cannot read config file {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
    }

    /// Load `path` if given, otherwise use compiled defaults
    ///
    /// `path` normally comes from [`resolve_config_path`].
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }
}

/// Pick the config file to read, if any
///
/// `explicit` is the `--config` / `MYP_CONFIG` value and is returned as-is,
/// even when it does not exist, so that loading it reports the problem.
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    let local = PathBuf::from(DEFAULT_CONFIG_FILE);
    if local.exists() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|d| d.join("myp").join(DEFAULT_CONFIG_FILE))
        .filter(|p| p.exists())
}
