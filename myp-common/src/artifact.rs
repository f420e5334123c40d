//! Model artifact format and the training → serving file contract
//!
//! Two JSON files are written by training and read by serving:
//! - the model artifact ([`ModelArtifact`]): forest, metrics, and the feature
//!   list it was fit on
//! - the feature-name list: the ordered column names, kept as its own file
//!
//! [`ArtifactPaths::load`] refuses any pair that does not describe the same
//! input layout.

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::features::{feature_spec, FeatureVector};
use crate::forest::{ForestParams, RandomForest};
use crate::metrics::ModelMetrics;
use crate::{Error, Result, YEAR_RANGE};

/// Bumped whenever the artifact layout changes incompatibly
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

pub const DEFAULT_MODEL_PATH: &str = "models/music_year_model.json";
pub const DEFAULT_FEATURE_NAMES_PATH: &str = "models/feature_names.json";

/// Persisted regression model plus the metadata serving needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    pub created_at: DateTime<Utc>,
    /// Input order the forest was fit on
    pub feature_names: Vec<String>,
    /// Canonical features that were absent from the training dataset
    #[serde(default)]
    pub dropped_features: Vec<String>,
    pub metrics: ModelMetrics,
    pub params: ForestParams,
    pub forest: RandomForest,
}

impl ModelArtifact {
    pub fn new(
        feature_names: Vec<String>,
        dropped_features: Vec<String>,
        metrics: ModelMetrics,
        params: ForestParams,
        forest: RandomForest,
    ) -> Self {
        Self {
            format_version: ARTIFACT_FORMAT_VERSION,
            created_at: Utc::now(),
            feature_names,
            dropped_features,
            metrics,
            params,
            forest,
        }
    }
}

/// Locations of the two artifact files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactPaths {
    pub model: PathBuf,
    pub feature_names: PathBuf,
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        Self {
            model: PathBuf::from(DEFAULT_MODEL_PATH),
            feature_names: PathBuf::from(DEFAULT_FEATURE_NAMES_PATH),
        }
    }
}

impl ArtifactPaths {
    pub fn new(model: impl Into<PathBuf>, feature_names: impl Into<PathBuf>) -> Self {
        Self {
            model: model.into(),
            feature_names: feature_names.into(),
        }
    }

    /// Write the model, then the feature-name list
    pub fn save(&self, artifact: &ModelArtifact) -> Result<()> {
        write_json(&self.model, artifact)?;
        write_json(&self.feature_names, &artifact.feature_names)?;
        Ok(())
    }

    /// Read both files and check that they agree
    pub fn load(&self) -> Result<TrainedModel> {
        let artifact: ModelArtifact = read_json(&self.model)?;
        let feature_names: Vec<String> = read_json(&self.feature_names)?;
        TrainedModel::new(artifact, feature_names)
    }
}

/// Model and feature list that passed the consistency checks
#[derive(Debug, Clone)]
pub struct TrainedModel {
    artifact: ModelArtifact,
    feature_names: Vec<String>,
}

impl TrainedModel {
    pub fn new(artifact: ModelArtifact, feature_names: Vec<String>) -> Result<Self> {
        if artifact.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(Error::Artifact(format!(
                "unsupported format version {} (expected {})",
                artifact.format_version, ARTIFACT_FORMAT_VERSION
            )));
        }

        check_feature_names(&feature_names)?;

        if artifact.feature_names != feature_names {
            return Err(Error::Artifact(format!(
                "feature list {:?} does not match the model's training order {:?}",
                feature_names, artifact.feature_names
            )));
        }
        if artifact.forest.n_features() != feature_names.len() {
            return Err(Error::Artifact(format!(
                "model expects {} inputs but the feature list has {}",
                artifact.forest.n_features(),
                feature_names.len()
            )));
        }
        artifact.forest.check()?;

        let m = &artifact.metrics;
        if !(m.r2_score.is_finite() && m.mae.is_finite() && m.rmse.is_finite()) || m.rmse < 0.0 {
            return Err(Error::Artifact("model metrics are not valid numbers".to_string()));
        }
        // Band half-width must stay within the span of reportable years
        let span = f64::from(YEAR_RANGE.end() - YEAR_RANGE.start());
        if m.rmse > span {
            return Err(Error::Artifact(format!(
                "model RMSE {} exceeds the {}-year prediction range",
                m.rmse, span
            )));
        }

        Ok(Self { artifact, feature_names })
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn metrics(&self) -> &ModelMetrics {
        &self.artifact.metrics
    }

    pub fn artifact(&self) -> &ModelArtifact {
        &self.artifact
    }

    /// Raw model output for a validated vector
    pub fn predict(&self, features: &FeatureVector) -> Result<f64> {
        let row = features.assemble(&self.feature_names)?;
        let year = self.artifact.forest.predict(&row)?;
        if !year.is_finite() {
            return Err(Error::Artifact(format!("model produced a non-finite output: {}", year)));
        }
        Ok(year)
    }
}

/// Feature-name lists must name known, distinct features
fn check_feature_names(names: &[String]) -> Result<()> {
    if names.is_empty() {
        return Err(Error::Artifact("feature list is empty".to_string()));
    }
    let mut seen = HashSet::new();
    for name in names {
        if feature_spec(name).is_none() {
            return Err(Error::Artifact(format!("unknown feature '{}' in feature list", name)));
        }
        if !seen.insert(name.as_str()) {
            return Err(Error::Artifact(format!("feature '{}' listed twice", name)));
        }
    }
    Ok(())
}

/// Serialize to a `.tmp` sibling, then rename into place
fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    let bytes = serde_json::to_vec(value)?;
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)?;
    debug!("Wrote {}", path.display());
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(Error::ArtifactMissing(path.to_path_buf()))
        }
        Err(e) => return Err(e.into()),
    };
    serde_json::from_slice(&bytes)
        .map_err(|e| Error::Artifact(format!("{}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FeatureInput;
    use crate::forest::{Node, RegressionTree};

    fn two_feature_artifact() -> ModelArtifact {
        let tree = RegressionTree::from_nodes(
            vec![
                Node::Split {
                    feature: 0,
                    threshold: 0.5,
                    left: 1,
                    right: 2,
                },
                Node::Leaf { value: 1950.0 },
                Node::Leaf { value: 2000.0 },
            ],
            2,
        )
        .unwrap();
        let forest = RandomForest::from_trees(2, vec![tree]).unwrap();
        let metrics = ModelMetrics {
            r2_score: 0.5,
            mae: 8.0,
            rmse: 10.4,
            n_train: 8,
            n_test: 2,
        };
        ModelArtifact::new(
            vec!["energy".to_string(), "tempo".to_string()],
            vec![],
            metrics,
            ForestParams::default(),
            forest,
        )
    }

    fn input(energy: f64) -> FeatureVector {
        FeatureInput {
            acousticness: Some(0.1),
            danceability: Some(0.1),
            energy: Some(energy),
            instrumentalness: Some(0.1),
            liveness: Some(0.1),
            loudness: Some(-5.0),
            speechiness: Some(0.1),
            tempo: Some(120.0),
            valence: Some(0.1),
            duration_ms: Some(200000.0),
            key: Some(3.0),
            mode: Some(1.0),
        }
        .validate()
        .unwrap()
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ArtifactPaths::new(
            dir.path().join("m/model.json"),
            dir.path().join("m/names.json"),
        );
        let artifact = two_feature_artifact();
        paths.save(&artifact).unwrap();

        let model = paths.load().unwrap();
        assert_eq!(model.artifact(), &artifact);
        assert_eq!(model.feature_names(), ["energy", "tempo"]);
        assert_eq!(model.predict(&input(0.2)).unwrap(), 1950.0);
        assert_eq!(model.predict(&input(0.8)).unwrap(), 2000.0);
        assert!(!dir.path().join("m/model.json.tmp").exists());
    }

    #[test]
    fn test_missing_model_file() {
        let dir = tempfile::tempdir().unwrap();
        let paths =
            ArtifactPaths::new(dir.path().join("absent.json"), dir.path().join("names.json"));
        assert!(matches!(paths.load(), Err(Error::ArtifactMissing(_))));
    }

    #[test]
    fn test_corrupt_model_file() {
        let dir = tempfile::tempdir().unwrap();
        let paths =
            ArtifactPaths::new(dir.path().join("model.json"), dir.path().join("names.json"));
        fs::write(&paths.model, b"not json").unwrap();
        fs::write(&paths.feature_names, b"[\"energy\"]").unwrap();
        assert!(matches!(paths.load(), Err(Error::Artifact(_))));
    }

    #[test]
    fn test_rmse_wider_than_year_range_rejected() {
        let names = vec!["energy".to_string(), "tempo".to_string()];

        let mut artifact = two_feature_artifact();
        artifact.metrics.rmse = 3e9;
        assert!(matches!(
            TrainedModel::new(artifact, names.clone()),
            Err(Error::Artifact(_))
        ));

        let mut artifact = two_feature_artifact();
        artifact.metrics.rmse = 124.0;
        assert!(TrainedModel::new(artifact, names).is_ok());
    }

    #[test]
    fn test_mismatched_feature_list_rejected() {
        let artifact = two_feature_artifact();
        let reordered = vec!["tempo".to_string(), "energy".to_string()];
        assert!(TrainedModel::new(artifact.clone(), reordered).is_err());

        let shorter = vec!["energy".to_string()];
        assert!(TrainedModel::new(artifact, shorter).is_err());
    }

    #[test]
    fn test_width_mismatch_rejected_even_when_lists_agree() {
        let mut artifact = two_feature_artifact();
        artifact.feature_names.push("valence".to_string());
        let names = artifact.feature_names.clone();
        assert!(TrainedModel::new(artifact, names).is_err());
    }

    #[test]
    fn test_unknown_or_duplicate_names_rejected() {
        assert!(check_feature_names(&["energy".to_string(), "year".to_string()]).is_err());
        assert!(check_feature_names(&["energy".to_string(), "energy".to_string()]).is_err());
        assert!(check_feature_names(&[]).is_err());
    }

    #[test]
    fn test_future_format_version_rejected() {
        let mut artifact = two_feature_artifact();
        artifact.format_version = ARTIFACT_FORMAT_VERSION + 1;
        let names = artifact.feature_names.clone();
        assert!(TrainedModel::new(artifact, names).is_err());
    }
}
