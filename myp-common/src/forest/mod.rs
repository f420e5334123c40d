//! Bagged regression-tree ensemble
//!
//! Each tree is grown on a bootstrap sample drawn from its own seeded RNG
//! (`seed + tree_index`), so fitting in parallel gives the same forest as
//! fitting sequentially.

mod tree;

pub use tree::{Node, RegressionTree, TreeParams};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Forest hyperparameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_trees: usize,
    pub tree: TreeParams,
    pub seed: u64,
    /// Draw a bootstrap sample per tree (otherwise every tree sees all rows)
    pub bootstrap: bool,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 100,
            tree: TreeParams::default(),
            seed: 42,
            bootstrap: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    n_features: usize,
    trees: Vec<RegressionTree>,
    /// Impurity-based importances, one per input position, summing to 1
    feature_importances: Vec<f64>,
}

impl RandomForest {
    /// Fit on row-major `x` with targets `y`
    pub fn fit(x: &[Vec<f64>], y: &[f64], params: &ForestParams) -> Result<Self> {
        if x.is_empty() {
            return Err(Error::InvalidInput("cannot fit on an empty dataset".to_string()));
        }
        if x.len() != y.len() {
            return Err(Error::InvalidInput(format!(
                "{} feature rows but {} targets",
                x.len(),
                y.len()
            )));
        }
        if params.n_trees == 0 {
            return Err(Error::InvalidInput("n_trees must be at least 1".to_string()));
        }
        let n_features = x[0].len();
        if n_features == 0 || x.iter().any(|row| row.len() != n_features) {
            return Err(Error::InvalidInput("feature rows must share a non-zero width".to_string()));
        }

        let n_rows = x.len();
        let fitted: Vec<(RegressionTree, Vec<f64>)> = (0..params.n_trees)
            .into_par_iter()
            .map(|t| {
                let sample = if params.bootstrap {
                    let mut rng = StdRng::seed_from_u64(params.seed.wrapping_add(t as u64));
                    (0..n_rows).map(|_| rng.gen_range(0..n_rows)).collect()
                } else {
                    (0..n_rows).collect()
                };
                RegressionTree::fit(x, y, sample, n_features, params.tree)
            })
            .collect();

        let mut importances = vec![0.0; n_features];
        let mut trees = Vec::with_capacity(fitted.len());
        for (tree, tree_importances) in fitted {
            let total: f64 = tree_importances.iter().sum();
            if total > 0.0 {
                for (acc, value) in importances.iter_mut().zip(&tree_importances) {
                    *acc += value / total;
                }
            }
            trees.push(tree);
        }
        let total: f64 = importances.iter().sum();
        if total > 0.0 {
            importances.iter_mut().for_each(|v| *v /= total);
        }

        Ok(Self {
            n_features,
            trees,
            feature_importances: importances,
        })
    }

    /// Assemble a forest from already-built trees
    pub fn from_trees(n_features: usize, trees: Vec<RegressionTree>) -> Result<Self> {
        let forest = Self {
            n_features,
            feature_importances: vec![0.0; n_features],
            trees,
        };
        forest.check()?;
        Ok(forest)
    }

    /// Number of inputs the forest expects per row
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn feature_importances(&self) -> &[f64] {
        &self.feature_importances
    }

    /// Structural check for forests read from disk
    pub fn check(&self) -> Result<()> {
        if self.trees.is_empty() {
            return Err(Error::Artifact("forest has no trees".to_string()));
        }
        if self.feature_importances.len() != self.n_features {
            return Err(Error::Artifact(format!(
                "{} feature importances for {} inputs",
                self.feature_importances.len(),
                self.n_features
            )));
        }
        for (idx, tree) in self.trees.iter().enumerate() {
            tree.check(self.n_features)
                .map_err(|e| Error::Artifact(format!("tree {}: {}", idx, e)))?;
        }
        Ok(())
    }

    /// Average of all tree outputs for one row
    pub fn predict(&self, row: &[f64]) -> Result<f64> {
        if row.len() != self.n_features {
            return Err(Error::InvalidInput(format!(
                "expected {} features, got {}",
                self.n_features,
                row.len()
            )));
        }

        let mut total = 0.0;
        for tree in &self.trees {
            total += tree
                .predict(row)
                .ok_or_else(|| Error::Artifact("malformed tree".to_string()))?;
        }
        Ok(total / self.trees.len() as f64)
    }

    pub fn predict_many(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>> {
        rows.par_iter().map(|row| self.predict(row)).collect()
    }
}
