//! CART regression tree (squared-error splits)

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Growth limits for a single tree
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TreeParams {
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: 15,
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }
}

/// Tree node, stored in pre-order
///
/// Children always sit at larger indices than their parent, which is what
/// [`RegressionTree::check`] enforces on loaded trees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    nodes: Vec<Node>,
}

/// Best split found for one node
struct Candidate {
    feature: usize,
    threshold: f64,
    sse: f64,
}

struct Builder<'a> {
    x: &'a [Vec<f64>],
    y: &'a [f64],
    params: TreeParams,
    nodes: Vec<Node>,
    importances: Vec<f64>,
}

impl RegressionTree {
    /// Grow a tree on the rows listed in `sample` (duplicates allowed)
    ///
    /// Returns the tree and its unnormalized impurity decrease per feature.
    pub fn fit(
        x: &[Vec<f64>],
        y: &[f64],
        sample: Vec<usize>,
        n_features: usize,
        params: TreeParams,
    ) -> (Self, Vec<f64>) {
        let mut builder = Builder {
            x,
            y,
            params,
            nodes: Vec::new(),
            importances: vec![0.0; n_features],
        };
        builder.grow(sample, 0);

        (Self { nodes: builder.nodes }, builder.importances)
    }

    /// Build a tree from explicit nodes, checked against `n_features`
    pub fn from_nodes(nodes: Vec<Node>, n_features: usize) -> Result<Self> {
        let tree = Self { nodes };
        tree.check(n_features)?;
        Ok(tree)
    }

    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], idx: usize) -> usize {
            match nodes.get(idx) {
                Some(Node::Split { left, right, .. }) => {
                    1 + walk(nodes, *left).max(walk(nodes, *right))
                }
                _ => 0,
            }
        }
        walk(&self.nodes, 0)
    }

    /// Structural check for trees read from disk
    pub fn check(&self, n_features: usize) -> Result<()> {
        if self.nodes.is_empty() {
            return Err(Error::Artifact("tree has no nodes".to_string()));
        }
        for (idx, node) in self.nodes.iter().enumerate() {
            match node {
                Node::Leaf { value } if !value.is_finite() => {
                    return Err(Error::Artifact(format!(
                        "node {} has a non-finite leaf value",
                        idx
                    )));
                }
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= n_features {
                        return Err(Error::Artifact(format!(
                            "node {} splits on feature {} but the model has {} inputs",
                            idx, feature, n_features
                        )));
                    }
                    if !threshold.is_finite() {
                        return Err(Error::Artifact(format!(
                            "node {} has a non-finite threshold",
                            idx
                        )));
                    }
                    let len = self.nodes.len();
                    if *left <= idx || *right <= idx || *left >= len || *right >= len {
                        return Err(Error::Artifact(format!("node {} has invalid children", idx)));
                    }
                }
                Node::Leaf { .. } => {}
            }
        }
        Ok(())
    }

    /// Walk the tree for one row; `None` only for malformed trees
    pub fn predict(&self, row: &[f64]) -> Option<f64> {
        let mut idx = 0;
        loop {
            match self.nodes.get(idx)? {
                Node::Leaf { value } => return Some(*value),
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let value = *row.get(*feature)?;
                    let next = if value <= *threshold { *left } else { *right };
                    if next <= idx {
                        return None;
                    }
                    idx = next;
                }
            }
        }
    }
}

impl Builder<'_> {
    fn grow(&mut self, rows: Vec<usize>, depth: usize) -> usize {
        let n = rows.len();
        let sum: f64 = rows.iter().map(|&i| self.y[i]).sum();
        let mean = sum / n as f64;
        let sse: f64 = rows.iter().map(|&i| (self.y[i] - mean).powi(2)).sum();

        let idx = self.nodes.len();
        self.nodes.push(Node::Leaf { value: mean });

        if depth >= self.params.max_depth
            || n < self.params.min_samples_split
            || n < 2 * self.params.min_samples_leaf
            || sse <= f64::EPSILON
        {
            return idx;
        }

        let Some(best) = self.best_split(&rows) else {
            return idx;
        };
        if best.sse >= sse {
            return idx;
        }

        self.importances[best.feature] += sse - best.sse;

        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
            .into_iter()
            .partition(|&i| self.x[i][best.feature] <= best.threshold);

        let left = self.grow(left_rows, depth + 1);
        let right = self.grow(right_rows, depth + 1);
        self.nodes[idx] = Node::Split {
            feature: best.feature,
            threshold: best.threshold,
            left,
            right,
        };
        idx
    }

    fn best_split(&self, rows: &[usize]) -> Option<Candidate> {
        let n = rows.len();
        let min_leaf = self.params.min_samples_leaf.max(1);
        let mut best: Option<Candidate> = None;
        let mut pairs: Vec<(f64, f64)> = Vec::with_capacity(n);

        for feature in 0..self.importances.len() {
            pairs.clear();
            pairs.extend(rows.iter().map(|&i| (self.x[i][feature], self.y[i])));
            pairs.sort_unstable_by(|a, b| a.0.total_cmp(&b.0));

            let total_sum: f64 = pairs.iter().map(|p| p.1).sum();
            let total_sq: f64 = pairs.iter().map(|p| p.1 * p.1).sum();
            let mut left_sum = 0.0;
            let mut left_sq = 0.0;

            for k in 1..n {
                let (value, target) = pairs[k - 1];
                left_sum += target;
                left_sq += target * target;

                if k < min_leaf || n - k < min_leaf {
                    continue;
                }
                let next = pairs[k].0;
                if next <= value {
                    continue;
                }

                let n_left = k as f64;
                let n_right = (n - k) as f64;
                let right_sum = total_sum - left_sum;
                let right_sq = total_sq - left_sq;
                let split_sse = (left_sq - left_sum * left_sum / n_left)
                    + (right_sq - right_sum * right_sum / n_right);

                if best.as_ref().map_or(true, |b| split_sse < b.sse) {
                    let mut threshold = value + (next - value) / 2.0;
                    if threshold >= next {
                        threshold = value;
                    }
                    best = Some(Candidate { feature, threshold, sse: split_sse });
                }
            }
        }

        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step_data() -> (Vec<Vec<f64>>, Vec<f64>) {
        // Target depends only on feature 1
        let x = vec![
            vec![0.3, 0.1],
            vec![0.9, 0.2],
            vec![0.1, 0.3],
            vec![0.5, 0.7],
            vec![0.2, 0.8],
            vec![0.8, 0.9],
        ];
        let y = vec![1950.0, 1950.0, 1950.0, 2000.0, 2000.0, 2000.0];
        (x, y)
    }

    #[test]
    fn test_fit_recovers_step() {
        let (x, y) = step_data();
        let (tree, importances) =
            RegressionTree::fit(&x, &y, (0..6).collect(), 2, TreeParams::default());

        assert_eq!(tree.n_nodes(), 3);
        assert_eq!(tree.depth(), 1);
        assert_eq!(tree.predict(&[0.0, 0.15]), Some(1950.0));
        assert_eq!(tree.predict(&[0.0, 0.75]), Some(2000.0));
        assert_eq!(importances[0], 0.0);
        assert!(importances[1] > 0.0);
    }

    #[test]
    fn test_depth_zero_is_mean_leaf() {
        let (x, y) = step_data();
        let params = TreeParams { max_depth: 0, ..TreeParams::default() };
        let (tree, _) = RegressionTree::fit(&x, &y, (0..6).collect(), 2, params);
        assert_eq!(tree.n_nodes(), 1);
        assert_eq!(tree.predict(&[0.0, 0.0]), Some(1975.0));
    }

    #[test]
    fn test_min_samples_leaf_respected() {
        let (x, y) = step_data();
        let params = TreeParams { min_samples_leaf: 4, ..TreeParams::default() };
        let (tree, _) = RegressionTree::fit(&x, &y, (0..6).collect(), 2, params);
        // 6 rows cannot be split into two leaves of at least 4
        assert_eq!(tree.n_nodes(), 1);
    }

    #[test]
    fn test_check_rejects_backward_children() {
        let nodes = vec![
            Node::Split {
                feature: 0,
                threshold: 0.5,
                left: 0,
                right: 1,
            },
            Node::Leaf { value: 1.0 },
        ];
        assert!(RegressionTree::from_nodes(nodes, 1).is_err());
    }

    #[test]
    fn test_check_rejects_unknown_feature() {
        let nodes = vec![
            Node::Split {
                feature: 3,
                threshold: 0.5,
                left: 1,
                right: 2,
            },
            Node::Leaf { value: 1.0 },
            Node::Leaf { value: 2.0 },
        ];
        assert!(RegressionTree::from_nodes(nodes, 2).is_err());
    }
}
