//! Random forest of regression trees
//!
//! Each tree is grown on a bootstrap sample with greedy variance-reduction
//! splits at midpoints between distinct feature values. The forest
//! prediction is the mean of the tree predictions. Every random draw comes
//! from a `ChaCha8Rng` seeded from the forest seed, so a fixed seed gives
//! identical forests on every platform.

use crate::error::{ForecastError, Result};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Random forest configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestConfig {
    /// Number of trees in the forest
    pub n_trees: usize,
    /// Maximum depth of each tree
    pub max_depth: usize,
    /// Minimum samples to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf
    pub min_samples_leaf: usize,
    /// Bootstrap sampling
    pub bootstrap: bool,
    /// Random seed
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: 10,
            min_samples_split: 2,
            min_samples_leaf: 1,
            bootstrap: true,
            seed: 42,
        }
    }
}

impl ForestConfig {
    fn validate(&self) -> Result<()> {
        if self.n_trees == 0 {
            return Err(ForecastError::InvalidParameter(
                "Forest needs at least one tree".to_string(),
            ));
        }
        if self.min_samples_leaf == 0 || self.min_samples_split < 2 {
            return Err(ForecastError::InvalidParameter(
                "min_samples_leaf must be >= 1 and min_samples_split >= 2".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
    gain: f64,
}

/// Sum of squared deviations from the mean, from running sums
fn sse(sum: f64, sum_sq: f64, n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    (sum_sq - sum * sum / n as f64).max(0.0)
}

#[derive(Debug, Clone)]
struct RegressionTree {
    root: Node,
}

impl RegressionTree {
    fn fit(features: &[Vec<f64>], labels: &[f64], indices: &[usize], config: &ForestConfig) -> Self {
        Self {
            root: Self::build(features, labels, indices, 0, config),
        }
    }

    fn build(
        features: &[Vec<f64>],
        labels: &[f64],
        indices: &[usize],
        depth: usize,
        config: &ForestConfig,
    ) -> Node {
        let n = indices.len();
        let sum: f64 = indices.iter().map(|&i| labels[i]).sum();
        let sum_sq: f64 = indices.iter().map(|&i| labels[i] * labels[i]).sum();
        let value = sum / n as f64;
        let impurity = sse(sum, sum_sq, n);

        if depth >= config.max_depth || n < config.min_samples_split || impurity < 1e-12 {
            return Node::Leaf { value };
        }

        let Some(best) = Self::best_split(features, labels, indices, impurity, config) else {
            return Node::Leaf { value };
        };

        let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| features[i][best.feature] <= best.threshold);

        Node::Split {
            feature: best.feature,
            threshold: best.threshold,
            left: Box::new(Self::build(features, labels, &left_idx, depth + 1, config)),
            right: Box::new(Self::build(features, labels, &right_idx, depth + 1, config)),
        }
    }

    fn best_split(
        features: &[Vec<f64>],
        labels: &[f64],
        indices: &[usize],
        parent_impurity: f64,
        config: &ForestConfig,
    ) -> Option<SplitCandidate> {
        let n = indices.len();
        let n_features = features[indices[0]].len();
        let total_sum: f64 = indices.iter().map(|&i| labels[i]).sum();
        let total_sq: f64 = indices.iter().map(|&i| labels[i] * labels[i]).sum();

        let mut best: Option<SplitCandidate> = None;

        for feature in 0..n_features {
            let mut order = indices.to_vec();
            order.sort_by(|&a, &b| features[a][feature].total_cmp(&features[b][feature]));

            let mut left_sum = 0.0;
            let mut left_sq = 0.0;

            for pos in 0..n - 1 {
                let label = labels[order[pos]];
                left_sum += label;
                left_sq += label * label;

                let left_n = pos + 1;
                let right_n = n - left_n;
                if left_n < config.min_samples_leaf || right_n < config.min_samples_leaf {
                    continue;
                }

                let here = features[order[pos]][feature];
                let next = features[order[pos + 1]][feature];
                if next <= here {
                    continue;
                }

                let children = sse(left_sum, left_sq, left_n)
                    + sse(total_sum - left_sum, total_sq - left_sq, right_n);
                let gain = parent_impurity - children;

                if gain > 1e-12 && best.as_ref().map_or(true, |b| gain > b.gain) {
                    best = Some(SplitCandidate {
                        feature,
                        threshold: (here + next) / 2.0,
                        gain,
                    });
                }
            }
        }

        best
    }

    fn predict(&self, sample: &[f64]) -> f64 {
        let mut node = &self.root;
        loop {
            match node {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if sample[*feature] <= *threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }
}

/// Random forest regressor
#[derive(Debug, Clone)]
pub struct RandomForest {
    config: ForestConfig,
    trees: Vec<RegressionTree>,
    n_features: usize,
}

impl RandomForest {
    /// Train a forest on `(features, label)` rows
    pub fn fit(config: &ForestConfig, features: &[Vec<f64>], labels: &[f64]) -> Result<Self> {
        config.validate()?;

        if features.is_empty() {
            return Err(ForecastError::InsufficientData(
                "Cannot train a forest without training rows".to_string(),
            ));
        }
        if features.len() != labels.len() {
            return Err(ForecastError::InvalidParameter(format!(
                "Got {} feature rows but {} labels",
                features.len(),
                labels.len()
            )));
        }

        let n_features = features[0].len();
        if n_features == 0 || features.iter().any(|row| row.len() != n_features) {
            return Err(ForecastError::InvalidParameter(
                "Feature rows must share the same non-zero width".to_string(),
            ));
        }

        let n = features.len();
        let trees = (0..config.n_trees)
            .map(|i| {
                let indices: Vec<usize> = if config.bootstrap {
                    let mut rng = ChaCha8Rng::seed_from_u64(config.seed.wrapping_add(i as u64));
                    (0..n).map(|_| rng.gen_range(0..n)).collect()
                } else {
                    (0..n).collect()
                };
                RegressionTree::fit(features, labels, &indices, config)
            })
            .collect();

        Ok(Self {
            config: config.clone(),
            trees,
            n_features,
        })
    }

    /// Mean prediction across trees for one sample
    pub fn predict(&self, sample: &[f64]) -> Result<f64> {
        if sample.len() != self.n_features {
            return Err(ForecastError::InvalidParameter(format!(
                "Expected {} features, got {}",
                self.n_features,
                sample.len()
            )));
        }

        let total: f64 = self.trees.iter().map(|tree| tree.predict(sample)).sum();
        Ok(total / self.trees.len() as f64)
    }

    /// Number of trees
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Configuration used for training
    pub fn config(&self) -> &ForestConfig {
        &self.config
    }
}
