//! Random forest of CART regression trees.
//!
//! Trees are grown in parallel on bootstrap samples and split on variance
//! reduction. Each tree is stored as a flat node arena so the whole forest
//! serializes to plain JSON.

use rand::rngs::StdRng;
use rand::seq::index::sample;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Forest hyperparameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForestConfig {
    pub n_trees: usize,
    /// `None` grows until leaves are pure or too small to split.
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Features tried per split; `None` tries all of them.
    pub max_features: Option<usize>,
    pub bootstrap: bool,
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            bootstrap: true,
            seed: 42,
        }
    }
}

impl ForestConfig {
    fn validate(&self) -> Result<(), ModelError> {
        if self.n_trees == 0 {
            return Err(ModelError::InvalidConfig(String::from(
                "n_trees must be at least 1",
            )));
        }
        if self.min_samples_leaf == 0 {
            return Err(ModelError::InvalidConfig(String::from(
                "min_samples_leaf must be at least 1",
            )));
        }
        if self.max_features == Some(0) {
            return Err(ModelError::InvalidConfig(String::from(
                "max_features must be at least 1",
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum Node {
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
struct RegressionTree {
    nodes: Vec<Node>,
}

impl RegressionTree {
    fn predict(&self, row: &[f64]) -> f64 {
        let mut index = 0;
        loop {
            match self.nodes[index] {
                Node::Leaf { value } => return value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if row[feature] <= threshold { left } else { right };
                }
            }
        }
    }

    fn depth(&self) -> usize {
        fn walk(nodes: &[Node], index: usize) -> usize {
            match nodes[index] {
                Node::Leaf { .. } => 1,
                Node::Split { left, right, .. } => 1 + walk(nodes, left).max(walk(nodes, right)),
            }
        }
        walk(&self.nodes, 0)
    }
}

struct Candidate {
    feature: usize,
    threshold: f64,
    score: f64,
}

struct TreeBuilder<'a> {
    features: &'a [Vec<f64>],
    labels: &'a [f64],
    config: &'a ForestConfig,
    n_features: usize,
    rng: StdRng,
    nodes: Vec<Node>,
}

impl TreeBuilder<'_> {
    fn grow(mut self, indices: Vec<usize>) -> RegressionTree {
        self.build(&indices, 0);
        RegressionTree { nodes: self.nodes }
    }

    fn build(&mut self, indices: &[usize], depth: usize) -> usize {
        let n = indices.len();
        let sum: f64 = indices.iter().map(|&i| self.labels[i]).sum();
        let node_id = self.nodes.len();
        self.nodes.push(Node::Leaf {
            value: sum / n as f64,
        });

        let depth_exhausted = self.config.max_depth.is_some_and(|max| depth >= max);
        if depth_exhausted || n < self.config.min_samples_split.max(2) {
            return node_id;
        }

        let Some(split) = self.best_split(indices, sum) else {
            return node_id;
        };

        let (left, right): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .copied()
            .partition(|&i| self.features[i][split.feature] <= split.threshold);
        let left_id = self.build(&left, depth + 1);
        let right_id = self.build(&right, depth + 1);

        self.nodes[node_id] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left: left_id,
            right: right_id,
        };
        node_id
    }

    /// Best variance-reducing split over a random feature subset.
    ///
    /// Minimising child SSE is the same as maximising
    /// `sum_l^2 / n_l + sum_r^2 / n_r`, scanned over sorted values with
    /// prefix sums. Thresholds sit halfway between distinct neighbours.
    fn best_split(&mut self, indices: &[usize], total: f64) -> Option<Candidate> {
        let n = indices.len();
        let min_leaf = self.config.min_samples_leaf;
        let k = self
            .config
            .max_features
            .map_or(self.n_features, |m| m.min(self.n_features));
        let candidates = sample(&mut self.rng, self.n_features, k).into_vec();

        let parent_score = total * total / n as f64;
        let mut best: Option<Candidate> = None;
        let mut column: Vec<(f64, f64)> = Vec::with_capacity(n);

        for feature in candidates {
            column.clear();
            column.extend(
                indices
                    .iter()
                    .map(|&i| (self.features[i][feature], self.labels[i])),
            );
            column.sort_by(|a, b| a.0.total_cmp(&b.0));

            let mut left_sum = 0.0;
            for split_at in 1..n {
                left_sum += column[split_at - 1].1;
                let (lower, upper) = (column[split_at - 1].0, column[split_at].0);
                if lower == upper || split_at < min_leaf || n - split_at < min_leaf {
                    continue;
                }

                let right_sum = total - left_sum;
                let score = left_sum * left_sum / split_at as f64
                    + right_sum * right_sum / (n - split_at) as f64;
                let improves = score > parent_score + 1e-12 * parent_score.abs().max(1.0);
                let beats_best = best.as_ref().is_none_or(|b| score > b.score);
                if improves && beats_best {
                    let mid = lower + (upper - lower) / 2.0;
                    let threshold = if mid < upper { mid } else { lower };
                    best = Some(Candidate {
                        feature,
                        threshold,
                        score,
                    });
                }
            }
        }

        best
    }
}

/// Bagged ensemble of regression trees; predictions are the mean over trees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForestRegressor {
    config: ForestConfig,
    feature_names: Vec<String>,
    n_features: usize,
    trees: Vec<RegressionTree>,
}

impl RandomForestRegressor {
    pub fn fit(
        config: &ForestConfig,
        features: &[Vec<f64>],
        labels: &[f64],
        feature_names: &[&str],
    ) -> Result<Self, ModelError> {
        config.validate()?;
        if features.is_empty() {
            return Err(ModelError::EmptyDataset);
        }
        if features.len() != labels.len() {
            return Err(ModelError::LabelCount {
                rows: features.len(),
                labels: labels.len(),
            });
        }

        let n_features = features[0].len();
        if n_features == 0 {
            return Err(ModelError::FeatureWidth {
                expected: feature_names.len(),
                actual: 0,
            });
        }
        for (row, (values, label)) in features.iter().zip(labels).enumerate() {
            if values.len() != n_features {
                return Err(ModelError::FeatureWidth {
                    expected: n_features,
                    actual: values.len(),
                });
            }
            if !label.is_finite() || values.iter().any(|value| !value.is_finite()) {
                return Err(ModelError::NonFinite { row });
            }
        }

        let n_samples = features.len();
        let trees = (0..config.n_trees)
            .into_par_iter()
            .map(|tree_index| {
                let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(tree_index as u64));
                let indices: Vec<usize> = if config.bootstrap {
                    (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect()
                } else {
                    (0..n_samples).collect()
                };

                TreeBuilder {
                    features,
                    labels,
                    config,
                    n_features,
                    rng,
                    nodes: Vec::new(),
                }
                .grow(indices)
            })
            .collect();

        Ok(Self {
            config: config.clone(),
            feature_names: feature_names.iter().map(|name| (*name).to_owned()).collect(),
            n_features,
            trees,
        })
    }

    pub fn predict_one(&self, row: &[f64]) -> Result<f64, ModelError> {
        if row.len() != self.n_features {
            return Err(ModelError::FeatureWidth {
                expected: self.n_features,
                actual: row.len(),
            });
        }
        if row.iter().any(|value| !value.is_finite()) {
            return Err(ModelError::NonFinite { row: 0 });
        }
        let total: f64 = self.trees.iter().map(|tree| tree.predict(row)).sum();
        Ok(total / self.trees.len() as f64)
    }

    pub fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>, ModelError> {
        rows.iter()
            .enumerate()
            .map(|(index, row)| {
                self.predict_one(row).map_err(|error| match error {
                    ModelError::NonFinite { .. } => ModelError::NonFinite { row: index },
                    other => other,
                })
            })
            .collect()
    }

    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    /// Names recorded at fit time; prediction is positional.
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn max_depth(&self) -> usize {
        self.trees.iter().map(RegressionTree::depth).max().unwrap_or(0)
    }
}
