//! Random forest classifier
//!
//! Bags seeded decision trees over bootstrap samples and predicts by
//! majority vote across trees. Trees are fit in parallel; the data
//! pipeline itself stays single-threaded.

use ndarray::{Array1, Array2, Axis};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use super::tree::{DecisionTree, TreeConfig};
use super::Classifier;

/// Random forest configuration
///
/// Defaults match the validation tool this pipeline was built for
/// (250 trees, depth 40).
#[derive(Debug, Clone)]
pub struct ForestConfig {
    /// Number of trees
    pub n_trees: usize,
    /// Maximum depth of each tree
    pub max_depth: usize,
    /// Minimum samples to attempt a split
    pub min_samples_split: usize,
    /// Minimum samples in a leaf
    pub min_samples_leaf: usize,
    /// Features per split (None = sqrt of feature count)
    pub max_features: Option<usize>,
    /// Draw a bootstrap sample per tree
    pub bootstrap: bool,
    /// Random seed
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 250,
            max_depth: 40,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            bootstrap: true,
            seed: 42,
        }
    }
}

/// Random forest classifier
#[derive(Debug, Clone)]
pub struct RandomForest {
    config: ForestConfig,
    trees: Vec<DecisionTree>,
    n_classes: usize,
}

impl RandomForest {
    /// Create a forest with the given configuration
    pub fn new(config: ForestConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
            n_classes: 0,
        }
    }

    /// Number of fitted trees
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Forest configuration
    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    fn bootstrap_indices(n: usize, seed: u64) -> Vec<usize> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        (0..n).map(|_| rng.gen_range(0..n)).collect()
    }

    /// Predict the class of one sample by majority vote
    pub fn predict_one(&self, sample: &[f64]) -> usize {
        if self.trees.is_empty() {
            return 0;
        }

        let mut votes = vec![0usize; self.n_classes.max(1)];
        for tree in &self.trees {
            let class = tree.predict_one(sample);
            if class < votes.len() {
                votes[class] += 1;
            }
        }

        votes
            .iter()
            .enumerate()
            .max_by_key(|&(_, v)| *v)
            .map(|(class, _)| class)
            .unwrap_or(0)
    }
}

impl Classifier for RandomForest {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<usize>) {
        assert_eq!(x.nrows(), y.len(), "X and y must have same number of samples");
        self.n_classes = y.iter().max().map(|&m| m + 1).unwrap_or(0);

        let n_samples = x.nrows();
        let n_features = x.ncols();
        let max_features = self
            .config
            .max_features
            .unwrap_or_else(|| (n_features as f64).sqrt().ceil() as usize)
            .max(1);

        let config = self.config.clone();
        let trees: Vec<DecisionTree> = (0..config.n_trees)
            .into_par_iter()
            .map(|i| {
                let tree_config = TreeConfig {
                    max_depth: config.max_depth,
                    min_samples_split: config.min_samples_split,
                    min_samples_leaf: config.min_samples_leaf,
                    max_features: Some(max_features),
                    seed: config.seed.wrapping_add(i as u64),
                };

                let mut tree = DecisionTree::new(tree_config);

                if config.bootstrap {
                    let indices =
                        Self::bootstrap_indices(n_samples, config.seed.wrapping_add(i as u64));
                    let x_boot = x.select(Axis(0), &indices);
                    let y_boot: Array1<usize> = indices.iter().map(|&j| y[j]).collect();
                    tree.fit(&x_boot, &y_boot);
                } else {
                    tree.fit(x, y);
                }

                tree
            })
            .collect();
        self.trees = trees;
    }

    fn predict(&self, x: &Array2<f64>) -> Array1<usize> {
        x.rows()
            .into_iter()
            .map(|row| self.predict_one(&row.to_vec()))
            .collect()
    }
}
