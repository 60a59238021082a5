//! Decision tree classifier
//!
//! CART-style binary tree with gini impurity and midpoint thresholds.
//! Mostly useful as the base learner of [`RandomForest`](super::RandomForest).

use ndarray::{Array1, Array2};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::Classifier;

/// Decision tree configuration
#[derive(Debug, Clone)]
pub struct TreeConfig {
    /// Maximum depth of the tree
    pub max_depth: usize,
    /// Minimum samples required to attempt a split
    pub min_samples_split: usize,
    /// Minimum samples allowed in a leaf
    pub min_samples_leaf: usize,
    /// Features considered per split (None = all)
    pub max_features: Option<usize>,
    /// Seed for feature subsampling
    pub seed: u64,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: 40,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone)]
struct Node {
    feature: usize,
    threshold: f64,
    class: usize,
    left: Option<Box<Node>>,
    right: Option<Box<Node>>,
}

impl Node {
    fn leaf(class: usize) -> Self {
        Self {
            feature: 0,
            threshold: 0.0,
            class,
            left: None,
            right: None,
        }
    }

    fn is_leaf(&self) -> bool {
        self.left.is_none()
    }
}

/// Decision tree classifier
#[derive(Debug, Clone)]
pub struct DecisionTree {
    config: TreeConfig,
    n_classes: usize,
    root: Option<Node>,
}

impl DecisionTree {
    /// Create a tree with the given configuration
    pub fn new(config: TreeConfig) -> Self {
        Self {
            config,
            n_classes: 0,
            root: None,
        }
    }

    /// Tree depth (0 when unfitted)
    pub fn depth(&self) -> usize {
        fn depth_of(node: &Node) -> usize {
            if node.is_leaf() {
                1
            } else {
                1 + depth_of(node.left.as_ref().unwrap()).max(depth_of(node.right.as_ref().unwrap()))
            }
        }
        self.root.as_ref().map(depth_of).unwrap_or(0)
    }

    /// Predict the class of one sample
    pub fn predict_one(&self, sample: &[f64]) -> usize {
        let mut node = match &self.root {
            Some(node) => node,
            None => return 0,
        };
        while !node.is_leaf() {
            node = if sample[node.feature] <= node.threshold {
                node.left.as_ref().expect("non-leaf node missing left child")
            } else {
                node.right.as_ref().expect("non-leaf node missing right child")
            };
        }
        node.class
    }

    fn class_counts(&self, y: &Array1<usize>, indices: &[usize]) -> Vec<usize> {
        let mut counts = vec![0usize; self.n_classes];
        for &i in indices {
            counts[y[i]] += 1;
        }
        counts
    }

    fn gini(counts: &[usize]) -> f64 {
        let total: usize = counts.iter().sum();
        if total == 0 {
            return 0.0;
        }
        let total = total as f64;
        1.0 - counts
            .iter()
            .map(|&c| (c as f64 / total).powi(2))
            .sum::<f64>()
    }

    fn majority(counts: &[usize]) -> usize {
        counts
            .iter()
            .enumerate()
            .max_by_key(|&(_, c)| *c)
            .map(|(class, _)| class)
            .unwrap_or(0)
    }

    fn build(
        &self,
        x: &Array2<f64>,
        y: &Array1<usize>,
        indices: &[usize],
        depth: usize,
        rng: &mut ChaCha8Rng,
    ) -> Node {
        let counts = self.class_counts(y, indices);
        let impurity = Self::gini(&counts);

        if depth >= self.config.max_depth
            || indices.len() < self.config.min_samples_split
            || impurity < 1e-10
        {
            return Node::leaf(Self::majority(&counts));
        }

        match self.find_best_split(x, y, indices, impurity, rng) {
            Some((feature, threshold, left_idx, right_idx)) => {
                if left_idx.len() < self.config.min_samples_leaf
                    || right_idx.len() < self.config.min_samples_leaf
                {
                    return Node::leaf(Self::majority(&counts));
                }

                let left = self.build(x, y, &left_idx, depth + 1, rng);
                let right = self.build(x, y, &right_idx, depth + 1, rng);

                Node {
                    feature,
                    threshold,
                    class: Self::majority(&counts),
                    left: Some(Box::new(left)),
                    right: Some(Box::new(right)),
                }
            }
            None => Node::leaf(Self::majority(&counts)),
        }
    }

    fn find_best_split(
        &self,
        x: &Array2<f64>,
        y: &Array1<usize>,
        indices: &[usize],
        parent_impurity: f64,
        rng: &mut ChaCha8Rng,
    ) -> Option<(usize, f64, Vec<usize>, Vec<usize>)> {
        let n_features = x.ncols();
        let max_features = self.config.max_features.unwrap_or(n_features).min(n_features);

        let mut feature_pool: Vec<usize> = (0..n_features).collect();
        feature_pool.shuffle(rng);
        feature_pool.truncate(max_features);

        let mut best_gain = 0.0;
        let mut best: Option<(usize, f64, Vec<usize>, Vec<usize>)> = None;

        for &feature in &feature_pool {
            let mut values: Vec<f64> = indices.iter().map(|&i| x[[i, feature]]).collect();
            values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            values.dedup();

            for window in values.windows(2) {
                let threshold = (window[0] + window[1]) / 2.0;

                let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
                    .iter()
                    .partition(|&&i| x[[i, feature]] <= threshold);

                if left_idx.is_empty() || right_idx.is_empty() {
                    continue;
                }

                let left_gini = Self::gini(&self.class_counts(y, &left_idx));
                let right_gini = Self::gini(&self.class_counts(y, &right_idx));

                let n_left = left_idx.len() as f64;
                let n_right = right_idx.len() as f64;
                let weighted = (n_left * left_gini + n_right * right_gini) / (n_left + n_right);
                let gain = parent_impurity - weighted;

                if gain > best_gain {
                    best_gain = gain;
                    best = Some((feature, threshold, left_idx, right_idx));
                }
            }
        }

        best
    }
}

impl Classifier for DecisionTree {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<usize>) {
        assert_eq!(x.nrows(), y.len(), "X and y must have same number of samples");
        self.n_classes = y.iter().max().map(|&m| m + 1).unwrap_or(0);

        let indices: Vec<usize> = (0..x.nrows()).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        self.root = Some(self.build(x, y, &indices, 0, &mut rng));
    }

    fn predict(&self, x: &Array2<f64>) -> Array1<usize> {
        x.rows()
            .into_iter()
            .map(|row| self.predict_one(&row.to_vec()))
            .collect()
    }
}
