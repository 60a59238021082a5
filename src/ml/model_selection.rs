//! Train/test splitting, cross-validation, and grid search
//!
//! Splits are seeded so runs are reproducible.

use ndarray::{Array1, Array2, Axis};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::forest::{ForestConfig, RandomForest};
use super::knn::{KnnClassifier, WeightScheme};
use super::metrics::Metrics;
use super::Classifier;

/// One cross-validation split
#[derive(Debug, Clone)]
pub struct CvSplit {
    pub train_indices: Vec<usize>,
    pub test_indices: Vec<usize>,
}

/// Cross-validation split generators
pub struct CrossValidator;

impl CrossValidator {
    /// K-fold splits over `n_samples`, shuffled with `seed`
    pub fn k_fold(n_samples: usize, n_folds: usize, seed: u64) -> Vec<CvSplit> {
        assert!(n_folds > 1, "n_folds must be > 1");
        assert!(n_samples >= n_folds, "n_samples must be >= n_folds");

        let mut indices: Vec<usize> = (0..n_samples).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        indices.shuffle(&mut rng);

        let fold_size = n_samples / n_folds;
        let mut splits = Vec::with_capacity(n_folds);

        for i in 0..n_folds {
            let test_start = i * fold_size;
            let test_end = if i == n_folds - 1 {
                n_samples
            } else {
                (i + 1) * fold_size
            };

            let test_indices: Vec<usize> = indices[test_start..test_end].to_vec();
            let train_indices: Vec<usize> = indices[..test_start]
                .iter()
                .chain(indices[test_end..].iter())
                .cloned()
                .collect();

            splits.push(CvSplit {
                train_indices,
                test_indices,
            });
        }

        splits
    }
}

/// Shuffled train/test split of a feature matrix and label vector
pub fn train_test_split(
    x: &Array2<f64>,
    y: &Array1<usize>,
    test_ratio: f64,
    seed: u64,
) -> (Array2<f64>, Array1<usize>, Array2<f64>, Array1<usize>) {
    assert_eq!(x.nrows(), y.len(), "X and y must have same number of samples");

    let n = x.nrows();
    let test_size = ((n as f64) * test_ratio).round() as usize;

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let (test_idx, train_idx) = indices.split_at(test_size);

    (
        x.select(Axis(0), train_idx),
        train_idx.iter().map(|&i| y[i]).collect(),
        x.select(Axis(0), test_idx),
        test_idx.iter().map(|&i| y[i]).collect(),
    )
}

/// Mean cross-validated accuracy of models produced by `make_model`
pub fn cross_val_score<M, F>(
    make_model: F,
    x: &Array2<f64>,
    y: &Array1<usize>,
    n_folds: usize,
    seed: u64,
) -> f64
where
    M: Classifier,
    F: Fn() -> M,
{
    let splits = CrossValidator::k_fold(x.nrows(), n_folds, seed);
    let mut scores = Vec::with_capacity(splits.len());

    for split in &splits {
        let x_train = x.select(Axis(0), &split.train_indices);
        let y_train: Array1<usize> = split.train_indices.iter().map(|&i| y[i]).collect();
        let x_test = x.select(Axis(0), &split.test_indices);
        let y_test: Array1<usize> = split.test_indices.iter().map(|&i| y[i]).collect();

        let mut model = make_model();
        model.fit(&x_train, &y_train);
        scores.push(Metrics::accuracy(&y_test, &model.predict(&x_test)));
    }

    scores.iter().sum::<f64>() / scores.len() as f64
}

/// Outcome of a grid search: the refitted best model, its CV accuracy,
/// and a human-readable parameter description
pub struct GridSearchResult<M> {
    pub model: M,
    pub cv_accuracy: f64,
    pub parameters: String,
}

/// Grid-search a KNN classifier over k and vote weighting
pub fn grid_search_knn(
    x: &Array2<f64>,
    y: &Array1<usize>,
    n_folds: usize,
    seed: u64,
) -> GridSearchResult<KnnClassifier> {
    let k_grid = [1usize, 2, 5];
    let weight_grid = [WeightScheme::Uniform, WeightScheme::Distance];

    let mut best_k = k_grid[0];
    let mut best_weights = weight_grid[0];
    let mut best_score = f64::NEG_INFINITY;

    for &k in &k_grid {
        for &weights in &weight_grid {
            let score = cross_val_score(
                || KnnClassifier::new(k).with_weights(weights),
                x,
                y,
                n_folds,
                seed,
            );
            if score > best_score {
                best_score = score;
                best_k = k;
                best_weights = weights;
            }
        }
    }

    let mut model = KnnClassifier::new(best_k).with_weights(best_weights);
    model.fit(x, y);

    GridSearchResult {
        model,
        cv_accuracy: best_score,
        parameters: format!("k={}, weights={}", best_k, best_weights),
    }
}

/// Grid-search a random forest over tree count and depth
pub fn grid_search_forest(
    x: &Array2<f64>,
    y: &Array1<usize>,
    n_folds: usize,
    seed: u64,
) -> GridSearchResult<RandomForest> {
    let n_trees_grid = [200usize, 250, 300];
    let depth_grid = [30usize, 40, 50];

    let mut best_config = ForestConfig::default();
    let mut best_score = f64::NEG_INFINITY;

    for &n_trees in &n_trees_grid {
        for &max_depth in &depth_grid {
            let config = ForestConfig {
                n_trees,
                max_depth,
                seed,
                ..Default::default()
            };
            let score = cross_val_score(
                || RandomForest::new(config.clone()),
                x,
                y,
                n_folds,
                seed,
            );
            if score > best_score {
                best_score = score;
                best_config = config;
            }
        }
    }

    let parameters = format!(
        "n_trees={}, max_depth={}",
        best_config.n_trees, best_config.max_depth
    );
    let mut model = RandomForest::new(best_config);
    model.fit(x, y);

    GridSearchResult {
        model,
        cv_accuracy: best_score,
        parameters,
    }
}
