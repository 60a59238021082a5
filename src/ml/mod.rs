//! Classifiers and evaluation utilities

pub mod forest;
pub mod knn;
pub mod metrics;
pub mod model_selection;
pub mod tree;

pub use forest::{ForestConfig, RandomForest};
pub use knn::{DistanceMetric, KnnClassifier, WeightScheme};
pub use metrics::Metrics;
pub use model_selection::{CrossValidator, GridSearchResult};
pub use tree::{DecisionTree, TreeConfig};

use ndarray::{Array1, Array2};

/// Common interface of the classifiers in this module
///
/// Labels are class ids produced by
/// [`LabeledDataset::to_training_data`](crate::data::LabeledDataset::to_training_data).
pub trait Classifier {
    /// Fit the model to training data
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<usize>);

    /// Predict class ids for samples
    fn predict(&self, x: &Array2<f64>) -> Array1<usize>;
}
