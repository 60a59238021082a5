//! K-Nearest Neighbors classifier
//!
//! Classifies a sample by (optionally distance-weighted) majority vote
//! among the k closest training samples.

use ndarray::{Array1, Array2};
use std::collections::HashMap;

use super::Classifier;

/// Distance metric between samples
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceMetric {
    /// Euclidean distance (L2)
    Euclidean,
    /// Manhattan distance (L1)
    Manhattan,
}

/// Neighbor vote weighting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightScheme {
    /// All neighbors count equally
    Uniform,
    /// Neighbors weighted by inverse distance
    Distance,
}

impl std::fmt::Display for WeightScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WeightScheme::Uniform => write!(f, "uniform"),
            WeightScheme::Distance => write!(f, "distance"),
        }
    }
}

/// KNN classifier
#[derive(Debug, Clone)]
pub struct KnnClassifier {
    k: usize,
    metric: DistanceMetric,
    weights: WeightScheme,
    x_train: Option<Array2<f64>>,
    y_train: Option<Array1<usize>>,
}

impl KnnClassifier {
    /// Create a classifier with `k` neighbors, Euclidean metric and
    /// uniform weighting
    pub fn new(k: usize) -> Self {
        Self {
            k,
            metric: DistanceMetric::Euclidean,
            weights: WeightScheme::Uniform,
            x_train: None,
            y_train: None,
        }
    }

    /// Set the distance metric
    pub fn with_metric(mut self, metric: DistanceMetric) -> Self {
        self.metric = metric;
        self
    }

    /// Set the vote weighting
    pub fn with_weights(mut self, weights: WeightScheme) -> Self {
        self.weights = weights;
        self
    }

    /// Number of neighbors
    pub fn k(&self) -> usize {
        self.k
    }

    /// Vote weighting in use
    pub fn weights(&self) -> WeightScheme {
        self.weights
    }

    fn distance(&self, a: &[f64], b: &[f64]) -> f64 {
        match self.metric {
            DistanceMetric::Euclidean => a
                .iter()
                .zip(b.iter())
                .map(|(x, y)| (x - y).powi(2))
                .sum::<f64>()
                .sqrt(),
            DistanceMetric::Manhattan => {
                a.iter().zip(b.iter()).map(|(x, y)| (x - y).abs()).sum()
            }
        }
    }

    fn vote(&self, neighbors: &[(usize, f64)], y_train: &Array1<usize>) -> usize {
        let mut votes: HashMap<usize, f64> = HashMap::new();

        for (idx, dist) in neighbors {
            let weight = match self.weights {
                WeightScheme::Uniform => 1.0,
                // exact matches dominate the vote
                WeightScheme::Distance if *dist > 0.0 => 1.0 / dist,
                WeightScheme::Distance => 1e10,
            };
            *votes.entry(y_train[*idx]).or_insert(0.0) += weight;
        }

        votes
            .into_iter()
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(class, _)| class)
            .unwrap_or(0)
    }
}

impl Classifier for KnnClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<usize>) {
        assert_eq!(x.nrows(), y.len(), "X and y must have same number of samples");
        self.x_train = Some(x.clone());
        self.y_train = Some(y.clone());
    }

    fn predict(&self, x: &Array2<f64>) -> Array1<usize> {
        let x_train = self.x_train.as_ref().expect("Model not fitted");
        let y_train = self.y_train.as_ref().expect("Model not fitted");

        let mut predictions = Vec::with_capacity(x.nrows());

        for sample in x.rows() {
            let sample = sample.to_vec();

            let mut distances: Vec<(usize, f64)> = x_train
                .rows()
                .into_iter()
                .enumerate()
                .map(|(i, train_sample)| (i, self.distance(&sample, &train_sample.to_vec())))
                .collect();

            distances.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
            distances.truncate(self.k);

            predictions.push(self.vote(&distances, y_train));
        }

        Array1::from_vec(predictions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_knn_separable_clusters() {
        let x_train = array![
            [1.0, 1.0],
            [1.0, 2.0],
            [2.0, 1.0],
            [5.0, 5.0],
            [5.0, 6.0],
            [6.0, 5.0]
        ];
        let y_train = array![0, 0, 0, 1, 1, 1];

        let mut knn = KnnClassifier::new(3);
        knn.fit(&x_train, &y_train);

        let predictions = knn.predict(&array![[1.5, 1.5], [5.5, 5.5]]);
        assert_eq!(predictions.to_vec(), vec![0, 1]);
    }

    #[test]
    fn test_knn_one_neighbor_memorizes() {
        let x_train = array![[0.0], [1.0], [2.0]];
        let y_train = array![2, 0, 1];

        let mut knn = KnnClassifier::new(1);
        knn.fit(&x_train, &y_train);

        let predictions = knn.predict(&x_train);
        assert_eq!(predictions.to_vec(), vec![2, 0, 1]);
    }

    #[test]
    fn test_distance_weighting_prefers_closer_class() {
        // two far 1s, one near 0: uniform k=3 says 1, distance says 0
        let x_train = array![[0.0], [10.0], [10.5]];
        let y_train = array![0, 1, 1];
        let x_test = array![[0.5]];

        let mut uniform = KnnClassifier::new(3);
        uniform.fit(&x_train, &y_train);
        assert_eq!(uniform.predict(&x_test)[0], 1);

        let mut weighted = KnnClassifier::new(3).with_weights(WeightScheme::Distance);
        weighted.fit(&x_train, &y_train);
        assert_eq!(weighted.predict(&x_test)[0], 0);
    }

    #[test]
    fn test_manhattan_metric() {
        let x_train = array![[0.0, 0.0], [3.0, 3.0]];
        let y_train = array![0, 1];

        let mut knn = KnnClassifier::new(1).with_metric(DistanceMetric::Manhattan);
        knn.fit(&x_train, &y_train);
        assert_eq!(knn.predict(&array![[1.0, 1.0]])[0], 0);
    }
}
