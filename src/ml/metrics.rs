//! Evaluation metrics for classification
//!
//! Accuracy, per-class precision/recall/F1, confusion matrix, and an
//! sklearn-style classification report.

use ndarray::{Array1, Array2};

/// Metrics calculator
pub struct Metrics;

impl Metrics {
    /// Accuracy: correct predictions / total predictions
    pub fn accuracy(y_true: &Array1<usize>, y_pred: &Array1<usize>) -> f64 {
        assert_eq!(y_true.len(), y_pred.len(), "Arrays must have same length");

        if y_true.is_empty() {
            return 0.0;
        }

        let correct = y_true
            .iter()
            .zip(y_pred.iter())
            .filter(|(t, p)| t == p)
            .count();

        correct as f64 / y_true.len() as f64
    }

    /// Precision for one class: TP / (TP + FP)
    pub fn precision(y_true: &Array1<usize>, y_pred: &Array1<usize>, class: usize) -> f64 {
        let tp = Self::count(y_true, y_pred, |t, p| t == class && p == class);
        let fp = Self::count(y_true, y_pred, |t, p| t != class && p == class);

        if tp + fp == 0 {
            0.0
        } else {
            tp as f64 / (tp + fp) as f64
        }
    }

    /// Recall for one class: TP / (TP + FN)
    pub fn recall(y_true: &Array1<usize>, y_pred: &Array1<usize>, class: usize) -> f64 {
        let tp = Self::count(y_true, y_pred, |t, p| t == class && p == class);
        let fn_ = Self::count(y_true, y_pred, |t, p| t == class && p != class);

        if tp + fn_ == 0 {
            0.0
        } else {
            tp as f64 / (tp + fn_) as f64
        }
    }

    /// F1 score for one class: harmonic mean of precision and recall
    pub fn f1_score(y_true: &Array1<usize>, y_pred: &Array1<usize>, class: usize) -> f64 {
        let precision = Self::precision(y_true, y_pred, class);
        let recall = Self::recall(y_true, y_pred, class);

        if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        }
    }

    /// Confusion matrix, rows = true class, columns = predicted class
    pub fn confusion_matrix(
        y_true: &Array1<usize>,
        y_pred: &Array1<usize>,
        n_classes: usize,
    ) -> Array2<usize> {
        let mut matrix = Array2::zeros((n_classes, n_classes));
        for (&t, &p) in y_true.iter().zip(y_pred.iter()) {
            if t < n_classes && p < n_classes {
                matrix[[t, p]] += 1;
            }
        }
        matrix
    }

    /// Per-class precision/recall/F1/support table as a printable string
    ///
    /// `classes` maps class ids to display names.
    pub fn classification_report(
        y_true: &Array1<usize>,
        y_pred: &Array1<usize>,
        classes: &[String],
    ) -> String {
        let width = classes
            .iter()
            .map(|c| c.len())
            .max()
            .unwrap_or(5)
            .max(5);

        let mut report = format!(
            "{:>w$} {:>10} {:>10} {:>10} {:>10}\n",
            "", "precision", "recall", "f1-score", "support",
            w = width
        );

        for (class, name) in classes.iter().enumerate() {
            let support = y_true.iter().filter(|&&t| t == class).count();
            report.push_str(&format!(
                "{:>w$} {:>10.2} {:>10.2} {:>10.2} {:>10}\n",
                name,
                Self::precision(y_true, y_pred, class),
                Self::recall(y_true, y_pred, class),
                Self::f1_score(y_true, y_pred, class),
                support,
                w = width
            ));
        }

        report.push_str(&format!(
            "\n{:>w$} {:>10.2} (over {} samples)\n",
            "accuracy",
            Self::accuracy(y_true, y_pred),
            y_true.len(),
            w = width
        ));

        report
    }

    fn count<F: Fn(usize, usize) -> bool>(
        y_true: &Array1<usize>,
        y_pred: &Array1<usize>,
        pred: F,
    ) -> usize {
        y_true
            .iter()
            .zip(y_pred.iter())
            .filter(|&(&t, &p)| pred(t, p))
            .count()
    }
}
