//! Core data types for sensor recordings
//!
//! - SensorFrame: one table of timestamped sensor values (per-sensor or merged)
//! - LabeledDataset: the final concatenated, label-annotated feature table

use std::fs::File;
use std::path::Path;

use chrono::{DateTime, TimeZone, Utc};
use ndarray::{Array1, Array2};

use super::error::DataResult;

/// A timestamped table of sensor values
///
/// Holds either one sensor's records or a merged multi-sensor stream;
/// `columns` names the value columns (timestamps are kept separately).
#[derive(Debug, Clone, PartialEq)]
pub struct SensorFrame {
    /// Value column names, in order
    pub columns: Vec<String>,
    /// Unix timestamps in milliseconds, one per row
    pub timestamps: Vec<i64>,
    /// Value rows, each of length `columns.len()`
    pub rows: Vec<Vec<f64>>,
}

impl SensorFrame {
    /// Create an empty frame with the given columns
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            timestamps: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Number of rows
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Number of value columns
    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    /// Whether the frame has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Datetime of the row at `index`
    pub fn datetime(&self, index: usize) -> Option<DateTime<Utc>> {
        self.timestamps
            .get(index)
            .and_then(|&ms| Utc.timestamp_millis_opt(ms).single())
    }

    /// Sort rows by timestamp (stable, ascending)
    ///
    /// Raw files are not guaranteed to be ordered; the asof merge
    /// requires ascending timestamps on both sides.
    pub fn sort_by_timestamp(&mut self) {
        let mut order: Vec<usize> = (0..self.timestamps.len()).collect();
        order.sort_by_key(|&i| self.timestamps[i]);

        self.timestamps = order.iter().map(|&i| self.timestamps[i]).collect();
        self.rows = order.iter().map(|&i| self.rows[i].clone()).collect();
    }

    /// Write the frame to a CSV file (timestamp column first)
    pub fn write_csv<P: AsRef<Path>>(&self, path: P, timestamp_column: &str) -> DataResult<()> {
        let file = File::create(path.as_ref())?;
        let mut writer = csv::Writer::from_writer(file);

        let mut header = vec![timestamp_column.to_string()];
        header.extend(self.columns.iter().cloned());
        writer.write_record(&header)?;

        for (ts, row) in self.timestamps.iter().zip(self.rows.iter()) {
            let mut record = vec![ts.to_string()];
            record.extend(row.iter().map(|v| v.to_string()));
            writer.write_record(&record)?;
        }

        writer.flush()?;
        Ok(())
    }
}

/// The assembled dataset: merged sensor rows from every label folder,
/// annotated with the class label they came from
#[derive(Debug, Clone, Default)]
pub struct LabeledDataset {
    /// Feature column names (timestamp excluded)
    pub feature_names: Vec<String>,
    /// Unix timestamps in milliseconds, one per row
    pub timestamps: Vec<i64>,
    /// Feature rows
    pub rows: Vec<Vec<f64>>,
    /// Class label of each row
    pub labels: Vec<String>,
}

impl LabeledDataset {
    /// Number of samples
    pub fn n_samples(&self) -> usize {
        self.rows.len()
    }

    /// Number of features
    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    /// Distinct class labels, sorted
    pub fn classes(&self) -> Vec<String> {
        let mut classes = self.labels.clone();
        classes.sort();
        classes.dedup();
        classes
    }

    /// Append one merged frame under a class label
    pub fn extend_from_frame(&mut self, frame: SensorFrame, label: &str) {
        if self.feature_names.is_empty() {
            self.feature_names = frame.columns;
        }
        self.labels
            .extend(std::iter::repeat(label.to_string()).take(frame.rows.len()));
        self.timestamps.extend(frame.timestamps);
        self.rows.extend(frame.rows);
    }

    /// Encode the dataset into a feature matrix and class-id vector
    ///
    /// Class ids index into the returned sorted class list, so the
    /// encoding is stable across runs.
    pub fn to_training_data(&self) -> (Array2<f64>, Array1<usize>, Vec<String>) {
        let classes = self.classes();
        let y: Array1<usize> = self
            .labels
            .iter()
            .map(|l| classes.iter().position(|c| c == l).unwrap_or(0))
            .collect();

        let n = self.n_samples();
        let k = self.n_features();
        let mut x = Array2::zeros((n, k));
        for (i, row) in self.rows.iter().enumerate() {
            for (j, &v) in row.iter().enumerate() {
                x[[i, j]] = v;
            }
        }

        (x, y, classes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(columns: &[&str], data: &[(i64, &[f64])]) -> SensorFrame {
        SensorFrame {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            timestamps: data.iter().map(|(t, _)| *t).collect(),
            rows: data.iter().map(|(_, r)| r.to_vec()).collect(),
        }
    }

    #[test]
    fn test_sort_by_timestamp() {
        let mut f = frame(
            &["v"],
            &[(500, &[3.0][..]), (0, &[1.0][..]), (250, &[2.0][..])],
        );
        f.sort_by_timestamp();
        assert_eq!(f.timestamps, vec![0, 250, 500]);
        assert_eq!(f.rows, vec![vec![1.0], vec![2.0], vec![3.0]]);
    }

    #[test]
    fn test_datetime_conversion() {
        let f = frame(&["v"], &[(1_700_000_000_000, &[1.0][..])]);
        let dt = f.datetime(0).unwrap();
        assert_eq!(dt.timestamp_millis(), 1_700_000_000_000);
        assert!(f.datetime(1).is_none());
    }

    #[test]
    fn test_dataset_extend_and_classes() {
        let mut ds = LabeledDataset::default();
        ds.extend_from_frame(
            frame(&["a", "b"], &[(0, &[1.0, 2.0][..]), (250, &[3.0, 4.0][..])]),
            "walk",
        );
        ds.extend_from_frame(frame(&["a", "b"], &[(0, &[5.0, 6.0][..])]), "run");

        assert_eq!(ds.n_samples(), 3);
        assert_eq!(ds.n_features(), 2);
        assert_eq!(ds.classes(), vec!["run", "walk"]);
        assert_eq!(ds.labels, vec!["walk", "walk", "run"]);
    }

    #[test]
    fn test_to_training_data() {
        let mut ds = LabeledDataset::default();
        ds.extend_from_frame(frame(&["a"], &[(0, &[1.0][..])]), "walk");
        ds.extend_from_frame(frame(&["a"], &[(0, &[2.0][..])]), "run");

        let (x, y, classes) = ds.to_training_data();
        assert_eq!(x.nrows(), 2);
        assert_eq!(classes, vec!["run", "walk"]);
        // "walk" sorts after "run", so walk -> 1, run -> 0
        assert_eq!(y.to_vec(), vec![1, 0]);
    }
}
