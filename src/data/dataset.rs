//! Dataset assembly across label folders
//!
//! Walks the immediate subfolders of a root directory (one subfolder per
//! class label), merges each label's recording at `<root>/<label>/<target>`,
//! appends the label, and concatenates everything into one
//! [`LabeledDataset`].

use std::path::Path;

use tracing::{debug, info};

use super::error::{DataError, DataResult};
use super::merge::SensorMerger;
use super::schema::{has_csv_extension, SensorSchema};
use super::types::LabeledDataset;

/// Builds a labeled dataset from a directory of recordings
#[derive(Debug, Clone)]
pub struct DatasetBuilder {
    merger: SensorMerger,
}

impl DatasetBuilder {
    /// Create a builder for the given schema
    pub fn new(schema: SensorSchema) -> Self {
        Self {
            merger: SensorMerger::new(schema),
        }
    }

    /// Create a builder around an existing merger
    pub fn with_merger(merger: SensorMerger) -> Self {
        Self { merger }
    }

    /// Build the dataset rooted at `root`
    ///
    /// Each immediate subdirectory of `root` names a class label; its
    /// recording is expected at `<root>/<label>/<target>`. Labels whose
    /// recording folder does not exist are skipped. Label folders are
    /// visited in sorted name order so row order is reproducible.
    ///
    /// A `root` that is itself a CSV file is treated as a single
    /// pre-merged recording labeled with the file's own stem.
    pub fn build<P: AsRef<Path>>(&self, root: P, target: &str) -> DataResult<LabeledDataset> {
        let root = root.as_ref();
        let mut dataset = LabeledDataset::default();

        if has_csv_extension(root) {
            // Degenerate single-recording case; a missing file cannot be
            // skipped here because there is no outer walk to continue.
            let frame = self
                .merger
                .merge(root, None)?
                .ok_or_else(|| DataError::NoValidInput(root.to_path_buf()))?;
            let label = root
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("unknown")
                .to_string();
            dataset.extend_from_frame(frame, &label);
            return Ok(dataset);
        }

        let mut labels: Vec<String> = std::fs::read_dir(root)?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_dir())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .collect();
        labels.sort();

        if labels.is_empty() {
            return Err(DataError::NoLabelDirectories(root.to_path_buf()));
        }

        for label in &labels {
            let recording = root.join(label).join(target);
            let frame = match self.merger.merge(&recording, None)? {
                Some(frame) => frame,
                None => {
                    debug!(label = %label, "recording folder absent, label skipped");
                    continue;
                }
            };

            if !dataset.feature_names.is_empty() && frame.columns != dataset.feature_names {
                return Err(DataError::SchemaMismatch {
                    label: label.clone(),
                    expected: dataset.feature_names.clone(),
                    found: frame.columns,
                });
            }

            info!(label = %label, rows = frame.n_rows(), "merged recording");
            dataset.extend_from_frame(frame, label);
        }

        Ok(dataset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::Path;
    use tempfile::tempdir;

    fn write_file(path: &Path, contents: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        let mut file = std::fs::File::create(path).unwrap();
        write!(file, "{}", contents).unwrap();
    }

    fn write_recording(dir: &Path, base: f64) {
        write_file(
            &dir.join("ACG.csv"),
            &format!(
                "t_unix;x;y;z\n0;{b};{b};{b}\n250;{b};{b};{b}\n500;{b};{b};{b}\n",
                b = base
            ),
        );
        write_file(
            &dir.join("GYRO.csv"),
            &format!(
                "t_unix;x;y;z\n0;{b};{b};{b}\n250;{b};{b};{b}\n500;{b};{b};{b}\n",
                b = base + 0.5
            ),
        );
    }

    fn builder() -> DatasetBuilder {
        DatasetBuilder::new(SensorSchema::default())
    }

    #[test]
    fn test_end_to_end_two_labels() {
        let root = tempdir().unwrap();
        write_recording(&root.path().join("walk").join("target"), 1.0);
        write_recording(&root.path().join("run").join("target"), 2.0);

        let dataset = builder().build(root.path(), "target").unwrap();

        // 6 rows, 6 sensor features + timestamp + label = 8 logical columns
        assert_eq!(dataset.n_samples(), 6);
        assert_eq!(dataset.n_features(), 6);
        assert_eq!(
            dataset.feature_names,
            vec!["acg_x", "acg_y", "acg_z", "gyro_x", "gyro_y", "gyro_z"]
        );
        // sorted label order: run before walk
        assert_eq!(
            dataset.labels,
            vec!["run", "run", "run", "walk", "walk", "walk"]
        );
        assert_eq!(dataset.rows[0], vec![2.0, 2.0, 2.0, 2.5, 2.5, 2.5]);
        assert_eq!(dataset.rows[3], vec![1.0, 1.0, 1.0, 1.5, 1.5, 1.5]);
    }

    #[test]
    fn test_absent_target_folder_skips_label() {
        let root = tempdir().unwrap();
        write_recording(&root.path().join("walk").join("target"), 1.0);
        std::fs::create_dir_all(root.path().join("run")).unwrap();
        // run/ exists but has no target/ recording

        let dataset = builder().build(root.path(), "target").unwrap();
        assert_eq!(dataset.n_samples(), 3);
        assert!(dataset.labels.iter().all(|l| l == "walk"));
    }

    #[test]
    fn test_no_label_directories() {
        let root = tempdir().unwrap();
        write_file(&root.path().join("stray.txt"), "not a label\n");

        assert!(matches!(
            builder().build(root.path(), "target"),
            Err(DataError::NoLabelDirectories(_))
        ));
    }

    #[test]
    fn test_schema_mismatch_across_labels() {
        let root = tempdir().unwrap();
        write_recording(&root.path().join("walk").join("target"), 1.0);
        // run/ is missing its GYRO file, yielding a narrower column set
        write_file(
            &root.path().join("run").join("target").join("ACG.csv"),
            "t_unix;x;y;z\n0;1;1;1\n",
        );

        match builder().build(root.path(), "target") {
            Err(DataError::SchemaMismatch { label, .. }) => assert_eq!(label, "walk"),
            other => panic!("expected SchemaMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_csv_root_is_single_recording() {
        let dir = tempdir().unwrap();
        write_file(
            &dir.path().join("ACG.csv"),
            "t_unix;x;y;z\n0;1.0;2.0;3.0\n250;4.0;5.0;6.0\n",
        );

        let dataset = builder().build(dir.path().join("ACG.csv"), "target").unwrap();
        assert_eq!(dataset.n_samples(), 2);
        assert!(dataset.labels.iter().all(|l| l == "ACG"));
    }

    #[test]
    fn test_csv_root_missing_file() {
        assert!(matches!(
            builder().build(Path::new("/nonexistent/ACG.csv"), "target"),
            Err(DataError::NoValidInput(_))
        ));
    }

    #[test]
    fn test_custom_schema_via_merger() {
        let root = tempdir().unwrap();
        write_file(
            &root.path().join("rest").join("session").join("HR.csv"),
            "ts;bpm\n0;62\n250;63\n",
        );

        let schema = SensorSchema::new(
            "ts",
            [("HR.csv".to_string(), vec!["bpm".to_string()])],
        );
        let builder = DatasetBuilder::with_merger(SensorMerger::new(schema));

        let dataset = builder.build(root.path(), "session").unwrap();
        assert_eq!(dataset.feature_names, vec!["hr_bpm"]);
        assert_eq!(dataset.n_samples(), 2);
        assert_eq!(dataset.labels, vec!["rest", "rest"]);
    }

    #[test]
    fn test_malformed_file_fails_whole_build() {
        let root = tempdir().unwrap();
        write_recording(&root.path().join("walk").join("target"), 1.0);
        write_file(
            &root.path().join("run").join("target").join("ACG.csv"),
            "t_unix;x;y;z\n0;bad;1;1\n",
        );
        write_file(
            &root.path().join("run").join("target").join("GYRO.csv"),
            "t_unix;x;y;z\n0;1;1;1\n",
        );

        assert!(matches!(
            builder().build(root.path(), "target"),
            Err(DataError::BadValue { .. })
        ));
    }
}
