//! Time-alignment of per-sensor streams
//!
//! Combines the sensor CSVs of one recording folder (or a single CSV
//! file) into one synchronized frame via a forward asof join: each row
//! of the running combined stream picks up, from the next sensor, the
//! first sample whose timestamp is at or after its own. Rows that find
//! no forward match for some sensor are dropped at the end.

use std::path::{Path, PathBuf};

use super::error::{DataError, DataResult};
use super::reader::SensorReader;
use super::schema::{has_csv_extension, SensorSchema};
use super::types::SensorFrame;

/// A merge input, resolved once at the call boundary
#[derive(Debug, Clone, PartialEq, Eq)]
enum MergeInput {
    /// One pre-identified sensor CSV file
    SingleFile(PathBuf),
    /// A recording folder with the recognized sensor files found inside,
    /// in schema order
    Folder(Vec<PathBuf>),
}

/// Merges a recording's sensor streams into one synchronized frame
#[derive(Debug, Clone)]
pub struct SensorMerger {
    reader: SensorReader,
}

impl SensorMerger {
    /// Create a merger for the given schema
    pub fn new(schema: SensorSchema) -> Self {
        Self {
            reader: SensorReader::new(schema),
        }
    }

    /// Create a merger around an existing reader (custom delimiter)
    pub fn with_reader(reader: SensorReader) -> Self {
        Self { reader }
    }

    /// The schema this merger validates against
    pub fn schema(&self) -> &SensorSchema {
        self.reader.schema()
    }

    /// Merge the sensor files at `path` into one time-aligned frame
    ///
    /// Returns `Ok(None)` when the path does not exist: absent optional
    /// recordings are a legitimate case during the dataset walk, not an
    /// error. A folder that exists but contains zero recognized sensor
    /// files fails with [`DataError::NoValidInput`].
    ///
    /// When `output` is given, the merged frame is also written there
    /// as CSV before being returned.
    pub fn merge<P: AsRef<Path>>(
        &self,
        path: P,
        output: Option<&Path>,
    ) -> DataResult<Option<SensorFrame>> {
        let path = path.as_ref();

        let input = match self.resolve(path)? {
            Some(input) => input,
            None => return Ok(None),
        };

        let files = match input {
            MergeInput::SingleFile(file) => vec![file],
            MergeInput::Folder(files) => files,
        };

        let mut merged: Option<PartialFrame> = None;
        for file in &files {
            let frame = self.reader.read(file)?;
            merged = Some(match merged {
                Some(base) => base.join_forward(&frame),
                None => PartialFrame::from_frame(frame),
            });
        }

        // resolve() guarantees at least one file
        let frame = merged
            .map(PartialFrame::drop_incomplete)
            .unwrap_or_else(|| SensorFrame::new(Vec::new()));

        if let Some(out) = output {
            frame.write_csv(out, self.schema().timestamp_column())?;
        }

        Ok(Some(frame))
    }

    /// Classify the input path once: missing, single file, or folder
    fn resolve(&self, path: &Path) -> DataResult<Option<MergeInput>> {
        if !path.exists() {
            return Ok(None);
        }

        if has_csv_extension(path) {
            return Ok(Some(MergeInput::SingleFile(path.to_path_buf())));
        }

        // Scan in schema order so merged columns line up deterministically.
        let files: Vec<PathBuf> = self
            .schema()
            .sensor_files()
            .map(|name| path.join(name))
            .filter(|p| p.is_file())
            .collect();

        if files.is_empty() {
            return Err(DataError::NoValidInput(path.to_path_buf()));
        }

        Ok(Some(MergeInput::Folder(files)))
    }
}

/// Combined stream under construction; cells are None until the owning
/// sensor has contributed a forward match
struct PartialFrame {
    columns: Vec<String>,
    timestamps: Vec<i64>,
    rows: Vec<Vec<Option<f64>>>,
}

impl PartialFrame {
    fn from_frame(frame: SensorFrame) -> Self {
        Self {
            columns: frame.columns,
            timestamps: frame.timestamps,
            rows: frame
                .rows
                .into_iter()
                .map(|row| row.into_iter().map(Some).collect())
                .collect(),
        }
    }

    /// Forward asof join: for every timestamp of the combined stream,
    /// attach the first `other` row whose timestamp is >= it
    fn join_forward(mut self, other: &SensorFrame) -> Self {
        let width = other.columns.len();
        self.columns.extend(other.columns.iter().cloned());

        for (row, &ts) in self.rows.iter_mut().zip(self.timestamps.iter()) {
            let idx = other.timestamps.partition_point(|&t| t < ts);
            match other.rows.get(idx) {
                Some(values) => row.extend(values.iter().copied().map(Some)),
                None => row.extend(std::iter::repeat(None).take(width)),
            }
        }

        self
    }

    /// Drop every row with an unfilled cell (the dropna step)
    fn drop_incomplete(self) -> SensorFrame {
        let mut frame = SensorFrame::new(self.columns);
        for (ts, row) in self.timestamps.into_iter().zip(self.rows) {
            if row.iter().all(Option::is_some) {
                frame.timestamps.push(ts);
                frame.rows.push(row.into_iter().flatten().collect());
            }
        }
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    fn write_file(dir: &Path, name: &str, contents: &str) {
        let mut file = std::fs::File::create(dir.join(name)).unwrap();
        write!(file, "{}", contents).unwrap();
    }

    fn merger() -> SensorMerger {
        SensorMerger::new(SensorSchema::default())
    }

    #[test]
    fn test_missing_path_is_no_data() {
        let result = merger().merge(Path::new("/nonexistent/recording"), None);
        assert!(matches!(result, Ok(None)));
    }

    #[test]
    fn test_empty_folder_is_an_error() {
        let dir = tempdir().unwrap();
        write_file(dir.path(), "notes.txt", "not a sensor\n");

        assert!(matches!(
            merger().merge(dir.path(), None),
            Err(DataError::NoValidInput(_))
        ));
    }

    #[test]
    fn test_single_file_mode() {
        let dir = tempdir().unwrap();
        write_file(
            dir.path(),
            "ACG.csv",
            "t_unix;x;y;z\n0;1.0;2.0;3.0\n250;4.0;5.0;6.0\n",
        );

        let frame = merger()
            .merge(dir.path().join("ACG.csv"), None)
            .unwrap()
            .unwrap();
        assert_eq!(frame.columns, vec!["acg_x", "acg_y", "acg_z"]);
        assert_eq!(frame.n_rows(), 2);
    }

    #[test]
    fn test_single_file_still_validated() {
        let dir = tempdir().unwrap();
        write_file(dir.path(), "MAG.csv", "t_unix;x\n0;1.0\n");

        assert!(matches!(
            merger().merge(dir.path().join("MAG.csv"), None),
            Err(DataError::UnknownSensor(_))
        ));
    }

    #[test]
    fn test_identical_timestamps_keep_all_rows() {
        let dir = tempdir().unwrap();
        write_file(
            dir.path(),
            "ACG.csv",
            "t_unix;x;y;z\n0;1;1;1\n250;2;2;2\n500;3;3;3\n",
        );
        write_file(
            dir.path(),
            "GYRO.csv",
            "t_unix;x;y;z\n0;10;10;10\n250;20;20;20\n500;30;30;30\n",
        );

        let frame = merger().merge(dir.path(), None).unwrap().unwrap();
        assert_eq!(frame.n_rows(), 3);
        assert_eq!(
            frame.columns,
            vec!["acg_x", "acg_y", "acg_z", "gyro_x", "gyro_y", "gyro_z"]
        );
        assert_eq!(frame.rows[1], vec![2.0, 2.0, 2.0, 20.0, 20.0, 20.0]);
    }

    #[test]
    fn test_forward_join_picks_next_sample() {
        let dir = tempdir().unwrap();
        // GYRO samples fall between ACG samples; forward join takes the
        // first GYRO row at-or-after each ACG timestamp.
        write_file(dir.path(), "ACG.csv", "t_unix;x;y;z\n0;1;1;1\n250;2;2;2\n");
        write_file(
            dir.path(),
            "GYRO.csv",
            "t_unix;x;y;z\n100;10;10;10\n300;30;30;30\n",
        );

        let frame = merger().merge(dir.path(), None).unwrap().unwrap();
        assert_eq!(frame.n_rows(), 2);
        assert_eq!(frame.rows[0], vec![1.0, 1.0, 1.0, 10.0, 10.0, 10.0]);
        assert_eq!(frame.rows[1], vec![2.0, 2.0, 2.0, 30.0, 30.0, 30.0]);
    }

    #[test]
    fn test_trailing_gap_rows_are_dropped() {
        let dir = tempdir().unwrap();
        // GYRO stops recording after 250ms; later ACG rows have no
        // forward match and must be dropped.
        write_file(
            dir.path(),
            "ACG.csv",
            "t_unix;x;y;z\n0;1;1;1\n250;2;2;2\n500;3;3;3\n750;4;4;4\n",
        );
        write_file(dir.path(), "GYRO.csv", "t_unix;x;y;z\n0;10;10;10\n250;20;20;20\n");

        let frame = merger().merge(dir.path(), None).unwrap().unwrap();
        assert_eq!(frame.n_rows(), 2);
        assert_eq!(frame.timestamps, vec![0, 250]);
    }

    #[test]
    fn test_late_second_sensor_keeps_early_rows() {
        let dir = tempdir().unwrap();
        // GYRO starts late; under forward semantics the early ACG rows
        // all match GYRO's first sample and survive.
        write_file(
            dir.path(),
            "ACG.csv",
            "t_unix;x;y;z\n0;1;1;1\n250;2;2;2\n500;3;3;3\n",
        );
        write_file(dir.path(), "GYRO.csv", "t_unix;x;y;z\n400;40;40;40\n500;50;50;50\n");

        let frame = merger().merge(dir.path(), None).unwrap().unwrap();
        assert_eq!(frame.n_rows(), 3);
        assert_eq!(frame.rows[0], vec![1.0, 1.0, 1.0, 40.0, 40.0, 40.0]);
        assert_eq!(frame.rows[2], vec![3.0, 3.0, 3.0, 50.0, 50.0, 50.0]);
    }

    #[test]
    fn test_custom_delimiter_via_reader() {
        let dir = tempdir().unwrap();
        write_file(dir.path(), "ACG.csv", "t_unix,x,y,z\n0,1,1,1\n");
        write_file(dir.path(), "GYRO.csv", "t_unix,x,y,z\n0,2,2,2\n");

        let reader = SensorReader::new(SensorSchema::default()).with_delimiter(b',');
        let frame = SensorMerger::with_reader(reader)
            .merge(dir.path(), None)
            .unwrap()
            .unwrap();
        assert_eq!(frame.n_rows(), 1);
        assert_eq!(frame.rows[0], vec![1.0, 1.0, 1.0, 2.0, 2.0, 2.0]);
    }

    #[test]
    fn test_output_is_written() {
        let dir = tempdir().unwrap();
        write_file(dir.path(), "ACG.csv", "t_unix;x;y;z\n0;1.5;2.5;3.5\n");
        write_file(dir.path(), "GYRO.csv", "t_unix;x;y;z\n0;4.5;5.5;6.5\n");

        let out = dir.path().join("merged.csv");
        let frame = merger().merge(dir.path(), Some(&out)).unwrap().unwrap();
        assert_eq!(frame.n_rows(), 1);

        let written = std::fs::read_to_string(&out).unwrap();
        let mut lines = written.lines();
        assert_eq!(
            lines.next().unwrap(),
            "t_unix,acg_x,acg_y,acg_z,gyro_x,gyro_y,gyro_z"
        );
        assert_eq!(lines.next().unwrap(), "0,1.5,2.5,3.5,4.5,5.5,6.5");
    }
}
