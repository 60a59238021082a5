//! Sensor schema configuration
//!
//! A [`SensorSchema`] declares which CSV files in a recording folder are
//! recognized sensors and which value columns each of them contributes.
//! It is an immutable value handed to the reader/merger/builder at
//! construction, so several schemas can coexist (tests use small ad-hoc
//! ones, the binary uses [`SensorSchema::default`] or a JSON file).

use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::DataResult;

/// Declared mapping of sensor file names to their value columns
///
/// Iteration order over sensors is the BTreeMap key order, which fixes
/// the left-to-right column order of merged frames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorSchema {
    /// Name of the timestamp column shared by every sensor file
    timestamp_column: String,
    /// Sensor file name -> ordered value column names
    sensors: BTreeMap<String, Vec<String>>,
}

impl Default for SensorSchema {
    /// The accelerometer + gyroscope schema used by the recording app
    fn default() -> Self {
        let mut sensors = BTreeMap::new();
        sensors.insert(
            "ACG.csv".to_string(),
            vec!["x".to_string(), "y".to_string(), "z".to_string()],
        );
        sensors.insert(
            "GYRO.csv".to_string(),
            vec!["x".to_string(), "y".to_string(), "z".to_string()],
        );
        Self {
            timestamp_column: "t_unix".to_string(),
            sensors,
        }
    }
}

impl SensorSchema {
    /// Create a schema from explicit sensor declarations
    pub fn new<S: Into<String>>(
        timestamp_column: S,
        sensors: impl IntoIterator<Item = (String, Vec<String>)>,
    ) -> Self {
        Self {
            timestamp_column: timestamp_column.into(),
            sensors: sensors.into_iter().collect(),
        }
    }

    /// Load a schema from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> DataResult<Self> {
        let file = File::open(path.as_ref())?;
        let schema = serde_json::from_reader(file)?;
        Ok(schema)
    }

    /// Name of the timestamp column
    pub fn timestamp_column(&self) -> &str {
        &self.timestamp_column
    }

    /// Whether `file_name` is a declared sensor file
    pub fn is_recognized(&self, file_name: &str) -> bool {
        self.sensors.contains_key(file_name)
    }

    /// Declared value columns of a sensor file, if recognized
    pub fn columns(&self, file_name: &str) -> Option<&[String]> {
        self.sensors.get(file_name).map(|c| c.as_slice())
    }

    /// Declared sensor file names, in schema order
    pub fn sensor_files(&self) -> impl Iterator<Item = &str> {
        self.sensors.keys().map(|k| k.as_str())
    }

    /// Number of declared sensors
    pub fn n_sensors(&self) -> usize {
        self.sensors.len()
    }

    /// Output column names for a sensor, qualified with its file stem
    /// ("ACG.csv" with columns x,y,z becomes acg_x, acg_y, acg_z)
    ///
    /// Qualification keeps columns of different sensors from colliding
    /// once they are merged into one frame.
    pub fn qualified_columns(&self, file_name: &str) -> Option<Vec<String>> {
        let stem = Path::new(file_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(file_name)
            .to_ascii_lowercase();
        self.sensors
            .get(file_name)
            .map(|cols| cols.iter().map(|c| format!("{}_{}", stem, c)).collect())
    }
}

/// Whether a path carries the `.csv` extension
pub fn has_csv_extension(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("csv")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::Path;
    use tempfile::tempdir;

    #[test]
    fn test_default_schema() {
        let schema = SensorSchema::default();
        assert_eq!(schema.timestamp_column(), "t_unix");
        assert!(schema.is_recognized("ACG.csv"));
        assert!(schema.is_recognized("GYRO.csv"));
        assert!(!schema.is_recognized("MAG.csv"));
        assert_eq!(
            schema.columns("ACG.csv").unwrap(),
            &["x".to_string(), "y".to_string(), "z".to_string()]
        );
    }

    #[test]
    fn test_sensor_order_is_stable() {
        let schema = SensorSchema::default();
        let files: Vec<&str> = schema.sensor_files().collect();
        assert_eq!(files, vec!["ACG.csv", "GYRO.csv"]);
    }

    #[test]
    fn test_qualified_columns() {
        let schema = SensorSchema::default();
        assert_eq!(
            schema.qualified_columns("GYRO.csv").unwrap(),
            vec!["gyro_x", "gyro_y", "gyro_z"]
        );
        assert!(schema.qualified_columns("MAG.csv").is_none());
    }

    #[test]
    fn test_custom_schema() {
        let schema = SensorSchema::new(
            "ts",
            [("HR.csv".to_string(), vec!["bpm".to_string()])],
        );
        assert_eq!(schema.timestamp_column(), "ts");
        assert_eq!(schema.n_sensors(), 1);
        assert_eq!(schema.qualified_columns("HR.csv").unwrap(), vec!["hr_bpm"]);
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("schema.json");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(
            file,
            r#"{{"timestamp_column":"t","sensors":{{"MAG.csv":["mx","my"]}}}}"#
        )
        .unwrap();

        let schema = SensorSchema::from_json_file(&path).unwrap();
        assert_eq!(schema.timestamp_column(), "t");
        assert!(schema.is_recognized("MAG.csv"));
        assert_eq!(schema.qualified_columns("MAG.csv").unwrap(), vec!["mag_mx", "mag_my"]);
    }

    #[test]
    fn test_csv_extension() {
        assert!(has_csv_extension(Path::new("/tmp/ACG.csv")));
        assert!(!has_csv_extension(Path::new("/tmp/ACG.txt")));
        assert!(!has_csv_extension(Path::new("/tmp/folder")));
    }
}
