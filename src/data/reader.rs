//! Per-sensor CSV reading with schema validation
//!
//! Reads exactly the timestamp column plus the schema-declared value
//! columns of a recognized sensor file; every other column in the file
//! is ignored.

use std::fs::File;
use std::path::Path;

use csv::ReaderBuilder;

use super::error::{DataError, DataResult};
use super::schema::{has_csv_extension, SensorSchema};
use super::types::SensorFrame;

/// Default column delimiter used by the recording app
pub const DEFAULT_DELIMITER: u8 = b';';

/// Reads one sensor CSV file into a [`SensorFrame`]
#[derive(Debug, Clone)]
pub struct SensorReader {
    schema: SensorSchema,
    delimiter: u8,
}

impl SensorReader {
    /// Create a reader for the given schema
    pub fn new(schema: SensorSchema) -> Self {
        Self {
            schema,
            delimiter: DEFAULT_DELIMITER,
        }
    }

    /// Override the column delimiter
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// The schema this reader validates against
    pub fn schema(&self) -> &SensorSchema {
        &self.schema
    }

    /// Read one recognized sensor file
    ///
    /// Fails with [`DataError::InvalidFormat`] when the path is not
    /// `.csv`-suffixed and [`DataError::UnknownSensor`] when its file
    /// name is not declared in the schema. Rows are returned sorted by
    /// timestamp.
    pub fn read<P: AsRef<Path>>(&self, path: P) -> DataResult<SensorFrame> {
        let path = path.as_ref();

        if !has_csv_extension(path) {
            return Err(DataError::InvalidFormat(path.to_path_buf()));
        }

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| DataError::InvalidFormat(path.to_path_buf()))?;

        let declared = self
            .schema
            .columns(file_name)
            .ok_or_else(|| DataError::UnknownSensor(path.to_path_buf()))?;

        let file = File::open(path)?;
        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .from_reader(file);

        let headers = reader.headers()?.clone();
        let find_column = |name: &str| -> DataResult<usize> {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| DataError::MissingColumn {
                    file: path.to_path_buf(),
                    column: name.to_string(),
                })
        };

        let timestamp_idx = find_column(self.schema.timestamp_column())?;
        let value_indices: Vec<usize> = declared
            .iter()
            .map(|c| find_column(c))
            .collect::<DataResult<_>>()?;

        let columns = self
            .schema
            .qualified_columns(file_name)
            .unwrap_or_else(|| declared.to_vec());
        let mut frame = SensorFrame::new(columns);

        for (record_idx, result) in reader.records().enumerate() {
            let record = result?;

            let parse = |idx: usize, column: &str| -> DataResult<f64> {
                let raw = record.get(idx).unwrap_or("");
                raw.trim()
                    .parse::<f64>()
                    .map_err(|_| DataError::BadValue {
                        file: path.to_path_buf(),
                        record: record_idx + 1,
                        column: column.to_string(),
                        value: raw.to_string(),
                    })
            };

            let raw_ts = record.get(timestamp_idx).unwrap_or("");
            let timestamp =
                raw_ts
                    .trim()
                    .parse::<i64>()
                    .map_err(|_| DataError::BadValue {
                        file: path.to_path_buf(),
                        record: record_idx + 1,
                        column: self.schema.timestamp_column().to_string(),
                        value: raw_ts.to_string(),
                    })?;

            let mut row = Vec::with_capacity(value_indices.len());
            for (&idx, column) in value_indices.iter().zip(declared.iter()) {
                row.push(parse(idx, column)?);
            }

            frame.timestamps.push(timestamp);
            frame.rows.push(row);
        }

        frame.sort_by_timestamp();
        Ok(frame)
    }
}
