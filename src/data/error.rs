//! Data pipeline error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading, merging, or assembling sensor data
#[derive(Error, Debug)]
pub enum DataError {
    #[error("not a CSV file: {0}")]
    InvalidFormat(PathBuf),

    #[error("not a recognized sensor file: {0}")]
    UnknownSensor(PathBuf),

    #[error("column '{column}' not found in {file}")]
    MissingColumn { file: PathBuf, column: String },

    #[error("invalid value '{value}' for column '{column}' in {file} (record {record})")]
    BadValue {
        file: PathBuf,
        record: usize,
        column: String,
        value: String,
    },

    #[error("no recognized sensor files found in {0}")]
    NoValidInput(PathBuf),

    #[error("no label directories found in {0}")]
    NoLabelDirectories(PathBuf),

    #[error("label '{label}' produced columns {found:?}, expected {expected:?}")]
    SchemaMismatch {
        label: String,
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("schema file error: {0}")]
    SchemaFile(#[from] serde_json::Error),
}

/// Result type alias for data pipeline operations
pub type DataResult<T> = Result<T, DataError>;
