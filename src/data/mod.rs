//! Sensor data ingestion and alignment

pub mod dataset;
pub mod error;
pub mod merge;
pub mod reader;
pub mod schema;
pub mod types;

pub use dataset::DatasetBuilder;
pub use error::{DataError, DataResult};
pub use merge::SensorMerger;
pub use reader::SensorReader;
pub use schema::SensorSchema;
pub use types::{LabeledDataset, SensorFrame};
