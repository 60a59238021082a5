//! # Motion ML - Activity Classification from Multi-Sensor Recordings
//!
//! This library ingests per-sensor CSV recordings (accelerometer,
//! gyroscope), aligns them onto a common timeline, and assembles a
//! labeled feature table for supervised classification:
//!
//! - Schema-validated per-sensor CSV parsing
//! - Forward asof merging of sensor streams per recording
//! - Directory walk turning label folders into one labeled dataset
//! - KNN and random-forest classifiers with grid search and metrics

pub mod data;
pub mod ml;

pub use data::{
    DataError, DatasetBuilder, LabeledDataset, SensorFrame, SensorMerger, SensorReader,
    SensorSchema,
};
pub use ml::{Classifier, KnnClassifier, Metrics, RandomForest};
