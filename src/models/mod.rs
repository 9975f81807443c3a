//! Data models and structures for speedlog

pub mod config;
pub mod record;

// Re-export main model types
pub use config::Config;
pub use record::{Measurement, MeasurementRecord, round2, TIMESTAMP_FORMAT};
