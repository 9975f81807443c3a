//! Measurement results and the persisted log record

use crate::types::Endpoint;
use chrono::{Local, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// Timestamp layout used in the log table and in displays
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Round to two decimal places, the precision every metric is reported at
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Outcome of a successful speed test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// Download throughput in Mbps
    pub download_mbps: f64,

    /// Upload throughput in Mbps
    pub upload_mbps: f64,

    /// Round-trip latency in milliseconds, if any sample was obtained
    pub ping_ms: Option<f64>,

    /// Sample standard deviation of the latency samples in milliseconds
    pub jitter_ms: Option<f64>,

    /// Server the throughput was measured against
    pub endpoint: Endpoint,
}

impl Measurement {
    /// Build the log record for this measurement, stamped with `timestamp`
    pub fn to_record(&self, timestamp: NaiveDateTime) -> MeasurementRecord {
        MeasurementRecord::new(
            timestamp,
            Some(self.download_mbps),
            Some(self.upload_mbps),
            self.ping_ms,
            self.jitter_ms,
        )
    }

    /// Build the log record stamped with the current local time
    pub fn to_record_now(&self) -> MeasurementRecord {
        self.to_record(Local::now().naive_local())
    }
}

/// One row of a device's measurement log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRecord {
    /// When the test completed (local time, second precision)
    pub timestamp: NaiveDateTime,

    pub download_mbps: Option<f64>,

    pub upload_mbps: Option<f64>,

    pub ping_ms: Option<f64>,

    pub jitter_ms: Option<f64>,
}

impl MeasurementRecord {
    /// Create a record; the timestamp is truncated to whole seconds to match the table format
    pub fn new(
        timestamp: NaiveDateTime,
        download_mbps: Option<f64>,
        upload_mbps: Option<f64>,
        ping_ms: Option<f64>,
        jitter_ms: Option<f64>,
    ) -> Self {
        Self {
            timestamp: timestamp.with_nanosecond(0).unwrap_or(timestamp),
            download_mbps,
            upload_mbps,
            ping_ms,
            jitter_ms,
        }
    }

    /// Timestamp rendered in the table format
    pub fn formatted_timestamp(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }
}
