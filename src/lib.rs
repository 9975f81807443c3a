//! speedlog
//!
//! A personal internet speed test dashboard: runs a download/upload/latency
//! measurement against a speed test server, appends the result to a
//! per-device log and shows the recent history with a throughput chart.

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod measure;
pub mod models;
pub mod output;
pub mod stats;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use error::{AppError, Result};
pub use measure::{MeasurementAdapter, SpeedTestProvider, LatencyProber};
pub use models::{Config, Measurement, MeasurementRecord};
pub use store::LogStore;
pub use stats::{LatencySummary, HistorySummary, ChartSeries};

/// Application version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const PKG_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
pub const BUILD_TIME: &str = env!("BUILD_TIME");
pub const GIT_COMMIT: &str = env!("GIT_COMMIT");

/// Default configuration values
pub mod defaults {
    use std::time::Duration;

    pub const DEFAULT_DATA_DIR: &str = "speedtest_logs";
    pub const DEFAULT_PING_HOST: &str = "8.8.8.8:53";
    pub const DEFAULT_PING_PORT: u16 = 443;
    pub const DEFAULT_PING_COUNT: u32 = 10;
    pub const DEFAULT_PING_TIMEOUT: Duration = Duration::from_secs(2);
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
    pub const DEFAULT_SERVERS: &[&str] = &["https://speed.cloudflare.com"];
    pub const DEFAULT_DOWNLOAD_BYTES: u64 = 25_000_000;
    pub const DEFAULT_UPLOAD_BYTES: u64 = 10_000_000;
    pub const MAX_TRANSFER_BYTES: u64 = 1_000_000_000;
    pub const DEFAULT_HISTORY_ROWS: usize = 10;
    pub const DEFAULT_ENABLE_COLOR: bool = true;
    pub const LOG_FILE_NAME: &str = "speedtest_log.csv";
    pub const USER_AGENT: &str = concat!("speedlog/", env!("CARGO_PKG_VERSION"));
}
