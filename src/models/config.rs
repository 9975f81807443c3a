//! Configuration data model and validation

use crate::types::{AppError, PingMode, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding one sub-directory per device identity
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Explicit device identity; the hostname is used when absent
    #[serde(default)]
    pub device: Option<String>,

    /// How ping and jitter are derived
    #[serde(default)]
    pub ping_mode: PingMode,

    /// Probe target for round-trip latency (`host` or `host:port`)
    #[serde(default = "default_ping_host")]
    pub ping_host: String,

    /// Number of latency probes per test
    #[serde(default = "default_ping_count")]
    pub ping_count: u32,

    /// Timeout of a single latency probe
    #[serde(default = "default_ping_timeout_secs")]
    pub ping_timeout_seconds: u64,

    /// Timeout of each speed test request
    #[serde(default = "default_timeout_secs")]
    pub timeout_seconds: u64,

    /// Candidate speed test servers
    #[serde(default = "default_servers")]
    pub servers: Vec<String>,

    /// Payload size requested for the download test
    #[serde(default = "default_download_bytes")]
    pub download_bytes: u64,

    /// Payload size sent for the upload test
    #[serde(default = "default_upload_bytes")]
    pub upload_bytes: u64,

    /// Number of most recent rows shown in the history table
    #[serde(default = "default_history_rows")]
    pub history_rows: usize,

    /// Enable colored terminal output
    #[serde(default = "default_enable_color")]
    pub enable_color: bool,

    /// Enable verbose output
    #[serde(default)]
    pub verbose: bool,

    /// Enable debug output
    #[serde(default)]
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            device: None,
            ping_mode: PingMode::default(),
            ping_host: default_ping_host(),
            ping_count: default_ping_count(),
            ping_timeout_seconds: default_ping_timeout_secs(),
            timeout_seconds: default_timeout_secs(),
            servers: default_servers(),
            download_bytes: default_download_bytes(),
            upload_bytes: default_upload_bytes(),
            history_rows: default_history_rows(),
            enable_color: default_enable_color(),
            verbose: false,
            debug: false,
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Get request timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Get probe timeout as Duration
    pub fn ping_timeout(&self) -> Duration {
        Duration::from_secs(self.ping_timeout_seconds)
    }

    /// Device identity partitioning the measurement log
    pub fn identity(&self) -> String {
        let raw = match self.device.as_deref().map(str::trim) {
            Some(device) if !device.is_empty() => device.to_string(),
            _ => crate::config::EnvManager::system_hostname(),
        };
        crate::store::sanitize_identity(&raw)
    }

    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Result<()> {
        if self.servers.is_empty() {
            return Err(AppError::config("At least one speed test server is required"));
        }

        for server in &self.servers {
            if server.is_empty() {
                return Err(AppError::config("Speed test server URL cannot be empty"));
            }

            match url::Url::parse(server) {
                Ok(parsed) => {
                    if parsed.scheme() != "http" && parsed.scheme() != "https" {
                        return Err(AppError::config(format!("Speed test server must use http or https: {}", server)));
                    }
                    if parsed.host_str().is_none() {
                        return Err(AppError::config(format!("Speed test server has no host: {}", server)));
                    }
                }
                Err(e) => {
                    return Err(AppError::config(format!("Invalid speed test server URL '{}': {}", server, e)));
                }
            }
        }

        if self.ping_host.trim().is_empty() {
            return Err(AppError::config("Ping host cannot be empty"));
        }

        if let Some(device) = &self.device {
            if device.trim().is_empty() {
                return Err(AppError::config("Device name cannot be empty"));
            }
        }

        if self.ping_count == 0 || self.ping_count > 100 {
            return Err(AppError::config("Ping count must be between 1 and 100"));
        }

        if self.ping_timeout_seconds == 0 || self.ping_timeout_seconds > 60 {
            return Err(AppError::config("Ping timeout must be between 1 and 60 seconds"));
        }

        if self.timeout_seconds == 0 {
            return Err(AppError::config("Timeout must be greater than 0"));
        }

        if self.timeout_seconds > 300 {
            return Err(AppError::config("Timeout cannot exceed 300 seconds"));
        }

        if self.download_bytes == 0 || self.download_bytes > crate::defaults::MAX_TRANSFER_BYTES {
            return Err(AppError::config(format!(
                "Download size must be between 1 and {} bytes",
                crate::defaults::MAX_TRANSFER_BYTES
            )));
        }

        if self.upload_bytes == 0 || self.upload_bytes > crate::defaults::MAX_TRANSFER_BYTES {
            return Err(AppError::config(format!(
                "Upload size must be between 1 and {} bytes",
                crate::defaults::MAX_TRANSFER_BYTES
            )));
        }

        if self.history_rows == 0 || self.history_rows > 1000 {
            return Err(AppError::config("History rows must be between 1 and 1000"));
        }

        Ok(())
    }

    /// Merge environment variables into this configuration
    pub fn merge_from_env(&mut self) -> Result<()> {
        if let Ok(data_dir) = std::env::var("DATA_DIR") {
            if !data_dir.trim().is_empty() {
                self.data_dir = PathBuf::from(data_dir.trim());
            }
        }

        if let Ok(device) = std::env::var("DEVICE_NAME") {
            if !device.trim().is_empty() {
                self.device = Some(device.trim().to_string());
            }
        }

        if let Ok(ping_mode) = std::env::var("PING_MODE") {
            self.ping_mode = ping_mode.parse()
                .map_err(|e| AppError::config(format!("Invalid PING_MODE value '{}': {}", ping_mode, e)))?;
        }

        if let Ok(ping_host) = std::env::var("PING_HOST") {
            self.ping_host = ping_host.trim().to_string();
        }

        if let Ok(ping_count) = std::env::var("PING_COUNT") {
            self.ping_count = ping_count.parse()
                .map_err(|e| AppError::config(format!("Invalid PING_COUNT value '{}': {}", ping_count, e)))?;
        }

        if let Ok(ping_timeout) = std::env::var("PING_TIMEOUT_SECONDS") {
            self.ping_timeout_seconds = ping_timeout.parse()
                .map_err(|e| AppError::config(format!("Invalid PING_TIMEOUT_SECONDS value '{}': {}", ping_timeout, e)))?;
        }

        if let Ok(timeout) = std::env::var("TIMEOUT_SECONDS") {
            self.timeout_seconds = timeout.parse()
                .map_err(|e| AppError::config(format!("Invalid TIMEOUT_SECONDS value '{}': {}", timeout, e)))?;
        }

        if let Ok(servers) = std::env::var("SPEEDTEST_SERVERS") {
            self.servers = servers
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        if let Ok(download_bytes) = std::env::var("DOWNLOAD_BYTES") {
            self.download_bytes = download_bytes.parse()
                .map_err(|e| AppError::config(format!("Invalid DOWNLOAD_BYTES value '{}': {}", download_bytes, e)))?;
        }

        if let Ok(upload_bytes) = std::env::var("UPLOAD_BYTES") {
            self.upload_bytes = upload_bytes.parse()
                .map_err(|e| AppError::config(format!("Invalid UPLOAD_BYTES value '{}': {}", upload_bytes, e)))?;
        }

        if let Ok(history_rows) = std::env::var("HISTORY_ROWS") {
            self.history_rows = history_rows.parse()
                .map_err(|e| AppError::config(format!("Invalid HISTORY_ROWS value '{}': {}", history_rows, e)))?;
        }

        if let Ok(enable_color) = std::env::var("ENABLE_COLOR") {
            self.enable_color = enable_color.parse()
                .map_err(|e| AppError::config(format!("Invalid ENABLE_COLOR value '{}': {}", enable_color, e)))?;
        }

        Ok(())
    }
}

// Default value functions for serde
fn default_data_dir() -> PathBuf {
    PathBuf::from(crate::defaults::DEFAULT_DATA_DIR)
}

fn default_ping_host() -> String {
    crate::defaults::DEFAULT_PING_HOST.to_string()
}

fn default_ping_count() -> u32 {
    crate::defaults::DEFAULT_PING_COUNT
}

fn default_ping_timeout_secs() -> u64 {
    crate::defaults::DEFAULT_PING_TIMEOUT.as_secs()
}

fn default_timeout_secs() -> u64 {
    crate::defaults::DEFAULT_TIMEOUT.as_secs()
}

fn default_servers() -> Vec<String> {
    crate::defaults::DEFAULT_SERVERS
        .iter()
        .map(|&s| s.to_string())
        .collect()
}

fn default_download_bytes() -> u64 {
    crate::defaults::DEFAULT_DOWNLOAD_BYTES
}

fn default_upload_bytes() -> u64 {
    crate::defaults::DEFAULT_UPLOAD_BYTES
}

fn default_history_rows() -> usize {
    crate::defaults::DEFAULT_HISTORY_ROWS
}

fn default_enable_color() -> bool {
    crate::defaults::DEFAULT_ENABLE_COLOR
}
