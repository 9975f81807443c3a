//! Environment variable handling and .env file management

use crate::error::{AppError, Result};
use crate::types::PingMode;
use std::path::Path;

/// Environment variable configuration manager
pub struct EnvManager;

impl EnvManager {
    /// Load .env file if it exists
    pub fn load_env_file(debug: bool) -> Result<()> {
        if Path::new(".env").exists() {
            dotenv::from_filename(".env")
                .map_err(|e| AppError::config(format!("Failed to load .env file: {}", e)))?;

            if debug {
                eprintln!("Loaded configuration from .env file");
            }
        } else if debug {
            eprintln!("No .env file found, using defaults and CLI arguments");
        }

        Ok(())
    }

    /// Host name of this machine, used as the default device identity.
    ///
    /// Falls back to `localhost` when the name cannot be read or is not
    /// valid UTF-8.
    pub fn system_hostname() -> String {
        hostname::get()
            .ok()
            .and_then(|h| h.into_string().ok())
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty())
            .unwrap_or_else(|| "localhost".to_string())
    }

    /// Create example .env file content
    pub fn create_example_env_content() -> String {
        r#"# speedlog configuration
#
# Values here act as defaults and can be overridden by command-line
# arguments.

# Directory holding one log folder per device
# DATA_DIR=speedtest_logs

# Device identity; defaults to the host name
# DEVICE_NAME=living-room-pc

# How ping and jitter are derived: probe or endpoint
# PING_MODE=probe

# Latency probe target (host or host:port)
# PING_HOST=8.8.8.8:53

# Number of latency probes per test (1-100)
# PING_COUNT=10

# Timeout of a single latency probe in seconds (1-60)
# PING_TIMEOUT_SECONDS=2

# Timeout of each speed test request in seconds (1-300)
# TIMEOUT_SECONDS=30

# Candidate speed test servers (comma-separated)
# SPEEDTEST_SERVERS=https://speed.cloudflare.com

# Transfer sizes in bytes
# DOWNLOAD_BYTES=25000000
# UPLOAD_BYTES=10000000

# Rows shown in the history table (1-1000)
# HISTORY_ROWS=10

# Enable colored output (true/false)
# ENABLE_COLOR=true
"#
        .to_string()
    }

    /// Save example .env file to disk
    pub fn save_example_env_file(path: &Path) -> Result<()> {
        let content = Self::create_example_env_content();
        std::fs::write(path, content)
            .map_err(|e| AppError::config(format!("Failed to write example .env file: {}", e)))?;

        Ok(())
    }

    /// Validate environment variable format before parsing
    pub fn validate_env_var(key: &str, value: &str) -> Result<()> {
        match key {
            "SPEEDTEST_SERVERS" => {
                for server in value.split(',') {
                    let server = server.trim();
                    if !server.is_empty() {
                        url::Url::parse(server).map_err(|e| {
                            AppError::config(format!("Invalid SPEEDTEST_SERVERS entry '{}': {}", server, e))
                        })?;
                    }
                }
            }
            "PING_MODE" => {
                value
                    .parse::<PingMode>()
                    .map_err(|e| AppError::config(format!("Invalid PING_MODE value '{}': {}", value, e)))?;
            }
            "PING_COUNT" => Self::validate_range(key, value, 1, 100)?,
            "PING_TIMEOUT_SECONDS" => Self::validate_range(key, value, 1, 60)?,
            "TIMEOUT_SECONDS" => Self::validate_range(key, value, 1, 300)?,
            "HISTORY_ROWS" => Self::validate_range(key, value, 1, 1000)?,
            "DOWNLOAD_BYTES" | "UPLOAD_BYTES" => {
                Self::validate_range(key, value, 1, crate::defaults::MAX_TRANSFER_BYTES)?
            }
            "DATA_DIR" | "DEVICE_NAME" | "PING_HOST" => {
                if value.trim().is_empty() {
                    return Err(AppError::config(format!("{} cannot be empty", key)));
                }
            }
            "ENABLE_COLOR" => {
                value
                    .parse::<bool>()
                    .map_err(|e| AppError::config(format!("Invalid ENABLE_COLOR value '{}': {}", value, e)))?;
            }
            _ => {
                // Unknown environment variable, ignore
            }
        }

        Ok(())
    }

    fn validate_range(key: &str, value: &str, min: u64, max: u64) -> Result<()> {
        let parsed: u64 = value
            .trim()
            .parse()
            .map_err(|e| AppError::config(format!("Invalid {} value '{}': {}", key, value, e)))?;
        if parsed < min || parsed > max {
            return Err(AppError::config(format!(
                "{} must be between {} and {}, got: {}",
                key, min, max, parsed
            )));
        }
        Ok(())
    }

    /// Get list of all supported environment variables with descriptions
    pub fn get_supported_env_vars() -> Vec<(&'static str, &'static str, &'static str)> {
        vec![
            ("DATA_DIR", "Directory holding per-device logs", "speedtest_logs"),
            ("DEVICE_NAME", "Device identity (defaults to host name)", "living-room-pc"),
            ("PING_MODE", "Ping policy: probe or endpoint", "probe"),
            ("PING_HOST", "Latency probe target", "8.8.8.8:53"),
            ("PING_COUNT", "Latency probes per test (1-100)", "10"),
            ("PING_TIMEOUT_SECONDS", "Per-probe timeout in seconds (1-60)", "2"),
            ("TIMEOUT_SECONDS", "Request timeout in seconds (1-300)", "30"),
            ("SPEEDTEST_SERVERS", "Comma-separated speed test servers", "https://speed.cloudflare.com"),
            ("DOWNLOAD_BYTES", "Download payload size in bytes", "25000000"),
            ("UPLOAD_BYTES", "Upload payload size in bytes", "10000000"),
            ("HISTORY_ROWS", "Rows shown in the history table (1-1000)", "10"),
            ("ENABLE_COLOR", "Enable colored output", "true"),
        ]
    }

    /// Display environment variable help
    pub fn display_env_help() -> String {
        let mut help = String::new();
        help.push_str("Supported Environment Variables:\n\n");

        for (var, description, example) in Self::get_supported_env_vars() {
            help.push_str(&format!("  {:<22} {}\n", var, description));
            help.push_str(&format!("  {:<22} Example: {}\n\n", "", example));
        }

        help.push_str("Configuration Priority (highest to lowest):\n");
        help.push_str("  1. Command-line arguments\n");
        help.push_str("  2. Environment variables\n");
        help.push_str("  3. .env file values\n");
        help.push_str("  4. Default values\n");

        help
    }

    /// Validate all currently set environment variables
    pub fn validate_current_env() -> Vec<String> {
        Self::get_supported_env_vars()
            .into_iter()
            .filter_map(|(var_name, _, _)| {
                let value = std::env::var(var_name).ok()?;
                Self::validate_env_var(var_name, &value)
                    .err()
                    .map(|e| format!("Warning: {}", e))
            })
            .collect()
    }
}
