//! Type definitions and aliases

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// Re-export commonly used types
pub use crate::error::{AppError, Result};

/// How ping and jitter are derived for a measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PingMode {
    /// Repeated round-trip probes; ping is the mean, jitter the sample standard deviation
    #[default]
    Probe,
    /// Ping is the latency reported by the selected endpoint; jitter is never available
    Endpoint,
}

impl PingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PingMode::Probe => "probe",
            PingMode::Endpoint => "endpoint",
        }
    }
}

impl FromStr for PingMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "probe" | "probes" => Ok(PingMode::Probe),
            "endpoint" | "server" => Ok(PingMode::Endpoint),
            other => Err(AppError::parse(format!(
                "Invalid ping mode '{}': expected 'probe' or 'endpoint'",
                other
            ))),
        }
    }
}

impl fmt::Display for PingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A remote speed test server chosen as the basis for throughput and latency sampling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Endpoint {
    /// Human-readable name (the server host)
    pub name: String,
    /// Base URL of the server
    pub url: String,
    /// Round-trip latency observed while selecting the server (milliseconds)
    pub latency_ms: f64,
}

impl Endpoint {
    pub fn new(url: impl Into<String>, latency_ms: f64) -> Self {
        let url = url.into();
        let name = url::Url::parse(&url)
            .ok()
            .and_then(|parsed| parsed.host_str().map(String::from))
            .unwrap_or_else(|| url.clone());
        Self { name, url, latency_ms }
    }
}

/// Quality classification of a throughput value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpeedLevel {
    /// 100 Mbps and above
    Fast,
    /// 25-100 Mbps
    Moderate,
    /// Below 25 Mbps
    Slow,
}

impl SpeedLevel {
    pub fn from_mbps(mbps: f64) -> Self {
        if mbps >= 100.0 {
            Self::Fast
        } else if mbps >= 25.0 {
            Self::Moderate
        } else {
            Self::Slow
        }
    }
}
