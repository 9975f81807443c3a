//! Round-trip latency probes

use crate::logging::NetworkLogger;
use async_trait::async_trait;
use std::time::{Duration, Instant};
use tokio::net::TcpStream;
use tokio::time::timeout;

/// One round-trip latency sample against a host
#[async_trait]
pub trait LatencyProber: Send + Sync {
    /// Latency in milliseconds, or `None` when the probe failed or timed out
    async fn probe(&self, host: &str) -> Option<f64>;
}

/// Measures round-trip time as the duration of a TCP handshake
pub struct TcpLatencyProber {
    timeout: Duration,
    logger: Option<NetworkLogger>,
}

impl TcpLatencyProber {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout, logger: None }
    }

    pub fn with_logger(mut self, logger: NetworkLogger) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Append the default port when `host` does not carry one
    pub fn target_address(host: &str) -> String {
        let host = host.trim();
        let has_port = match host.rsplit_once(':') {
            // Bracketed IPv6 literal: `[::1]:443`
            Some((addr, port)) if addr.ends_with(']') => port.parse::<u16>().is_ok(),
            // Bare IPv6 literal without a port
            Some((addr, _)) if addr.contains(':') => false,
            Some((_, port)) => port.parse::<u16>().is_ok(),
            None => false,
        };

        if has_port {
            host.to_string()
        } else if host.contains(':') && !host.starts_with('[') {
            format!("[{}]:{}", host, crate::defaults::DEFAULT_PING_PORT)
        } else {
            format!("{}:{}", host, crate::defaults::DEFAULT_PING_PORT)
        }
    }
}

#[async_trait]
impl LatencyProber for TcpLatencyProber {
    async fn probe(&self, host: &str) -> Option<f64> {
        let target = Self::target_address(host);
        let start = Instant::now();

        let latency = match timeout(self.timeout, TcpStream::connect(target.as_str())).await {
            Ok(Ok(_stream)) => Some(start.elapsed().as_secs_f64() * 1000.0),
            _ => None,
        };

        if let Some(logger) = &self.logger {
            logger.log_probe(&target, latency).await;
        }

        latency
    }
}
