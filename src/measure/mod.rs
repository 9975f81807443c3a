//! Measurement adapter
//!
//! Runs one speed test through a [`SpeedTestProvider`]: select the best
//! endpoint, measure download then upload, and derive ping and jitter
//! according to the configured [`PingMode`]. Any provider failure is reported
//! as [`AppError::MeasurementUnavailable`]; failed latency probes only make
//! ping and jitter absent.

pub mod probe;
pub mod provider;

pub use probe::{LatencyProber, TcpLatencyProber};
pub use provider::{HttpSpeedTestProvider, SpeedTestProvider};

use crate::error::{AppError, Result};
use crate::logging::{Logger, LoggerFactory};
use crate::models::{round2, Config, Measurement};
use crate::stats::LatencySummary;
use crate::types::PingMode;
use std::sync::Arc;

/// Bits per second to megabits per second
pub fn to_mbps(bits_per_second: f64) -> f64 {
    round2(bits_per_second / 1_000_000.0)
}

/// Coordinates the speed test provider and the latency prober
pub struct MeasurementAdapter {
    provider: Arc<dyn SpeedTestProvider>,
    prober: Arc<dyn LatencyProber>,
    ping_mode: PingMode,
    ping_host: String,
    ping_count: u32,
    logger: Logger,
}

impl MeasurementAdapter {
    pub fn new(
        provider: Arc<dyn SpeedTestProvider>,
        prober: Arc<dyn LatencyProber>,
        config: &Config,
    ) -> Self {
        Self {
            provider,
            prober,
            ping_mode: config.ping_mode,
            ping_host: config.ping_host.clone(),
            ping_count: config.ping_count,
            logger: Logger::with_config("MEASURE".to_string(), config),
        }
    }

    /// Build the adapter with the HTTP provider and TCP prober from `config`
    pub async fn from_config(config: &Config, loggers: &LoggerFactory) -> Result<Self> {
        let provider = HttpSpeedTestProvider::from_config(config)?;
        let prober = TcpLatencyProber::new(config.ping_timeout())
            .with_logger(loggers.create_network_logger());

        let mut adapter = Self::new(Arc::new(provider), Arc::new(prober), config);
        adapter.logger = loggers.create_logger("MEASURE").await;
        Ok(adapter)
    }

    pub fn ping_mode(&self) -> PingMode {
        self.ping_mode
    }

    /// Run one complete speed test
    pub async fn measure(&self) -> Result<Measurement> {
        let correlation_id = self.logger.start_operation("speed_test").await;

        let result = self.run_measurement().await;

        match &result {
            Ok(measurement) => {
                self.logger
                    .info("Speed test completed")
                    .correlation_id(&correlation_id)
                    .measurement(measurement)
                    .log()
                    .await;
            }
            Err(e) => {
                self.logger
                    .warn(&format!("Speed test failed: {}", e))
                    .correlation_id(&correlation_id)
                    .error_info(e)
                    .log()
                    .await;
            }
        }
        self.logger
            .end_operation(&correlation_id, "speed_test", result.is_ok())
            .await;

        result
    }

    async fn run_measurement(&self) -> Result<Measurement> {
        let endpoint = self
            .provider
            .select_best_endpoint()
            .await
            .map_err(|e| unavailable("selecting an endpoint", e))?;

        self.logger
            .debug(&format!("Selected endpoint {} ({:.2} ms)", endpoint.name, endpoint.latency_ms))
            .field("endpoint", &endpoint.url)
            .log()
            .await;

        let download_bps = self
            .provider
            .measure_download(&endpoint)
            .await
            .map_err(|e| unavailable("measuring download", e))?;

        let upload_bps = self
            .provider
            .measure_upload(&endpoint)
            .await
            .map_err(|e| unavailable("measuring upload", e))?;

        let (ping_ms, jitter_ms) = match self.ping_mode {
            PingMode::Probe => {
                let summary = self.probe_latency().await;
                (summary.ping_ms, summary.jitter_ms)
            }
            PingMode::Endpoint => (Some(round2(endpoint.latency_ms)), None),
        };

        Ok(Measurement {
            download_mbps: to_mbps(download_bps),
            upload_mbps: to_mbps(upload_bps),
            ping_ms,
            jitter_ms,
            endpoint,
        })
    }

    /// Probe the ping host sequentially; failed probes are dropped
    pub async fn probe_latency(&self) -> LatencySummary {
        let mut samples = Vec::with_capacity(self.ping_count as usize);
        for _ in 0..self.ping_count {
            if let Some(ms) = self.prober.probe(&self.ping_host).await {
                samples.push(ms);
            }
        }

        if samples.is_empty() {
            self.logger
                .warn(&format!("No latency samples from {}", self.ping_host))
                .field("attempts", self.ping_count)
                .log()
                .await;
        }

        LatencySummary::from_samples(&samples)
    }
}

fn unavailable(stage: &str, error: AppError) -> AppError {
    match error {
        AppError::MeasurementUnavailable(_) => error,
        other => AppError::measurement_unavailable(format!("Failed while {}: {}", stage, other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Endpoint;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    struct FixedProvider {
        endpoint: Option<Endpoint>,
        download_bps: Result<f64>,
        upload_bps: f64,
    }

    impl FixedProvider {
        fn healthy(download_bps: f64, upload_bps: f64, latency_ms: f64) -> Self {
            Self {
                endpoint: Some(Endpoint::new("https://speed.example.net", latency_ms)),
                download_bps: Ok(download_bps),
                upload_bps,
            }
        }
    }

    #[async_trait]
    impl SpeedTestProvider for FixedProvider {
        async fn select_best_endpoint(&self) -> Result<Endpoint> {
            self.endpoint
                .clone()
                .ok_or_else(|| AppError::network("No reachable speed test server"))
        }

        async fn measure_download(&self, _endpoint: &Endpoint) -> Result<f64> {
            match &self.download_bps {
                Ok(bps) => Ok(*bps),
                Err(_) => Err(AppError::timeout("download timed out")),
            }
        }

        async fn measure_upload(&self, _endpoint: &Endpoint) -> Result<f64> {
            Ok(self.upload_bps)
        }
    }

    struct ScriptedProber {
        samples: Mutex<VecDeque<Option<f64>>>,
    }

    impl ScriptedProber {
        fn new(samples: Vec<Option<f64>>) -> Self {
            Self {
                samples: Mutex::new(samples.into()),
            }
        }
    }

    #[async_trait]
    impl LatencyProber for ScriptedProber {
        async fn probe(&self, _host: &str) -> Option<f64> {
            self.samples.lock().unwrap().pop_front().flatten()
        }
    }

    fn adapter(provider: FixedProvider, prober: ScriptedProber, mode: PingMode, count: u32) -> MeasurementAdapter {
        let config = Config {
            ping_mode: mode,
            ping_count: count,
            ..Config::default()
        };
        MeasurementAdapter::new(Arc::new(provider), Arc::new(prober), &config)
    }

    #[test]
    fn test_to_mbps() {
        assert_eq!(to_mbps(50_123_456.0), 50.12);
        assert_eq!(to_mbps(9_870_000.0), 9.87);
    }

    #[tokio::test]
    async fn test_endpoint_mode_reports_endpoint_latency_without_jitter() {
        let adapter = adapter(
            FixedProvider::healthy(50_120_000.0, 9_870_000.0, 18.3),
            ScriptedProber::new(vec![]),
            PingMode::Endpoint,
            10,
        );

        let measurement = adapter.measure().await.unwrap();
        assert_eq!(measurement.download_mbps, 50.12);
        assert_eq!(measurement.upload_mbps, 9.87);
        assert_eq!(measurement.ping_ms, Some(18.3));
        assert_eq!(measurement.jitter_ms, None);
        assert_eq!(measurement.endpoint.name, "speed.example.net");
    }

    #[tokio::test]
    async fn test_probe_mode_derives_ping_and_jitter() {
        let adapter = adapter(
            FixedProvider::healthy(100_000_000.0, 20_000_000.0, 5.0),
            ScriptedProber::new(vec![Some(10.0), None, Some(12.0)]),
            PingMode::Probe,
            3,
        );

        let measurement = adapter.measure().await.unwrap();
        assert_eq!(measurement.ping_ms, Some(11.0));
        assert_eq!(measurement.jitter_ms, Some(1.41));
    }

    #[tokio::test]
    async fn test_probe_mode_single_sample() {
        let adapter = adapter(
            FixedProvider::healthy(1_000_000.0, 1_000_000.0, 5.0),
            ScriptedProber::new(vec![None, Some(20.0)]),
            PingMode::Probe,
            2,
        );

        let measurement = adapter.measure().await.unwrap();
        assert_eq!(measurement.ping_ms, Some(20.0));
        assert_eq!(measurement.jitter_ms, Some(0.0));
    }

    #[tokio::test]
    async fn test_failed_probes_do_not_fail_measurement() {
        let adapter = adapter(
            FixedProvider::healthy(1_000_000.0, 1_000_000.0, 5.0),
            ScriptedProber::new(vec![None, None]),
            PingMode::Probe,
            2,
        );

        let measurement = adapter.measure().await.unwrap();
        assert_eq!(measurement.download_mbps, 1.0);
        assert_eq!(measurement.ping_ms, None);
        assert_eq!(measurement.jitter_ms, None);
    }

    #[tokio::test]
    async fn test_no_endpoint_is_unavailable() {
        let provider = FixedProvider {
            endpoint: None,
            download_bps: Ok(1.0),
            upload_bps: 1.0,
        };
        let adapter = adapter(provider, ScriptedProber::new(vec![]), PingMode::Probe, 1);

        let err = adapter.measure().await.unwrap_err();
        assert!(matches!(err, AppError::MeasurementUnavailable(_)));
        assert!(err.to_string().contains("selecting an endpoint"));
    }

    #[tokio::test]
    async fn test_transfer_failure_is_unavailable() {
        let provider = FixedProvider {
            endpoint: Some(Endpoint::new("https://speed.example.net", 4.0)),
            download_bps: Err(AppError::timeout("unused")),
            upload_bps: 1.0,
        };
        let adapter = adapter(provider, ScriptedProber::new(vec![]), PingMode::Endpoint, 1);

        let err = adapter.measure().await.unwrap_err();
        assert!(matches!(err, AppError::MeasurementUnavailable(_)));
        assert!(err.to_string().contains("measuring download"));
    }
}
