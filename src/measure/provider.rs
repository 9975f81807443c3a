//! Speed test capability: endpoint selection and throughput transfers

use crate::error::{AppError, Result};
use crate::logging::NetworkLogger;
use crate::models::Config;
use crate::types::Endpoint;
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use std::time::{Duration, Instant};

/// External speed test capability consumed by the measurement adapter.
///
/// Throughput is reported in bits per second.
#[async_trait]
pub trait SpeedTestProvider: Send + Sync {
    /// Pick the endpoint with the lowest latency among the candidates
    async fn select_best_endpoint(&self) -> Result<Endpoint>;

    async fn measure_download(&self, endpoint: &Endpoint) -> Result<f64>;

    async fn measure_upload(&self, endpoint: &Endpoint) -> Result<f64>;
}

/// Speed test provider speaking the `__down` / `__up` HTTP protocol
pub struct HttpSpeedTestProvider {
    client: Client,
    servers: Vec<String>,
    download_bytes: u64,
    upload_bytes: u64,
    logger: Option<NetworkLogger>,
}

impl HttpSpeedTestProvider {
    /// Create a provider for the given candidate servers
    pub fn new(servers: Vec<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(crate::defaults::USER_AGENT)
            .build()
            .map_err(|e| AppError::network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            servers,
            download_bytes: crate::defaults::DEFAULT_DOWNLOAD_BYTES,
            upload_bytes: crate::defaults::DEFAULT_UPLOAD_BYTES,
            logger: None,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(config.servers.clone(), config.timeout())?
            .with_transfer_sizes(config.download_bytes, config.upload_bytes)
            .with_logger(NetworkLogger::new(config)))
    }

    pub fn with_transfer_sizes(mut self, download_bytes: u64, upload_bytes: u64) -> Self {
        self.download_bytes = download_bytes;
        self.upload_bytes = upload_bytes;
        self
    }

    pub fn with_logger(mut self, logger: NetworkLogger) -> Self {
        self.logger = Some(logger);
        self
    }

    fn download_url(server: &str, bytes: u64) -> String {
        format!("{}/__down?bytes={}", server.trim_end_matches('/'), bytes)
    }

    fn upload_url(server: &str) -> String {
        format!("{}/__up", server.trim_end_matches('/'))
    }

    /// Round-trip time of an empty download request, in milliseconds
    async fn endpoint_latency(&self, server: &str) -> Result<f64> {
        let start = Instant::now();
        let response = self
            .client
            .get(Self::download_url(server, 0))
            .send()
            .await?
            .error_for_status()?;
        let elapsed = start.elapsed();
        // Drain the (empty) body so the connection can be reused
        let _ = response.bytes().await;

        Ok(elapsed.as_secs_f64() * 1000.0)
    }

    async fn log_transfer(&self, direction: &str, url: &str, bytes: u64, elapsed: Duration, success: bool) {
        if let Some(logger) = &self.logger {
            logger
                .log_transfer(direction, url, bytes, elapsed.as_secs_f64() * 1000.0, success)
                .await;
        }
    }
}

fn bits_per_second(bytes: u64, elapsed: Duration) -> Result<f64> {
    let seconds = elapsed.as_secs_f64();
    if bytes == 0 || seconds <= 0.0 {
        return Err(AppError::measurement_unavailable("Transfer completed without measurable data"));
    }
    Ok(bytes as f64 * 8.0 / seconds)
}

#[async_trait]
impl SpeedTestProvider for HttpSpeedTestProvider {
    async fn select_best_endpoint(&self) -> Result<Endpoint> {
        if self.servers.is_empty() {
            return Err(AppError::config("No speed test servers configured"));
        }

        let probes = self.servers.iter().map(|server| async move {
            let latency = self.endpoint_latency(server).await;
            (server, latency)
        });
        let results = futures::future::join_all(probes).await;

        let mut best: Option<Endpoint> = None;
        let mut last_error = None;
        for (server, latency) in results {
            match latency {
                Ok(ms) => {
                    if best.as_ref().map_or(true, |b| ms < b.latency_ms) {
                        best = Some(Endpoint::new(server, ms));
                    }
                }
                Err(e) => last_error = Some(e),
            }
        }

        best.ok_or_else(|| {
            let detail = last_error.map(|e| e.to_string()).unwrap_or_default();
            AppError::network(format!("No reachable speed test server: {}", detail))
        })
    }

    async fn measure_download(&self, endpoint: &Endpoint) -> Result<f64> {
        let url = Self::download_url(&endpoint.url, self.download_bytes);
        let start = Instant::now();

        let mut received: u64 = 0;
        let outcome: Result<()> = async {
            let response = self.client.get(&url).send().await?.error_for_status()?;
            let mut stream = response.bytes_stream();
            while let Some(chunk) = stream.next().await {
                received += chunk?.len() as u64;
            }
            Ok(())
        }
        .await;

        let elapsed = start.elapsed();
        self.log_transfer("download", &url, received, elapsed, outcome.is_ok()).await;
        outcome?;

        bits_per_second(received, elapsed)
    }

    async fn measure_upload(&self, endpoint: &Endpoint) -> Result<f64> {
        let url = Self::upload_url(&endpoint.url);
        let payload = vec![0u8; self.upload_bytes as usize];
        let start = Instant::now();

        let outcome: Result<()> = async {
            let response = self.client.post(&url).body(payload).send().await?.error_for_status()?;
            let _ = response.bytes().await?;
            Ok(())
        }
        .await;

        let elapsed = start.elapsed();
        self.log_transfer("upload", &url, self.upload_bytes, elapsed, outcome.is_ok()).await;
        outcome?;

        bits_per_second(self.upload_bytes, elapsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn speed_server(delay_ms: u64) -> MockServer {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/__down"))
            .and(query_param("bytes", "0"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(delay_ms)))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/__down"))
            .and(query_param("bytes", "4096"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![7u8; 4096]))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/__up"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        server
    }

    fn provider(servers: Vec<String>) -> HttpSpeedTestProvider {
        HttpSpeedTestProvider::new(servers, Duration::from_secs(5))
            .unwrap()
            .with_transfer_sizes(4096, 2048)
    }

    #[test]
    fn test_url_building() {
        assert_eq!(
            HttpSpeedTestProvider::download_url("https://speed.example.net/", 100),
            "https://speed.example.net/__down?bytes=100"
        );
        assert_eq!(
            HttpSpeedTestProvider::upload_url("https://speed.example.net"),
            "https://speed.example.net/__up"
        );
    }

    #[test]
    fn test_bits_per_second() {
        assert_eq!(bits_per_second(1_000_000, Duration::from_secs(1)).unwrap(), 8_000_000.0);
        assert!(bits_per_second(0, Duration::from_secs(1)).is_err());
        assert!(bits_per_second(10, Duration::ZERO).is_err());
    }

    #[tokio::test]
    async fn test_selects_lowest_latency_server() {
        let slow = speed_server(300).await;
        let fast = speed_server(0).await;

        let provider = provider(vec![slow.uri(), fast.uri()]);
        let endpoint = provider.select_best_endpoint().await.unwrap();
        assert_eq!(endpoint.url, fast.uri());
        assert!(endpoint.latency_ms >= 0.0);
    }

    #[tokio::test]
    async fn test_unreachable_servers_fail_selection() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let provider = provider(vec![server.uri()]);
        let err = provider.select_best_endpoint().await.unwrap_err();
        assert!(err.to_string().contains("No reachable speed test server"));
    }

    #[tokio::test]
    async fn test_download_and_upload_report_throughput() {
        let server = speed_server(0).await;
        let provider = provider(vec![server.uri()]);
        let endpoint = provider.select_best_endpoint().await.unwrap();

        let download = provider.measure_download(&endpoint).await.unwrap();
        let upload = provider.measure_upload(&endpoint).await.unwrap();
        assert!(download > 0.0);
        assert!(upload > 0.0);
    }

    #[tokio::test]
    async fn test_download_http_error_propagates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/__down"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let provider = provider(vec![server.uri()]);
        let endpoint = Endpoint::new(&server.uri(), 1.0);
        assert!(provider.measure_download(&endpoint).await.is_err());
    }
}
