use crate::error::CatalogError;
use rand::Rng;
use reqwest::header::HeaderMap;
use reqwest::{Client, ClientBuilder, RequestBuilder};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::sleep;

/// Configuration for the catalog HTTP client
#[derive(Clone, Debug)]
pub struct HttpClientConfig {
    pub timeout: Duration,
    pub max_retries: usize,
    pub initial_retry_delay_ms: u64,
    pub max_retry_delay_ms: u64,
    /// Upper bound on requests in flight against the catalog host
    pub max_in_flight: usize,
    pub enable_gzip: bool,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_retries: 2,
            initial_retry_delay_ms: 500,
            max_retry_delay_ms: 8000,
            max_in_flight: 4,
            enable_gzip: true,
        }
    }
}

/// HTTP client shared by every catalog lookup.
///
/// Every request carries the frozen header bundle, a timeout, and holds one
/// of `max_in_flight` permits from send until the body has been read.
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
    permits: Arc<Semaphore>,
}

impl HttpClient {
    pub fn with_config(config: HttpClientConfig, headers: HeaderMap) -> Result<Self, reqwest::Error> {
        let client = ClientBuilder::new()
            .timeout(config.timeout)
            .gzip(config.enable_gzip)
            .brotli(config.enable_gzip)
            .default_headers(headers)
            .tcp_keepalive(Some(Duration::from_secs(60)))
            .pool_idle_timeout(Some(Duration::from_secs(90)))
            .build()?;

        let permits = Arc::new(Semaphore::new(config.max_in_flight.max(1)));

        Ok(Self {
            client,
            config,
            permits,
        })
    }

    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// Calculate retry delay with exponential backoff and jitter
    fn calculate_retry_delay(&self, attempt: usize) -> Duration {
        let base_delay = self.config.initial_retry_delay_ms;
        let max_delay = self.config.max_retry_delay_ms;

        let delay_ms = base_delay
            .saturating_mul(2u64.saturating_pow(attempt as u32))
            .min(max_delay);

        // +/-25% so parallel retries don't line up
        let jitter = rand::thread_rng().gen_range(0.75..=1.25);
        Duration::from_millis((delay_ms as f64 * jitter) as u64)
    }

    fn is_retryable_status(status: u16) -> bool {
        matches!(
            status,
            // Rate limiting
            429 |
            // Server errors
            500 | 502 | 503 | 504 |
            // Cloudflare errors
            520 | 521 | 522 | 523 | 524 | 525 | 526 | 527
        )
    }

    fn should_retry(error: &CatalogError) -> bool {
        match error {
            CatalogError::Timeout { .. } => true,
            CatalogError::Transport(e) => e.is_connect() || e.is_request(),
            CatalogError::Status { status, .. } => Self::is_retryable_status(*status),
            _ => false,
        }
    }

    fn classify(url: &str, error: reqwest::Error) -> CatalogError {
        if error.is_timeout() {
            CatalogError::Timeout {
                url: url.to_string(),
            }
        } else {
            CatalogError::Transport(error)
        }
    }

    /// GET a page and return its body
    pub async fn get_text(&self, url: &str) -> Result<String, CatalogError> {
        self.send_with_retry(url, || self.client.get(url)).await
    }

    /// POST a form-encoded body and return the response body
    pub async fn post_form(&self, url: &str, form: &[(&str, &str)]) -> Result<String, CatalogError> {
        self.send_with_retry(url, || self.client.post(url).form(form)).await
    }

    async fn send_with_retry<F>(&self, url: &str, build: F) -> Result<String, CatalogError>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut attempt = 0;
        loop {
            let outcome = {
                // The semaphore is never closed, so a missing permit cannot happen in practice
                let _permit = self.permits.acquire().await.ok();
                self.send_once(url, &build).await
            };

            match outcome {
                Ok(body) => return Ok(body),
                Err(e) if attempt < self.config.max_retries && Self::should_retry(&e) => {
                    log::warn!(
                        "Request failed for {}, attempt {}/{}: {}",
                        url,
                        attempt + 1,
                        self.config.max_retries + 1,
                        e
                    );
                    sleep(self.calculate_retry_delay(attempt)).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn send_once<F>(&self, url: &str, build: &F) -> Result<String, CatalogError>
    where
        F: Fn() -> RequestBuilder,
    {
        let response = build()
            .send()
            .await
            .map_err(|e| Self::classify(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| Self::classify(url, e))
    }
}
