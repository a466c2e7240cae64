//! HTTP source fetcher
//!
//! Async reqwest client with bounded timeouts and retry backoff.

use bytes::Bytes;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

use super::ResourceFetcher;
use crate::config::HttpConfig;
use crate::error::{Result, TesseraError};

/// Fetches sources over HTTP(S)
pub struct HttpFetcher {
    client: Client,
    config: HttpConfig,
}

impl HttpFetcher {
    /// Create a new HTTP fetcher
    pub fn new(config: HttpConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| TesseraError::Internal {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self { client, config })
    }

    /// Single GET attempt
    pub async fn get(&self, url: &str) -> Result<Bytes> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| TesseraError::unavailable(url, format!("request failed: {}", e)))?;

        if !resp.status().is_success() {
            return Err(TesseraError::unavailable(
                url,
                format!("status {}", resp.status()),
            ));
        }

        resp.bytes()
            .await
            .map_err(|e| TesseraError::unavailable(url, format!("failed to read body: {}", e)))
    }

    /// GET with exponential backoff between attempts
    pub async fn get_with_retry(&self, url: &str, retries: u32) -> Result<Bytes> {
        let attempts = retries.max(1);
        let mut last_error = None;

        for attempt in 0..attempts {
            match self.get(url).await {
                Ok(data) => {
                    debug!("GET {} complete ({} bytes)", url, data.len());
                    return Ok(data);
                }
                Err(e) => {
                    warn!("GET attempt {}/{} for {} failed: {}", attempt + 1, attempts, url, e);
                    last_error = Some(e);

                    if attempt + 1 < attempts {
                        let delay = Duration::from_millis(100 * 2u64.pow(attempt));
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| TesseraError::unavailable(url, "no attempts made")))
    }
}

impl ResourceFetcher for HttpFetcher {
    async fn fetch(&self, location: &str) -> Result<Bytes> {
        self.get_with_retry(location, self.config.retry_count).await
    }
}
