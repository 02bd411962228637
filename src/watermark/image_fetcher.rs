//! Logo image fetcher.
//!
//! The logo is fetched with a plain HTTP GET on every invocation. Redirects
//! are followed up to a configured limit; any non-2xx final status is a
//! fetch failure. Decoding happens later in the compositor, so this module
//! only deals in raw bytes.

use super::WatermarkError;
use crate::config::FetchConfig;
use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;

/// Source of the logo bytes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LogoSource: Send + Sync {
    /// Fetch the raw logo bytes from `url`.
    async fn fetch(&self, url: &str) -> Result<Bytes, WatermarkError>;
}

/// Logo fetcher over HTTP(S).
#[derive(Clone)]
pub struct HttpLogoFetcher {
    http_client: reqwest::Client,
}

impl HttpLogoFetcher {
    /// Create a new fetcher with the given timeout and redirect limit.
    ///
    /// # Errors
    ///
    /// Returns `WatermarkError::ConfigError` if the HTTP client cannot be created
    /// (e.g., TLS configuration issues, system resource exhaustion).
    pub fn new(config: &FetchConfig) -> Result<Self, WatermarkError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()
            .map_err(|e| {
                WatermarkError::ConfigError(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { http_client })
    }
}

#[async_trait]
impl LogoSource for HttpLogoFetcher {
    async fn fetch(&self, url: &str) -> Result<Bytes, WatermarkError> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| WatermarkError::FetchError(format!("HTTP fetch failed: {e}")))?;

        if !response.status().is_success() {
            return Err(WatermarkError::FetchError(format!(
                "HTTP request failed with status: {}",
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| WatermarkError::FetchError(format!("Failed to read HTTP body: {e}")))?;

        tracing::debug!(url = %url, bytes = bytes.len(), "Logo fetched");

        Ok(bytes)
    }
}
