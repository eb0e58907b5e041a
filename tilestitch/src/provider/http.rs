//! HTTP transport for tile downloads

use std::future::Future;
use std::time::Duration;

use tracing::{debug, trace, warn};

use super::types::ProviderError;

/// Identifying `User-Agent` sent with every tile request.
///
/// Public tile servers (OSM in particular) reject anonymous clients.
pub const DEFAULT_USER_AGENT: &str = concat!("tilestitch/", env!("CARGO_PKG_VERSION"));

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Transport used by the fetcher to download tile bodies.
///
/// Tests substitute an in-memory implementation.
pub trait AsyncHttpClient: Send + Sync {
    /// GETs `url` and returns the body.
    ///
    /// Any non-success status is an error.
    fn get(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, ProviderError>> + Send;
}

/// [`AsyncHttpClient`] over a pooled `reqwest::Client`.
#[derive(Clone)]
pub struct AsyncReqwestClient {
    client: reqwest::Client,
}

impl AsyncReqwestClient {
    /// Creates a client with the given identifying header and timeout.
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .pool_max_idle_per_host(32)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_nodelay(true)
            .build()
            .map_err(|e| {
                ProviderError::HttpError(format!("Failed to create async HTTP client: {}", e))
            })?;

        Ok(Self { client })
    }

    /// Creates a client with [`DEFAULT_USER_AGENT`] and [`DEFAULT_TIMEOUT`].
    pub fn with_defaults() -> Result<Self, ProviderError> {
        Self::new(DEFAULT_USER_AGENT, DEFAULT_TIMEOUT)
    }
}

impl AsyncHttpClient for AsyncReqwestClient {
    async fn get(&self, url: &str) -> Result<Vec<u8>, ProviderError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            debug!(url, error = %e, timeout = e.is_timeout(), "Tile request failed");
            ProviderError::HttpError(format!("Request failed: {}", e))
        })?;

        let status = response.status();
        trace!(url, status = status.as_u16(), "Tile response");
        if !status.is_success() {
            return Err(ProviderError::HttpError(format!("HTTP {} from {}", status, url)));
        }

        let body = response.bytes().await.map_err(|e| {
            warn!(url, error = %e, "Tile body truncated");
            ProviderError::HttpError(format!("Failed to read response: {}", e))
        })?;
        Ok(body.to_vec())
    }
}
