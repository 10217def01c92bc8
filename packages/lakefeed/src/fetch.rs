//! Page retrieval seam.
//!
//! The pipeline never talks to the network directly for the scrape; it goes
//! through [`PageFetcher`], a one-method trait. The real implementation is a
//! thin reqwest wrapper; tests use [`MockPageFetcher`](crate::testing::MockPageFetcher).

use async_trait::async_trait;
use tracing::{debug, warn};
use url::Url;

use crate::error::{FetchError, FetchResult};

/// Narrow interface to the page-retrieval collaborator: exactly one fetch
/// per call, returning the raw document.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch the document at `url`. A network failure or non-success status
    /// is an error; the body is returned verbatim otherwise.
    async fn fetch(&self, url: &str) -> FetchResult<String>;

    /// Fetcher name, for logging.
    fn name(&self) -> &str {
        "unknown"
    }
}

/// HTTP fetcher backed by reqwest.
pub struct HttpPageFetcher {
    client: reqwest::Client,
}

impl Default for HttpPageFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpPageFetcher {
    /// Create a fetcher with a 30s request timeout.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .user_agent(concat!("lakefeed/", env!("CARGO_PKG_VERSION")))
                .build()
                .expect("Failed to create HTTP client"),
        }
    }

    /// Use a custom reqwest client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &str) -> FetchResult<String> {
        Url::parse(url).map_err(|_| FetchError::InvalidUrl {
            url: url.to_string(),
        })?;

        debug!(url = %url, "fetch starting");
        let response = self.client.get(url).send().await.map_err(|e| {
            warn!(url = %url, error = %e, "fetch failed");
            FetchError::Request(Box::new(e))
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| FetchError::Request(Box::new(e)))
    }

    fn name(&self) -> &str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_invalid_url_rejected_before_any_request() {
        let fetcher = HttpPageFetcher::new();
        let err = fetcher.fetch("not a url").await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl { .. }));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_request_error() {
        let fetcher = HttpPageFetcher::new();
        let err = fetcher.fetch("http://127.0.0.1:1/page").await.unwrap_err();
        assert!(matches!(err, FetchError::Request(_)));
    }
}
