//! HTTP feed fetcher.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::Client;

use crate::config::DEFAULT_FEED_TIMEOUT_SECS;
use crate::error::FetchError;

/// Several publishers reject default automation clients, so requests
/// present themselves as a desktop browser.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/115.0.0.0 Safari/537.36";

/// Accept header listing the feed content types.
pub const FEED_ACCEPT: &str =
    "application/rss+xml, application/xml, application/atom+xml, text/xml;q=0.9, */*;q=0.8";

/// Retrieves raw feed bodies.
#[async_trait]
pub trait FetchFeed: Send + Sync {
    /// Fetch the body at `url`. Non-2xx statuses and transport failures
    /// are returned as errors, never panics.
    async fn fetch(&self, url: &str) -> Result<Bytes, FetchError>;
}

/// `reqwest`-backed fetcher with browser headers and a bounded timeout.
pub struct HttpFeedFetcher {
    client: Client,
}

impl HttpFeedFetcher {
    /// Create a fetcher whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        headers.insert(ACCEPT, HeaderValue::from_static(FEED_ACCEPT));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// Create a fetcher with the default 10 second timeout.
    pub fn with_default_timeout() -> Result<Self, FetchError> {
        Self::new(Duration::from_secs(DEFAULT_FEED_TIMEOUT_SECS))
    }
}

#[async_trait]
impl FetchFeed for HttpFeedFetcher {
    async fn fetch(&self, url: &str) -> Result<Bytes, FetchError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        tracing::debug!(url, bytes = body.len(), "Fetched feed");
        Ok(body)
    }
}
