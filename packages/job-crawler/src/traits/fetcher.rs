//! HTTP fetch capability.

use async_trait::async_trait;
use std::time::Duration;

use crate::error::FetchResult;

/// A single GET request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub url: String,

    /// Extra headers on top of the fetcher's defaults
    pub headers: Vec<(String, String)>,

    pub timeout: Duration,
}

impl FetchRequest {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
            timeout,
        }
    }

    /// Add a request header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// A successfully fetched (2xx) response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub url: String,

    pub status: u16,

    pub body: String,
}

impl FetchedPage {
    pub fn new(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status: 200,
            body: body.into(),
        }
    }
}

/// Fetcher trait for retrieving page bodies.
///
/// Implementations must report non-2xx responses as
/// [`FetchError::Status`](crate::error::FetchError::Status) and never retry.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch one URL.
    async fn fetch(&self, request: &FetchRequest) -> FetchResult<FetchedPage>;

    /// Fetch one URL and return only its body.
    async fn fetch_text(&self, url: &str, timeout: Duration) -> FetchResult<String> {
        let page = self.fetch(&FetchRequest::new(url, timeout)).await?;
        Ok(page.body)
    }

    /// Get the fetcher name (for logging/debugging).
    fn name(&self) -> &str {
        "unknown"
    }
}
