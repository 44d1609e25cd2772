//! HTTP fetcher backed by reqwest.
//!
//! One instance owns one connection pool. The orchestrator builds its
//! fetchers when a run starts and drops them with the run.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use tracing::{debug, warn};
use url::Url;

use crate::error::{FetchError, FetchResult};
use crate::traits::fetcher::{FetchRequest, FetchedPage, Fetcher};
use crate::types::config::CrawlerConfig;

/// HTTP fetcher with browser-like default headers and redirect following.
///
/// # Example
///
/// ```rust,ignore
/// use job_crawler::{CrawlerConfig, FetchRequest, Fetcher, HttpFetcher};
///
/// let fetcher = HttpFetcher::new(&CrawlerConfig::default())?;
/// let request = FetchRequest::new("https://www.saramin.co.kr", Duration::from_secs(10));
/// let page = fetcher.fetch(&request).await?;
/// ```
#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    name: &'static str,
}

impl HttpFetcher {
    /// Fetcher for recruiting sites and their APIs. Certificates are verified.
    pub fn new(config: &CrawlerConfig) -> FetchResult<Self> {
        Self::build(config, false, "http")
    }

    /// Fetcher for company homepages.
    ///
    /// Accepts invalid TLS certificates. Used only for company homepages.
    pub fn lenient(config: &CrawlerConfig) -> FetchResult<Self> {
        Self::build(config, true, "http-lenient")
    }

    fn build(config: &CrawlerConfig, accept_invalid_certs: bool, name: &'static str) -> FetchResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, header_value(&config.accept)?);
        headers.insert(ACCEPT_LANGUAGE, header_value(&config.accept_language)?);

        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .danger_accept_invalid_certs(accept_invalid_certs)
            .build()
            .map_err(|e| FetchError::Http(Box::new(e)))?;

        Ok(Self { client, name })
    }

    fn classify(url: &str, error: reqwest::Error) -> FetchError {
        if error.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
            }
        } else if error.is_builder() {
            FetchError::InvalidUrl {
                url: url.to_string(),
            }
        } else {
            FetchError::Http(Box::new(error))
        }
    }
}

fn header_value(value: &str) -> FetchResult<HeaderValue> {
    HeaderValue::from_str(value).map_err(|e| FetchError::Http(Box::new(e)))
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, request: &FetchRequest) -> FetchResult<FetchedPage> {
        let url = Url::parse(&request.url).map_err(|_| FetchError::InvalidUrl {
            url: request.url.clone(),
        })?;

        debug!(url = %url, timeout_ms = request.timeout.as_millis() as u64, "HTTP fetch starting");

        let mut builder = self.client.get(url).timeout(request.timeout);
        for (name, value) in &request.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| FetchError::Http(Box::new(e)))?;
            builder = builder.header(name, header_value(value)?);
        }

        let response = builder.send().await.map_err(|e| {
            warn!(url = %request.url, error = %e, "HTTP request failed");
            Self::classify(&request.url, e)
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: request.url.clone(),
                status: status.as_u16(),
            });
        }

        // Capture final URL after redirects
        let final_url = response.url().to_string();

        let body = response
            .text()
            .await
            .map_err(|e| Self::classify(&request.url, e))?;

        debug!(url = %request.url, final_url = %final_url, bytes = body.len(), "HTTP fetch complete");

        Ok(FetchedPage {
            url: final_url,
            status: status.as_u16(),
            body,
        })
    }

    fn name(&self) -> &str {
        self.name
    }
}
