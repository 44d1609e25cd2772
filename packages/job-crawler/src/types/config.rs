//! Configuration for crawl runs.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Browser-like User-Agent sent with every request.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

pub const DEFAULT_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";

pub const DEFAULT_ACCEPT_LANGUAGE: &str = "ko-KR,ko;q=0.9,en-US;q=0.8,en;q=0.7";

/// Configuration for one crawl run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// Delay between consecutive search-page requests.
    ///
    /// Politeness only. Default: 500 ms.
    pub page_delay_ms: u64,

    /// Delay between consecutive companies during enrichment.
    ///
    /// Default: 300 ms.
    pub company_delay_ms: u64,

    /// Maximum contact pages fetched per homepage. Default: 3.
    pub contact_page_limit: usize,

    pub user_agent: String,

    pub accept: String,

    pub accept_language: String,

    /// Redirects followed before a fetch gives up. Default: 10.
    pub max_redirects: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            page_delay_ms: 500,
            company_delay_ms: 300,
            contact_page_limit: 3,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept: DEFAULT_ACCEPT.to_string(),
            accept_language: DEFAULT_ACCEPT_LANGUAGE.to_string(),
            max_redirects: 10,
        }
    }
}

impl CrawlerConfig {
    /// Config with all pacing delays disabled (tests, local fixtures).
    pub fn without_delays() -> Self {
        Self::default().with_page_delay_ms(0).with_company_delay_ms(0)
    }

    pub fn with_page_delay_ms(mut self, ms: u64) -> Self {
        self.page_delay_ms = ms;
        self
    }

    pub fn with_company_delay_ms(mut self, ms: u64) -> Self {
        self.company_delay_ms = ms;
        self
    }

    pub fn with_contact_page_limit(mut self, limit: usize) -> Self {
        self.contact_page_limit = limit;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }

    pub fn company_delay(&self) -> Duration {
        Duration::from_millis(self.company_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CrawlerConfig::default();
        assert_eq!(config.page_delay(), Duration::from_millis(500));
        assert_eq!(config.company_delay(), Duration::from_millis(300));
        assert_eq!(config.contact_page_limit, 3);
        assert!(config.accept_language.starts_with("ko-KR"));
    }

    #[test]
    fn test_without_delays() {
        let config = CrawlerConfig::without_delays();
        assert_eq!(config.page_delay(), Duration::ZERO);
        assert_eq!(config.company_delay(), Duration::ZERO);
        assert_eq!(config.contact_page_limit, 3);
    }
}
