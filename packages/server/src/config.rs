use anyhow::{Context, Result};
use dotenvy::dotenv;
use job_crawler::CrawlerConfig;
use std::env;
use std::path::PathBuf;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,

    /// Directory CSV exports are written into
    pub export_dir: PathBuf,

    pub page_delay_ms: u64,
    pub company_delay_ms: u64,

    /// Upper bound on `end_page - start_page + 1` for one request
    pub max_pages_per_run: u32,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. Every key is optional.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let crawler = CrawlerConfig::default();

        Ok(Self {
            port: lookup("PORT")
                .unwrap_or_else(|| "8000".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            export_dir: lookup("EXPORT_DIR")
                .unwrap_or_else(|| "exports".to_string())
                .into(),
            page_delay_ms: lookup("PAGE_DELAY_MS")
                .unwrap_or_else(|| crawler.page_delay_ms.to_string())
                .parse()
                .context("PAGE_DELAY_MS must be a number of milliseconds")?,
            company_delay_ms: lookup("COMPANY_DELAY_MS")
                .unwrap_or_else(|| crawler.company_delay_ms.to_string())
                .parse()
                .context("COMPANY_DELAY_MS must be a number of milliseconds")?,
            max_pages_per_run: lookup("MAX_PAGES_PER_RUN")
                .unwrap_or_else(|| "10".to_string())
                .parse()
                .context("MAX_PAGES_PER_RUN must be a valid number")?,
        })
    }

    /// Crawler settings for one run.
    pub fn crawler_config(&self) -> CrawlerConfig {
        CrawlerConfig::default()
            .with_page_delay_ms(self.page_delay_ms)
            .with_company_delay_ms(self.company_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(|_| None).unwrap();

        assert_eq!(config.port, 8000);
        assert_eq!(config.export_dir, PathBuf::from("exports"));
        assert_eq!(config.max_pages_per_run, 10);
        assert_eq!(config.crawler_config(), CrawlerConfig::default());
    }

    #[test]
    fn test_overrides_flow_into_crawler_config() {
        let config = Config::from_lookup(lookup_from(&[
            ("PORT", "9000"),
            ("PAGE_DELAY_MS", "0"),
            ("COMPANY_DELAY_MS", "50"),
        ]))
        .unwrap();

        assert_eq!(config.port, 9000);
        let crawler = config.crawler_config();
        assert_eq!(crawler.page_delay_ms, 0);
        assert_eq!(crawler.company_delay_ms, 50);
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[("PORT", "eighty")])).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }
}
