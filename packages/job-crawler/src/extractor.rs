//! Homepage email extraction.
//!
//! Fetches a company homepage, mines it for addresses, follows a bounded
//! number of same-host "contact" links, and mines those too.

use scraper::{Html, Selector};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::html;
use crate::traits::fetcher::{FetchRequest, Fetcher};
use crate::validator::{extract_emails, is_valid_address, EmailSet};

/// Default number of contact pages fetched per homepage.
pub const DEFAULT_CONTACT_PAGE_LIMIT: usize = 3;

/// Lowercase tokens marking an anchor as a likely contact page.
pub const CONTACT_KEYWORDS: &[&str] = &[
    "contact", "about", "company", "footer", "문의", "연락", "회사소개", "고객센터", "고객지원",
];

/// Everything one extraction learned about a homepage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionReport {
    /// Validated addresses, first-seen order, unique ignoring case
    pub emails: Vec<String>,

    /// Pages that were fetched successfully (homepage included)
    pub pages_fetched: usize,

    /// Contact-page URLs that were selected for fetching
    pub contact_pages: Vec<String>,

    /// Set when the homepage itself could not be fetched
    pub homepage_error: Option<String>,
}

/// Addresses and candidate links found on one page.
#[derive(Debug, Default)]
struct PageScan {
    emails: Vec<String>,
    contact_links: Vec<String>,
}

/// Email extraction over a [`Fetcher`].
///
/// # Example
///
/// ```rust,ignore
/// use job_crawler::{EmailExtractor, HttpFetcher, CrawlerConfig};
///
/// let fetcher = HttpFetcher::lenient(&CrawlerConfig::default())?;
/// let extractor = EmailExtractor::new(fetcher, Duration::from_secs(8));
/// let emails = extractor.extract("acme.co.kr").await;
/// ```
pub struct EmailExtractor<F: Fetcher> {
    fetcher: F,
    timeout: Duration,
    contact_page_limit: usize,
}

impl<F: Fetcher> EmailExtractor<F> {
    pub fn new(fetcher: F, timeout: Duration) -> Self {
        Self {
            fetcher,
            timeout,
            contact_page_limit: DEFAULT_CONTACT_PAGE_LIMIT,
        }
    }

    /// Cap the number of contact pages followed per homepage.
    pub fn with_contact_page_limit(mut self, limit: usize) -> Self {
        self.contact_page_limit = limit;
        self
    }

    /// Validated emails reachable from `homepage`.
    ///
    /// Never fails: unreachable pages contribute nothing.
    pub async fn extract(&self, homepage: &str) -> Vec<String> {
        self.extract_report(homepage).await.emails
    }

    /// Like [`extract`](Self::extract), but also reports what was fetched.
    pub async fn extract_report(&self, homepage: &str) -> ExtractionReport {
        let url = normalize_url(homepage);
        let mut report = ExtractionReport::default();

        let page = match self.fetcher.fetch(&FetchRequest::new(&url, self.timeout)).await {
            Ok(page) => page,
            Err(e) => {
                warn!(url = %url, error = %e, "Homepage fetch failed");
                report.homepage_error = Some(e.to_string());
                return report;
            }
        };
        report.pages_fetched = 1;

        // Relative links resolve against where the homepage actually landed
        let base = Url::parse(&page.url).or_else(|_| Url::parse(&url)).ok();
        let scan = scan_page(&page.body, base.as_ref(), self.contact_page_limit);

        let mut emails = EmailSet::new();
        emails.extend(&scan.emails);

        debug!(
            url = %url,
            emails = scan.emails.len(),
            contact_links = scan.contact_links.len(),
            "Homepage scanned"
        );

        for link in &scan.contact_links {
            match self.fetcher.fetch(&FetchRequest::new(link, self.timeout)).await {
                Ok(contact) => {
                    report.pages_fetched += 1;
                    emails.extend(scan_page(&contact.body, None, 0).emails);
                }
                Err(e) => {
                    debug!(url = %link, error = %e, "Contact page fetch failed, skipping");
                }
            }
        }

        report.contact_pages = scan.contact_links;
        report.emails = emails.into_vec();
        report
    }
}

/// Prepend `https://` when the URL carries no http(s) scheme.
pub fn normalize_url(url: &str) -> String {
    let trimmed = url.trim();
    let lower = trimmed.to_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}

/// Host and explicit port both match. A scheme's default port counts as no port.
fn same_origin_host(link: &Url, base: &Url) -> bool {
    link.host_str().is_some() && link.host_str() == base.host_str() && link.port() == base.port()
}

/// Addresses on one page: raw-text matches first, then `mailto:` targets.
pub fn emails_in_page(html: &str) -> Vec<String> {
    scan_page(html, None, 0).emails
}

/// Same-host links whose text or href looks like a contact page.
///
/// Encounter order, unique by resolved URL, at most `limit` entries.
pub fn discover_contact_pages(html: &str, base: &Url, limit: usize) -> Vec<String> {
    scan_page(html, Some(base), limit).contact_links
}

fn scan_page(body: &str, base: Option<&Url>, limit: usize) -> PageScan {
    let mut emails = EmailSet::new();
    emails.extend(extract_emails(body));

    let document = Html::parse_document(body);
    let Ok(anchors) = Selector::parse("a[href]") else {
        return PageScan {
            emails: emails.into_vec(),
            contact_links: Vec::new(),
        };
    };

    let mut contact_links: Vec<String> = Vec::new();
    for anchor in document.select(&anchors) {
        let Some(href) = html::href(&anchor) else {
            continue;
        };

        if let Some(address) = mailto_address(href) {
            if is_valid_address(&address) {
                emails.insert(&address);
            }
            continue;
        }

        let Some(base) = base else {
            continue;
        };
        if contact_links.len() >= limit {
            continue;
        }

        let text = html::lower_text(&anchor);
        let href_lower = href.to_lowercase();
        let is_contact = CONTACT_KEYWORDS
            .iter()
            .any(|k| text.contains(k) || href_lower.contains(k));
        if !is_contact {
            continue;
        }

        let Ok(resolved) = base.join(href) else {
            continue;
        };
        if !same_origin_host(&resolved, base) {
            continue;
        }

        let resolved = resolved.to_string();
        if !contact_links.contains(&resolved) {
            contact_links.push(resolved);
        }
    }

    PageScan {
        emails: emails.into_vec(),
        contact_links,
    }
}

/// Target of a `mailto:` href with any query stripped.
fn mailto_address(href: &str) -> Option<String> {
    let href = href.trim();
    let prefix = href.get(..7)?;
    if !prefix.eq_ignore_ascii_case("mailto:") {
        return None;
    }
    let target = &href[7..];
    let address = target.split('?').next().unwrap_or_default().trim();
    Some(address.to_string())
}
