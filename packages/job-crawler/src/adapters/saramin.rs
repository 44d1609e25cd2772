//! Saramin (saramin.co.kr) adapter.
//!
//! Search results are server-rendered HTML, one request per page. Listings
//! link to a company-info page that carries the homepage.

use async_trait::async_trait;
use lazy_static::lazy_static;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info};
use url::Url;

use super::homepage::HomepageResolver;
use crate::error::{AdapterResult, FetchError, ParseError};
use crate::html;
use crate::traits::adapter::SiteAdapter;
use crate::traits::fetcher::Fetcher;
use crate::types::company::{CompanyRecord, Source};

pub const BASE_URL: &str = "https://www.saramin.co.kr";
pub const SEARCH_URL: &str = "https://www.saramin.co.kr/zf_user/search";

lazy_static! {
    static ref LISTING: Selector = Selector::parse(".item_recruit").unwrap();
    static ref COMPANY_LINK: Selector = Selector::parse(".corp_name a").unwrap();
    static ref JOB_LINK: Selector = Selector::parse(".job_tit a").unwrap();
}

/// Saramin search and homepage resolution.
pub struct SaraminAdapter<F: Fetcher> {
    fetcher: F,
    resolver: HomepageResolver,
}

impl<F: Fetcher> SaraminAdapter<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            resolver: HomepageResolver::saramin(),
        }
    }
}

/// Search URL for one result page.
pub fn search_url(keyword: &str, page: u32) -> Result<String, FetchError> {
    let page = page.to_string();
    Url::parse_with_params(
        SEARCH_URL,
        &[
            ("search_area", "main"),
            ("search_done", "y"),
            ("search_optional_item", "n"),
            ("searchType", "search"),
            ("searchword", keyword),
            ("recruitPage", page.as_str()),
        ],
    )
    .map(String::from)
    .map_err(|_| FetchError::InvalidUrl {
        url: SEARCH_URL.to_string(),
    })
}

/// Company records from one search result page, in listing order.
///
/// Listings without a company name are skipped.
pub fn parse_search_results(body: &str) -> Vec<CompanyRecord> {
    let document = Html::parse_document(body);
    let mut records = Vec::new();

    for listing in document.select(&LISTING) {
        match parse_listing(&listing) {
            Ok(record) => records.push(record),
            Err(e) => debug!(error = %e, "Skipping Saramin listing"),
        }
    }

    records
}

fn parse_listing(listing: &ElementRef<'_>) -> Result<CompanyRecord, ParseError> {
    let company = listing
        .select(&COMPANY_LINK)
        .next()
        .ok_or(ParseError::MissingField { field: "company_name" })?;

    let name = html::stripped_text(&company);
    if name.is_empty() {
        return Err(ParseError::MissingField { field: "company_name" });
    }

    let mut record = CompanyRecord::new(name, Source::Saramin);

    if let Some(detail) = html::href(&company).and_then(|href| html::absolutize(BASE_URL, href)) {
        record = record.with_detail_url(detail);
    }

    if let Some(job) = listing.select(&JOB_LINK).next() {
        let title = html::stripped_text(&job);
        if !title.is_empty() {
            record = record.with_job_title(title);
        }
        if let Some(url) = html::href(&job).and_then(|href| html::absolutize(BASE_URL, href)) {
            record = record.with_job_url(url);
        }
    }

    Ok(record)
}

#[async_trait]
impl<F: Fetcher> SiteAdapter for SaraminAdapter<F> {
    fn source(&self) -> Source {
        Source::Saramin
    }

    async fn search_page(&self, keyword: &str, page: u32) -> AdapterResult<Vec<CompanyRecord>> {
        let url = search_url(keyword, page)?;
        let body = self
            .fetcher
            .fetch_text(&url, Source::Saramin.site_timeout())
            .await?;

        let records = parse_search_results(&body);
        info!(keyword = %keyword, page, found = records.len(), "Saramin page parsed");
        Ok(records)
    }

    async fn resolve_homepage(&self, company_ref: &str) -> AdapterResult<Option<String>> {
        let body = self
            .fetcher
            .fetch_text(company_ref, Source::Saramin.site_timeout())
            .await?;

        let homepage = self.resolver.resolve(&body);
        debug!(company_url = %company_ref, homepage = ?homepage, "Saramin homepage lookup");
        Ok(homepage)
    }
}
