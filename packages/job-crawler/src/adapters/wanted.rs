//! Wanted (wanted.co.kr) adapter.
//!
//! Wanted exposes a JSON search API that returns the whole company list in a
//! single response. Pages are emulated by slicing that list, and the list is
//! fetched once per keyword.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{AdapterResult, FetchError, ParseError};
use crate::traits::adapter::{Pagination, SiteAdapter};
use crate::traits::fetcher::{FetchRequest, Fetcher};
use crate::types::company::{CompanyRecord, Source};

pub const BASE_URL: &str = "https://www.wanted.co.kr";
pub const SEARCH_API_URL: &str = "https://www.wanted.co.kr/api/v4/search";
pub const COMPANY_API_URL: &str = "https://www.wanted.co.kr/api/v4/companies";
pub const REFERER: &str = "https://www.wanted.co.kr/";
pub const JSON_ACCEPT: &str = "application/json, text/plain, */*";

/// Results per emulated page.
pub const PAGE_SIZE: usize = 10;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    data: Option<SearchData>,
}

#[derive(Debug, Deserialize)]
struct SearchData {
    companies: Option<Vec<serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
struct RawCompany {
    id: Option<CompanyId>,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CompanyId {
    Number(u64),
    Text(String),
}

impl CompanyId {
    fn to_ref(&self) -> Option<String> {
        match self {
            CompanyId::Number(0) => None,
            CompanyId::Number(n) => Some(n.to_string()),
            CompanyId::Text(s) if s.trim().is_empty() => None,
            CompanyId::Text(s) => Some(s.trim().to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct DetailResponse {
    company: Option<DetailCompany>,
}

#[derive(Debug, Deserialize)]
struct DetailCompany {
    detail: Option<CompanyDetail>,
}

#[derive(Debug, Deserialize)]
struct CompanyDetail {
    link: Option<String>,
}

/// Wanted search and homepage resolution.
pub struct WantedAdapter<F: Fetcher> {
    fetcher: F,

    /// Search outcome per keyword. Failures are kept too, so later pages
    /// never repeat a failed API call.
    results: Mutex<HashMap<String, Result<Vec<CompanyRecord>, String>>>,
}

impl<F: Fetcher> WantedAdapter<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            results: Mutex::new(HashMap::new()),
        }
    }

    fn cached(&self, keyword: &str) -> Option<Result<Vec<CompanyRecord>, String>> {
        let results = self.results.lock().unwrap_or_else(|e| e.into_inner());
        results.get(keyword).cloned()
    }

    fn remember(&self, keyword: &str, outcome: Result<Vec<CompanyRecord>, String>) {
        let mut results = self.results.lock().unwrap_or_else(|e| e.into_inner());
        results.insert(keyword.to_string(), outcome);
    }

    async fn get_json(&self, url: &str) -> AdapterResult<String> {
        let request = FetchRequest::new(url, Source::Wanted.site_timeout())
            .with_header("Referer", REFERER)
            .with_header("Accept", JSON_ACCEPT);
        let page = self.fetcher.fetch(&request).await?;
        Ok(page.body)
    }

    async fn fetch_search(&self, url: &str) -> AdapterResult<Vec<CompanyRecord>> {
        let body = self.get_json(url).await?;
        Ok(parse_search_response(&body)?)
    }

    /// Every company the search API returns for `keyword`.
    ///
    /// The API is called at most once per keyword, whether it succeeds or not.
    pub async fn search_all(&self, keyword: &str) -> AdapterResult<Vec<CompanyRecord>> {
        let url = search_url(keyword)?;

        match self.cached(keyword) {
            Some(Ok(records)) => return Ok(records),
            Some(Err(reason)) => return Err(FetchError::PreviouslyFailed { url, reason }.into()),
            None => {}
        }

        match self.fetch_search(&url).await {
            Ok(records) => {
                info!(keyword = %keyword, found = records.len(), "Wanted search returned");
                self.remember(keyword, Ok(records.clone()));
                Ok(records)
            }
            Err(e) => {
                warn!(keyword = %keyword, error = %e, "Wanted search failed");
                self.remember(keyword, Err(e.to_string()));
                Err(e)
            }
        }
    }
}

/// Search API URL for a keyword.
pub fn search_url(keyword: &str) -> Result<String, FetchError> {
    Url::parse_with_params(
        SEARCH_API_URL,
        &[
            ("query", keyword),
            ("tab", "company"),
            ("country", "kr"),
            ("locations", "all"),
        ],
    )
    .map(String::from)
    .map_err(|_| FetchError::InvalidUrl {
        url: SEARCH_API_URL.to_string(),
    })
}

/// Public company page for an id.
pub fn company_page_url(id: &str) -> String {
    format!("{}/company/{}", BASE_URL, id)
}

/// Company records from a search API response.
///
/// A response without `data.companies` is an empty result. Items missing an
/// id or a name are skipped.
pub fn parse_search_response(body: &str) -> Result<Vec<CompanyRecord>, ParseError> {
    let response: SearchResponse = serde_json::from_str(body)?;

    let Some(items) = response.data.and_then(|data| data.companies) else {
        warn!("No company data in Wanted search response");
        return Ok(Vec::new());
    };

    let records = items
        .into_iter()
        .filter_map(|item| match parse_company(item) {
            Ok(record) => Some(record),
            Err(e) => {
                debug!(error = %e, "Skipping Wanted company item");
                None
            }
        })
        .collect();

    Ok(records)
}

fn parse_company(item: serde_json::Value) -> Result<CompanyRecord, ParseError> {
    let raw: RawCompany = serde_json::from_value(item)?;

    let id = raw
        .id
        .as_ref()
        .and_then(CompanyId::to_ref)
        .ok_or(ParseError::MissingField { field: "id" })?;
    let name = raw
        .name
        .filter(|name| !name.trim().is_empty())
        .ok_or(ParseError::MissingField { field: "name" })?;

    let title = format!("{} 채용 정보", name);
    Ok(CompanyRecord::new(name, Source::Wanted)
        .with_detail_url(company_page_url(&id))
        .with_job_title(title))
}

/// Homepage from a company-detail API response; bare hosts get `http://`.
pub fn parse_detail_response(body: &str) -> Result<Option<String>, ParseError> {
    let response: DetailResponse = serde_json::from_str(body)?;

    let link = response
        .company
        .and_then(|company| company.detail)
        .and_then(|detail| detail.link)
        .map(|link| link.trim().to_string())
        .filter(|link| !link.is_empty());

    Ok(link.map(|link| {
        if link.starts_with("http") {
            link
        } else {
            format!("http://{}", link)
        }
    }))
}

/// Numeric company id from either a bare id or a company page URL.
pub fn company_id(company_ref: &str) -> Option<&str> {
    let candidate = company_ref.trim().trim_end_matches('/');
    let candidate = candidate.rsplit('/').next().unwrap_or(candidate);
    (!candidate.is_empty() && candidate.chars().all(|c| c.is_ascii_digit())).then_some(candidate)
}

/// Items on pages `start_page..=end_page` (1-based) of `page_size` each.
///
/// Ranges past the end of the list are clamped.
pub fn paginate<T: Clone>(items: &[T], start_page: u32, end_page: u32, page_size: usize) -> Vec<T> {
    let start = (start_page.max(1) as usize - 1) * page_size;
    let end = (end_page as usize * page_size).min(items.len());
    if start >= end {
        return Vec::new();
    }
    items[start..end].to_vec()
}

#[async_trait]
impl<F: Fetcher> SiteAdapter for WantedAdapter<F> {
    fn source(&self) -> Source {
        Source::Wanted
    }

    fn pagination(&self) -> Pagination {
        Pagination::Client {
            page_size: PAGE_SIZE,
        }
    }

    async fn search_page(&self, keyword: &str, page: u32) -> AdapterResult<Vec<CompanyRecord>> {
        let all = self.search_all(keyword).await?;
        Ok(paginate(&all, page, page, PAGE_SIZE))
    }

    async fn resolve_homepage(&self, company_ref: &str) -> AdapterResult<Option<String>> {
        let Some(id) = company_id(company_ref) else {
            warn!(company_ref = %company_ref, "Invalid Wanted company reference");
            return Ok(None);
        };

        let url = format!("{}/{}", COMPANY_API_URL, id);
        let body = self.get_json(&url).await?;
        let homepage = parse_detail_response(&body)?;

        debug!(company_id = %id, homepage = ?homepage, "Wanted homepage lookup");
        Ok(homepage)
    }
}
