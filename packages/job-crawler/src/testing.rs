//! Testing utilities including mock implementations.
//!
//! These are useful for testing applications that use the crawler library
//! without making real network calls.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use crate::error::{AdapterResult, FetchError, FetchResult};
use crate::export::ExportRow;
use crate::traits::{
    adapter::{Pagination, SiteAdapter},
    fetcher::{FetchRequest, FetchedPage, Fetcher},
    sink::{ExportOutcome, ExportSink},
};
use crate::types::company::{CompanyRecord, Source};

#[derive(Debug, Clone)]
enum MockResponse {
    Page { final_url: String, body: String },
    Status(u16),
    Timeout,
}

/// A mock fetcher serving canned responses by exact URL.
///
/// Unknown URLs answer 404. Clones share responses and the request log.
#[derive(Clone, Default)]
pub struct MockFetcher {
    responses: Arc<RwLock<HashMap<String, MockResponse>>>,

    /// Call tracking for assertions
    requests: Arc<RwLock<Vec<FetchRequest>>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` for `url`.
    pub fn with_page(self, url: impl Into<String>, body: impl Into<String>) -> Self {
        let url = url.into();
        self.responses.write().unwrap().insert(
            url.clone(),
            MockResponse::Page {
                final_url: url,
                body: body.into(),
            },
        );
        self
    }

    /// Serve `body` for `url` as if the request was redirected to `final_url`.
    pub fn with_redirect(
        self,
        url: impl Into<String>,
        final_url: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        self.responses.write().unwrap().insert(
            url.into(),
            MockResponse::Page {
                final_url: final_url.into(),
                body: body.into(),
            },
        );
        self
    }

    /// Answer `url` with a non-2xx status.
    pub fn with_status(self, url: impl Into<String>, status: u16) -> Self {
        self.responses
            .write()
            .unwrap()
            .insert(url.into(), MockResponse::Status(status));
        self
    }

    /// Make `url` time out.
    pub fn fail_url(self, url: impl Into<String>) -> Self {
        self.responses
            .write()
            .unwrap()
            .insert(url.into(), MockResponse::Timeout);
        self
    }

    /// URLs requested so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.requests
            .read()
            .unwrap()
            .iter()
            .map(|r| r.url.clone())
            .collect()
    }

    /// Full requests made so far, in order.
    pub fn requests(&self) -> Vec<FetchRequest> {
        self.requests.read().unwrap().clone()
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(&self, request: &FetchRequest) -> FetchResult<FetchedPage> {
        self.requests.write().unwrap().push(request.clone());

        let response = self.responses.read().unwrap().get(&request.url).cloned();
        match response {
            Some(MockResponse::Page { final_url, body }) => Ok(FetchedPage::new(final_url, body)),
            Some(MockResponse::Status(status)) => Err(FetchError::Status {
                url: request.url.clone(),
                status,
            }),
            Some(MockResponse::Timeout) => Err(FetchError::Timeout {
                url: request.url.clone(),
            }),
            None => Err(FetchError::Status {
                url: request.url.clone(),
                status: 404,
            }),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Record of a call made to the mock adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockAdapterCall {
    SearchPage { keyword: String, page: u32 },
    ResolveDetailUrl { company_name: String },
    ResolveHomepage { company_ref: String },
}

/// A scripted site adapter.
///
/// Pages and homepages are keyed by page number and company reference.
/// Unscripted pages are empty and unscripted references have no homepage.
/// Records are deduplicated by detail URL unless
/// [`dedup_by_name`](Self::dedup_by_name) is set.
#[derive(Clone)]
pub struct MockAdapter {
    source: Source,
    pagination: Pagination,
    by_name: bool,
    pages: Arc<RwLock<HashMap<u32, Vec<CompanyRecord>>>>,
    failing_pages: Arc<RwLock<HashSet<u32>>>,
    detail_urls: Arc<RwLock<HashMap<String, String>>>,
    homepages: Arc<RwLock<HashMap<String, String>>>,
    failing_refs: Arc<RwLock<HashSet<String>>>,
    calls: Arc<RwLock<Vec<MockAdapterCall>>>,
}

impl MockAdapter {
    pub fn new(source: Source) -> Self {
        Self {
            source,
            pagination: Pagination::Server,
            by_name: false,
            pages: Default::default(),
            failing_pages: Default::default(),
            detail_urls: Default::default(),
            homepages: Default::default(),
            failing_refs: Default::default(),
            calls: Default::default(),
        }
    }

    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = pagination;
        self
    }

    /// Deduplicate by company name instead of detail URL.
    pub fn dedup_by_name(mut self) -> Self {
        self.by_name = true;
        self
    }

    /// Results for one search page.
    pub fn with_page(self, page: u32, records: Vec<CompanyRecord>) -> Self {
        self.pages.write().unwrap().insert(page, records);
        self
    }

    /// Make a search page fail with a fetch error.
    pub fn fail_page(self, page: u32) -> Self {
        self.failing_pages.write().unwrap().insert(page);
        self
    }

    /// Detail URL returned for a company listed without one.
    pub fn with_detail_url(self, company_name: impl Into<String>, url: impl Into<String>) -> Self {
        self.detail_urls
            .write()
            .unwrap()
            .insert(company_name.into(), url.into());
        self
    }

    /// Homepage for a company reference.
    pub fn with_homepage(self, company_ref: impl Into<String>, homepage: impl Into<String>) -> Self {
        self.homepages
            .write()
            .unwrap()
            .insert(company_ref.into(), homepage.into());
        self
    }

    /// Make homepage resolution fail for a company reference.
    pub fn fail_homepage(self, company_ref: impl Into<String>) -> Self {
        self.failing_refs.write().unwrap().insert(company_ref.into());
        self
    }

    /// Get all calls made to this mock.
    pub fn calls(&self) -> Vec<MockAdapterCall> {
        self.calls.read().unwrap().clone()
    }

    /// Page numbers searched so far, in order.
    pub fn searched_pages(&self) -> Vec<u32> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                MockAdapterCall::SearchPage { page, .. } => Some(page),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl SiteAdapter for MockAdapter {
    fn source(&self) -> Source {
        self.source
    }

    async fn search_page(&self, keyword: &str, page: u32) -> AdapterResult<Vec<CompanyRecord>> {
        self.calls.write().unwrap().push(MockAdapterCall::SearchPage {
            keyword: keyword.to_string(),
            page,
        });

        if self.failing_pages.read().unwrap().contains(&page) {
            return Err(FetchError::Timeout {
                url: format!("mock://search/{}", page),
            }
            .into());
        }

        Ok(self
            .pages
            .read()
            .unwrap()
            .get(&page)
            .cloned()
            .unwrap_or_default())
    }

    fn dedup_key<'a>(&self, record: &'a CompanyRecord) -> Option<&'a str> {
        if self.by_name {
            Some(record.company_name.as_str())
        } else {
            record.company_detail_url.as_deref()
        }
    }

    fn pagination(&self) -> Pagination {
        self.pagination
    }

    async fn resolve_detail_url(&self, record: &CompanyRecord) -> AdapterResult<Option<String>> {
        self.calls
            .write()
            .unwrap()
            .push(MockAdapterCall::ResolveDetailUrl {
                company_name: record.company_name.clone(),
            });

        Ok(self
            .detail_urls
            .read()
            .unwrap()
            .get(&record.company_name)
            .cloned())
    }

    async fn resolve_homepage(&self, company_ref: &str) -> AdapterResult<Option<String>> {
        self.calls
            .write()
            .unwrap()
            .push(MockAdapterCall::ResolveHomepage {
                company_ref: company_ref.to_string(),
            });

        if self.failing_refs.read().unwrap().contains(company_ref) {
            return Err(FetchError::Status {
                url: company_ref.to_string(),
                status: 503,
            }
            .into());
        }

        Ok(self.homepages.read().unwrap().get(company_ref).cloned())
    }
}

/// An export sink that keeps every export in memory.
#[derive(Clone, Default)]
pub struct MemorySink {
    exports: Arc<RwLock<Vec<(String, Vec<ExportRow>)>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// `(target, rows)` for every export so far.
    pub fn exports(&self) -> Vec<(String, Vec<ExportRow>)> {
        self.exports.read().unwrap().clone()
    }
}

#[async_trait]
impl ExportSink for MemorySink {
    async fn export(&self, rows: &[ExportRow], target: &str) -> ExportOutcome {
        self.exports
            .write()
            .unwrap()
            .push((target.to_string(), rows.to_vec()));
        ExportOutcome::ok(format!("{} rows stored", rows.len()))
    }
}
