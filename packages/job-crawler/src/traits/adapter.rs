//! Site adapter capability set.

use async_trait::async_trait;

use crate::error::AdapterResult;
use crate::types::company::{CompanyRecord, Source};

/// How an adapter's result pages map onto requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pagination {
    /// Every page is its own request; requests are paced.
    Server,

    /// One request returns a flat list that is sliced into pages locally.
    Client { page_size: usize },
}

/// Site-specific search and homepage resolution.
///
/// Every operation works on a single unit (one result page, one company) and
/// reports failure for that unit only. Pacing, deduplication across pages, and
/// containment are the orchestrator's job.
#[async_trait]
pub trait SiteAdapter: Send + Sync {
    /// Site this adapter crawls.
    fn source(&self) -> Source;

    /// Fetch and parse one page of search results.
    ///
    /// Listings that fail to parse are skipped; an error means the whole page
    /// could not be fetched or read.
    async fn search_page(&self, keyword: &str, page: u32) -> AdapterResult<Vec<CompanyRecord>>;

    /// Key used to collapse repeated listings into one company.
    ///
    /// Records without a key are dropped during the merge.
    fn dedup_key<'a>(&self, record: &'a CompanyRecord) -> Option<&'a str> {
        record.company_detail_url.as_deref()
    }

    fn pagination(&self) -> Pagination {
        Pagination::Server
    }

    /// Indirection hop that finds the company-detail URL for a record that
    /// was listed without one. Adapters whose listings already carry the
    /// detail URL keep the default.
    async fn resolve_detail_url(&self, _record: &CompanyRecord) -> AdapterResult<Option<String>> {
        Ok(None)
    }

    /// Resolve the company's own homepage from its detail reference.
    async fn resolve_homepage(&self, company_ref: &str) -> AdapterResult<Option<String>>;
}
