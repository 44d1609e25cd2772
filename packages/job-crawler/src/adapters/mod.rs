//! Site adapter implementations.
//!
//! - `SaraminAdapter` - HTML search, company-info page with the homepage
//! - `JobKoreaAdapter` - HTML job cards, two-hop company page lookup
//! - `WantedAdapter` - JSON search API, client-side pagination
//!
//! [`Adapter`] picks one of them at runtime from a [`Source`].

pub mod homepage;
pub mod jobkorea;
pub mod saramin;
pub mod wanted;

use async_trait::async_trait;

pub use homepage::{HomepageResolver, HomepageRule};
pub use jobkorea::JobKoreaAdapter;
pub use saramin::SaraminAdapter;
pub use wanted::WantedAdapter;

use crate::error::AdapterResult;
use crate::traits::adapter::{Pagination, SiteAdapter};
use crate::traits::fetcher::Fetcher;
use crate::types::company::{CompanyRecord, Source};

/// Any of the supported site adapters.
pub enum Adapter<F: Fetcher> {
    Saramin(SaraminAdapter<F>),
    JobKorea(JobKoreaAdapter<F>),
    Wanted(WantedAdapter<F>),
}

impl<F: Fetcher> Adapter<F> {
    pub fn for_source(source: Source, fetcher: F) -> Self {
        match source {
            Source::Saramin => Adapter::Saramin(SaraminAdapter::new(fetcher)),
            Source::JobKorea => Adapter::JobKorea(JobKoreaAdapter::new(fetcher)),
            Source::Wanted => Adapter::Wanted(WantedAdapter::new(fetcher)),
        }
    }

    fn inner(&self) -> &dyn SiteAdapter {
        match self {
            Adapter::Saramin(a) => a,
            Adapter::JobKorea(a) => a,
            Adapter::Wanted(a) => a,
        }
    }
}

#[async_trait]
impl<F: Fetcher> SiteAdapter for Adapter<F> {
    fn source(&self) -> Source {
        self.inner().source()
    }

    async fn search_page(&self, keyword: &str, page: u32) -> AdapterResult<Vec<CompanyRecord>> {
        self.inner().search_page(keyword, page).await
    }

    fn dedup_key<'a>(&self, record: &'a CompanyRecord) -> Option<&'a str> {
        self.inner().dedup_key(record)
    }

    fn pagination(&self) -> Pagination {
        self.inner().pagination()
    }

    async fn resolve_detail_url(&self, record: &CompanyRecord) -> AdapterResult<Option<String>> {
        self.inner().resolve_detail_url(record).await
    }

    async fn resolve_homepage(&self, company_ref: &str) -> AdapterResult<Option<String>> {
        self.inner().resolve_homepage(company_ref).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockFetcher;

    #[test]
    fn test_for_source_dispatch() {
        for source in Source::ALL {
            let adapter = Adapter::for_source(source, MockFetcher::new());
            assert_eq!(adapter.source(), source);
        }

        let wanted = Adapter::for_source(Source::Wanted, MockFetcher::new());
        assert_eq!(wanted.pagination(), Pagination::Client { page_size: 10 });

        let saramin = Adapter::for_source(Source::Saramin, MockFetcher::new());
        assert_eq!(saramin.pagination(), Pagination::Server);
    }
}
