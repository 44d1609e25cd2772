//! Crawl orchestration.
//!
//! One run is `search -> enrich each company -> rank`, executed
//! sequentially with politeness delays between requests. Failures while
//! enriching a company are recorded on that company and the run moves on;
//! only a search stage that yields no page at all ends the run early.

use async_stream::stream;
use futures::{Stream, StreamExt};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::rank::{merge_unique, rank_by_email_count, RunSummary};
use crate::adapters::Adapter;
use crate::error::{AdapterError, CrawlerError, FetchResult, Result};
use crate::extractor::EmailExtractor;
use crate::fetchers::HttpFetcher;
use crate::traits::adapter::{Pagination, SiteAdapter};
use crate::traits::fetcher::Fetcher;
use crate::types::company::{CompanyRecord, Source};
use crate::types::config::CrawlerConfig;
use crate::types::event::ProgressEvent;

/// Batch-mode progress callback: `(current, total, company_name)`.
///
/// May borrow caller state for `'a`.
pub type ProgressCallback<'a> = dyn Fn(usize, usize, &str) + Send + Sync + 'a;

/// Boxed progress stream.
pub type ProgressStream<'a> = Pin<Box<dyn Stream<Item = ProgressEvent> + Send + 'a>>;

/// Check a search request before any fetch is made.
pub fn validate_request(keyword: &str, start_page: u32, end_page: u32) -> Result<()> {
    if keyword.trim().is_empty() {
        return Err(CrawlerError::InvalidRequest {
            reason: "keyword must not be empty".to_string(),
        });
    }
    if start_page < 1 {
        return Err(CrawlerError::InvalidRequest {
            reason: "start_page must be at least 1".to_string(),
        });
    }
    if end_page < start_page {
        return Err(CrawlerError::InvalidRequest {
            reason: format!("end_page ({}) must not be less than start_page ({})", end_page, start_page),
        });
    }
    Ok(())
}

/// Drives one site adapter end to end.
///
/// # Example
///
/// ```rust,ignore
/// use job_crawler::{CrawlOrchestrator, CrawlerConfig, Source};
///
/// let orchestrator = CrawlOrchestrator::for_source(Source::Saramin, CrawlerConfig::default())?;
/// let ranked = orchestrator.crawl_with_emails("백엔드", 1, 2, None).await?;
/// ```
pub struct CrawlOrchestrator<A: SiteAdapter, F: Fetcher> {
    adapter: A,
    extractor: EmailExtractor<F>,
    config: CrawlerConfig,
    cancel: CancellationToken,
}

impl CrawlOrchestrator<Adapter<HttpFetcher>, HttpFetcher> {
    /// Orchestrator with fresh HTTP clients for `source`.
    ///
    /// The site client verifies certificates; the homepage client does not.
    pub fn for_source(source: Source, config: CrawlerConfig) -> FetchResult<Self> {
        let site = HttpFetcher::new(&config)?;
        let homepages = HttpFetcher::lenient(&config)?;

        let extractor = EmailExtractor::new(homepages, source.extract_timeout())
            .with_contact_page_limit(config.contact_page_limit);

        Ok(Self::new(Adapter::for_source(source, site), extractor, config))
    }
}

impl<A: SiteAdapter, F: Fetcher> CrawlOrchestrator<A, F> {
    pub fn new(adapter: A, extractor: EmailExtractor<F>, config: CrawlerConfig) -> Self {
        Self {
            adapter,
            extractor,
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Use an externally owned cancellation token.
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Token that stops this orchestrator's runs at the next suspension point.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    async fn guard<T>(&self, fut: impl Future<Output = T>) -> Result<T> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(CrawlerError::Cancelled),
            out = fut => Ok(out),
        }
    }

    async fn pause(&self, delay: Duration) -> Result<()> {
        if delay.is_zero() {
            if self.cancel.is_cancelled() {
                return Err(CrawlerError::Cancelled);
            }
            return Ok(());
        }
        self.guard(tokio::time::sleep(delay)).await
    }

    /// Search pages `start_page..=end_page` and merge them by the adapter's dedup key.
    ///
    /// A page that fails is logged and skipped. The search fails only when
    /// no page could be fetched.
    pub async fn search(&self, keyword: &str, start_page: u32, end_page: u32) -> Result<Vec<CompanyRecord>> {
        validate_request(keyword, start_page, end_page)?;

        let source = self.adapter.source();
        let total_pages = end_page - start_page + 1;
        let mut found = Vec::new();
        let mut fetched = 0;
        let mut last_error: Option<String> = None;

        for page in start_page..=end_page {
            info!(
                source = %source,
                keyword = %keyword,
                page,
                progress = %format!("{}/{}", page - start_page + 1, total_pages),
                "Searching page"
            );

            match self.guard(self.adapter.search_page(keyword, page)).await? {
                Ok(records) => {
                    fetched += 1;
                    found.extend(records);
                }
                Err(e) => {
                    warn!(source = %source, page, error = %e, "Search page failed, skipping");
                    last_error = Some(e.to_string());
                }
            }

            if page < end_page && self.adapter.pagination() == Pagination::Server {
                self.pause(self.config.page_delay()).await?;
            }
        }

        if fetched == 0 {
            return Err(CrawlerError::BatchAbort {
                reason: last_error.unwrap_or_else(|| "no search page could be fetched".to_string()),
            });
        }

        let listed = found.len();
        let unique = merge_unique(found, |r| self.adapter.dedup_key(r));
        info!(source = %source, keyword = %keyword, listed, unique = unique.len(), "Search complete");

        Ok(unique)
    }

    /// Resolve the homepage and emails of one record in place.
    ///
    /// Adapter and fetch failures are written to `record.error`; only
    /// cancellation is returned as an error.
    pub async fn enrich(&self, record: &mut CompanyRecord) -> Result<()> {
        if record.company_detail_url.is_none() {
            match self.guard(self.adapter.resolve_detail_url(record)).await? {
                Ok(Some(url)) => record.company_detail_url = Some(url),
                Ok(None) => {}
                Err(e) => {
                    contain(record, "company detail lookup failed", e);
                    return Ok(());
                }
            }
        }

        if record.homepage.is_none() {
            if let Some(detail) = record.company_detail_url.clone() {
                match self.guard(self.adapter.resolve_homepage(&detail)).await? {
                    Ok(homepage) => record.homepage = homepage,
                    Err(e) => {
                        contain(record, "homepage lookup failed", e);
                        return Ok(());
                    }
                }
            }
        }

        let Some(homepage) = record.homepage.clone() else {
            debug!(company = %record.company_name, "No homepage, skipping email extraction");
            return Ok(());
        };

        let report = self.guard(self.extractor.extract_report(&homepage)).await?;
        if let Some(error) = report.homepage_error {
            record.error = Some(format!("homepage unreachable: {}", error));
        }
        record.add_emails(report.emails);

        debug!(
            company = %record.company_name,
            homepage = %homepage,
            pages = report.pages_fetched,
            emails = record.email_count(),
            "Company enriched"
        );
        Ok(())
    }

    /// Batch mode: search, enrich every company, and return the ranked list.
    pub async fn crawl_with_emails(
        &self,
        keyword: &str,
        start_page: u32,
        end_page: u32,
        on_progress: Option<&ProgressCallback<'_>>,
    ) -> Result<Vec<CompanyRecord>> {
        let mut records = self.search(keyword, start_page, end_page).await?;
        let total = records.len();
        info!(keyword = %keyword, total, "Extracting emails");

        for (index, record) in records.iter_mut().enumerate() {
            self.enrich(record).await?;

            if let Some(callback) = on_progress {
                callback(index + 1, total, &record.company_name);
            }

            if index + 1 < total {
                self.pause(self.config.company_delay()).await?;
            }
        }

        rank_by_email_count(&mut records);
        self.log_summary(keyword, &records);
        Ok(records)
    }

    /// Streaming mode: the same run as [`crawl_with_emails`](Self::crawl_with_emails),
    /// reported as [`ProgressEvent`]s.
    ///
    /// Nothing runs until the stream is polled, and dropping the stream stops
    /// the run at its next suspension point.
    pub fn crawl_stream(&self, keyword: &str, start_page: u32, end_page: u32) -> ProgressStream<'_> {
        let keyword = keyword.to_string();

        Box::pin(stream! {
            let mut records = match self.search(&keyword, start_page, end_page).await {
                Ok(records) => records,
                Err(e) => {
                    yield ProgressEvent::Error { message: e.to_string() };
                    return;
                }
            };

            let total = records.len();
            yield ProgressEvent::Start { total };

            for index in 0..total {
                if let Err(e) = self.enrich(&mut records[index]).await {
                    yield ProgressEvent::Error { message: e.to_string() };
                    return;
                }

                yield ProgressEvent::Progress {
                    current: index + 1,
                    total,
                    record: records[index].clone(),
                };

                if index + 1 < total {
                    if let Err(e) = self.pause(self.config.company_delay()).await {
                        yield ProgressEvent::Error { message: e.to_string() };
                        return;
                    }
                }
            }

            rank_by_email_count(&mut records);
            self.log_summary(&keyword, &records);
            yield ProgressEvent::Complete { total };
        })
    }

    fn log_summary(&self, keyword: &str, records: &[CompanyRecord]) {
        let summary = RunSummary::of(records);
        info!(
            source = %self.adapter.source(),
            keyword = %keyword,
            companies = summary.companies,
            with_homepage = summary.with_homepage,
            with_emails = summary.with_emails,
            with_errors = summary.with_errors,
            "Crawl complete"
        );
    }
}

impl<A, F> CrawlOrchestrator<A, F>
where
    A: SiteAdapter + 'static,
    F: Fetcher + 'static,
{
    /// Owned variant of [`crawl_stream`](Self::crawl_stream) for handing to a server task.
    pub fn into_stream(self: Arc<Self>, keyword: String, start_page: u32, end_page: u32) -> ProgressStream<'static> {
        Box::pin(stream! {
            let mut events = self.crawl_stream(&keyword, start_page, end_page);
            while let Some(event) = events.next().await {
                yield event;
            }
        })
    }
}

fn contain(record: &mut CompanyRecord, stage: &str, error: AdapterError) {
    warn!(company = %record.company_name, error = %error, "{}", stage);
    record.error = Some(format!("{}: {}", stage, error));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockAdapter, MockFetcher};
    use std::sync::Mutex;

    fn orchestrator(adapter: MockAdapter, fetcher: MockFetcher) -> CrawlOrchestrator<MockAdapter, MockFetcher> {
        let extractor = EmailExtractor::new(fetcher, Duration::from_secs(1));
        CrawlOrchestrator::new(adapter, extractor, CrawlerConfig::without_delays())
    }

    fn company(name: &str) -> CompanyRecord {
        CompanyRecord::new(name, Source::Saramin).with_detail_url(format!("https://site/{}", name))
    }

    #[test]
    fn test_validate_request() {
        assert!(validate_request("rust", 1, 1).is_ok());
        assert!(matches!(validate_request("  ", 1, 1), Err(CrawlerError::InvalidRequest { .. })));
        assert!(matches!(validate_request("rust", 0, 1), Err(CrawlerError::InvalidRequest { .. })));
        assert!(matches!(validate_request("rust", 3, 2), Err(CrawlerError::InvalidRequest { .. })));
    }

    #[tokio::test]
    async fn test_search_skips_failed_page_and_dedups() {
        let adapter = MockAdapter::new(Source::Saramin)
            .with_page(1, vec![company("a"), company("b")])
            .fail_page(2)
            .with_page(3, vec![company("b"), company("c")]);
        let orchestrator = orchestrator(adapter.clone(), MockFetcher::new());

        let records = orchestrator.search("rust", 1, 3).await.unwrap();
        let names: Vec<&str> = records.iter().map(|r| r.company_name.as_str()).collect();

        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(adapter.searched_pages(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_search_aborts_when_no_page_fetched() {
        let adapter = MockAdapter::new(Source::Saramin).fail_page(1).fail_page(2);
        let orchestrator = orchestrator(adapter, MockFetcher::new());

        let result = orchestrator.search("rust", 1, 2).await;
        assert!(matches!(result, Err(CrawlerError::BatchAbort { .. })));
    }

    #[tokio::test]
    async fn test_enrichment_failure_is_contained() {
        let adapter = MockAdapter::new(Source::Saramin)
            .with_page(1, vec![company("a"), company("b"), company("c")])
            .with_homepage("https://site/a", "https://a.co.kr")
            .fail_homepage("https://site/b")
            .with_homepage("https://site/c", "https://c.co.kr");
        let fetcher = MockFetcher::new()
            .with_page("https://a.co.kr", "hr@a.co.kr")
            .with_page("https://c.co.kr", "ceo@c.co.kr sales@c.co.kr");
        let orchestrator = orchestrator(adapter, fetcher);

        let records = orchestrator.crawl_with_emails("rust", 1, 1, None).await.unwrap();
        assert_eq!(records.len(), 3);

        // Ranked: c (2 emails), a (1), b (0)
        let names: Vec<&str> = records.iter().map(|r| r.company_name.as_str()).collect();
        assert_eq!(names, vec!["c", "a", "b"]);

        let failed = &records[2];
        assert!(failed.error.as_deref().is_some_and(|e| !e.is_empty()));
        assert!(records[0].error.is_none());
        assert!(records[1].error.is_none());
    }

    #[tokio::test]
    async fn test_unreachable_homepage_is_recorded() {
        let adapter = MockAdapter::new(Source::Saramin)
            .with_page(1, vec![company("a")])
            .with_homepage("https://site/a", "https://a.co.kr");
        let orchestrator = orchestrator(adapter, MockFetcher::new().fail_url("https://a.co.kr"));

        let records = orchestrator.crawl_with_emails("rust", 1, 1, None).await.unwrap();
        let error = records[0].error.as_deref().unwrap_or_default();
        assert!(error.starts_with("homepage unreachable:"));
        assert_eq!(records[0].homepage.as_deref(), Some("https://a.co.kr"));
    }

    #[tokio::test]
    async fn test_progress_callback_counts_up() {
        let adapter = MockAdapter::new(Source::Saramin).with_page(1, vec![company("a"), company("b")]);
        let orchestrator = orchestrator(adapter, MockFetcher::new());

        let seen = Mutex::new(Vec::new());
        let callback = |current: usize, total: usize, name: &str| {
            seen.lock().unwrap().push((current, total, name.to_string()));
        };

        orchestrator
            .crawl_with_emails("rust", 1, 1, Some(&callback))
            .await
            .unwrap();

        assert_eq!(
            seen.into_inner().unwrap(),
            vec![(1, 2, "a".to_string()), (2, 2, "b".to_string())]
        );
    }

    #[tokio::test]
    async fn test_detail_hop_runs_before_homepage() {
        let listed = CompanyRecord::new("에이크미", Source::JobKorea).with_job_url("https://jk/job/1");
        let adapter = MockAdapter::new(Source::JobKorea)
            .dedup_by_name()
            .with_page(1, vec![listed])
            .with_detail_url("에이크미", "https://jk/company/1")
            .with_homepage("https://jk/company/1", "https://acme.co.kr");
        let fetcher = MockFetcher::new().with_page("https://acme.co.kr", "info@acme.co.kr");
        let orchestrator = orchestrator(adapter, fetcher);

        let records = orchestrator.crawl_with_emails("rust", 1, 1, None).await.unwrap();
        assert_eq!(records[0].company_detail_url.as_deref(), Some("https://jk/company/1"));
        assert_eq!(records[0].emails, vec!["info@acme.co.kr"]);
    }

    #[tokio::test]
    async fn test_stream_event_order() {
        let companies: Vec<CompanyRecord> = (0..5).map(|i| company(&format!("c{}", i))).collect();
        let adapter = MockAdapter::new(Source::Saramin).with_page(1, companies);
        let orchestrator = orchestrator(adapter, MockFetcher::new());

        let events: Vec<ProgressEvent> = orchestrator.crawl_stream("rust", 1, 1).collect().await;

        assert_eq!(events.len(), 7);
        assert_eq!(events[0], ProgressEvent::Start { total: 5 });
        for (i, event) in events[1..6].iter().enumerate() {
            match event {
                ProgressEvent::Progress { current, total, record } => {
                    assert_eq!(*current, i + 1);
                    assert_eq!(*total, 5);
                    assert_eq!(record.company_name, format!("c{}", i));
                }
                other => panic!("expected progress, got {:?}", other),
            }
        }
        assert_eq!(events[6], ProgressEvent::Complete { total: 5 });
    }

    #[tokio::test]
    async fn test_stream_search_failure_is_single_error() {
        let adapter = MockAdapter::new(Source::Saramin).fail_page(1);
        let orchestrator = orchestrator(adapter, MockFetcher::new());

        let events: Vec<ProgressEvent> = orchestrator.crawl_stream("rust", 1, 1).collect().await;
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], ProgressEvent::Error { .. }));
    }

    #[tokio::test]
    async fn test_cancelled_stream_ends_with_error() {
        let adapter = MockAdapter::new(Source::Saramin).with_page(1, vec![company("a"), company("b")]);
        let orchestrator = orchestrator(adapter, MockFetcher::new());
        let cancel = orchestrator.cancel_token();

        let mut stream = orchestrator.crawl_stream("rust", 1, 1);
        assert_eq!(stream.next().await, Some(ProgressEvent::Start { total: 2 }));

        cancel.cancel();
        let next = stream.next().await;
        assert!(matches!(next, Some(ProgressEvent::Error { .. })));
        assert_eq!(stream.next().await, None);
    }

    #[tokio::test]
    async fn test_client_pagination_skips_page_delay() {
        let adapter = MockAdapter::new(Source::Wanted)
            .with_pagination(Pagination::Client { page_size: 10 })
            .with_page(1, vec![company("a")])
            .with_page(2, vec![company("b")]);
        let extractor = EmailExtractor::new(MockFetcher::new(), Duration::from_secs(1));
        let config = CrawlerConfig::default().with_page_delay_ms(60_000);
        let orchestrator = CrawlOrchestrator::new(adapter, extractor, config);

        let records = tokio::time::timeout(Duration::from_secs(5), orchestrator.search("rust", 1, 2))
            .await
            .expect("client-side pages are not paced")
            .unwrap();
        assert_eq!(records.len(), 2);
    }

    #[tokio::test]
    async fn test_into_stream_is_owned() {
        let adapter = MockAdapter::new(Source::Saramin).with_page(1, vec![company("a")]);
        let orchestrator = Arc::new(orchestrator(adapter, MockFetcher::new()));

        let handle = tokio::spawn(async move {
            orchestrator
                .into_stream("rust".to_string(), 1, 1)
                .collect::<Vec<_>>()
                .await
        });

        let events = handle.await.unwrap();
        assert_eq!(events.len(), 3);
        assert!(events[2].is_terminal());
    }
}
