//! Job-Listing Company Email Crawler
//!
//! Finds companies that post job listings on Korean recruiting sites,
//! resolves each company's own homepage, and mines that homepage (plus a few
//! contact pages) for publishable email addresses.
//!
//! # Pipeline
//!
//! ```text
//! SiteAdapter::search_page ─► CrawlOrchestrator ─► EmailExtractor ─► ProgressEvent
//!   (saramin / jobkorea /      (dedup, pacing,      (homepage +        (batch result
//!    wanted)                    containment, rank)   contact pages)     or stream)
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use futures::StreamExt;
//! use job_crawler::{CrawlOrchestrator, CrawlerConfig, Source};
//!
//! let orchestrator = CrawlOrchestrator::for_source(Source::Saramin, CrawlerConfig::default())?;
//!
//! // Batch: ranked list, most emails first
//! let companies = orchestrator.crawl_with_emails("백엔드", 1, 2, None).await?;
//!
//! // Streaming: Start, one Progress per company, Complete
//! let mut events = orchestrator.crawl_stream("백엔드", 1, 2);
//! while let Some(event) = events.next().await {
//!     println!("{}", event.to_json_line()?);
//! }
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Capability seams (Fetcher, SiteAdapter, ExportSink)
//! - [`types`] - Company records, progress events, configuration
//! - [`adapters`] - Site adapters and homepage rules
//! - [`fetchers`] - HTTP fetcher
//! - [`validator`] - Email validation
//! - [`extractor`] - Homepage email extraction
//! - [`pipeline`] - Orchestration, dedup, ranking
//! - [`export`] - Row flattening and CSV export
//! - [`testing`] - Mock implementations for testing

pub mod adapters;
pub mod error;
pub mod export;
pub mod extractor;
pub mod fetchers;
mod html;
pub mod pipeline;
pub mod testing;
pub mod traits;
pub mod types;
pub mod validator;

// Re-export core types at crate root
pub use error::{
    AdapterError, AdapterResult, CrawlerError, ExportError, ExportResult, FetchError, FetchResult,
    ParseError, Result,
};
pub use traits::{
    adapter::{Pagination, SiteAdapter},
    fetcher::{FetchRequest, FetchedPage, Fetcher},
    sink::{ExportOutcome, ExportSink},
};
pub use types::{
    company::{CompanyRecord, Source, UnknownSource},
    config::CrawlerConfig,
    event::ProgressEvent,
};

pub use adapters::{Adapter, HomepageResolver, HomepageRule, JobKoreaAdapter, SaraminAdapter, WantedAdapter};
pub use export::{flatten, CsvExportSink, ExportRow, EXPORT_HEADERS};
pub use extractor::{EmailExtractor, ExtractionReport};
pub use fetchers::HttpFetcher;
pub use pipeline::{
    merge_unique, rank_by_email_count, validate_request, CrawlOrchestrator, ProgressCallback,
    ProgressStream, RunSummary,
};
pub use validator::{extract_emails, is_valid_email};
