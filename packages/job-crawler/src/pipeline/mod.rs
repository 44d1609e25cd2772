//! Crawl pipeline: search, enrichment, ranking, progress reporting.

pub mod orchestrator;
pub mod rank;

pub use orchestrator::{validate_request, CrawlOrchestrator, ProgressCallback, ProgressStream};
pub use rank::{merge_unique, rank_by_email_count, RunSummary};
