//! Core trait abstractions for the crawler library.
//!
//! These are the seams the orchestrator is written against: HTTP fetching,
//! site-specific search and homepage resolution, and the export sink.

pub mod adapter;
pub mod fetcher;
pub mod sink;
