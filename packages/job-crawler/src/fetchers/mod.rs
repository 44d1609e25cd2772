//! Fetcher implementations.
//!
//! - `HttpFetcher` - reqwest client with browser-like headers
//!
//! A mock lives in [`crate::testing`].

mod http;

pub use http::HttpFetcher;

// Re-export from traits for convenience
pub use crate::traits::fetcher::{FetchRequest, FetchedPage, Fetcher};
