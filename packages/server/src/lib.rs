// Job Crawler - API Core
//
// HTTP boundary for the company email crawler: request validation, JSON
// batch endpoints, an SSE progress stream and CSV export.

pub mod config;
pub mod server;

pub use config::*;
