//! Typed errors for the crawler library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) so callers can tell a
//! contained per-unit failure apart from a run-level abort.

use thiserror::Error;

/// Errors raised while fetching a single URL.
///
/// Never fatal to a run: the affected page or record degrades to "no data".
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport failure (DNS, connect, TLS, body read)
    #[error("HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Server answered with a non-2xx status
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    /// Request exceeded its timeout
    #[error("timeout fetching: {url}")]
    Timeout { url: String },

    /// URL could not be parsed or has no host
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },

    /// The same request already failed earlier in this run; not re-sent
    #[error("earlier request to {url} failed: {reason}")]
    PreviouslyFailed { url: String, reason: String },
}

/// Errors raised while interpreting one listing, field, or JSON document.
#[derive(Debug, Error)]
pub enum ParseError {
    /// A listing card did not have the expected shape
    #[error("malformed listing: {reason}")]
    Listing { reason: String },

    /// A required field was absent
    #[error("missing field: {field}")]
    MissingField { field: &'static str },

    /// JSON body did not deserialize
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Per-unit error returned by a site adapter operation.
///
/// The orchestrator contains these: they are recorded on the affected
/// record (or logged for a search page) and never abort sibling units.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Run-level errors. Only these end a run with a terminal error event.
#[derive(Debug, Error)]
pub enum CrawlerError {
    /// Request parameters were rejected before any fetch
    #[error("invalid request: {reason}")]
    InvalidRequest { reason: String },

    /// The search stage could not produce any page
    #[error("search failed: {reason}")]
    BatchAbort { reason: String },

    /// The run was cancelled through its cancellation token
    #[error("operation cancelled")]
    Cancelled,
}

/// Errors from writing exported rows.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("export I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Export target name was empty or escaped the export directory
    #[error("invalid export target: {0}")]
    InvalidTarget(String),
}

/// Result type alias for fetch operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Result type alias for adapter operations.
pub type AdapterResult<T> = std::result::Result<T, AdapterError>;

/// Result type alias for run-level operations.
pub type Result<T> = std::result::Result<T, CrawlerError>;

/// Result type alias for export operations.
pub type ExportResult<T> = std::result::Result<T, ExportError>;
