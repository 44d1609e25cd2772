//! Export sink for ranked results.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::export::ExportRow;

/// Outcome reported by a sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportOutcome {
    pub success: bool,
    pub message: String,
}

impl ExportOutcome {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Destination for flattened result rows (spreadsheet, CSV file, ...).
#[async_trait]
pub trait ExportSink: Send + Sync {
    /// Replace the contents of `target` with `rows`.
    async fn export(&self, rows: &[ExportRow], target: &str) -> ExportOutcome;
}
