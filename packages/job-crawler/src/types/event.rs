//! Progress events emitted by one pipeline run.

use serde::{Deserialize, Serialize};

use crate::types::company::CompanyRecord;

/// Lifecycle event of a crawl run.
///
/// A run emits exactly one `Start`, then `total` `Progress` events with
/// `current` counting up from 1, then one terminal `Complete`. A run whose
/// search stage fails emits a single `Error` and nothing else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressEvent {
    Start {
        total: usize,
    },
    Progress {
        current: usize,
        total: usize,
        #[serde(rename = "company")]
        record: CompanyRecord,
    },
    Complete {
        total: usize,
    },
    Error {
        message: String,
    },
}

impl ProgressEvent {
    /// Whether this event ends the run.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProgressEvent::Complete { .. } | ProgressEvent::Error { .. })
    }

    /// Serialize as one line of JSON. Non-ASCII text is written as-is.
    pub fn to_json_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Serialize as a Server-Sent-Events `data:` frame.
    pub fn to_sse_frame(&self) -> serde_json::Result<String> {
        Ok(format!("data: {}\n\n", self.to_json_line()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::company::Source;

    #[test]
    fn test_event_tags() {
        let start = ProgressEvent::Start { total: 5 };
        assert_eq!(start.to_json_line().unwrap(), r#"{"type":"start","total":5}"#);

        let error = ProgressEvent::Error {
            message: "boom".to_string(),
        };
        assert_eq!(
            error.to_json_line().unwrap(),
            r#"{"type":"error","message":"boom"}"#
        );
        assert!(error.is_terminal());
        assert!(!start.is_terminal());
    }

    #[test]
    fn test_progress_keeps_non_ascii() {
        let event = ProgressEvent::Progress {
            current: 1,
            total: 1,
            record: CompanyRecord::new("주식회사 테스트", Source::Saramin),
        };

        let frame = event.to_sse_frame().unwrap();
        assert!(frame.starts_with("data: {\"type\":\"progress\""));
        assert!(frame.contains("주식회사 테스트"));
        assert!(frame.contains("\"company\":{"));
        assert!(frame.ends_with("\n\n"));
    }
}
