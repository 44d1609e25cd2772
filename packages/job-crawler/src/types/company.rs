//! Company records and the recruiting sites they come from.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Recruiting site a record was discovered on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Saramin,
    JobKorea,
    Wanted,
}

impl Source {
    /// All supported sources, in the order they are advertised.
    pub const ALL: [Source; 3] = [Source::Saramin, Source::JobKorea, Source::Wanted];

    /// Stable lowercase tag used on the wire and in exports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Saramin => "saramin",
            Source::JobKorea => "jobkorea",
            Source::Wanted => "wanted",
        }
    }

    /// Timeout for requests against the recruiting site itself.
    pub fn site_timeout(&self) -> Duration {
        match self {
            Source::Saramin => Duration::from_secs(10),
            Source::JobKorea | Source::Wanted => Duration::from_secs(15),
        }
    }

    /// Timeout for homepage and contact-page fetches during email extraction.
    pub fn extract_timeout(&self) -> Duration {
        match self {
            Source::Saramin => Duration::from_secs(8),
            Source::JobKorea | Source::Wanted => Duration::from_secs(10),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a source name is not one of the known adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported source: {0}")]
pub struct UnknownSource(pub String);

impl FromStr for Source {
    type Err = UnknownSource;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "saramin" => Ok(Source::Saramin),
            "jobkorea" => Ok(Source::JobKorea),
            "wanted" => Ok(Source::Wanted),
            _ => Err(UnknownSource(s.to_string())),
        }
    }
}

/// One company discovered through a job listing.
///
/// Created by an adapter's search step with no homepage and no emails, then
/// filled in by the orchestrator. Field names on the wire are the ones the web client
/// reads (`company_url`, `job_url`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyRecord {
    pub company_name: String,

    /// Source-site page that links to the company homepage
    #[serde(rename = "company_url", default)]
    pub company_detail_url: Option<String>,

    #[serde(rename = "job_url", default)]
    pub job_posting_url: Option<String>,

    #[serde(default)]
    pub job_title: Option<String>,

    #[serde(default)]
    pub homepage: Option<String>,

    /// Validated addresses in discovery order, unique ignoring case
    #[serde(default)]
    pub emails: Vec<String>,

    pub source: Source,

    /// Last contained enrichment failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CompanyRecord {
    pub fn new(company_name: impl Into<String>, source: Source) -> Self {
        Self {
            company_name: company_name.into(),
            company_detail_url: None,
            job_posting_url: None,
            job_title: None,
            homepage: None,
            emails: Vec::new(),
            source,
            error: None,
        }
    }

    pub fn with_detail_url(mut self, url: impl Into<String>) -> Self {
        self.company_detail_url = Some(url.into());
        self
    }

    pub fn with_job_url(mut self, url: impl Into<String>) -> Self {
        self.job_posting_url = Some(url.into());
        self
    }

    pub fn with_job_title(mut self, title: impl Into<String>) -> Self {
        self.job_title = Some(title.into());
        self
    }

    pub fn with_homepage(mut self, homepage: impl Into<String>) -> Self {
        self.homepage = Some(homepage.into());
        self
    }

    /// Append an address unless an equal one (ignoring case) is already present.
    ///
    /// Returns `true` if the address was added.
    pub fn add_email(&mut self, email: impl Into<String>) -> bool {
        let email = email.into();
        if self.emails.iter().any(|e| e.eq_ignore_ascii_case(&email)) {
            return false;
        }
        self.emails.push(email);
        true
    }

    /// Append several addresses, keeping discovery order.
    pub fn add_emails<I, S>(&mut self, emails: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for email in emails {
            self.add_email(email);
        }
    }

    pub fn email_count(&self) -> usize {
        self.emails.len()
    }

    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_parse() {
        assert_eq!("saramin".parse::<Source>().unwrap(), Source::Saramin);
        assert_eq!(" JobKorea ".parse::<Source>().unwrap(), Source::JobKorea);
        assert_eq!("WANTED".parse::<Source>().unwrap(), Source::Wanted);
        assert!("indeed".parse::<Source>().is_err());
    }

    #[test]
    fn test_add_email_dedups_ignoring_case() {
        let mut record = CompanyRecord::new("Acme", Source::Saramin);
        assert!(record.add_email("Info@Acme.co.kr"));
        assert!(!record.add_email("info@acme.co.kr"));
        assert!(record.add_email("hr@acme.co.kr"));

        assert_eq!(record.emails, vec!["Info@Acme.co.kr", "hr@acme.co.kr"]);
    }

    #[test]
    fn test_wire_field_names() {
        let record = CompanyRecord::new("에이컴퍼니", Source::JobKorea)
            .with_detail_url("https://www.jobkorea.co.kr/Recruit/Co_Read/C/1")
            .with_job_url("https://www.jobkorea.co.kr/Recruit/GI_Read/2");

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["company_name"], "에이컴퍼니");
        assert_eq!(json["company_url"], "https://www.jobkorea.co.kr/Recruit/Co_Read/C/1");
        assert_eq!(json["job_url"], "https://www.jobkorea.co.kr/Recruit/GI_Read/2");
        assert_eq!(json["source"], "jobkorea");
        assert!(json.get("error").is_none());
    }
}
