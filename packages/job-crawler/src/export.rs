//! Flattened export rows and the CSV export sink.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::error::{ExportError, ExportResult};
use crate::traits::sink::{ExportOutcome, ExportSink};
use crate::types::company::CompanyRecord;

/// Column headers, in row order.
pub const EXPORT_HEADERS: [&str; 8] = [
    "회사명",
    "채용공고 제목",
    "대표 이메일",
    "추가 이메일",
    "홈페이지",
    "채용사이트 링크",
    "기업정보 링크",
    "수집 출처",
];

/// One company as a spreadsheet row. Missing values are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRow {
    pub company_name: String,
    pub job_title: String,

    /// First discovered email
    pub primary_email: String,

    /// Remaining emails joined by `", "`
    pub additional_emails: String,

    pub homepage: String,
    pub job_posting_url: String,
    pub company_detail_url: String,
    pub source: String,
}

impl ExportRow {
    /// Cells in [`EXPORT_HEADERS`] order.
    pub fn fields(&self) -> [&str; 8] {
        [
            &self.company_name,
            &self.job_title,
            &self.primary_email,
            &self.additional_emails,
            &self.homepage,
            &self.job_posting_url,
            &self.company_detail_url,
            &self.source,
        ]
    }
}

impl From<&CompanyRecord> for ExportRow {
    fn from(record: &CompanyRecord) -> Self {
        let (primary, rest) = match record.emails.split_first() {
            Some((first, rest)) => (first.clone(), rest.join(", ")),
            None => (String::new(), String::new()),
        };

        Self {
            company_name: record.company_name.clone(),
            job_title: record.job_title.clone().unwrap_or_default(),
            primary_email: primary,
            additional_emails: rest,
            homepage: record.homepage.clone().unwrap_or_default(),
            job_posting_url: record.job_posting_url.clone().unwrap_or_default(),
            company_detail_url: record.company_detail_url.clone().unwrap_or_default(),
            source: record.source.as_str().to_string(),
        }
    }
}

/// Flatten ranked records into export rows, order preserved.
pub fn flatten(records: &[CompanyRecord]) -> Vec<ExportRow> {
    records.iter().map(ExportRow::from).collect()
}

/// Write a header row followed by `rows` as CSV.
pub fn write_csv<W: Write>(rows: &[ExportRow], writer: W) -> ExportResult<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(EXPORT_HEADERS)?;
    for row in rows {
        csv.write_record(row.fields())?;
    }
    csv.flush()?;
    Ok(())
}

/// Writes each export to `<dir>/<target>.csv`, replacing any previous file.
#[derive(Debug, Clone)]
pub struct CsvExportSink {
    dir: PathBuf,
}

impl CsvExportSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// File path for a target name. Names that could leave the export
    /// directory are rejected.
    pub fn path_for(&self, target: &str) -> ExportResult<PathBuf> {
        let name = target.trim();
        if name.is_empty() || name.contains('/') || name.contains('\\') || name.contains("..") {
            return Err(ExportError::InvalidTarget(target.to_string()));
        }
        Ok(self.dir.join(format!("{}.csv", name)))
    }

    /// Write `rows` and return the written path.
    pub async fn write(&self, rows: &[ExportRow], target: &str) -> ExportResult<PathBuf> {
        let path = self.path_for(target)?;
        let dir = self.dir.clone();
        let rows = rows.to_vec();
        let out = path.clone();

        tokio::task::spawn_blocking(move || -> ExportResult<()> {
            std::fs::create_dir_all(&dir)?;
            let file = std::fs::File::create(&out)?;
            write_csv(&rows, file)
        })
        .await
        .map_err(|e| ExportError::Io(std::io::Error::other(e.to_string())))??;

        Ok(path)
    }
}

#[async_trait]
impl ExportSink for CsvExportSink {
    async fn export(&self, rows: &[ExportRow], target: &str) -> ExportOutcome {
        match self.write(rows, target).await {
            Ok(path) => {
                info!(path = %path.display(), rows = rows.len(), "Export written");
                ExportOutcome::ok(format!("{} companies written to {}", rows.len(), path.display()))
            }
            Err(e) => {
                warn!(target = %target, error = %e, "Export failed");
                ExportOutcome::failed(e.to_string())
            }
        }
    }
}
