use std::str::FromStr;

use axum::{extract::Extension, Json};
use job_crawler::{validate_request, CompanyRecord, ProgressCallback, RunSummary, Source};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::server::app::AppState;
use crate::server::error::ApiError;

pub const DEFAULT_START_PAGE: u32 = 1;
/// Pages crawled when neither `end_page` nor `pages` is given.
pub const DEFAULT_PAGE_COUNT: u32 = 5;

/// Body shared by the search, crawl and stream endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CrawlRequest {
    pub keyword: String,

    #[serde(default)]
    pub start_page: Option<u32>,

    #[serde(default)]
    pub end_page: Option<u32>,

    /// Page count from page 1. Used as `end_page` when that is absent.
    #[serde(default)]
    pub pages: Option<u32>,

    /// Site name; defaults to saramin
    #[serde(default)]
    pub source: Option<String>,
}

/// A request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlParams {
    pub keyword: String,
    pub start_page: u32,
    pub end_page: u32,
    pub source: Source,
}

impl CrawlRequest {
    pub fn validate(&self, max_pages: u32) -> Result<CrawlParams, ApiError> {
        let keyword = self.keyword.trim();
        let start_page = self.start_page.unwrap_or(DEFAULT_START_PAGE);
        let end_page = self
            .end_page
            .or(self.pages)
            .unwrap_or_else(|| start_page.saturating_add(DEFAULT_PAGE_COUNT - 1));

        validate_request(keyword, start_page, end_page)?;

        let requested = end_page - start_page + 1;
        if requested > max_pages {
            return Err(ApiError::bad_request(format!(
                "at most {} pages per run, requested {}",
                max_pages, requested
            )));
        }

        let source = match self.source.as_deref() {
            None => Source::Saramin,
            Some(name) => {
                Source::from_str(name).map_err(|e| ApiError::bad_request(e.to_string()))?
            }
        };

        Ok(CrawlParams {
            keyword: keyword.to_string(),
            start_page,
            end_page,
            source,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct CrawlResponse {
    pub success: bool,
    pub keyword: String,
    pub source: Source,
    pub total: usize,
    pub companies: Vec<CompanyRecord>,
}

impl CrawlResponse {
    fn new(params: CrawlParams, companies: Vec<CompanyRecord>) -> Self {
        Self {
            success: true,
            keyword: params.keyword,
            source: params.source,
            total: companies.len(),
            companies,
        }
    }
}

/// Search only: listing records without homepages or emails.
pub async fn search_handler(
    Extension(state): Extension<AppState>,
    Json(request): Json<CrawlRequest>,
) -> Result<Json<CrawlResponse>, ApiError> {
    let params = request.validate(state.config.max_pages_per_run)?;
    info!(
        keyword = %params.keyword,
        source = params.source.as_str(),
        start_page = params.start_page,
        end_page = params.end_page,
        "Search requested"
    );

    let orchestrator = state.orchestrator(params.source)?;
    let companies = orchestrator
        .search(&params.keyword, params.start_page, params.end_page)
        .await?;

    Ok(Json(CrawlResponse::new(params, companies)))
}

/// Full run: search, enrich and rank, answered in one response.
pub async fn crawl_handler(
    Extension(state): Extension<AppState>,
    Json(request): Json<CrawlRequest>,
) -> Result<Json<CrawlResponse>, ApiError> {
    let params = request.validate(state.config.max_pages_per_run)?;
    info!(
        keyword = %params.keyword,
        source = params.source.as_str(),
        start_page = params.start_page,
        end_page = params.end_page,
        "Crawl requested"
    );

    let orchestrator = state.orchestrator(params.source)?;
    let on_progress: &ProgressCallback<'_> = &|current, total, company| {
        debug!(current, total, company, "Crawl progress");
    };
    let companies = orchestrator
        .crawl_with_emails(
            &params.keyword,
            params.start_page,
            params.end_page,
            Some(on_progress),
        )
        .await?;

    let summary = RunSummary::of(&companies);
    info!(
        companies = summary.companies,
        with_emails = summary.with_emails,
        "Crawl answered"
    );

    Ok(Json(CrawlResponse::new(params, companies)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn request(keyword: &str) -> CrawlRequest {
        CrawlRequest {
            keyword: keyword.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults() {
        let params = request("  백엔드 ").validate(10).unwrap();

        assert_eq!(
            params,
            CrawlParams {
                keyword: "백엔드".to_string(),
                start_page: 1,
                end_page: 5,
                source: Source::Saramin,
            }
        );
    }

    #[test]
    fn test_default_end_page_follows_start_page() {
        let req = CrawlRequest {
            start_page: Some(7),
            ..request("rust")
        };
        let params = req.validate(10).unwrap();

        assert_eq!(params.start_page, 7);
        assert_eq!(params.end_page, 11);
    }

    #[test]
    fn test_pages_is_end_page_fallback() {
        let req = CrawlRequest {
            pages: Some(3),
            ..request("rust")
        };
        assert_eq!(req.validate(10).unwrap().end_page, 3);

        let req = CrawlRequest {
            pages: Some(3),
            end_page: Some(7),
            ..request("rust")
        };
        assert_eq!(req.validate(10).unwrap().end_page, 7);
    }

    #[test]
    fn test_source_names() {
        let req = CrawlRequest {
            source: Some("wanted".to_string()),
            ..request("rust")
        };
        assert_eq!(req.validate(10).unwrap().source, Source::Wanted);

        let req = CrawlRequest {
            source: Some("indeed".to_string()),
            ..request("rust")
        };
        let err = req.validate(10).unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_invalid_ranges() {
        let reversed = CrawlRequest {
            start_page: Some(4),
            end_page: Some(2),
            ..request("rust")
        };
        assert_eq!(reversed.validate(10).unwrap_err().status(), StatusCode::BAD_REQUEST);

        let zero = CrawlRequest {
            start_page: Some(0),
            ..request("rust")
        };
        assert_eq!(zero.validate(10).unwrap_err().status(), StatusCode::BAD_REQUEST);

        let too_many = CrawlRequest {
            start_page: Some(3),
            end_page: Some(12),
            ..request("rust")
        };
        let err = too_many.validate(5).unwrap_err();
        assert!(err.detail().contains("at most 5 pages"));
    }
}
