//! JobKorea (jobkorea.co.kr) adapter.
//!
//! Listings are job-posting cards and carry no company link. The company
//! page is reached in two hops: the job posting embeds a numeric company id,
//! and the company page carries the homepage.

use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info};
use url::Url;

use super::homepage::HomepageResolver;
use crate::error::{AdapterResult, FetchError, ParseError};
use crate::html;
use crate::traits::adapter::SiteAdapter;
use crate::traits::fetcher::Fetcher;
use crate::types::company::{CompanyRecord, Source};

pub const BASE_URL: &str = "https://www.jobkorea.co.kr";
pub const SEARCH_URL: &str = "https://www.jobkorea.co.kr/Search/";

lazy_static! {
    static ref CARD: Selector =
        Selector::parse(r#"div[class*="Box_bgColor_white"][class*="Box_borderColor"]"#).unwrap();
    static ref POSTING_LINK: Selector = Selector::parse(r#"a[href*="/Recruit/GI_Read/"]"#).unwrap();
    static ref COMPANY_ID: Regex = Regex::new(r"/Recruit/Co_Read/C/(\d+)").unwrap();
}

/// JobKorea search, detail-page indirection, and homepage resolution.
pub struct JobKoreaAdapter<F: Fetcher> {
    fetcher: F,
    resolver: HomepageResolver,
}

impl<F: Fetcher> JobKoreaAdapter<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            resolver: HomepageResolver::jobkorea(),
        }
    }
}

/// Search URL for one result page.
pub fn search_url(keyword: &str, page: u32) -> Result<String, FetchError> {
    let page = page.to_string();
    Url::parse_with_params(SEARCH_URL, &[("stext", keyword), ("Page_No", page.as_str())])
        .map(String::from)
        .map_err(|_| FetchError::InvalidUrl {
            url: SEARCH_URL.to_string(),
        })
}

/// Company detail URL for the first company id embedded in a job-posting page.
pub fn company_url_from_posting(body: &str) -> Option<String> {
    COMPANY_ID
        .captures(body)
        .and_then(|caps| caps.get(1))
        .map(|id| format!("{}/Recruit/Co_Read/C/{}", BASE_URL, id.as_str()))
}

/// Pick `(job title, company name)` from a card's link texts.
///
/// The longest text is the title (earliest wins a tie); the shortest is the
/// company name (latest wins a tie). Similar-length texts can be mislabeled.
pub fn pick_title_and_company(texts: &[String]) -> Option<(String, String)> {
    if texts.len() < 2 {
        return None;
    }

    let mut title = &texts[0];
    let mut company = &texts[0];
    for text in &texts[1..] {
        let len = text.chars().count();
        if len > title.chars().count() {
            title = text;
        }
        if len <= company.chars().count() {
            company = text;
        }
    }

    Some((title.clone(), company.clone()))
}

/// Company records from one search result page, in card order.
pub fn parse_search_results(body: &str) -> Vec<CompanyRecord> {
    let document = Html::parse_document(body);
    let mut records = Vec::new();

    for card in document.select(&CARD) {
        match parse_card(&card) {
            Ok(record) => records.push(record),
            Err(e) => debug!(error = %e, "Skipping JobKorea card"),
        }
    }

    records
}

fn parse_card(card: &ElementRef<'_>) -> Result<CompanyRecord, ParseError> {
    let links: Vec<ElementRef<'_>> = card.select(&POSTING_LINK).collect();
    if links.len() < 2 {
        return Err(ParseError::Listing {
            reason: format!("expected at least 2 posting links, found {}", links.len()),
        });
    }

    let job_url = html::href(&links[0]).and_then(|href| html::absolutize(BASE_URL, href));

    let texts: Vec<String> = links
        .iter()
        .map(html::stripped_text)
        .filter(|text| !text.is_empty())
        .collect();

    let (title, company) = pick_title_and_company(&texts).ok_or_else(|| ParseError::Listing {
        reason: format!("expected at least 2 text links, found {}", texts.len()),
    })?;

    let mut record = CompanyRecord::new(company, Source::JobKorea).with_job_title(title);
    if let Some(job_url) = job_url {
        record = record.with_job_url(job_url);
    }

    Ok(record)
}

#[async_trait]
impl<F: Fetcher> SiteAdapter for JobKoreaAdapter<F> {
    fn source(&self) -> Source {
        Source::JobKorea
    }

    async fn search_page(&self, keyword: &str, page: u32) -> AdapterResult<Vec<CompanyRecord>> {
        let url = search_url(keyword, page)?;
        let body = self
            .fetcher
            .fetch_text(&url, Source::JobKorea.site_timeout())
            .await?;

        let records = parse_search_results(&body);
        info!(keyword = %keyword, page, found = records.len(), "JobKorea page parsed");
        Ok(records)
    }

    fn dedup_key<'a>(&self, record: &'a CompanyRecord) -> Option<&'a str> {
        Some(record.company_name.as_str()).filter(|name| !name.is_empty())
    }

    async fn resolve_detail_url(&self, record: &CompanyRecord) -> AdapterResult<Option<String>> {
        let Some(job_url) = record.job_posting_url.as_deref() else {
            return Ok(None);
        };

        let body = self
            .fetcher
            .fetch_text(job_url, Source::JobKorea.site_timeout())
            .await?;

        let detail = company_url_from_posting(&body);
        if detail.is_none() {
            debug!(job_url = %job_url, "No company id on job posting");
        }
        Ok(detail)
    }

    async fn resolve_homepage(&self, company_ref: &str) -> AdapterResult<Option<String>> {
        let body = self
            .fetcher
            .fetch_text(company_ref, Source::JobKorea.site_timeout())
            .await?;

        let homepage = self.resolver.resolve(&body);
        debug!(company_url = %company_ref, homepage = ?homepage, "JobKorea homepage lookup");
        Ok(homepage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockFetcher;

    fn texts(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    const RESULTS: &str = r#"
        <div class="Box_bgColor_white__abc Box_borderColor_gray__def">
            <a href="/Recruit/GI_Read/1001?Oem_Code=C1"><img src="logo.png"></a>
            <a href="/Recruit/GI_Read/1001?Oem_Code=C1">Rust 백엔드 엔지니어 (경력 3년 이상)</a>
            <a href="/Recruit/GI_Read/1001?Oem_Code=C1">에이크미</a>
        </div>
        <div class="Box_bgColor_white__abc Box_borderColor_gray__def">
            <a href="/Recruit/GI_Read/1002">Only one link</a>
        </div>
        <div class="Box_bgColor_white__abc">
            <a href="/Recruit/GI_Read/1003">Not a card</a>
            <a href="/Recruit/GI_Read/1003">x</a>
        </div>
    "#;

    #[test]
    fn test_pick_title_and_company() {
        let picked = pick_title_and_company(&texts(&["데이터 엔지니어 채용", "베타"]));
        assert_eq!(picked, Some(("데이터 엔지니어 채용".to_string(), "베타".to_string())));
    }

    #[test]
    fn test_pick_breaks_ties_by_encounter_order() {
        // Equal lengths: title is the first, company the last
        let picked = pick_title_and_company(&texts(&["알파", "베타", "감마"]));
        assert_eq!(picked, Some(("알파".to_string(), "감마".to_string())));

        assert_eq!(pick_title_and_company(&texts(&["solo"])), None);
    }

    #[test]
    fn test_parse_search_results() {
        let records = parse_search_results(RESULTS);
        assert_eq!(records.len(), 1);

        let record = &records[0];
        assert_eq!(record.company_name, "에이크미");
        assert_eq!(record.job_title.as_deref(), Some("Rust 백엔드 엔지니어 (경력 3년 이상)"));
        assert_eq!(
            record.job_posting_url.as_deref(),
            Some("https://www.jobkorea.co.kr/Recruit/GI_Read/1001?Oem_Code=C1")
        );
        assert!(record.company_detail_url.is_none());
    }

    #[test]
    fn test_company_url_from_posting() {
        let body = r#"<a href="https://www.jobkorea.co.kr/Recruit/Co_Read/C/48213?Oem_Code=C1">기업정보</a>"#;
        assert_eq!(
            company_url_from_posting(body).as_deref(),
            Some("https://www.jobkorea.co.kr/Recruit/Co_Read/C/48213")
        );
        assert_eq!(company_url_from_posting("<p>none</p>"), None);
    }

    #[test]
    fn test_dedup_key_is_company_name() {
        let adapter = JobKoreaAdapter::new(MockFetcher::new());
        let record = CompanyRecord::new("에이크미", Source::JobKorea);
        assert_eq!(adapter.dedup_key(&record), Some("에이크미"));
        assert_eq!(adapter.dedup_key(&CompanyRecord::new("", Source::JobKorea)), None);
    }

    #[tokio::test]
    async fn test_two_hop_resolution() {
        let job_url = "https://www.jobkorea.co.kr/Recruit/GI_Read/1001";
        let company_url = "https://www.jobkorea.co.kr/Recruit/Co_Read/C/77";
        let fetcher = MockFetcher::new()
            .with_page(job_url, r#"<a href="/Recruit/Co_Read/C/77">회사</a>"#)
            .with_page(
                company_url,
                r#"<dl><dt><span>홈페이지</span></dt><dd><a href="https://www.acme.co.kr">www.acme.co.kr</a></dd></dl>"#,
            );
        let adapter = JobKoreaAdapter::new(fetcher);

        let record = CompanyRecord::new("에이크미", Source::JobKorea).with_job_url(job_url);
        let detail = adapter.resolve_detail_url(&record).await.unwrap();
        assert_eq!(detail.as_deref(), Some(company_url));

        let homepage = adapter.resolve_homepage(company_url).await.unwrap();
        assert_eq!(homepage.as_deref(), Some("https://www.acme.co.kr"));
    }

    #[tokio::test]
    async fn test_detail_hop_without_job_url() {
        let adapter = JobKoreaAdapter::new(MockFetcher::new());
        let record = CompanyRecord::new("에이크미", Source::JobKorea);
        assert_eq!(adapter.resolve_detail_url(&record).await.unwrap(), None);
    }
}
