//! Small helpers over `scraper` element handles.
//!
//! Everything here is synchronous: parsed documents are not `Send`, so callers
//! parse, extract owned values, and drop the document before awaiting.

use scraper::{ElementRef, Selector};
use tracing::warn;
use url::Url;

/// Text of an element with each fragment trimmed, fragments concatenated.
pub(crate) fn stripped_text(element: &ElementRef<'_>) -> String {
    element.text().map(str::trim).collect()
}

/// Raw text of an element, lowercased.
pub(crate) fn lower_text(element: &ElementRef<'_>) -> String {
    element.text().collect::<String>().to_lowercase()
}

/// `href` attribute, if present.
pub(crate) fn href<'a>(element: &ElementRef<'a>) -> Option<&'a str> {
    element.value().attr("href")
}

/// Resolve `href` against `base` unless it is already absolute (`http...`).
///
/// Returns `None` for an empty href.
pub(crate) fn absolutize(base: &str, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    if href.starts_with("http") {
        return Some(href.to_string());
    }
    Url::parse(base)
        .and_then(|base| base.join(href))
        .map(|u| u.to_string())
        .ok()
}

/// Parse a selector from static rule data, logging instead of panicking.
pub(crate) fn parse_selector(selector: &str) -> Option<Selector> {
    match Selector::parse(selector) {
        Ok(s) => Some(s),
        Err(e) => {
            warn!(selector = %selector, error = ?e, "Invalid selector in rule data");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    #[test]
    fn test_stripped_text_joins_trimmed_fragments() {
        let doc = Html::parse_fragment("<a href='/x'>  (주) <b> 에이 </b>\n</a>");
        let selector = Selector::parse("a").unwrap();
        let a = doc.select(&selector).next().unwrap();

        assert_eq!(stripped_text(&a), "(주)에이");
        assert_eq!(href(&a), Some("/x"));
    }

    #[test]
    fn test_absolutize() {
        let base = "https://www.saramin.co.kr";
        assert_eq!(
            absolutize(base, "/zf_user/company-info/view?csn=1").as_deref(),
            Some("https://www.saramin.co.kr/zf_user/company-info/view?csn=1")
        );
        assert_eq!(
            absolutize(base, "https://acme.co.kr").as_deref(),
            Some("https://acme.co.kr")
        );
        assert_eq!(absolutize(base, "  "), None);
    }

    #[test]
    fn test_parse_selector_rejects_garbage() {
        assert!(parse_selector("dl.company_details a.ellipsis").is_some());
        assert!(parse_selector("a[[").is_none());
    }
}
