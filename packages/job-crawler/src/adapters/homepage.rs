//! Homepage discovery on company-detail pages.
//!
//! Each site lists a company's own website differently, so resolution is an
//! ordered list of [`HomepageRule`]s. Rules run in order and the first rule
//! that yields an acceptable link wins. A link is acceptable when it is
//! absolute (`http...`) and mentions none of the excluded domains.

use scraper::{ElementRef, Html};
use tracing::debug;

use crate::html;

/// One way of locating a homepage link in a detail page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HomepageRule {
    /// Elements matching `label_selector` whose text contains `label`; the
    /// first link inside the next sibling element named `sibling`.
    LabeledSibling {
        label_selector: &'static str,
        label: &'static str,
        sibling: &'static str,
    },

    /// Only the first element matching `selector`.
    FirstMatch { selector: &'static str },

    /// Links matching `selector` whose trimmed, lowercased text contains one of `keywords`.
    AnchorText {
        selector: &'static str,
        keywords: &'static [&'static str],
    },

    /// The first link inside each element matching `containers`.
    FirstLinkIn { containers: &'static str },

    /// For each text node containing `label`, the next link after its parent
    /// element in document order.
    LinkAfterLabel { label: &'static str },

    /// Every link matching `selector`.
    AnyLink { selector: &'static str },
}

pub const SARAMIN_RULES: &[HomepageRule] = &[
    HomepageRule::LabeledSibling {
        label_selector: "dt.tit",
        label: "홈페이지",
        sibling: "dd",
    },
    HomepageRule::FirstMatch {
        selector: "dl.company_details a.ellipsis",
    },
    HomepageRule::AnchorText {
        selector: r#"a[href^="http"]"#,
        keywords: &["홈페이지", "회사소개", "homepage", "website"],
    },
    HomepageRule::FirstLinkIn {
        containers: ".info_item, .tb_col_list td, dd.desc",
    },
];

pub const SARAMIN_EXCLUDED: &[&str] = &["saramin.co.kr"];

pub const JOBKOREA_RULES: &[HomepageRule] = &[
    HomepageRule::LinkAfterLabel { label: "홈페이지" },
    HomepageRule::AnyLink {
        selector: r#"a[href^="http"]"#,
    },
];

/// Job boards, portals, and social sites that JobKorea detail pages link to.
pub const JOBKOREA_EXCLUDED: &[&str] = &[
    "jobkorea.co.kr",
    "albamon.com",
    "gamejob.co.kr",
    "ninehire.com",
    "klik.co.kr",
    "naver.com",
    "facebook.com",
    "instagram.com",
    "youtube.com",
    "notion.site",
    "oopy.io",
    "google.com",
    "daum.net",
    "kakao.com",
    "nicebizinfo.com",
    "dataline.co.kr",
];

/// Ordered homepage rules plus a domain exclusion list.
#[derive(Debug, Clone, Copy)]
pub struct HomepageResolver {
    rules: &'static [HomepageRule],
    excluded_domains: &'static [&'static str],
}

impl HomepageResolver {
    pub const fn new(rules: &'static [HomepageRule], excluded_domains: &'static [&'static str]) -> Self {
        Self {
            rules,
            excluded_domains,
        }
    }

    pub const fn saramin() -> Self {
        Self::new(SARAMIN_RULES, SARAMIN_EXCLUDED)
    }

    pub const fn jobkorea() -> Self {
        Self::new(JOBKOREA_RULES, JOBKOREA_EXCLUDED)
    }

    pub fn rules(&self) -> &'static [HomepageRule] {
        self.rules
    }

    /// Homepage URL found in `html`, if any rule matches.
    pub fn resolve(&self, html: &str) -> Option<String> {
        self.resolve_with_rule(html).map(|(_, url)| url)
    }

    /// Like [`resolve`](Self::resolve), also returning the index of the winning rule.
    pub fn resolve_with_rule(&self, html: &str) -> Option<(usize, String)> {
        let document = Html::parse_document(html);

        for (index, rule) in self.rules.iter().enumerate() {
            if let Some(url) = self.apply(rule, &document) {
                debug!(rule = index, homepage = %url, "Homepage rule matched");
                return Some((index, url));
            }
        }

        None
    }

    /// Whether `href` may be reported as a homepage.
    pub fn accepts(&self, href: &str) -> bool {
        href.starts_with("http") && !self.excluded_domains.iter().any(|d| href.contains(d))
    }

    fn accept(&self, element: &ElementRef<'_>) -> Option<String> {
        html::href(element)
            .filter(|href| self.accepts(href))
            .map(str::to_string)
    }

    fn apply(&self, rule: &HomepageRule, document: &Html) -> Option<String> {
        match *rule {
            HomepageRule::LabeledSibling {
                label_selector,
                label,
                sibling,
            } => {
                let labels = html::parse_selector(label_selector)?;
                let links = html::parse_selector("a[href]")?;

                document
                    .select(&labels)
                    .filter(|el| el.text().collect::<String>().contains(label))
                    .filter_map(|el| {
                        el.next_siblings()
                            .filter_map(ElementRef::wrap)
                            .find(|sib| sib.value().name() == sibling)
                    })
                    .filter_map(|sib| sib.select(&links).next())
                    .find_map(|link| self.accept(&link))
            }

            HomepageRule::FirstMatch { selector } => {
                let selector = html::parse_selector(selector)?;
                let first = document.select(&selector).next()?;
                self.accept(&first)
            }

            HomepageRule::AnchorText { selector, keywords } => {
                let selector = html::parse_selector(selector)?;

                document
                    .select(&selector)
                    .filter(|link| {
                        let text = html::stripped_text(link).to_lowercase();
                        keywords.iter().any(|k| text.contains(k))
                    })
                    .find_map(|link| self.accept(&link))
            }

            HomepageRule::FirstLinkIn { containers } => {
                let containers = html::parse_selector(containers)?;
                let links = html::parse_selector("a[href]")?;

                document
                    .select(&containers)
                    .filter_map(|container| container.select(&links).next())
                    .find_map(|link| self.accept(&link))
            }

            HomepageRule::LinkAfterLabel { label } => self.link_after_label(document, label),

            HomepageRule::AnyLink { selector } => {
                let selector = html::parse_selector(selector)?;
                document
                    .select(&selector)
                    .find_map(|link| self.accept(&link))
            }
        }
    }

    fn link_after_label(&self, document: &Html, label: &str) -> Option<String> {
        // Whole tree in document order
        let nodes: Vec<_> = document.tree.root().descendants().collect();

        for (position, node) in nodes.iter().enumerate() {
            let Some(text) = node.value().as_text() else {
                continue;
            };
            if !text.contains(label) {
                continue;
            }
            let Some(parent) = node.parent() else {
                continue;
            };
            let Some(start) = nodes[..position].iter().rposition(|n| n.id() == parent.id()) else {
                continue;
            };

            let next_link = nodes[start + 1..]
                .iter()
                .filter_map(|n| ElementRef::wrap(*n))
                .find(|el| el.value().name() == "a" && el.value().attr("href").is_some());

            if let Some(url) = next_link.and_then(|link| self.accept(&link)) {
                return Some(url);
            }
        }

        None
    }
}
