//! Email validation.
//!
//! Pure functions: pull candidate addresses out of raw text and drop the ones
//! that are asset filenames, placeholders, or too short to be real.

use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref EMAIL_PATTERN: Regex =
        Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").unwrap();
    static ref EMAIL_EXACT: Regex =
        Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").unwrap();
}

/// Static-asset extensions that show up in `name@2x.png`-style filenames.
pub const ASSET_EXTENSIONS: &[&str] = &[".png", ".jpg", ".jpeg", ".gif", ".svg", ".webp", ".css", ".js"];

/// Substrings marking placeholder addresses.
pub const PLACEHOLDER_TOKENS: &[&str] = &["example", "test@"];

/// Shortest accepted domain part (text after `@`).
pub const MIN_DOMAIN_LEN: usize = 4;

/// Policy filter for a candidate that already matched the email grammar.
pub fn is_valid_email(candidate: &str) -> bool {
    let lower = candidate.to_lowercase();

    if ASSET_EXTENSIONS.iter().any(|ext| lower.contains(ext)) {
        return false;
    }

    if PLACEHOLDER_TOKENS.iter().any(|token| lower.contains(token)) {
        return false;
    }

    let parts: Vec<&str> = lower.split('@').collect();
    parts.len() == 2 && parts[1].len() >= MIN_DOMAIN_LEN
}

/// Grammar check plus policy filter for a standalone address (e.g. a `mailto:` target).
pub fn is_valid_address(candidate: &str) -> bool {
    EMAIL_EXACT.is_match(candidate) && is_valid_email(candidate)
}

/// Extract valid addresses from raw text.
///
/// Order is first appearance; duplicates are dropped ignoring case and the
/// first-seen casing is kept.
pub fn extract_emails(text: &str) -> Vec<String> {
    let mut set = EmailSet::new();
    for m in EMAIL_PATTERN.find_iter(text) {
        let candidate = m.as_str();
        if is_valid_email(candidate) {
            set.insert(candidate);
        }
    }
    set.into_vec()
}

/// Insertion-ordered set of addresses, unique ignoring case.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmailSet {
    entries: IndexMap<String, String>,
}

impl EmailSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an address; returns `false` if an equal one was already present.
    pub fn insert(&mut self, email: &str) -> bool {
        let key = email.to_lowercase();
        if self.entries.contains_key(&key) {
            return false;
        }
        self.entries.insert(key, email.to_string());
        true
    }

    pub fn extend<I, S>(&mut self, emails: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for email in emails {
            self.insert(email.as_ref());
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.entries.into_values().collect()
    }
}
