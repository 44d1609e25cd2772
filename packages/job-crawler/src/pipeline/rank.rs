//! Merge and ranking steps over a run's record list.

use std::cmp::Reverse;
use std::collections::HashSet;

use crate::types::company::CompanyRecord;

/// Concatenated page results collapsed by `key`, first occurrence kept.
///
/// Records without a key are dropped.
pub fn merge_unique<K>(records: Vec<CompanyRecord>, key: K) -> Vec<CompanyRecord>
where
    K: for<'a> Fn(&'a CompanyRecord) -> Option<&'a str>,
{
    let mut seen: HashSet<String> = HashSet::new();
    records
        .into_iter()
        .filter(|record| match key(record) {
            Some(k) => seen.insert(k.to_string()),
            None => false,
        })
        .collect()
}

/// Stable sort by email count, most emails first.
///
/// Records with equal counts keep their relative order, so ranking an
/// already-ranked list changes nothing.
pub fn rank_by_email_count(records: &mut [CompanyRecord]) {
    records.sort_by_key(|record| Reverse(record.email_count()));
}

/// Totals for one finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub companies: usize,
    pub with_homepage: usize,
    pub with_emails: usize,
    pub with_errors: usize,
}

impl RunSummary {
    pub fn of(records: &[CompanyRecord]) -> Self {
        Self {
            companies: records.len(),
            with_homepage: records.iter().filter(|r| r.homepage.is_some()).count(),
            with_emails: records.iter().filter(|r| r.email_count() > 0).count(),
            with_errors: records.iter().filter(|r| r.has_error()).count(),
        }
    }
}
