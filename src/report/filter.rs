//! Record filtering for list screens.

use std::collections::HashSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use super::TrackedRecord;

/// Accent-insensitive comparison form: decompose, drop combining marks,
/// lowercase. "Café" and "cafe" fold to the same string.
fn search_fold(text: &str) -> String {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

/// Screen-session filter state. Every populated field must match for a
/// record to pass; unset fields match everything.
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    date_range: Option<(NaiveDate, NaiveDate)>,
    amount_range: Option<(Decimal, Decimal)>,
    categories: HashSet<i64>,
    comment: Option<String>,
}

impl RecordFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep records dated within `[start, end]`, both ends inclusive.
    pub fn with_date_range(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.date_range = Some((start, end));
        self
    }

    /// Keep records whose amount lies within `[min, max]`, both ends
    /// inclusive.
    pub fn with_amount_range(mut self, min: Decimal, max: Decimal) -> Self {
        self.amount_range = Some((min, max));
        self
    }

    /// Keep records tagged with one of these category ids. An empty set
    /// keeps everything, and record types without categories are outside
    /// this predicate entirely.
    pub fn with_categories(mut self, ids: impl IntoIterator<Item = i64>) -> Self {
        self.categories = ids.into_iter().collect();
        self
    }

    /// Keep records whose comment contains this text, ignoring case and
    /// accents on both sides.
    pub fn with_comment(mut self, needle: impl Into<String>) -> Self {
        self.comment = Some(needle.into());
        self
    }

    pub fn matches<R: TrackedRecord>(&self, record: &R) -> bool {
        if let Some((start, end)) = self.date_range {
            if record.date() < start || record.date() > end {
                return false;
            }
        }

        if let Some((min, max)) = self.amount_range {
            if record.amount() < min || record.amount() > max {
                return false;
            }
        }

        if !self.categories.is_empty() {
            if let Some(id) = record.category_id() {
                if !self.categories.contains(&id) {
                    return false;
                }
            }
        }

        if let Some(needle) = &self.comment {
            if !search_fold(record.comment()).contains(&search_fold(needle)) {
                return false;
            }
        }

        true
    }

    /// Apply the filter, returning the survivors as a new list in their
    /// original order.
    pub fn apply<R: TrackedRecord + Clone>(&self, records: &[R]) -> Vec<R> {
        records
            .iter()
            .filter(|record| self.matches(*record))
            .cloned()
            .collect()
    }
}
