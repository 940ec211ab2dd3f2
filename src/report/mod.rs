//! Pure list transforms behind every screen: filtering, sorting, and
//! grouped totals. Nothing here touches the network or the cache; callers
//! pass in the records they already hold and get new sequences back.

mod aggregate;
mod filter;
mod sort;

pub use aggregate::{
    monthly_summaries, monthly_summary, totals_by_category, totals_by_date, yearly_summaries,
    yearly_summary, PeriodSummary,
};
pub use filter::RecordFilter;
pub use sort::{sort_records, SortDirection, SortField};

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::models::{Category, Expense, Income};

/// Common view of the two dated record types, so filters, sorts, and
/// grouping work on either list.
pub trait TrackedRecord {
    fn date(&self) -> NaiveDate;
    fn amount(&self) -> Decimal;
    fn comment(&self) -> &str;

    /// Id of the category the record is tagged with, for record types that
    /// have categories at all.
    fn category_id(&self) -> Option<i64> {
        None
    }
}

impl TrackedRecord for Expense {
    fn date(&self) -> NaiveDate {
        self.date
    }

    fn amount(&self) -> Decimal {
        self.amount
    }

    fn comment(&self) -> &str {
        &self.comment
    }

    fn category_id(&self) -> Option<i64> {
        Some(self.category_id)
    }
}

impl TrackedRecord for Income {
    fn date(&self) -> NaiveDate {
        self.date
    }

    fn amount(&self) -> Decimal {
        self.amount
    }

    fn comment(&self) -> &str {
        &self.comment
    }
}

/// Lookup from category id to display name.
///
/// An expense can outlive the category it was tagged with; those stale ids
/// resolve to a blank name instead of failing, and reports group them under
/// that blank name.
#[derive(Debug, Default)]
pub struct CategoryIndex {
    names: HashMap<i64, String>,
}

impl CategoryIndex {
    pub fn new(categories: &[Category]) -> Self {
        let names = categories
            .iter()
            .filter_map(|category| category.id.map(|id| (id, category.name.clone())))
            .collect();
        Self { names }
    }

    /// Display name for the id; blank when the id is unknown or absent.
    pub fn name_of(&self, id: Option<i64>) -> &str {
        id.and_then(|id| self.names.get(&id))
            .map(String::as_str)
            .unwrap_or("")
    }
}
