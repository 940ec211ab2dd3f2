//! Synchronization between the backend and the local cache.
//!
//! One service per record type, each holding the gateway, the cache store,
//! and a clock as injected dependencies. Refreshes reconcile the cache with
//! server truth and fall back to cached records when the server is
//! unreachable; mutations go remote-first and touch the cache only after
//! the server has accepted the change.

mod categories;
mod expenses;
mod incomes;

pub use categories::CategoryService;
pub use expenses::ExpenseService;
pub use incomes::IncomeService;

use chrono::{Datelike, Months, NaiveDate};
use thiserror::Error;

use crate::api::ApiError;

/// How much history a refresh asks the server for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// The entire remote collection.
    Full,
    /// Only the window at or after the record type's cutoff date.
    Incremental,
}

/// Result of a refresh.
///
/// `Fresh` means the server answered and the cache now mirrors it. `Stale`
/// means the server could not be reached: `records` are whatever the cache
/// already held, unchanged, with the failure attached for diagnostics.
#[derive(Debug)]
pub enum RefreshOutcome<T> {
    Fresh { records: Vec<T> },
    Stale { records: Vec<T>, error: ApiError },
}

impl<T> RefreshOutcome<T> {
    pub fn records(&self) -> &[T] {
        match self {
            Self::Fresh { records } | Self::Stale { records, .. } => records,
        }
    }

    pub fn into_records(self) -> Vec<T> {
        match self {
            Self::Fresh { records } | Self::Stale { records, .. } => records,
        }
    }

    pub fn is_stale(&self) -> bool {
        matches!(self, Self::Stale { .. })
    }

    pub fn error(&self) -> Option<&ApiError> {
        match self {
            Self::Fresh { .. } => None,
            Self::Stale { error, .. } => Some(error),
        }
    }
}

/// Failure of a synchronized mutation.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The backend refused or could not be reached; the cache was left
    /// untouched.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The record was never persisted: it carries no server-assigned id to
    /// address remotely.
    #[error("record has no server-assigned id")]
    MissingId,

    /// The local cache could not be read or written.
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl SyncError {
    /// The taxonomy kind, when the failure came from the backend.
    pub fn api(&self) -> Option<&ApiError> {
        match self {
            Self::Api(err) => Some(err),
            Self::MissingId | Self::Store(_) => None,
        }
    }
}

pub(crate) fn require_id(id: Option<i64>) -> Result<i64, SyncError> {
    id.ok_or(SyncError::MissingId)
}

/// First day of the month containing `today`: the income refresh window.
pub(crate) fn income_cutoff(today: NaiveDate) -> NaiveDate {
    today.with_day(1).expect("first of month is always valid")
}

/// Same day one month earlier (clamped at month ends): the expense refresh
/// window. Wider than the income window on most days of the month; the two
/// record types use different cutoffs on purpose.
pub(crate) fn expense_cutoff(today: NaiveDate) -> NaiveDate {
    today
        .checked_sub_months(Months::new(1))
        .expect("date stays within the supported calendar range")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn income_window_opens_on_the_first_of_the_current_month() {
        assert_eq!(income_cutoff(date(2024, 5, 15)), date(2024, 5, 1));
        assert_eq!(income_cutoff(date(2024, 5, 1)), date(2024, 5, 1));
        assert_eq!(income_cutoff(date(2024, 12, 31)), date(2024, 12, 1));
    }

    #[test]
    fn expense_window_opens_one_month_back() {
        assert_eq!(expense_cutoff(date(2024, 5, 15)), date(2024, 4, 15));
        assert_eq!(expense_cutoff(date(2024, 1, 10)), date(2023, 12, 10));
    }

    #[test]
    fn expense_window_clamps_at_month_ends() {
        assert_eq!(expense_cutoff(date(2024, 3, 31)), date(2024, 2, 29));
        assert_eq!(expense_cutoff(date(2023, 3, 31)), date(2023, 2, 28));
        assert_eq!(expense_cutoff(date(2024, 7, 31)), date(2024, 6, 30));
    }

    #[test]
    fn refresh_outcome_exposes_records_either_way() {
        let fresh = RefreshOutcome::Fresh {
            records: vec![1, 2],
        };
        assert_eq!(fresh.records(), &[1, 2]);
        assert!(!fresh.is_stale());
        assert!(fresh.error().is_none());

        let stale = RefreshOutcome::Stale {
            records: vec![3],
            error: ApiError::ConnectionTimeout,
        };
        assert_eq!(stale.records(), &[3]);
        assert!(stale.is_stale());
        assert_eq!(stale.error(), Some(&ApiError::ConnectionTimeout));
        assert_eq!(stale.into_records(), vec![3]);
    }
}
