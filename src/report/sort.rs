//! Stable record ordering for list screens.

use std::cmp::Ordering;

use super::{CategoryIndex, TrackedRecord};

/// Field a list is ordered by. `Category` compares resolved display names
/// and is only meaningful for categorized records; records without one all
/// compare equal there and keep their relative order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Date,
    Amount,
    Category,
    Comment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Sort into a new list. The sort is stable, and `Descending` reverses the
/// comparison rather than the result, so ties keep their input order in
/// both directions.
pub fn sort_records<R: TrackedRecord + Clone>(
    records: &[R],
    field: SortField,
    direction: SortDirection,
    categories: &CategoryIndex,
) -> Vec<R> {
    let mut sorted = records.to_vec();
    sorted.sort_by(|a, b| {
        let ordering = compare(a, b, field, categories);
        match direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
    sorted
}

fn compare<R: TrackedRecord>(a: &R, b: &R, field: SortField, categories: &CategoryIndex) -> Ordering {
    match field {
        SortField::Date => a.date().cmp(&b.date()),
        SortField::Amount => a.amount().cmp(&b.amount()),
        SortField::Category => categories
            .name_of(a.category_id())
            .cmp(categories.name_of(b.category_id())),
        SortField::Comment => a.comment().cmp(b.comment()),
    }
}
