//! Grouped totals and dashboard summaries.
//!
//! All sums run on `Decimal`, never floats, so repeated currency addition
//! cannot drift.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use crate::models::{Expense, Income};

use super::{CategoryIndex, TrackedRecord};

/// Total amount per calendar date. Only dates that appear in the input get
/// an entry; there are no zero groups.
pub fn totals_by_date<R: TrackedRecord>(records: &[R]) -> BTreeMap<NaiveDate, Decimal> {
    let mut totals = BTreeMap::new();
    for record in records {
        *totals.entry(record.date()).or_insert(Decimal::ZERO) += record.amount();
    }
    totals
}

/// Total amount per resolved category name. Records pointing at a category
/// the index does not know fall into a single blank-named group.
pub fn totals_by_category<R: TrackedRecord>(
    records: &[R],
    categories: &CategoryIndex,
) -> BTreeMap<String, Decimal> {
    let mut totals = BTreeMap::new();
    for record in records {
        let name = categories.name_of(record.category_id()).to_string();
        *totals.entry(name).or_insert(Decimal::ZERO) += record.amount();
    }
    totals
}

/// Income and expense totals for one dashboard period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PeriodSummary {
    pub income_total: Decimal,
    pub expense_total: Decimal,
}

impl PeriodSummary {
    /// Income minus expenses; negative when the period overspent.
    pub fn savings(&self) -> Decimal {
        self.income_total - self.expense_total
    }
}

/// Month-by-month rollup, keyed `(year, month)`. Only months present in
/// at least one of the lists get an entry.
pub fn monthly_summaries(
    incomes: &[Income],
    expenses: &[Expense],
) -> BTreeMap<(i32, u32), PeriodSummary> {
    let mut rollup: BTreeMap<(i32, u32), PeriodSummary> = BTreeMap::new();
    for income in incomes {
        let entry = rollup.entry((income.date.year(), income.date.month())).or_default();
        entry.income_total += income.amount;
    }
    for expense in expenses {
        let entry = rollup.entry((expense.date.year(), expense.date.month())).or_default();
        entry.expense_total += expense.amount;
    }
    rollup
}

/// Year-by-year rollup. Only years present in at least one of the lists
/// get an entry.
pub fn yearly_summaries(incomes: &[Income], expenses: &[Expense]) -> BTreeMap<i32, PeriodSummary> {
    let mut rollup: BTreeMap<i32, PeriodSummary> = BTreeMap::new();
    for income in incomes {
        rollup.entry(income.date.year()).or_default().income_total += income.amount;
    }
    for expense in expenses {
        rollup.entry(expense.date.year()).or_default().expense_total += expense.amount;
    }
    rollup
}

pub fn monthly_summary(
    incomes: &[Income],
    expenses: &[Expense],
    year: i32,
    month: u32,
) -> PeriodSummary {
    PeriodSummary {
        income_total: sum_where(incomes, |d| d.year() == year && d.month() == month),
        expense_total: sum_where(expenses, |d| d.year() == year && d.month() == month),
    }
}

pub fn yearly_summary(incomes: &[Income], expenses: &[Expense], year: i32) -> PeriodSummary {
    PeriodSummary {
        income_total: sum_where(incomes, |d| d.year() == year),
        expense_total: sum_where(expenses, |d| d.year() == year),
    }
}

fn sum_where<R: TrackedRecord>(records: &[R], keep: impl Fn(NaiveDate) -> bool) -> Decimal {
    records
        .iter()
        .filter(|record| keep(record.date()))
        .map(TrackedRecord::amount)
        .sum()
}
