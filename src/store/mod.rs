mod json_file;
mod memory;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

use anyhow::Result;
use chrono::NaiveDate;

use crate::models::{Category, Expense, Income};

/// Offline cache of server records, one ordered collection per record type.
///
/// The server is authoritative for ids: every record handed to this trait
/// already carries its server-assigned id. `update_*` matches by id and
/// appends when the id is not cached yet; `delete_*` reports whether the id
/// was present. The `replace_*` operations cover reconciliation after a
/// fetch: each runs as a single unit of work under the type's lock, so a
/// reader never observes a half-applied delete+insert, and reads always see
/// the most recently completed write.
#[async_trait::async_trait]
pub trait CacheStore: Send + Sync {
    // Categories
    async fn list_categories(&self) -> Result<Vec<Category>>;
    async fn insert_category(&self, category: &Category) -> Result<()>;
    async fn insert_categories(&self, categories: &[Category]) -> Result<()>;
    async fn update_category(&self, category: &Category) -> Result<()>;
    async fn delete_category(&self, id: i64) -> Result<bool>;
    async fn replace_categories(&self, categories: &[Category]) -> Result<()>;

    // Expenses
    async fn list_expenses(&self) -> Result<Vec<Expense>>;
    async fn insert_expense(&self, expense: &Expense) -> Result<()>;
    async fn insert_expenses(&self, expenses: &[Expense]) -> Result<()>;
    async fn update_expense(&self, expense: &Expense) -> Result<()>;
    async fn delete_expense(&self, id: i64) -> Result<bool>;
    async fn replace_expenses(&self, expenses: &[Expense]) -> Result<()>;
    /// Drop cached expenses dated at or after `cutoff`, then insert the
    /// given batch; older records are left untouched.
    async fn replace_expenses_since(&self, cutoff: NaiveDate, expenses: &[Expense]) -> Result<()>;

    // Incomes
    async fn list_incomes(&self) -> Result<Vec<Income>>;
    async fn insert_income(&self, income: &Income) -> Result<()>;
    async fn insert_incomes(&self, incomes: &[Income]) -> Result<()>;
    async fn update_income(&self, income: &Income) -> Result<()>;
    async fn delete_income(&self, id: i64) -> Result<bool>;
    async fn replace_incomes(&self, incomes: &[Income]) -> Result<()>;
    /// Drop cached incomes dated at or after `cutoff`, then insert the
    /// given batch; older records are left untouched.
    async fn replace_incomes_since(&self, cutoff: NaiveDate, incomes: &[Income]) -> Result<()>;
}
