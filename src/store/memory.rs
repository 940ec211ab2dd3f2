//! In-memory cache store for tests and ephemeral sessions.

use anyhow::Result;
use chrono::NaiveDate;
use tokio::sync::Mutex;

use crate::models::{Category, Expense, Income};

use super::CacheStore;

/// In-memory cache store. Collections keep insertion order, matching the
/// ordered-sequence guarantee of the file-backed store.
pub struct MemoryStore {
    categories: Mutex<Vec<Category>>,
    expenses: Mutex<Vec<Expense>>,
    incomes: Mutex<Vec<Income>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            categories: Mutex::new(Vec::new()),
            expenses: Mutex::new(Vec::new()),
            incomes: Mutex::new(Vec::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl CacheStore for MemoryStore {
    async fn list_categories(&self) -> Result<Vec<Category>> {
        Ok(self.categories.lock().await.clone())
    }

    async fn insert_category(&self, category: &Category) -> Result<()> {
        self.categories.lock().await.push(category.clone());
        Ok(())
    }

    async fn insert_categories(&self, categories: &[Category]) -> Result<()> {
        self.categories
            .lock()
            .await
            .extend(categories.iter().cloned());
        Ok(())
    }

    async fn update_category(&self, category: &Category) -> Result<()> {
        let mut categories = self.categories.lock().await;
        match categories.iter_mut().find(|c| c.id == category.id) {
            Some(existing) => *existing = category.clone(),
            None => categories.push(category.clone()),
        }
        Ok(())
    }

    async fn delete_category(&self, id: i64) -> Result<bool> {
        let mut categories = self.categories.lock().await;
        let before = categories.len();
        categories.retain(|c| c.id != Some(id));
        Ok(categories.len() != before)
    }

    async fn replace_categories(&self, categories: &[Category]) -> Result<()> {
        *self.categories.lock().await = categories.to_vec();
        Ok(())
    }

    async fn list_expenses(&self) -> Result<Vec<Expense>> {
        Ok(self.expenses.lock().await.clone())
    }

    async fn insert_expense(&self, expense: &Expense) -> Result<()> {
        self.expenses.lock().await.push(expense.clone());
        Ok(())
    }

    async fn insert_expenses(&self, expenses: &[Expense]) -> Result<()> {
        self.expenses.lock().await.extend(expenses.iter().cloned());
        Ok(())
    }

    async fn update_expense(&self, expense: &Expense) -> Result<()> {
        let mut expenses = self.expenses.lock().await;
        match expenses.iter_mut().find(|e| e.id == expense.id) {
            Some(existing) => *existing = expense.clone(),
            None => expenses.push(expense.clone()),
        }
        Ok(())
    }

    async fn delete_expense(&self, id: i64) -> Result<bool> {
        let mut expenses = self.expenses.lock().await;
        let before = expenses.len();
        expenses.retain(|e| e.id != Some(id));
        Ok(expenses.len() != before)
    }

    async fn replace_expenses(&self, expenses: &[Expense]) -> Result<()> {
        *self.expenses.lock().await = expenses.to_vec();
        Ok(())
    }

    async fn replace_expenses_since(&self, cutoff: NaiveDate, expenses: &[Expense]) -> Result<()> {
        let mut cached = self.expenses.lock().await;
        cached.retain(|e| e.date < cutoff);
        cached.extend(expenses.iter().cloned());
        Ok(())
    }

    async fn list_incomes(&self) -> Result<Vec<Income>> {
        Ok(self.incomes.lock().await.clone())
    }

    async fn insert_income(&self, income: &Income) -> Result<()> {
        self.incomes.lock().await.push(income.clone());
        Ok(())
    }

    async fn insert_incomes(&self, incomes: &[Income]) -> Result<()> {
        self.incomes.lock().await.extend(incomes.iter().cloned());
        Ok(())
    }

    async fn update_income(&self, income: &Income) -> Result<()> {
        let mut incomes = self.incomes.lock().await;
        match incomes.iter_mut().find(|i| i.id == income.id) {
            Some(existing) => *existing = income.clone(),
            None => incomes.push(income.clone()),
        }
        Ok(())
    }

    async fn delete_income(&self, id: i64) -> Result<bool> {
        let mut incomes = self.incomes.lock().await;
        let before = incomes.len();
        incomes.retain(|i| i.id != Some(id));
        Ok(incomes.len() != before)
    }

    async fn replace_incomes(&self, incomes: &[Income]) -> Result<()> {
        *self.incomes.lock().await = incomes.to_vec();
        Ok(())
    }

    async fn replace_incomes_since(&self, cutoff: NaiveDate, incomes: &[Income]) -> Result<()> {
        let mut cached = self.incomes.lock().await;
        cached.retain(|i| i.date < cutoff);
        cached.extend(incomes.iter().cloned());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn expense(id: i64, date: &str) -> Expense {
        Expense::new(date.parse().unwrap(), Decimal::new(100, 2), 1).with_id(id)
    }

    #[tokio::test]
    async fn replace_since_replaces_records_on_or_after_the_cutoff() -> Result<()> {
        let store = MemoryStore::new();
        // One record the day before the cutoff, one dated exactly on it.
        store
            .insert_expenses(&[expense(1, "2024-04-30"), expense(2, "2024-05-01")])
            .await?;

        store
            .replace_expenses_since("2024-05-01".parse().unwrap(), &[expense(3, "2024-05-20")])
            .await?;

        let ids: Vec<_> = store
            .list_expenses()
            .await?
            .into_iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, vec![Some(1), Some(3)]);

        Ok(())
    }

    #[tokio::test]
    async fn update_appends_when_id_is_not_cached() -> Result<()> {
        let store = MemoryStore::new();
        store.update_expense(&expense(7, "2024-01-01")).await?;
        assert_eq!(store.list_expenses().await?.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn delete_reports_whether_the_id_was_present() -> Result<()> {
        let store = MemoryStore::new();
        store.insert_expense(&expense(1, "2024-01-01")).await?;

        assert!(store.delete_expense(1).await?);
        assert!(!store.delete_expense(1).await?);

        Ok(())
    }
}
