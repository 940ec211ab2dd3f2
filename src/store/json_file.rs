use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use tokio::fs;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::Mutex;

use crate::models::{Category, Expense, Income};

use super::CacheStore;

/// JSON-lines cache store.
///
/// Directory structure:
/// ```text
/// data/
///   categories.jsonl
///   expenses.jsonl
///   incomes.jsonl
/// ```
///
/// Every rewrite goes through a temp file renamed into place, under that
/// type's lock, so a reader never sees a half-written cache and a crash
/// mid-write leaves the previous contents intact. Lines that fail to parse
/// are skipped with a warning instead of poisoning the whole cache.
pub struct JsonFileStore {
    base_path: PathBuf,
    categories_lock: Mutex<()>,
    expenses_lock: Mutex<()>,
    incomes_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(base_path: impl AsRef<Path>) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
            categories_lock: Mutex::new(()),
            expenses_lock: Mutex::new(()),
            incomes_lock: Mutex::new(()),
        }
    }

    fn categories_file(&self) -> PathBuf {
        self.base_path.join("categories.jsonl")
    }

    fn expenses_file(&self) -> PathBuf {
        self.base_path.join("expenses.jsonl")
    }

    fn incomes_file(&self) -> PathBuf {
        self.base_path.join("incomes.jsonl")
    }

    async fn read_jsonl<T: for<'de> serde::Deserialize<'de>>(&self, path: &Path) -> Result<Vec<T>> {
        let file = match fs::File::open(path).await {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e).context("Failed to open file"),
        };

        let reader = BufReader::new(file);
        let mut lines = reader.lines();
        let mut items = Vec::new();

        while let Some(line) = lines.next_line().await.context("Failed to read line")? {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(&line) {
                Ok(item) => items.push(item),
                Err(err) => {
                    tracing::warn!(
                        error = %err,
                        path = %path.display(),
                        "Skipping unparseable cache line"
                    );
                }
            }
        }

        Ok(items)
    }

    /// Rewrite the whole file: serialize into a sibling temp file, then
    /// rename it over the original.
    async fn write_jsonl<T: serde::Serialize>(&self, path: &Path, items: &[T]) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .context("Failed to create directory")?;
        }

        let mut content = String::new();
        for item in items {
            content.push_str(&serde_json::to_string(item).context("Failed to serialize item")?);
            content.push('\n');
        }

        let tmp = path.with_extension("jsonl.tmp");
        fs::write(&tmp, content)
            .await
            .with_context(|| format!("Failed to write temp file: {tmp:?}"))?;
        fs::rename(&tmp, path)
            .await
            .with_context(|| format!("Failed to replace cache file: {path:?}"))?;

        Ok(())
    }

    async fn append_jsonl<T: serde::Serialize>(&self, path: &Path, items: &[T]) -> Result<()> {
        if items.is_empty() {
            return Ok(());
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .context("Failed to create directory")?;
        }

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
            .context("Failed to open file for append")?;

        for item in items {
            let line = serde_json::to_string(item).context("Failed to serialize item")?;
            file.write_all(line.as_bytes()).await?;
            file.write_all(b"\n").await?;
        }

        Ok(())
    }
}

#[async_trait::async_trait]
impl CacheStore for JsonFileStore {
    async fn list_categories(&self) -> Result<Vec<Category>> {
        let _guard = self.categories_lock.lock().await;
        self.read_jsonl(&self.categories_file()).await
    }

    async fn insert_category(&self, category: &Category) -> Result<()> {
        let _guard = self.categories_lock.lock().await;
        self.append_jsonl(&self.categories_file(), std::slice::from_ref(category))
            .await
    }

    async fn insert_categories(&self, categories: &[Category]) -> Result<()> {
        let _guard = self.categories_lock.lock().await;
        self.append_jsonl(&self.categories_file(), categories).await
    }

    async fn update_category(&self, category: &Category) -> Result<()> {
        let _guard = self.categories_lock.lock().await;
        let path = self.categories_file();
        let mut categories: Vec<Category> = self.read_jsonl(&path).await?;
        match categories.iter_mut().find(|c| c.id == category.id) {
            Some(existing) => *existing = category.clone(),
            None => categories.push(category.clone()),
        }
        self.write_jsonl(&path, &categories).await
    }

    async fn delete_category(&self, id: i64) -> Result<bool> {
        let _guard = self.categories_lock.lock().await;
        let path = self.categories_file();
        let mut categories: Vec<Category> = self.read_jsonl(&path).await?;
        let before = categories.len();
        categories.retain(|c| c.id != Some(id));
        let removed = categories.len() != before;
        if removed {
            self.write_jsonl(&path, &categories).await?;
        }
        Ok(removed)
    }

    async fn replace_categories(&self, categories: &[Category]) -> Result<()> {
        let _guard = self.categories_lock.lock().await;
        self.write_jsonl(&self.categories_file(), categories).await
    }

    async fn list_expenses(&self) -> Result<Vec<Expense>> {
        let _guard = self.expenses_lock.lock().await;
        self.read_jsonl(&self.expenses_file()).await
    }

    async fn insert_expense(&self, expense: &Expense) -> Result<()> {
        let _guard = self.expenses_lock.lock().await;
        self.append_jsonl(&self.expenses_file(), std::slice::from_ref(expense))
            .await
    }

    async fn insert_expenses(&self, expenses: &[Expense]) -> Result<()> {
        let _guard = self.expenses_lock.lock().await;
        self.append_jsonl(&self.expenses_file(), expenses).await
    }

    async fn update_expense(&self, expense: &Expense) -> Result<()> {
        let _guard = self.expenses_lock.lock().await;
        let path = self.expenses_file();
        let mut expenses: Vec<Expense> = self.read_jsonl(&path).await?;
        match expenses.iter_mut().find(|e| e.id == expense.id) {
            Some(existing) => *existing = expense.clone(),
            None => expenses.push(expense.clone()),
        }
        self.write_jsonl(&path, &expenses).await
    }

    async fn delete_expense(&self, id: i64) -> Result<bool> {
        let _guard = self.expenses_lock.lock().await;
        let path = self.expenses_file();
        let mut expenses: Vec<Expense> = self.read_jsonl(&path).await?;
        let before = expenses.len();
        expenses.retain(|e| e.id != Some(id));
        let removed = expenses.len() != before;
        if removed {
            self.write_jsonl(&path, &expenses).await?;
        }
        Ok(removed)
    }

    async fn replace_expenses(&self, expenses: &[Expense]) -> Result<()> {
        let _guard = self.expenses_lock.lock().await;
        self.write_jsonl(&self.expenses_file(), expenses).await
    }

    async fn replace_expenses_since(&self, cutoff: NaiveDate, expenses: &[Expense]) -> Result<()> {
        let _guard = self.expenses_lock.lock().await;
        let path = self.expenses_file();
        let mut kept: Vec<Expense> = self.read_jsonl(&path).await?;
        kept.retain(|e| e.date < cutoff);
        kept.extend(expenses.iter().cloned());
        self.write_jsonl(&path, &kept).await
    }

    async fn list_incomes(&self) -> Result<Vec<Income>> {
        let _guard = self.incomes_lock.lock().await;
        self.read_jsonl(&self.incomes_file()).await
    }

    async fn insert_income(&self, income: &Income) -> Result<()> {
        let _guard = self.incomes_lock.lock().await;
        self.append_jsonl(&self.incomes_file(), std::slice::from_ref(income))
            .await
    }

    async fn insert_incomes(&self, incomes: &[Income]) -> Result<()> {
        let _guard = self.incomes_lock.lock().await;
        self.append_jsonl(&self.incomes_file(), incomes).await
    }

    async fn update_income(&self, income: &Income) -> Result<()> {
        let _guard = self.incomes_lock.lock().await;
        let path = self.incomes_file();
        let mut incomes: Vec<Income> = self.read_jsonl(&path).await?;
        match incomes.iter_mut().find(|i| i.id == income.id) {
            Some(existing) => *existing = income.clone(),
            None => incomes.push(income.clone()),
        }
        self.write_jsonl(&path, &incomes).await
    }

    async fn delete_income(&self, id: i64) -> Result<bool> {
        let _guard = self.incomes_lock.lock().await;
        let path = self.incomes_file();
        let mut incomes: Vec<Income> = self.read_jsonl(&path).await?;
        let before = incomes.len();
        incomes.retain(|i| i.id != Some(id));
        let removed = incomes.len() != before;
        if removed {
            self.write_jsonl(&path, &incomes).await?;
        }
        Ok(removed)
    }

    async fn replace_incomes(&self, incomes: &[Income]) -> Result<()> {
        let _guard = self.incomes_lock.lock().await;
        self.write_jsonl(&self.incomes_file(), incomes).await
    }

    async fn replace_incomes_since(&self, cutoff: NaiveDate, incomes: &[Income]) -> Result<()> {
        let _guard = self.incomes_lock.lock().await;
        let path = self.incomes_file();
        let mut kept: Vec<Income> = self.read_jsonl(&path).await?;
        kept.retain(|i| i.date < cutoff);
        kept.extend(incomes.iter().cloned());
        self.write_jsonl(&path, &kept).await
    }
}
