//! Expense synchronization: windowed refresh plus remote-first mutations.

use std::sync::Arc;

use crate::api::ApiClient;
use crate::clock::{Clock, SystemClock};
use crate::models::Expense;
use crate::store::CacheStore;

use super::{expense_cutoff, require_id, FetchMode, RefreshOutcome, SyncError};

/// Keeps the expense cache reconciled with the server.
pub struct ExpenseService {
    api: Arc<ApiClient>,
    store: Arc<dyn CacheStore>,
    clock: Arc<dyn Clock>,
}

impl ExpenseService {
    pub fn new(api: Arc<ApiClient>, store: Arc<dyn CacheStore>) -> Self {
        Self {
            api,
            store,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Fetch expenses from the server and reconcile the cache.
    ///
    /// An empty cache always fetches the full history, whatever `mode` asks
    /// for. An incremental refresh covers dates from one month before today
    /// onward; cached records older than the cutoff stay as they are. When
    /// the server cannot be reached the cached records come back unchanged
    /// with the failure attached.
    pub async fn refresh(&self, mode: FetchMode) -> Result<RefreshOutcome<Expense>, SyncError> {
        let cached = self.store.list_expenses().await?;
        let mode = if cached.is_empty() {
            FetchMode::Full
        } else {
            mode
        };

        let reconciled = match mode {
            FetchMode::Full => match self.api.list_expenses(None).await {
                Ok(batch) => {
                    self.store.replace_expenses(&batch).await?;
                    Ok(())
                }
                Err(err) => Err(err),
            },
            FetchMode::Incremental => {
                let cutoff = expense_cutoff(self.clock.today());
                match self.api.list_expenses(Some(cutoff)).await {
                    Ok(batch) => {
                        self.store.replace_expenses_since(cutoff, &batch).await?;
                        Ok(())
                    }
                    Err(err) => Err(err),
                }
            }
        };

        match reconciled {
            Ok(()) => Ok(RefreshOutcome::Fresh {
                records: self.store.list_expenses().await?,
            }),
            Err(err) => {
                tracing::warn!(error = %err, "Expense refresh failed; serving cached records");
                Ok(RefreshOutcome::Stale {
                    records: cached,
                    error: err,
                })
            }
        }
    }

    /// Create the expense on the server, then cache the record it assigned
    /// an id to.
    pub async fn create(&self, expense: &Expense) -> Result<Expense, SyncError> {
        let created = self.api.create_expense(expense).await?;
        self.store.insert_expense(&created).await?;
        Ok(created)
    }

    /// Push the edited expense to the server, then cache the version it
    /// returned.
    pub async fn update(&self, expense: &Expense) -> Result<Expense, SyncError> {
        let id = require_id(expense.id)?;
        let updated = self.api.update_expense(id, expense).await?;
        self.store.update_expense(&updated).await?;
        Ok(updated)
    }

    /// Delete the expense on the server, then drop it from the cache. A
    /// record the server no longer has surfaces `ApiError::NotFound` and
    /// leaves the cache untouched.
    pub async fn delete(&self, expense: &Expense) -> Result<(), SyncError> {
        let id = require_id(expense.id)?;
        self.api.delete_expense(id).await?;
        self.store.delete_expense(id).await?;
        Ok(())
    }
}
