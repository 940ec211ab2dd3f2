//! Income synchronization. Same shape as the expense service, with the
//! narrower current-month refresh window.

use std::sync::Arc;

use crate::api::ApiClient;
use crate::clock::{Clock, SystemClock};
use crate::models::Income;
use crate::store::CacheStore;

use super::{income_cutoff, require_id, FetchMode, RefreshOutcome, SyncError};

/// Keeps the income cache reconciled with the server.
pub struct IncomeService {
    api: Arc<ApiClient>,
    store: Arc<dyn CacheStore>,
    clock: Arc<dyn Clock>,
}

impl IncomeService {
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

    /// Fetch incomes from the server and reconcile the cache.
    ///
    /// An empty cache always fetches the full history. An incremental
    /// refresh covers the current month only, from its first day onward;
    /// earlier cached records stay as they are. When the server cannot be
    /// reached the cached records come back unchanged with the failure
    /// attached.
    pub async fn refresh(&self, mode: FetchMode) -> Result<RefreshOutcome<Income>, SyncError> {
        let cached = self.store.list_incomes().await?;
        let mode = if cached.is_empty() {
            FetchMode::Full
        } else {
            mode
        };

        let reconciled = match mode {
            FetchMode::Full => match self.api.list_incomes(None).await {
                Ok(batch) => {
                    self.store.replace_incomes(&batch).await?;
                    Ok(())
                }
                Err(err) => Err(err),
            },
            FetchMode::Incremental => {
                let cutoff = income_cutoff(self.clock.today());
                match self.api.list_incomes(Some(cutoff)).await {
                    Ok(batch) => {
                        self.store.replace_incomes_since(cutoff, &batch).await?;
                        Ok(())
                    }
                    Err(err) => Err(err),
                }
            }
        };

        match reconciled {
            Ok(()) => Ok(RefreshOutcome::Fresh {
                records: self.store.list_incomes().await?,
            }),
            Err(err) => {
                tracing::warn!(error = %err, "Income refresh failed; serving cached records");
                Ok(RefreshOutcome::Stale {
                    records: cached,
                    error: err,
                })
            }
        }
    }

    /// Create the income on the server, then cache the record it assigned
    /// an id to.
    pub async fn create(&self, income: &Income) -> Result<Income, SyncError> {
        let created = self.api.create_income(income).await?;
        self.store.insert_income(&created).await?;
        Ok(created)
    }

    /// Push the edited income to the server, then cache the version it
    /// returned.
    pub async fn update(&self, income: &Income) -> Result<Income, SyncError> {
        let id = require_id(income.id)?;
        let updated = self.api.update_income(id, income).await?;
        self.store.update_income(&updated).await?;
        Ok(updated)
    }

    /// Delete the income on the server, then drop it from the cache.
    pub async fn delete(&self, income: &Income) -> Result<(), SyncError> {
        let id = require_id(income.id)?;
        self.api.delete_income(id).await?;
        self.store.delete_income(id).await?;
        Ok(())
    }
}
