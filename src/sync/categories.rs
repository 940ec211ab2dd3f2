//! Category synchronization. Categories carry no dates, so there is no
//! incremental window; every refresh replaces the whole cached set.

use std::sync::Arc;

use crate::api::ApiClient;
use crate::models::Category;
use crate::store::CacheStore;

use super::{require_id, RefreshOutcome, SyncError};

/// Keeps the category cache reconciled with the server.
pub struct CategoryService {
    api: Arc<ApiClient>,
    store: Arc<dyn CacheStore>,
}

impl CategoryService {
    pub fn new(api: Arc<ApiClient>, store: Arc<dyn CacheStore>) -> Self {
        Self { api, store }
    }

    /// Fetch the full category list and replace the cache with it. When the
    /// server cannot be reached the cached categories come back unchanged
    /// with the failure attached.
    pub async fn refresh(&self) -> Result<RefreshOutcome<Category>, SyncError> {
        let cached = self.store.list_categories().await?;

        match self.api.list_categories().await {
            Ok(batch) => {
                self.store.replace_categories(&batch).await?;
                Ok(RefreshOutcome::Fresh {
                    records: self.store.list_categories().await?,
                })
            }
            Err(err) => {
                tracing::warn!(error = %err, "Category refresh failed; serving cached records");
                Ok(RefreshOutcome::Stale {
                    records: cached,
                    error: err,
                })
            }
        }
    }

    /// Create the category on the server, then cache the record it assigned
    /// an id to.
    pub async fn create(&self, category: &Category) -> Result<Category, SyncError> {
        let created = self.api.create_category(category).await?;
        self.store.insert_category(&created).await?;
        Ok(created)
    }

    /// Push the edited category to the server, then cache the version it
    /// returned.
    pub async fn update(&self, category: &Category) -> Result<Category, SyncError> {
        let id = require_id(category.id)?;
        let updated = self.api.update_category(id, category).await?;
        self.store.update_category(&updated).await?;
        Ok(updated)
    }

    /// Delete the category on the server, then drop it from the cache.
    /// Expenses that pointed at it keep their stale reference; reports
    /// resolve those to a blank name rather than failing.
    pub async fn delete(&self, category: &Category) -> Result<(), SyncError> {
        let id = require_id(category.id)?;
        self.api.delete_category(id).await?;
        self.store.delete_category(id).await?;
        Ok(())
    }
}
