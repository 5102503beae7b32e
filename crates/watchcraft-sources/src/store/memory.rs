use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{broadcast, RwLock};
use tracing::debug;
use watchcraft_models::{CatalogEntry, EntryId, EntryUpdate, MediaEntry};

use super::{apply_update, new_entry_id, publish, remove_entry, snapshot_channel};
use crate::error::SourceResult;
use crate::traits::{sort_catalog, WatchlistStore, WatchlistSubscription};

/// Process-local store, used for tests and ephemeral sessions
pub struct MemoryStore {
    entries: RwLock<Vec<CatalogEntry>>,
    updates: broadcast::Sender<Vec<CatalogEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_entries(Vec::new())
    }

    /// Start from existing documents, e.g. a fixture
    pub fn with_entries(entries: Vec<CatalogEntry>) -> Self {
        Self {
            entries: RwLock::new(entries),
            updates: snapshot_channel(),
        }
    }

    async fn sorted_snapshot(&self) -> Vec<CatalogEntry> {
        let mut snapshot = self.entries.read().await.clone();
        sort_catalog(&mut snapshot);
        snapshot
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WatchlistStore for MemoryStore {
    fn store_name(&self) -> &str {
        "memory"
    }

    async fn list_all(&self) -> SourceResult<Vec<CatalogEntry>> {
        Ok(self.sorted_snapshot().await)
    }

    async fn create(&self, entry: MediaEntry) -> SourceResult<EntryId> {
        let id = new_entry_id();
        self.entries
            .write()
            .await
            .push(CatalogEntry::new(id.clone(), entry, Utc::now()));
        debug!(id = %id, "Created entry in memory store");

        publish(&self.updates, self.sorted_snapshot().await);
        Ok(id)
    }

    async fn update(&self, id: &EntryId, update: &EntryUpdate) -> SourceResult<()> {
        apply_update(&mut *self.entries.write().await, id, update)?;
        publish(&self.updates, self.sorted_snapshot().await);
        Ok(())
    }

    async fn delete(&self, id: &EntryId) -> SourceResult<()> {
        remove_entry(&mut *self.entries.write().await, id)?;
        publish(&self.updates, self.sorted_snapshot().await);
        Ok(())
    }

    fn subscribe(&self) -> Option<WatchlistSubscription> {
        Some(WatchlistSubscription::new(self.updates.subscribe()))
    }
}
