use async_trait::async_trait;
use chrono::Utc;
use std::path::{Path, PathBuf};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info};
use watchcraft_models::{CatalogEntry, EntryId, EntryUpdate, MediaEntry};

use super::{apply_update, new_entry_id, publish, remove_entry, snapshot_channel};
use crate::error::{SourceError, SourceResult};
use crate::traits::{sort_catalog, WatchlistStore, WatchlistSubscription};

/// Watchlist persisted as one JSON array on disk
///
/// Every mutation rewrites the whole file through a temporary sibling and a
/// rename, so a crash leaves either the old or the new document. Writers in
/// this process are serialized; other processes are not coordinated with.
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
    updates: broadcast::Sender<Vec<CatalogEntry>>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
            updates: snapshot_channel(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> SourceResult<Vec<CatalogEntry>> {
        if !tokio::fs::try_exists(&self.path).await? {
            debug!(path = %self.path.display(), "Watchlist file does not exist yet");
            return Ok(Vec::new());
        }

        let content = tokio::fs::read_to_string(&self.path).await?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&content).map_err(|e| {
            SourceError::Store(format!(
                "Watchlist file {} is corrupt: {}",
                self.path.display(),
                e
            ))
        })
    }

    async fn save(&self, entries: &mut [CatalogEntry]) -> SourceResult<()> {
        sort_catalog(entries);

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(entries)?;
        let tmp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, content).await?;
        tokio::fs::rename(&tmp_path, &self.path).await?;

        debug!(path = %self.path.display(), entries = entries.len(), "Saved watchlist file");
        publish(&self.updates, entries.to_vec());
        Ok(())
    }
}

#[async_trait]
impl WatchlistStore for JsonFileStore {
    fn store_name(&self) -> &str {
        "json-file"
    }

    async fn list_all(&self) -> SourceResult<Vec<CatalogEntry>> {
        let _guard = self.lock.lock().await;
        let mut entries = self.load().await?;
        sort_catalog(&mut entries);
        Ok(entries)
    }

    async fn create(&self, entry: MediaEntry) -> SourceResult<EntryId> {
        let _guard = self.lock.lock().await;
        let mut entries = self.load().await?;

        let id = new_entry_id();
        info!(id = %id, title = %entry.title, "Adding entry to watchlist file");
        entries.push(CatalogEntry::new(id.clone(), entry, Utc::now()));
        self.save(&mut entries).await?;
        Ok(id)
    }

    async fn update(&self, id: &EntryId, update: &EntryUpdate) -> SourceResult<()> {
        let _guard = self.lock.lock().await;
        let mut entries = self.load().await?;
        apply_update(&mut entries, id, update)?;
        self.save(&mut entries).await
    }

    async fn delete(&self, id: &EntryId) -> SourceResult<()> {
        let _guard = self.lock.lock().await;
        let mut entries = self.load().await?;
        remove_entry(&mut entries, id)?;
        info!(id = %id, "Deleted entry from watchlist file");
        self.save(&mut entries).await
    }

    fn subscribe(&self) -> Option<WatchlistSubscription> {
        Some(WatchlistSubscription::new(self.updates.subscribe()))
    }
}
