use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::warn;
use watchcraft_models::{CatalogEntry, EntryId, EntryUpdate, MediaEntry, MediaType};

use crate::error::SourceResult;

/// One hit from a provider search, before details are fetched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub external_id: String,
    pub title: String,
    pub year: Option<i32>,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    pub poster_url: Option<String>,
}

/// Movie/TV metadata catalog (OMDb and friends)
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    fn provider_name(&self) -> &str;

    async fn try_search(&self, query: &str) -> SourceResult<Vec<SearchResult>>;

    async fn try_get_details(&self, external_id: &str) -> SourceResult<Option<MediaEntry>>;

    /// Search results in provider order; empty on no match or on failure
    async fn search(&self, query: &str) -> Vec<SearchResult> {
        match self.try_search(query).await {
            Ok(results) => results,
            Err(e) => {
                warn!(provider = self.provider_name(), query = %query, error = %e, "Search failed");
                Vec::new()
            }
        }
    }

    /// Full entry for a provider id; `None` when unknown or on failure
    async fn get_details(&self, external_id: &str) -> Option<MediaEntry> {
        match self.try_get_details(external_id).await {
            Ok(details) => details,
            Err(e) => {
                warn!(
                    provider = self.provider_name(),
                    external_id = %external_id,
                    error = %e,
                    "Detail lookup failed"
                );
                None
            }
        }
    }
}

/// Live feed of full catalog snapshots; dropping it unsubscribes
pub struct WatchlistSubscription {
    receiver: broadcast::Receiver<Vec<CatalogEntry>>,
}

impl WatchlistSubscription {
    pub fn new(receiver: broadcast::Receiver<Vec<CatalogEntry>>) -> Self {
        Self { receiver }
    }

    /// Wait for the next snapshot
    ///
    /// Returns `None` once the store is gone. A subscriber that falls behind
    /// skips straight to the newest snapshot, since each one is complete.
    pub async fn next(&mut self) -> Option<Vec<CatalogEntry>> {
        loop {
            match self.receiver.recv().await {
                Ok(snapshot) => return Some(snapshot),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped = skipped, "Watchlist subscriber lagged behind");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

/// Persistence for the shared watchlist
#[async_trait]
pub trait WatchlistStore: Send + Sync {
    fn store_name(&self) -> &str;

    /// Every entry, ordered by title (byte-wise, case-sensitive), then by id
    async fn list_all(&self) -> SourceResult<Vec<CatalogEntry>>;

    /// Persist a new entry; the store assigns the id and timestamps
    async fn create(&self, entry: MediaEntry) -> SourceResult<EntryId>;

    /// Merge the present fields into a stored entry
    async fn update(&self, id: &EntryId, update: &EntryUpdate) -> SourceResult<()>;

    async fn delete(&self, id: &EntryId) -> SourceResult<()>;

    /// Realtime snapshots, for stores that support them
    fn subscribe(&self) -> Option<WatchlistSubscription> {
        None
    }
}

/// Canonical `list_all` order shared by every store
pub fn sort_catalog(entries: &mut [CatalogEntry]) {
    entries.sort_by(|a, b| a.media.title.cmp(&b.media.title).then_with(|| a.id.cmp(&b.id)));
}
