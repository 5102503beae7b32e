use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use watchcraft_models::{CatalogEntry, EntryId, EntryUpdate, MediaEntry, PersonName, WatchStatus, EPISODES_PER_SEASON};
use watchcraft_sources::traits::sort_catalog;
use watchcraft_sources::{MetadataProvider, SearchResult, WatchlistStore};

use crate::error::{CoreError, CoreResult};
use crate::filter::{FacetValues, FilterCriteria, FilterSummary};
use crate::progress;
use crate::recommendation::{
    attribution_list, classify, find_by_external_id, merge_recommendation, recommended_entry,
    RecommendationStatus,
};

/// A provider search result annotated with where it stands on the watchlist
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    #[serde(flatten)]
    pub result: SearchResult,
    pub status: RecommendationStatus,
}

/// What `recommend` did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum RecommendOutcome {
    /// The title was not listed and a new entry was created
    Created { id: EntryId },
    /// The actor was merged into an existing not-started entry
    Merged { id: EntryId },
    /// Already being watched or finished; nothing changed
    AlreadyStarted { id: EntryId, completed: bool },
}

/// One session's view of the shared watchlist
///
/// Holds the last catalog snapshot read from the store. Every mutation is
/// computed on a copy and only replaces the held entry after the store
/// accepted it, so a failed write leaves the snapshot untouched.
pub struct WatchlistService {
    store: Arc<dyn WatchlistStore>,
    provider: Arc<dyn MetadataProvider>,
    episodes_per_season: u32,
    entries: Vec<CatalogEntry>,
}

impl WatchlistService {
    pub fn new(store: Arc<dyn WatchlistStore>, provider: Arc<dyn MetadataProvider>) -> Self {
        Self {
            store,
            provider,
            episodes_per_season: EPISODES_PER_SEASON,
            entries: Vec::new(),
        }
    }

    pub fn with_episodes_per_season(mut self, episodes_per_season: u32) -> Self {
        self.episodes_per_season = episodes_per_season;
        self
    }

    pub fn episodes_per_season(&self) -> u32 {
        self.episodes_per_season
    }

    /// Re-read the whole catalog from the store
    pub async fn refresh(&mut self) -> CoreResult<&[CatalogEntry]> {
        let entries = self.store.list_all().await?;
        debug!(store = self.store.store_name(), count = entries.len(), "Refreshed watchlist");
        self.entries = entries;
        Ok(&self.entries)
    }

    /// Replace the snapshot with one pushed by a store subscription
    pub fn replace_snapshot(&mut self, entries: Vec<CatalogEntry>) {
        self.entries = entries;
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn get(&self, id: &EntryId) -> CoreResult<&CatalogEntry> {
        self.entries
            .iter()
            .find(|entry| entry.id == *id)
            .ok_or_else(|| CoreError::NotFound(id.to_string()))
    }

    pub fn filtered(&self, criteria: &FilterCriteria) -> Vec<&CatalogEntry> {
        criteria.apply(&self.entries)
    }

    pub fn summary(&self, criteria: &FilterCriteria) -> FilterSummary {
        FilterSummary::new(self.filtered(criteria).len(), self.entries.len())
    }

    pub fn facets(&self) -> FacetValues {
        FacetValues::collect(&self.entries)
    }

    /// Provider search, classified against the current snapshot for `actor`
    pub async fn search(&self, query: &str, actor: Option<&PersonName>) -> Vec<SearchHit> {
        let results = self.provider.search(query).await;
        debug!(provider = self.provider.provider_name(), query = %query, hits = results.len(), "Search complete");

        results
            .into_iter()
            .map(|result| {
                let existing = find_by_external_id(&self.entries, &result.external_id);
                SearchHit {
                    status: classify(existing, actor),
                    result,
                }
            })
            .collect()
    }

    /// Fetch full details for a provider id and add them as a new entry
    #[instrument(skip(self))]
    pub async fn add_from_provider(&mut self, external_id: &str) -> CoreResult<EntryId> {
        let details = self.fetch_details(external_id).await?;
        self.insert(details).await
    }

    /// Add an entry typed in by hand
    pub async fn add_manual(&mut self, entry: MediaEntry) -> CoreResult<EntryId> {
        self.insert(entry).await
    }

    pub async fn delete(&mut self, id: &EntryId) -> CoreResult<()> {
        let index = self.position(id)?;
        self.store.delete(id).await?;
        let removed = self.entries.remove(index);
        info!(id = %id, title = %removed.title(), "Deleted entry");
        Ok(())
    }

    pub async fn set_status(&mut self, id: &EntryId, status: WatchStatus) -> CoreResult<()> {
        self.mutate(id, |entry| {
            entry.status = status;
            Ok(())
        })
        .await
    }

    pub async fn set_moods(&mut self, id: &EntryId, moods: Vec<String>) -> CoreResult<()> {
        self.mutate(id, |entry| {
            entry.moods = moods;
            Ok(())
        })
        .await
    }

    /// Replace the genres; blank names are dropped
    pub async fn set_genres(&mut self, id: &EntryId, genres: Vec<String>) -> CoreResult<()> {
        self.mutate(id, |entry| {
            entry.genres = genres
                .iter()
                .map(|genre| genre.trim())
                .filter(|genre| !genre.is_empty())
                .map(str::to_string)
                .collect();
            Ok(())
        })
        .await
    }

    /// Replace the recommender list; names must be distinct
    pub async fn set_recommended_by(&mut self, id: &EntryId, names: Vec<String>) -> CoreResult<()> {
        let people = attribution_list(&names)?;
        self.mutate(id, |entry| {
            entry.recommended_by = people;
            Ok(())
        })
        .await
    }

    /// Replace the co-viewer list; names must be distinct
    pub async fn set_watching_with(&mut self, id: &EntryId, names: Vec<String>) -> CoreResult<()> {
        let people = attribution_list(&names)?;
        self.mutate(id, |entry| {
            entry.watching_with = people;
            Ok(())
        })
        .await
    }

    pub async fn set_primary_progress(&mut self, id: &EntryId, season: i64, episode: i64) -> CoreResult<()> {
        self.mutate(id, |entry| progress::set_primary_progress(entry, season, episode))
            .await
    }

    pub async fn set_partner_progress(
        &mut self,
        id: &EntryId,
        name: &str,
        season: i64,
        episode: i64,
    ) -> CoreResult<()> {
        self.mutate(id, |entry| progress::set_partner_progress(entry, name, season, episode))
            .await
    }

    pub async fn add_partner(&mut self, id: &EntryId, name: &str) -> CoreResult<bool> {
        self.mutate(id, |entry| progress::add_partner(entry, name)).await
    }

    pub async fn remove_partner(&mut self, id: &EntryId, name: &str) -> CoreResult<bool> {
        self.mutate(id, |entry| Ok(progress::remove_partner(entry, name)))
            .await
    }

    pub async fn record_watch(&mut self, id: &EntryId, at: DateTime<Utc>) -> CoreResult<()> {
        self.mutate(id, |entry| {
            progress::record_watch(entry, at);
            Ok(())
        })
        .await
    }

    /// Recommend a provider title on behalf of `actor`
    ///
    /// Re-reads the catalog first so a title added earlier in this session is
    /// found. Two sessions recommending the same new title at once can still
    /// both create it.
    #[instrument(skip(self, actor), fields(actor = %actor))]
    pub async fn recommend(
        &mut self,
        external_id: &str,
        actor: &PersonName,
        watch_together: bool,
    ) -> CoreResult<RecommendOutcome> {
        self.refresh().await?;

        let existing = find_by_external_id(&self.entries, external_id);
        let existing_id = existing.map(|entry| entry.id.clone());
        match (classify(existing, Some(actor)), existing_id) {
            (RecommendationStatus::AlreadyStarted { completed }, Some(id)) => {
                info!(id = %id, completed, "Recommended title is already started");
                Ok(RecommendOutcome::AlreadyStarted { id, completed })
            }
            (RecommendationStatus::OnWatchlist { .. }, Some(id)) => {
                self.mutate(&id, |entry| {
                    *entry = merge_recommendation(entry, actor, watch_together);
                    Ok(())
                })
                .await?;
                Ok(RecommendOutcome::Merged { id })
            }
            _ => {
                let details = self.fetch_details(external_id).await?;
                let entry = recommended_entry(details, actor, watch_together, Utc::now());
                let id = self.insert(entry).await?;
                Ok(RecommendOutcome::Created { id })
            }
        }
    }

    async fn fetch_details(&self, external_id: &str) -> CoreResult<MediaEntry> {
        self.provider
            .get_details(external_id)
            .await
            .ok_or_else(|| CoreError::NotFound(format!("no details for {}", external_id)))
    }

    async fn insert(&mut self, entry: MediaEntry) -> CoreResult<EntryId> {
        let id = self.store.create(entry.clone()).await?;
        info!(id = %id, title = %entry.title, "Added entry");

        // Re-read so the snapshot carries the store's timestamps
        if let Err(e) = self.refresh().await.map(|_| ()) {
            warn!(id = %id, error = %e, "Could not re-read watchlist after adding an entry");
            self.entries.push(CatalogEntry::new(id.clone(), entry, Utc::now()));
            sort_catalog(&mut self.entries);
        }
        Ok(id)
    }

    fn position(&self, id: &EntryId) -> CoreResult<usize> {
        self.entries
            .iter()
            .position(|entry| entry.id == *id)
            .ok_or_else(|| CoreError::NotFound(id.to_string()))
    }

    async fn mutate<T, F>(&mut self, id: &EntryId, edit: F) -> CoreResult<T>
    where
        F: FnOnce(&mut MediaEntry) -> CoreResult<T>,
    {
        let index = self.position(id)?;
        let before = &self.entries[index].media;
        let mut after = before.clone();
        let outcome = edit(&mut after)?;

        let update = EntryUpdate::between(before, &after);
        if update.is_empty() {
            return Ok(outcome);
        }
        self.store.update(id, &update).await?;
        debug!(id = %id, "Stored entry update");

        let entry = &mut self.entries[index];
        entry.media = after;
        entry.updated_at = Utc::now();
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use watchcraft_models::{EpisodePosition, MediaType};
    use watchcraft_sources::error::{SourceError, SourceResult};
    use watchcraft_sources::MemoryStore;

    struct FakeProvider {
        titles: HashMap<String, MediaEntry>,
    }

    impl FakeProvider {
        fn new() -> Self {
            let mut titles = HashMap::new();
            titles.insert(
                "tt0113277".to_string(),
                MediaEntry::new("Heat", MediaType::Movie)
                    .unwrap()
                    .with_external_id("tt0113277")
                    .with_runtime(170),
            );
            titles.insert(
                "tt5753856".to_string(),
                MediaEntry::new("Dark", MediaType::Tv)
                    .unwrap()
                    .with_external_id("tt5753856")
                    .with_total_episodes(60),
            );
            Self { titles }
        }
    }

    #[async_trait]
    impl MetadataProvider for FakeProvider {
        fn provider_name(&self) -> &str {
            "fake"
        }

        async fn try_search(&self, query: &str) -> SourceResult<Vec<SearchResult>> {
            let query = query.to_lowercase();
            let mut hits: Vec<SearchResult> = self
                .titles
                .iter()
                .filter(|(_, entry)| entry.title.to_lowercase().contains(&query))
                .map(|(id, entry)| SearchResult {
                    external_id: id.clone(),
                    title: entry.title.clone(),
                    year: None,
                    media_type: entry.media_type,
                    poster_url: None,
                })
                .collect();
            hits.sort_by(|a, b| a.title.cmp(&b.title));
            Ok(hits)
        }

        async fn try_get_details(&self, external_id: &str) -> SourceResult<Option<MediaEntry>> {
            Ok(self.titles.get(external_id).cloned())
        }
    }

    /// Delegates to a memory store but can be told to reject writes
    struct FlakyStore {
        inner: MemoryStore,
        fail_writes: AtomicBool,
    }

    impl FlakyStore {
        fn new() -> Self {
            Self {
                inner: MemoryStore::new(),
                fail_writes: AtomicBool::new(false),
            }
        }

        fn check(&self) -> SourceResult<()> {
            if self.fail_writes.load(Ordering::SeqCst) {
                Err(SourceError::Store("write rejected".to_string()))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl WatchlistStore for FlakyStore {
        fn store_name(&self) -> &str {
            "flaky"
        }

        async fn list_all(&self) -> SourceResult<Vec<CatalogEntry>> {
            self.inner.list_all().await
        }

        async fn create(&self, entry: MediaEntry) -> SourceResult<EntryId> {
            self.check()?;
            self.inner.create(entry).await
        }

        async fn update(&self, id: &EntryId, update: &EntryUpdate) -> SourceResult<()> {
            self.check()?;
            self.inner.update(id, update).await
        }

        async fn delete(&self, id: &EntryId) -> SourceResult<()> {
            self.check()?;
            self.inner.delete(id).await
        }
    }

    fn service_with(store: Arc<dyn WatchlistStore>) -> WatchlistService {
        WatchlistService::new(store, Arc::new(FakeProvider::new()))
    }

    fn person(name: &str) -> PersonName {
        PersonName::new(name).unwrap()
    }

    #[tokio::test]
    async fn test_add_from_provider_then_refresh() {
        let store = Arc::new(MemoryStore::new());
        let mut service = service_with(store.clone());

        let id = service.add_from_provider("tt0113277").await.unwrap();
        assert_eq!(service.get(&id).unwrap().title(), "Heat");

        let stored = store.list_all().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, id);

        service.refresh().await.unwrap();
        assert_eq!(service.entries().len(), 1);
    }

    #[tokio::test]
    async fn test_add_unknown_title_is_not_found() {
        let mut service = service_with(Arc::new(MemoryStore::new()));
        let err = service.add_from_provider("tt0000000").await.unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
        assert!(service.entries().is_empty());
    }

    #[tokio::test]
    async fn test_snapshot_stays_sorted_by_title() {
        let mut service = service_with(Arc::new(MemoryStore::new()));
        service.add_manual(MediaEntry::new("Zodiac", MediaType::Movie).unwrap()).await.unwrap();
        service.add_manual(MediaEntry::new("Arrival", MediaType::Movie).unwrap()).await.unwrap();

        let titles: Vec<&str> = service.entries().iter().map(|e| e.title()).collect();
        assert_eq!(titles, vec!["Arrival", "Zodiac"]);
    }

    #[tokio::test]
    async fn test_progress_updates_reach_the_store() {
        let store = Arc::new(MemoryStore::new());
        let mut service = service_with(store.clone());
        let id = service.add_from_provider("tt5753856").await.unwrap();

        service.set_primary_progress(&id, 2, 5).await.unwrap();
        assert!(service.add_partner(&id, "Alex").await.unwrap());
        assert!(!service.add_partner(&id, "Alex").await.unwrap());
        service.set_partner_progress(&id, "Sam", 0, -3).await.unwrap();

        let stored = store.list_all().await.unwrap();
        let media = &stored[0].media;
        assert_eq!(media.primary_progress, EpisodePosition { season: 2, episode: 5 });
        assert_eq!(media.viewing_progress.len(), 2);
        assert_eq!(
            media.viewing_progress.get("Sam"),
            Some(&EpisodePosition { season: 1, episode: 1 })
        );
        assert_eq!(service.get(&id).unwrap().media, *media);
    }

    #[tokio::test]
    async fn test_snapshot_carries_store_timestamps() {
        let store = Arc::new(MemoryStore::new());
        let mut service = service_with(store.clone());
        let id = service.add_manual(MediaEntry::new("Heat", MediaType::Movie).unwrap()).await.unwrap();

        let stored = store.list_all().await.unwrap();
        assert_eq!(*service.get(&id).unwrap(), stored[0]);
    }

    #[tokio::test]
    async fn test_owner_edits_attribution_lists() {
        let store = Arc::new(MemoryStore::new());
        let mut service = service_with(store.clone());
        let id = service.add_manual(MediaEntry::new("Paddington 2", MediaType::Movie).unwrap()).await.unwrap();

        service
            .set_recommended_by(&id, vec!["Alex".to_string(), " Sam".to_string()])
            .await
            .unwrap();
        service.set_watching_with(&id, vec!["Sam".to_string()]).await.unwrap();

        let stored = &store.list_all().await.unwrap()[0].media;
        assert_eq!(stored.recommended_by, vec![person("Alex"), person("Sam")]);
        assert_eq!(stored.watching_with, vec![person("Sam")]);

        service.set_recommended_by(&id, vec!["Sam".to_string()]).await.unwrap();
        service.set_watching_with(&id, Vec::new()).await.unwrap();
        let stored = &store.list_all().await.unwrap()[0].media;
        assert_eq!(stored.recommended_by, vec![person("Sam")]);
        assert!(stored.watching_with.is_empty());
        assert_eq!(service.get(&id).unwrap().media, *stored);
    }

    #[tokio::test]
    async fn test_attribution_lists_reject_duplicates_and_blanks() {
        let store = Arc::new(FlakyStore::new());
        let mut service = service_with(store.clone());
        let id = service.add_manual(MediaEntry::new("Heat", MediaType::Movie).unwrap()).await.unwrap();

        store.fail_writes.store(true, Ordering::SeqCst);
        let err = service
            .set_recommended_by(&id, vec!["Alex".to_string(), "Alex ".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidArgument(_)));
        let err = service.set_watching_with(&id, vec![" ".to_string()]).await.unwrap_err();
        assert!(matches!(err, CoreError::InvalidArgument(_)));

        assert!(service.get(&id).unwrap().media.recommended_by.is_empty());
    }

    #[tokio::test]
    async fn test_set_genres_drops_blanks() {
        let store = Arc::new(MemoryStore::new());
        let mut service = service_with(store.clone());
        let id = service.add_from_provider("tt0113277").await.unwrap();

        service
            .set_genres(&id, vec!["Crime".to_string(), " ".to_string(), " Drama ".to_string(), "Crime".to_string()])
            .await
            .unwrap();

        let genres: Vec<String> = store.list_all().await.unwrap()[0].media.genres.iter().cloned().collect();
        assert_eq!(genres, vec!["Crime".to_string(), "Drama".to_string()]);
        assert!(FilterCriteria::new().genre("Drama").matches(&service.get(&id).unwrap().media));
    }

    #[tokio::test]
    async fn test_failed_write_leaves_snapshot_untouched() {
        let store = Arc::new(FlakyStore::new());
        let mut service = service_with(store.clone());
        let id = service.add_from_provider("tt5753856").await.unwrap();
        let before = service.get(&id).unwrap().clone();

        store.fail_writes.store(true, Ordering::SeqCst);
        let err = service.set_status(&id, WatchStatus::Watching).await.unwrap_err();
        assert!(matches!(err, CoreError::Collaborator(_)));
        assert!(service.delete(&id).await.is_err());
        assert!(service.add_manual(MediaEntry::new("Heat", MediaType::Movie).unwrap()).await.is_err());

        assert_eq!(service.entries().len(), 1);
        assert_eq!(*service.get(&id).unwrap(), before);
    }

    #[tokio::test]
    async fn test_invalid_partner_name_never_reaches_the_store() {
        let store = Arc::new(FlakyStore::new());
        let mut service = service_with(store.clone());
        let id = service.add_from_provider("tt5753856").await.unwrap();

        store.fail_writes.store(true, Ordering::SeqCst);
        let err = service.add_partner(&id, " ").await.unwrap_err();
        assert!(matches!(err, CoreError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found() {
        let mut service = service_with(Arc::new(MemoryStore::new()));
        let err = service.set_status(&EntryId::new("missing"), WatchStatus::Completed).await;
        assert!(matches!(err, Err(CoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_recommend_creates_then_merges() {
        let store = Arc::new(MemoryStore::new());
        let mut service = service_with(store.clone());

        let created = service.recommend("tt0113277", &person("Alex"), false).await.unwrap();
        let RecommendOutcome::Created { id } = created else {
            panic!("expected a new entry, got {:?}", created);
        };
        let entry = service.get(&id).unwrap();
        assert!(entry.media.added_via_recommendation);
        assert_eq!(entry.media.recommended_by, vec![person("Alex")]);

        let merged = service.recommend("tt0113277", &person("Sam"), true).await.unwrap();
        assert_eq!(merged, RecommendOutcome::Merged { id: id.clone() });
        let again = service.recommend("tt0113277", &person("Sam"), true).await.unwrap();
        assert_eq!(again, RecommendOutcome::Merged { id: id.clone() });

        let stored = store.list_all().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].media.recommended_by, vec![person("Alex"), person("Sam")]);
        assert_eq!(stored[0].media.watching_with, vec![person("Sam")]);
    }

    #[tokio::test]
    async fn test_recommend_started_title_changes_nothing() {
        let store = Arc::new(MemoryStore::new());
        let mut service = service_with(store.clone());
        let id = service.add_from_provider("tt0113277").await.unwrap();
        service.set_status(&id, WatchStatus::Completed).await.unwrap();

        let outcome = service.recommend("tt0113277", &person("Alex"), true).await.unwrap();
        assert_eq!(outcome, RecommendOutcome::AlreadyStarted { id, completed: true });
        assert!(store.list_all().await.unwrap()[0].media.recommended_by.is_empty());
    }

    #[tokio::test]
    async fn test_recommend_sees_entries_added_by_another_session() {
        let store: Arc<dyn WatchlistStore> = Arc::new(MemoryStore::new());
        let mut owner = service_with(store.clone());
        let mut friend = service_with(store.clone());
        friend.refresh().await.unwrap();

        owner.add_from_provider("tt5753856").await.unwrap();
        let outcome = friend.recommend("tt5753856", &person("Alex"), false).await.unwrap();
        assert!(matches!(outcome, RecommendOutcome::Merged { .. }));
        assert_eq!(store.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_search_classifies_hits() {
        let mut service = service_with(Arc::new(MemoryStore::new()));
        let id = service.add_from_provider("tt5753856").await.unwrap();
        service.set_status(&id, WatchStatus::Watching).await.unwrap();

        let hits = service.search("a", Some(&person("Alex"))).await;
        let statuses: Vec<(&str, RecommendationStatus)> =
            hits.iter().map(|hit| (hit.result.title.as_str(), hit.status)).collect();
        assert_eq!(
            statuses,
            vec![
                ("Dark", RecommendationStatus::AlreadyStarted { completed: false }),
                ("Heat", RecommendationStatus::NotListed),
            ]
        );
    }

    #[tokio::test]
    async fn test_record_watch_and_filtering() {
        let mut service = service_with(Arc::new(MemoryStore::new()));
        let heat = service.add_from_provider("tt0113277").await.unwrap();
        service.add_from_provider("tt5753856").await.unwrap();

        let at = Utc::now();
        service.record_watch(&heat, at).await.unwrap();
        assert_eq!(service.get(&heat).unwrap().media.last_watched, Some(at));

        let movies = FilterCriteria::new().media_type(MediaType::Movie);
        assert_eq!(service.filtered(&movies).len(), 1);
        assert_eq!(service.summary(&movies).to_string(), "Showing 1 of 2 items");
    }

    #[tokio::test]
    async fn test_subscription_snapshot_replaces_stale_view() {
        let store = Arc::new(MemoryStore::new());
        let mut owner = service_with(store.clone());
        let mut friend = service_with(store.clone());
        let mut updates = store.subscribe().unwrap();

        owner.add_from_provider("tt0113277").await.unwrap();
        assert!(friend.entries().is_empty());

        let snapshot = updates.next().await.unwrap();
        friend.replace_snapshot(snapshot);
        assert_eq!(friend.entries().len(), 1);
        assert_eq!(friend.entries()[0].title(), "Heat");
    }
}
