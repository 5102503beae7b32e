use chrono::{DateTime, Utc};
use serde::Serialize;
use watchcraft_models::{CatalogEntry, MediaEntry, PersonName, WatchStatus};

use crate::error::{CoreError, CoreResult};

/// Add `person` as a recommender, and as a co-viewer when `watch_together` is set
///
/// Names are only ever appended. Applying the same merge twice gives the same
/// lists as applying it once. Duplicates already present are left as they are.
pub fn merge_recommendation(entry: &MediaEntry, person: &PersonName, watch_together: bool) -> MediaEntry {
    let mut merged = entry.clone();
    if !merged.recommended_by.contains(person) {
        merged.recommended_by.push(person.clone());
    }
    if watch_together && !merged.watching_with.contains(person) {
        merged.watching_with.push(person.clone());
    }
    merged
}

/// Validate a recommender or co-viewer list set directly by the owner
///
/// Names are trimmed and must be non-empty. A name given twice is rejected
/// so the stored list never holds duplicates.
pub fn attribution_list<S: AsRef<str>>(names: &[S]) -> CoreResult<Vec<PersonName>> {
    let mut people: Vec<PersonName> = Vec::with_capacity(names.len());
    for name in names {
        let person = PersonName::new(name)?;
        if people.contains(&person) {
            return Err(CoreError::InvalidArgument(format!("{} is listed more than once", person)));
        }
        people.push(person);
    }
    Ok(people)
}

pub fn find_by_external_id<'a>(catalog: &'a [CatalogEntry], external_id: &str) -> Option<&'a CatalogEntry> {
    catalog
        .iter()
        .find(|entry| entry.media.external_id.as_deref() == Some(external_id))
}

/// Where a searched title stands relative to the watchlist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "kebab-case")]
pub enum RecommendationStatus {
    NotListed,
    /// Already being watched or finished; a co-watch offer does not apply
    AlreadyStarted { completed: bool },
    /// On the list but not started
    OnWatchlist { can_watch_together: bool },
}

impl RecommendationStatus {
    pub fn label(&self) -> &'static str {
        match self {
            RecommendationStatus::NotListed => "not listed",
            RecommendationStatus::AlreadyStarted { completed: true } => "already watched",
            RecommendationStatus::AlreadyStarted { completed: false } => "already watching",
            RecommendationStatus::OnWatchlist { .. } => "on watchlist",
        }
    }
}

/// Classify an existing entry (if any) for `actor`
///
/// The watch-together offer is hidden once `actor` is already a co-viewer,
/// and always offered when no actor is known.
pub fn classify(existing: Option<&CatalogEntry>, actor: Option<&PersonName>) -> RecommendationStatus {
    let Some(entry) = existing else {
        return RecommendationStatus::NotListed;
    };
    let media = &entry.media;
    if media.status.is_started() {
        return RecommendationStatus::AlreadyStarted {
            completed: media.status == WatchStatus::Completed,
        };
    }
    let can_watch_together = actor.map_or(true, |person| !media.watching_with.contains(person));
    RecommendationStatus::OnWatchlist { can_watch_together }
}

/// New entry for a title recommended by `actor` that is not on the list yet
pub fn recommended_entry(
    details: MediaEntry,
    actor: &PersonName,
    watch_together: bool,
    now: DateTime<Utc>,
) -> MediaEntry {
    let mut entry = details;
    entry.status = WatchStatus::NotStarted;
    entry.recommended_by = vec![actor.clone()];
    entry.watching_with = if watch_together { vec![actor.clone()] } else { Vec::new() };
    entry.added_via_recommendation = true;
    entry.recommendation_date = Some(now);
    entry
}

#[cfg(test)]
mod tests {
    use super::*;
    use watchcraft_models::{EntryId, MediaType};

    fn person(name: &str) -> PersonName {
        PersonName::new(name).unwrap()
    }

    fn listed(status: WatchStatus) -> CatalogEntry {
        let media = MediaEntry::new("Shōgun", MediaType::Tv)
            .unwrap()
            .with_external_id("tt2788316")
            .with_status(status);
        CatalogEntry::new(EntryId::new("a1"), media, Utc::now())
    }

    #[test]
    fn test_merge_appends_in_order() {
        let mut entry = MediaEntry::new("Heat", MediaType::Movie).unwrap();
        entry.recommended_by = vec![person("Sam")];

        let merged = merge_recommendation(&entry, &person("Alex"), true);
        assert_eq!(merged.recommended_by, vec![person("Sam"), person("Alex")]);
        assert_eq!(merged.watching_with, vec![person("Alex")]);

        let recommend_only = merge_recommendation(&entry, &person("Alex"), false);
        assert!(recommend_only.watching_with.is_empty());
    }

    #[test]
    fn test_merge_is_idempotent() {
        let entry = MediaEntry::new("Heat", MediaType::Movie).unwrap();
        let once = merge_recommendation(&entry, &person("Alex"), true);
        let twice = merge_recommendation(&once, &person("Alex"), true);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_merge_never_adds_duplicates() {
        let mut entry = MediaEntry::new("Heat", MediaType::Movie).unwrap();
        for (name, together) in [("Alex", false), ("Sam", true), ("Alex", true), ("Sam", false), ("Alex", true)] {
            entry = merge_recommendation(&entry, &person(name), together);
        }
        assert_eq!(entry.recommended_by, vec![person("Alex"), person("Sam")]);
        assert_eq!(entry.watching_with, vec![person("Sam"), person("Alex")]);
    }

    #[test]
    fn test_merge_keeps_existing_duplicates() {
        let mut entry = MediaEntry::new("Heat", MediaType::Movie).unwrap();
        entry.recommended_by = vec![person("Alex"), person("Alex")];
        let merged = merge_recommendation(&entry, &person("Alex"), false);
        assert_eq!(merged.recommended_by.len(), 2);
    }

    #[test]
    fn test_attribution_list() {
        let people = attribution_list(&["Alex", " Sam "]).unwrap();
        assert_eq!(people, vec![person("Alex"), person("Sam")]);
        assert!(attribution_list::<&str>(&[]).unwrap().is_empty());

        assert!(matches!(attribution_list(&["Alex", "Alex "]), Err(CoreError::InvalidArgument(_))));
        assert!(matches!(attribution_list(&["Alex", ""]), Err(CoreError::InvalidArgument(_))));
    }

    #[test]
    fn test_find_by_external_id() {
        let catalog = vec![listed(WatchStatus::NotStarted)];
        assert!(find_by_external_id(&catalog, "tt2788316").is_some());
        assert!(find_by_external_id(&catalog, "tt0000001").is_none());
    }

    #[test]
    fn test_classify_started_statuses() {
        let completed = listed(WatchStatus::Completed);
        assert_eq!(
            classify(Some(&completed), None),
            RecommendationStatus::AlreadyStarted { completed: true }
        );

        for status in [
            WatchStatus::Watching,
            WatchStatus::Rewatching,
            WatchStatus::OnHold,
            WatchStatus::ToRewatch,
        ] {
            let entry = listed(status);
            assert_eq!(
                classify(Some(&entry), Some(&person("Alex"))),
                RecommendationStatus::AlreadyStarted { completed: false }
            );
        }
    }

    #[test]
    fn test_classify_on_watchlist_hides_offer_for_existing_co_viewer() {
        let mut entry = listed(WatchStatus::NotStarted);
        assert_eq!(
            classify(Some(&entry), Some(&person("Alex"))),
            RecommendationStatus::OnWatchlist { can_watch_together: true }
        );

        entry.media.watching_with.push(person("Alex"));
        assert_eq!(
            classify(Some(&entry), Some(&person("Alex"))),
            RecommendationStatus::OnWatchlist { can_watch_together: false }
        );
        assert_eq!(classify(None, Some(&person("Alex"))), RecommendationStatus::NotListed);
    }

    #[test]
    fn test_recommended_entry() {
        let now = Utc::now();
        let details = MediaEntry::new("Dune", MediaType::Movie).unwrap().with_runtime(155);
        let entry = recommended_entry(details, &person("Alex"), true, now);
        assert_eq!(entry.recommended_by, vec![person("Alex")]);
        assert_eq!(entry.watching_with, vec![person("Alex")]);
        assert!(entry.added_via_recommendation);
        assert_eq!(entry.recommendation_date, Some(now));
        assert_eq!(entry.runtime_minutes, Some(155));
    }
}
