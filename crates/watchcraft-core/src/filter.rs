use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use watchcraft_models::{CatalogEntry, MediaEntry, MediaType, PersonName, WatchStatus};

/// Search term plus facet selections applied to a catalog snapshot
///
/// Clauses combine with AND. Within a clause, genres, recommenders and
/// co-viewers require every selected value (AND) while moods accept any
/// selected value (OR). Empty or unset clauses match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    #[serde(default)]
    pub search_term: String,
    #[serde(default)]
    pub genres: BTreeSet<String>,
    #[serde(default)]
    pub moods: BTreeSet<String>,
    #[serde(default)]
    pub status: Option<WatchStatus>,
    #[serde(default)]
    pub recommended_by: BTreeSet<PersonName>,
    #[serde(default)]
    pub watching_with: BTreeSet<PersonName>,
    #[serde(default, rename = "type")]
    pub media_type: Option<MediaType>,
    /// Inclusive upper bound on runtime or episode length
    #[serde(default)]
    pub max_length_minutes: Option<u32>,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search_term = term.into();
        self
    }

    pub fn genre(mut self, genre: impl Into<String>) -> Self {
        self.genres.insert(genre.into());
        self
    }

    pub fn mood(mut self, mood: impl Into<String>) -> Self {
        self.moods.insert(mood.into());
        self
    }

    pub fn status(mut self, status: WatchStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn recommended_by(mut self, person: PersonName) -> Self {
        self.recommended_by.insert(person);
        self
    }

    pub fn watching_with(mut self, person: PersonName) -> Self {
        self.watching_with.insert(person);
        self
    }

    pub fn media_type(mut self, media_type: MediaType) -> Self {
        self.media_type = Some(media_type);
        self
    }

    pub fn max_length(mut self, minutes: u32) -> Self {
        self.max_length_minutes = Some(minutes);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == FilterCriteria::default()
    }

    pub fn clear(&mut self) {
        *self = FilterCriteria::default();
    }

    pub fn matches(&self, entry: &MediaEntry) -> bool {
        self.matches_search(entry)
            && self.matches_genres(entry)
            && self.matches_moods(entry)
            && self.status.map_or(true, |status| entry.status == status)
            && self.matches_recommenders(entry)
            && self.matches_co_viewers(entry)
            && self.media_type.map_or(true, |media_type| entry.media_type == media_type)
            && self.matches_length(entry)
    }

    /// Entries that pass every clause, in catalog order
    pub fn apply<'a>(&self, catalog: &'a [CatalogEntry]) -> Vec<&'a CatalogEntry> {
        catalog.iter().filter(|entry| self.matches(&entry.media)).collect()
    }

    fn matches_search(&self, entry: &MediaEntry) -> bool {
        self.search_term.is_empty()
            || entry
                .title
                .to_lowercase()
                .contains(&self.search_term.to_lowercase())
    }

    fn matches_genres(&self, entry: &MediaEntry) -> bool {
        self.genres.is_subset(&entry.genres)
    }

    fn matches_moods(&self, entry: &MediaEntry) -> bool {
        self.moods.is_empty() || entry.moods.iter().any(|mood| self.moods.contains(mood))
    }

    fn matches_recommenders(&self, entry: &MediaEntry) -> bool {
        self.recommended_by
            .iter()
            .all(|person| entry.recommended_by.contains(person))
    }

    fn matches_co_viewers(&self, entry: &MediaEntry) -> bool {
        self.watching_with
            .iter()
            .all(|person| entry.watching_with.contains(person))
    }

    // An entry with no length at all never fits under a bound
    fn matches_length(&self, entry: &MediaEntry) -> bool {
        let Some(bound) = self.max_length_minutes else {
            return true;
        };
        entry.runtime_minutes.is_some_and(|minutes| minutes <= bound)
            || entry.episode_length_minutes.is_some_and(|minutes| minutes <= bound)
    }
}

/// Distinct facet values present in a catalog, sorted, for building filter choices
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FacetValues {
    pub genres: BTreeSet<String>,
    pub moods: BTreeSet<String>,
    pub recommended_by: BTreeSet<PersonName>,
    pub watching_with: BTreeSet<PersonName>,
}

impl FacetValues {
    pub fn collect(catalog: &[CatalogEntry]) -> Self {
        let mut facets = FacetValues::default();
        for entry in catalog {
            let media = &entry.media;
            facets.genres.extend(media.genres.iter().cloned());
            facets.moods.extend(media.moods.iter().cloned());
            facets.recommended_by.extend(media.recommended_by.iter().cloned());
            facets.watching_with.extend(media.watching_with.iter().cloned());
        }
        facets
    }
}

/// "Showing N of M items"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FilterSummary {
    pub shown: usize,
    pub total: usize,
}

impl FilterSummary {
    pub fn new(shown: usize, total: usize) -> Self {
        Self { shown, total }
    }
}

impl std::fmt::Display for FilterSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Showing {} of {} items", self.shown, self.total)
    }
}
