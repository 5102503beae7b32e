use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::{format_runtime, EpisodePosition, MediaType, ModelError, PersonName, ViewingProgress, WatchStatus};

/// Assumed number of episodes per season
///
/// Used both to estimate `total_episodes` from a provider's season count and
/// to turn a season/episode position into an absolute episode number. Both
/// sides must use the same value or progress percentages drift.
pub const EPISODES_PER_SEASON: u32 = 20;

/// Estimate a show's episode count from its season count (one season when unknown)
pub fn estimate_total_episodes(seasons: Option<u32>, episodes_per_season: u32) -> u32 {
    let seasons = seasons.filter(|s| *s > 0).unwrap_or(1);
    seasons.saturating_mul(episodes_per_season)
}

/// Store-assigned identifier of a catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntryId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// One movie or show as the owner tracks it, without store bookkeeping
///
/// This is what gets handed to a store on creation; the store wraps it in a
/// [`CatalogEntry`] with an id and timestamps.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MediaEntry {
    /// Metadata provider id (an IMDb id for OMDb); absent for manual entries
    #[serde(default)]
    pub external_id: Option<String>,
    pub title: String,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    #[serde(default)]
    pub genres: BTreeSet<String>,
    #[serde(default)]
    pub release_year: Option<i32>,
    #[serde(default)]
    pub poster_url: Option<String>,
    #[serde(default)]
    pub plot: Option<String>,
    #[serde(default)]
    pub director: Option<String>,
    #[serde(default)]
    pub actors: Option<String>,
    /// Provider rating, 0 when unknown
    #[serde(default)]
    pub external_rating: f32,

    #[serde(default)]
    pub moods: Vec<String>,
    #[serde(default)]
    pub status: WatchStatus,
    #[serde(default)]
    pub recommended_by: Vec<PersonName>,
    #[serde(default)]
    pub watching_with: Vec<PersonName>,

    /// Movies only
    #[serde(default)]
    pub runtime_minutes: Option<u32>,
    /// TV only
    #[serde(default)]
    pub episode_length_minutes: Option<u32>,
    /// TV only; fixed when the entry is created
    #[serde(default)]
    pub total_episodes: Option<u32>,

    /// The owner's own position (TV only)
    #[serde(default)]
    pub primary_progress: EpisodePosition,
    /// Independent positions of viewing partners (TV only)
    #[serde(default)]
    pub viewing_progress: ViewingProgress,

    #[serde(default)]
    pub last_watched: Option<DateTime<Utc>>,
    #[serde(default)]
    pub watch_dates: Vec<DateTime<Utc>>,

    #[serde(default)]
    pub added_via_recommendation: bool,
    #[serde(default)]
    pub recommendation_date: Option<DateTime<Utc>>,
}

impl MediaEntry {
    pub fn new(title: impl Into<String>, media_type: MediaType) -> Result<Self, ModelError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(ModelError::EmptyTitle);
        }

        Ok(Self {
            external_id: None,
            title,
            media_type,
            genres: BTreeSet::new(),
            release_year: None,
            poster_url: None,
            plot: None,
            director: None,
            actors: None,
            external_rating: 0.0,
            moods: Vec::new(),
            status: WatchStatus::NotStarted,
            recommended_by: Vec::new(),
            watching_with: Vec::new(),
            runtime_minutes: None,
            episode_length_minutes: None,
            total_episodes: None,
            primary_progress: EpisodePosition::default(),
            viewing_progress: ViewingProgress::new(),
            last_watched: None,
            watch_dates: Vec::new(),
            added_via_recommendation: false,
            recommendation_date: None,
        })
    }

    pub fn with_external_id(mut self, external_id: impl Into<String>) -> Self {
        self.external_id = Some(external_id.into());
        self
    }

    pub fn with_genres<I, S>(mut self, genres: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.genres = genres.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_moods<I, S>(mut self, moods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.moods = moods.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_status(mut self, status: WatchStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_release_year(mut self, year: i32) -> Self {
        self.release_year = Some(year);
        self
    }

    pub fn with_runtime(mut self, minutes: u32) -> Self {
        self.runtime_minutes = Some(minutes);
        self
    }

    pub fn with_episode_length(mut self, minutes: u32) -> Self {
        self.episode_length_minutes = Some(minutes);
        self
    }

    pub fn with_total_episodes(mut self, total: u32) -> Self {
        self.total_episodes = Some(total);
        self
    }

    pub fn with_poster_url(mut self, url: impl Into<String>) -> Self {
        self.poster_url = Some(url.into());
        self
    }

    pub fn is_tv(&self) -> bool {
        self.media_type.is_tv()
    }

    pub fn is_recommended_by(&self, name: &str) -> bool {
        self.recommended_by.iter().any(|p| p.as_str() == name)
    }

    pub fn is_watching_with(&self, name: &str) -> bool {
        self.watching_with.iter().any(|p| p.as_str() == name)
    }

    /// Owner's progress through a show as a whole percentage (0..=100)
    ///
    /// Absent for movies, when `total_episodes` is unknown or zero, or when
    /// `episodes_per_season` is zero. Rounds half up and clamps at 100, since
    /// an owner may record a position past the estimated episode count.
    pub fn main_progress_percent(&self, episodes_per_season: u32) -> Option<u8> {
        if !self.is_tv() || episodes_per_season == 0 {
            return None;
        }
        let total = u64::from(self.total_episodes.filter(|t| *t > 0)?);
        let position = self.primary_progress;
        let watched = u64::from(position.season.saturating_sub(1)) * u64::from(episodes_per_season)
            + u64::from(position.episode);

        let percent = (watched * 200 + total) / (total * 2);
        Some(percent.min(100) as u8)
    }

    /// Display-only guess at the latest aired episode, derived from `total_episodes`
    pub fn last_aired(&self, episodes_per_season: u32) -> Option<EpisodePosition> {
        if !self.is_tv() || episodes_per_season == 0 {
            return None;
        }
        let total = self.total_episodes.filter(|t| *t > 0)?;
        let season = total.div_ceil(episodes_per_season);
        let episode = match total % episodes_per_season {
            0 => episodes_per_season,
            rest => rest,
        };
        Some(EpisodePosition { season, episode })
    }

    /// Runtime for movies, per-episode length for shows
    pub fn length_minutes(&self) -> Option<u32> {
        match self.media_type {
            MediaType::Movie => self.runtime_minutes.or(self.episode_length_minutes),
            MediaType::Tv => self.episode_length_minutes.or(self.runtime_minutes),
        }
    }

    pub fn length_label(&self) -> Option<String> {
        let minutes = self.length_minutes()?;
        Some(match self.media_type {
            MediaType::Movie => format_runtime(minutes),
            MediaType::Tv => format!("{}/ep", format_runtime(minutes)),
        })
    }
}

/// A persisted watchlist entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub id: EntryId,
    #[serde(flatten)]
    pub media: MediaEntry,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CatalogEntry {
    pub fn new(id: EntryId, media: MediaEntry, now: DateTime<Utc>) -> Self {
        Self {
            id,
            media,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn title(&self) -> &str {
        &self.media.title
    }
}
