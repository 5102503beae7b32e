use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::{EpisodePosition, MediaEntry, PersonName, ViewingProgress, WatchStatus};

/// Partial update of a stored entry
///
/// Only fields that are `Some` are written; everything else on the stored
/// document is left alone. Identity, media type and `total_episodes` have no
/// field here and cannot change after creation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<WatchStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genres: Option<BTreeSet<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moods: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended_by: Option<Vec<PersonName>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watching_with: Option<Vec<PersonName>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_progress: Option<EpisodePosition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewing_progress: Option<ViewingProgress>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_watched: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watch_dates: Option<Vec<DateTime<Utc>>>,
}

impl EntryUpdate {
    /// Minimal update that turns `before` into `after` on the mutable fields
    pub fn between(before: &MediaEntry, after: &MediaEntry) -> Self {
        fn changed<T: PartialEq + Clone>(old: &T, new: &T) -> Option<T> {
            (old != new).then(|| new.clone())
        }

        Self {
            status: changed(&before.status, &after.status),
            genres: changed(&before.genres, &after.genres),
            moods: changed(&before.moods, &after.moods),
            recommended_by: changed(&before.recommended_by, &after.recommended_by),
            watching_with: changed(&before.watching_with, &after.watching_with),
            primary_progress: changed(&before.primary_progress, &after.primary_progress),
            viewing_progress: changed(&before.viewing_progress, &after.viewing_progress),
            last_watched: if before.last_watched != after.last_watched {
                after.last_watched
            } else {
                None
            },
            watch_dates: changed(&before.watch_dates, &after.watch_dates),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == EntryUpdate::default()
    }

    /// Merge the present fields into an entry
    pub fn apply_to(&self, entry: &mut MediaEntry) {
        if let Some(status) = self.status {
            entry.status = status;
        }
        if let Some(genres) = &self.genres {
            entry.genres = genres.clone();
        }
        if let Some(moods) = &self.moods {
            entry.moods = moods.clone();
        }
        if let Some(recommended_by) = &self.recommended_by {
            entry.recommended_by = recommended_by.clone();
        }
        if let Some(watching_with) = &self.watching_with {
            entry.watching_with = watching_with.clone();
        }
        if let Some(position) = self.primary_progress {
            entry.primary_progress = position;
        }
        if let Some(progress) = &self.viewing_progress {
            entry.viewing_progress = progress.clone();
        }
        if let Some(last_watched) = self.last_watched {
            entry.last_watched = Some(last_watched);
        }
        if let Some(watch_dates) = &self.watch_dates {
            entry.watch_dates = watch_dates.clone();
        }
    }
}
