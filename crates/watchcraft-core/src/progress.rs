use chrono::{DateTime, Utc};
use serde::Serialize;
use watchcraft_models::{EpisodePosition, MediaEntry, PersonName};

use crate::error::{CoreError, CoreResult};

/// Partners shown before collapsing the rest into "+N more"
pub const PARTNER_DISPLAY_LIMIT: usize = 2;

fn require_tv(entry: &MediaEntry) -> CoreResult<()> {
    if entry.is_tv() {
        Ok(())
    } else {
        Err(CoreError::InvalidArgument(format!(
            "'{}' is a movie and has no episode progress",
            entry.title
        )))
    }
}

/// Overwrite the owner's position
///
/// Non-positive inputs become 1. Positions past `total_episodes` are accepted.
pub fn set_primary_progress(entry: &mut MediaEntry, season: i64, episode: i64) -> CoreResult<()> {
    require_tv(entry)?;
    entry.primary_progress = EpisodePosition::coerced(season, episode);
    Ok(())
}

/// Insert or overwrite a partner's position
pub fn set_partner_progress(
    entry: &mut MediaEntry,
    name: &str,
    season: i64,
    episode: i64,
) -> CoreResult<()> {
    let name = PersonName::new(name)?;
    require_tv(entry)?;
    entry
        .viewing_progress
        .insert(name, EpisodePosition::coerced(season, episode));
    Ok(())
}

/// Start tracking a partner at S1E1
///
/// Returns false when the partner was already tracked; their position is kept.
pub fn add_partner(entry: &mut MediaEntry, name: &str) -> CoreResult<bool> {
    let name = PersonName::new(name)?;
    require_tv(entry)?;
    if entry.viewing_progress.contains(name.as_str()) {
        return Ok(false);
    }
    entry.viewing_progress.insert(name, EpisodePosition::default());
    Ok(true)
}

/// Stop tracking a partner; returns false when there was nothing to remove
pub fn remove_partner(entry: &mut MediaEntry, name: &str) -> bool {
    entry.viewing_progress.remove(name.trim()).is_some()
}

/// Log a viewing session
pub fn record_watch(entry: &mut MediaEntry, at: DateTime<Utc>) {
    entry.watch_dates.push(at);
    entry.last_watched = Some(at);
}

/// Compact view of partner progress: the first few partners plus a remainder count
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartnerSummary {
    pub shown: Vec<(PersonName, EpisodePosition)>,
    pub remaining: usize,
}

impl std::fmt::Display for PartnerSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .shown
            .iter()
            .map(|(name, position)| format!("{}: {}", name, position))
            .collect();
        write!(f, "{}", parts.join(", "))?;
        if self.remaining > 0 {
            write!(f, " +{} more", self.remaining)?;
        }
        Ok(())
    }
}

/// Partners in insertion order, capped at `limit`
pub fn summarize_partners(entry: &MediaEntry, limit: usize) -> PartnerSummary {
    let shown: Vec<_> = entry
        .viewing_progress
        .iter()
        .take(limit)
        .map(|(name, position)| (name.clone(), *position))
        .collect();
    let remaining = entry.viewing_progress.len() - shown.len();
    PartnerSummary { shown, remaining }
}
