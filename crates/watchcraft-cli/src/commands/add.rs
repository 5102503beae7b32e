use color_eyre::Result;
use serde_json::json;
use watchcraft_core::attribution_list;
use watchcraft_models::{MediaEntry, MediaType, WatchStatus};
use watchcraft_sources::omdb::api::placeholder_poster;

use super::context::AppContext;
use crate::output::Output;

/// Fields for an entry typed in by hand
pub struct ManualEntry {
    pub title: String,
    pub media_type: MediaType,
    pub genres: Vec<String>,
    pub moods: Vec<String>,
    pub year: Option<i32>,
    pub runtime: Option<u32>,
    pub episode_length: Option<u32>,
    pub total_episodes: Option<u32>,
    pub status: Option<WatchStatus>,
    pub recommended_by: Vec<String>,
}

impl ManualEntry {
    /// Build the entry; a show without a given episode count stays without one
    pub fn into_media(self) -> Result<MediaEntry> {
        let poster = placeholder_poster(&self.title);
        let mut media = MediaEntry::new(self.title, self.media_type)?
            .with_poster_url(poster)
            .with_genres(self.genres)
            .with_moods(self.moods)
            .with_status(self.status.unwrap_or_default());
        media.recommended_by = attribution_list(&self.recommended_by)?;
        if let Some(year) = self.year {
            media = media.with_release_year(year);
        }

        match self.media_type {
            MediaType::Movie => {
                if let Some(runtime) = self.runtime {
                    media = media.with_runtime(runtime);
                }
            }
            MediaType::Tv => {
                if let Some(length) = self.episode_length.or(self.runtime) {
                    media = media.with_episode_length(length);
                }
                if let Some(total) = self.total_episodes {
                    media = media.with_total_episodes(total);
                }
            }
        }
        Ok(media)
    }
}

pub async fn run_add_from_provider(ctx: &AppContext, imdb_id: &str, output: &Output) -> Result<()> {
    ctx.require_provider()?;
    let mut service = ctx.service().await?;

    if let Some(existing) = watchcraft_core::find_by_external_id(service.entries(), imdb_id) {
        output.warn(format!("'{}' is already on the watchlist ({})", existing.title(), existing.id));
        return Ok(());
    }

    let id = service.add_from_provider(imdb_id).await?;
    let entry = service.get(&id)?;
    output.success(format!("Added '{}' ({})", entry.title(), id));
    output.json(&json!({ "id": id, "entry": entry }));
    Ok(())
}

pub async fn run_add_manual(ctx: &AppContext, manual: ManualEntry, output: &Output) -> Result<()> {
    let media = manual.into_media()?;
    let mut service = ctx.service().await?;

    let id = service.add_manual(media).await?;
    let entry = service.get(&id)?;
    output.success(format!("Added '{}' ({})", entry.title(), id));
    output.json(&json!({ "id": id, "entry": entry }));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manual(media_type: MediaType) -> ManualEntry {
        ManualEntry {
            title: "Severance".to_string(),
            media_type,
            genres: vec!["Drama".to_string()],
            moods: Vec::new(),
            year: Some(2022),
            runtime: Some(55),
            episode_length: None,
            total_episodes: None,
            status: None,
            recommended_by: Vec::new(),
        }
    }

    #[test]
    fn test_manual_show_without_episode_count() {
        let media = manual(MediaType::Tv).into_media().unwrap();
        assert_eq!(media.total_episodes, None);
        assert_eq!(media.main_progress_percent(20), None);
        assert_eq!(media.last_aired(20), None);
        assert_eq!(media.episode_length_minutes, Some(55));
        assert_eq!(media.runtime_minutes, None);
        assert_eq!(media.status, WatchStatus::NotStarted);
    }

    #[test]
    fn test_manual_show_with_episode_count() {
        let mut entry = manual(MediaType::Tv);
        entry.total_episodes = Some(19);
        let media = entry.into_media().unwrap();
        assert_eq!(media.total_episodes, Some(19));
        assert_eq!(media.main_progress_percent(20), Some(5));
    }

    #[test]
    fn test_manual_entry_gets_placeholder_poster() {
        let media = manual(MediaType::Movie).into_media().unwrap();
        assert_eq!(media.poster_url, Some(placeholder_poster("Severance")));
    }

    #[test]
    fn test_manual_entry_recommenders() {
        let mut entry = manual(MediaType::Movie);
        entry.recommended_by = vec!["Alex".to_string(), " Sam ".to_string()];
        let media = entry.into_media().unwrap();
        let names: Vec<&str> = media.recommended_by.iter().map(|p| p.as_str()).collect();
        assert_eq!(names, vec!["Alex", "Sam"]);

        let mut repeated = manual(MediaType::Movie);
        repeated.recommended_by = vec!["Alex".to_string(), "Alex".to_string()];
        assert!(repeated.into_media().is_err());
    }

    #[test]
    fn test_manual_movie_keeps_runtime() {
        let media = manual(MediaType::Movie).into_media().unwrap();
        assert_eq!(media.runtime_minutes, Some(55));
        assert_eq!(media.total_episodes, None);
        assert!(media.genres.contains("Drama"));
    }

    #[test]
    fn test_manual_entry_requires_title() {
        let mut entry = manual(MediaType::Movie);
        entry.title = " ".to_string();
        assert!(entry.into_media().is_err());
    }
}
