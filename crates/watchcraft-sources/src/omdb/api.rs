//! OMDb wire format and its mapping onto watchlist entries

use serde::Deserialize;
use watchcraft_models::{estimate_total_episodes, MediaEntry, MediaType, ModelError};

use crate::traits::SearchResult;

const NOT_AVAILABLE: &str = "N/A";
const DEFAULT_EPISODE_LENGTH: u32 = 22;
const PLACEHOLDER_POSTER_BASE: &str = "https://via.placeholder.com/150x225/607D8B/white?text=";

/// Envelope shared by search and detail responses
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OmdbEnvelope {
    pub response: String,
    #[serde(default)]
    pub error: Option<String>,
}

impl OmdbEnvelope {
    pub fn is_success(&self) -> bool {
        self.response.eq_ignore_ascii_case("true")
    }

    /// OMDb reports "no results" as a failed response
    pub fn is_not_found(&self) -> bool {
        self.error
            .as_deref()
            .map(|e| e.to_lowercase().contains("not found"))
            .unwrap_or(false)
    }
}

#[derive(Debug, Deserialize)]
pub struct OmdbSearchResponse {
    #[serde(rename = "Search", default)]
    pub search: Vec<OmdbSearchItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OmdbSearchItem {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Year", default)]
    pub year: String,
    #[serde(rename = "imdbID")]
    pub imdb_id: String,
    #[serde(rename = "Type", default)]
    pub item_type: String,
    #[serde(rename = "Poster", default)]
    pub poster: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OmdbDetails {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Year", default)]
    pub year: String,
    #[serde(rename = "Runtime", default)]
    pub runtime: String,
    #[serde(rename = "Genre", default)]
    pub genre: String,
    #[serde(rename = "Director", default)]
    pub director: String,
    #[serde(rename = "Actors", default)]
    pub actors: String,
    #[serde(rename = "Plot", default)]
    pub plot: String,
    #[serde(rename = "Poster", default)]
    pub poster: String,
    #[serde(rename = "imdbRating", default)]
    pub imdb_rating: String,
    #[serde(rename = "imdbID")]
    pub imdb_id: String,
    #[serde(rename = "Type", default)]
    pub item_type: String,
    #[serde(rename = "totalSeasons", default)]
    pub total_seasons: Option<String>,
}

fn media_type_of(item_type: &str) -> MediaType {
    if item_type.eq_ignore_ascii_case("movie") {
        MediaType::Movie
    } else {
        MediaType::Tv
    }
}

/// Leading digits of a field such as "142 min" or "2008–2013"
fn leading_number(value: &str) -> Option<u32> {
    let digits: String = value.trim().chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

fn present(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() || value == NOT_AVAILABLE {
        None
    } else {
        Some(value.to_string())
    }
}

/// Poster stand-in used when the provider has no artwork
pub fn placeholder_poster(title: &str) -> String {
    let text: Vec<String> = title
        .split_whitespace()
        .map(|word| urlencoding::encode(word).into_owned())
        .collect();
    format!("{}{}", PLACEHOLDER_POSTER_BASE, text.join("+"))
}

impl From<OmdbSearchItem> for SearchResult {
    fn from(item: OmdbSearchItem) -> Self {
        SearchResult {
            media_type: media_type_of(&item.item_type),
            year: leading_number(&item.year).and_then(|y| i32::try_from(y).ok()),
            poster_url: present(&item.poster),
            external_id: item.imdb_id,
            title: item.title,
        }
    }
}

impl OmdbDetails {
    /// Build a fresh watchlist entry from provider details
    ///
    /// `current_year` stands in for an unparseable release year; shows get
    /// `total_episodes` estimated from their season count (one season when
    /// OMDb has none).
    pub fn into_entry(self, episodes_per_season: u32, current_year: i32) -> Result<MediaEntry, ModelError> {
        let media_type = media_type_of(&self.item_type);
        let runtime = leading_number(&self.runtime);
        let poster = present(&self.poster).unwrap_or_else(|| placeholder_poster(&self.title));

        let mut entry = MediaEntry::new(self.title.trim(), media_type)?
            .with_external_id(self.imdb_id)
            .with_poster_url(poster)
            .with_release_year(
                leading_number(&self.year)
                    .and_then(|y| i32::try_from(y).ok())
                    .unwrap_or(current_year),
            )
            .with_genres(
                self.genre
                    .split(',')
                    .map(str::trim)
                    .filter(|g| !g.is_empty() && *g != NOT_AVAILABLE),
            );

        entry.plot = present(&self.plot);
        entry.director = present(&self.director);
        entry.actors = present(&self.actors);
        entry.external_rating = self.imdb_rating.trim().parse().unwrap_or(0.0);

        match media_type {
            MediaType::Movie => {
                entry.runtime_minutes = Some(runtime.unwrap_or(0));
            }
            MediaType::Tv => {
                let seasons = self.total_seasons.as_deref().and_then(leading_number);
                entry.episode_length_minutes = Some(runtime.unwrap_or(DEFAULT_EPISODE_LENGTH));
                entry.total_episodes = Some(estimate_total_episodes(seasons, episodes_per_season));
            }
        }

        Ok(entry)
    }
}
