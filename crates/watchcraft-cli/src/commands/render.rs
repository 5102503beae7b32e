use comfy_table::{Attribute, Cell, Color, Table};
use watchcraft_core::{summarize_partners, RecommendationStatus, SearchHit};
use watchcraft_models::{CatalogEntry, WatchStatus};

use crate::output::new_table;

/// Characters of an entry id shown in tables; `resolve_id` accepts the prefix
pub const SHORT_ID_LEN: usize = 8;

pub fn short_id(entry: &CatalogEntry) -> &str {
    let id = entry.id.as_str();
    id.get(..SHORT_ID_LEN).unwrap_or(id)
}

fn status_color(status: WatchStatus) -> Color {
    match status {
        WatchStatus::NotStarted => Color::Grey,
        WatchStatus::Watching | WatchStatus::Rewatching => Color::Cyan,
        WatchStatus::OnHold => Color::Yellow,
        WatchStatus::Completed => Color::Green,
        WatchStatus::ToRewatch => Color::Magenta,
    }
}

/// "S2E5 · 63%", or "-" for movies
pub fn progress_label(entry: &CatalogEntry, episodes_per_season: u32) -> String {
    let media = &entry.media;
    if !media.is_tv() {
        return "-".to_string();
    }
    match media.main_progress_percent(episodes_per_season) {
        Some(percent) => format!("{} · {}%", media.primary_progress, percent),
        None => media.primary_progress.to_string(),
    }
}

pub fn entries_table(entries: &[&CatalogEntry], episodes_per_season: u32, partner_limit: usize) -> Table {
    let mut table = new_table();
    table.set_header(
        ["ID", "Title", "Type", "Status", "Length", "Progress", "Partners"]
            .into_iter()
            .map(|h| Cell::new(h).add_attribute(Attribute::Bold)),
    );

    for entry in entries {
        let media = &entry.media;
        let title = match media.release_year {
            Some(year) => format!("{} ({})", media.title, year),
            None => media.title.clone(),
        };
        table.add_row(vec![
            Cell::new(short_id(entry)).fg(Color::DarkGrey),
            Cell::new(title),
            Cell::new(media.media_type),
            Cell::new(media.status.label()).fg(status_color(media.status)),
            Cell::new(media.length_label().unwrap_or_else(|| "-".to_string())),
            Cell::new(progress_label(entry, episodes_per_season)),
            Cell::new(summarize_partners(media, partner_limit)),
        ]);
    }
    table
}

/// Two-column field/value table for `show`
pub fn entry_detail_table(entry: &CatalogEntry, episodes_per_season: u32) -> Table {
    let media = &entry.media;
    let join = |names: &[watchcraft_models::PersonName]| {
        names.iter().map(|n| n.as_str()).collect::<Vec<_>>().join(", ")
    };

    let mut rows: Vec<(&str, String)> = vec![
        ("ID", entry.id.to_string()),
        ("Title", media.title.clone()),
        ("Type", media.media_type.to_string()),
        ("Status", media.status.label().to_string()),
        ("Genres", media.genres.iter().cloned().collect::<Vec<_>>().join(", ")),
        ("Moods", media.moods.join(", ")),
        ("Recommended by", join(&media.recommended_by)),
        ("Watching with", join(&media.watching_with)),
    ];
    if let Some(year) = media.release_year {
        rows.push(("Year", year.to_string()));
    }
    if let Some(length) = media.length_label() {
        rows.push(("Length", length));
    }
    if media.external_rating > 0.0 {
        rows.push(("Rating", format!("{:.1}", media.external_rating)));
    }
    if media.is_tv() {
        rows.push(("Progress", progress_label(entry, episodes_per_season)));
        if let Some(last) = media.last_aired(episodes_per_season) {
            rows.push(("Last aired (est.)", last.to_string()));
        }
        for (name, position) in media.viewing_progress.iter() {
            rows.push(("Partner", format!("{}: {}", name, position)));
        }
    }
    if let Some(director) = &media.director {
        rows.push(("Director", director.clone()));
    }
    if let Some(actors) = &media.actors {
        rows.push(("Cast", actors.clone()));
    }
    if let Some(plot) = &media.plot {
        rows.push(("Plot", plot.clone()));
    }
    if let Some(last) = media.last_watched {
        rows.push(("Last watched", last.format("%Y-%m-%d %H:%M").to_string()));
        rows.push(("Times watched", media.watch_dates.len().to_string()));
    }
    if let Some(date) = media.recommendation_date {
        rows.push(("Recommended on", date.format("%Y-%m-%d").to_string()));
    }
    if let Some(external_id) = &media.external_id {
        rows.push(("IMDb", external_id.clone()));
    }

    let mut table = new_table();
    for (field, value) in rows {
        table.add_row(vec![Cell::new(field).add_attribute(Attribute::Bold), Cell::new(value)]);
    }
    table
}

pub fn status_hint(status: &RecommendationStatus) -> String {
    match status {
        RecommendationStatus::OnWatchlist { can_watch_together: true } => {
            "on watchlist (can watch together)".to_string()
        }
        other => other.label().to_string(),
    }
}

pub fn search_table(hits: &[SearchHit]) -> Table {
    let mut table = new_table();
    table.set_header(
        ["IMDb", "Title", "Year", "Type", "Watchlist"]
            .into_iter()
            .map(|h| Cell::new(h).add_attribute(Attribute::Bold)),
    );
    for hit in hits {
        let status = Cell::new(status_hint(&hit.status));
        let status = match hit.status {
            RecommendationStatus::NotListed => status,
            RecommendationStatus::AlreadyStarted { .. } => status.fg(Color::Yellow),
            RecommendationStatus::OnWatchlist { .. } => status.fg(Color::Green),
        };
        table.add_row(vec![
            Cell::new(&hit.result.external_id).fg(Color::DarkGrey),
            Cell::new(&hit.result.title),
            Cell::new(hit.result.year.map(|y| y.to_string()).unwrap_or_default()),
            Cell::new(hit.result.media_type),
            status,
        ]);
    }
    table
}
