use clap::{ArgAction, Args};
use color_eyre::Result;
use serde_json::json;
use watchcraft_core::{FacetValues, FilterCriteria};
use watchcraft_models::{MediaType, PersonName, WatchStatus};

use super::context::{resolve_id, AppContext};
use super::render::{entries_table, entry_detail_table};
use crate::output::Output;

#[derive(Args, Debug, Default)]
pub struct ListArgs {
    /// Case-insensitive title search
    #[arg(long, value_name = "TEXT")]
    search: Option<String>,

    /// Require this genre (repeat to require several)
    #[arg(long = "genre", value_name = "GENRE")]
    genres: Vec<String>,

    /// Accept this mood (repeat to accept any of several)
    #[arg(long = "mood", value_name = "MOOD")]
    moods: Vec<String>,

    #[arg(long)]
    status: Option<WatchStatus>,

    /// Require this recommender (repeatable)
    #[arg(long = "recommended-by", value_name = "NAME")]
    recommended_by: Vec<String>,

    /// Require this co-viewer (repeatable)
    #[arg(long = "watching-with", value_name = "NAME")]
    watching_with: Vec<String>,

    #[arg(long = "type", value_name = "TYPE")]
    media_type: Option<MediaType>,

    /// Longest runtime or episode length, in minutes
    #[arg(long, value_name = "MINUTES")]
    max_length: Option<u32>,

    /// Also print the values available for each filter
    #[arg(long, action = ArgAction::SetTrue)]
    facets: bool,
}

impl ListArgs {
    pub fn to_criteria(&self) -> Result<FilterCriteria> {
        let mut criteria = FilterCriteria::new();
        if let Some(term) = &self.search {
            criteria = criteria.search(term.trim());
        }
        for genre in &self.genres {
            criteria = criteria.genre(genre.as_str());
        }
        for mood in &self.moods {
            criteria = criteria.mood(mood.as_str());
        }
        if let Some(status) = self.status {
            criteria = criteria.status(status);
        }
        for name in &self.recommended_by {
            criteria = criteria.recommended_by(PersonName::new(name)?);
        }
        for name in &self.watching_with {
            criteria = criteria.watching_with(PersonName::new(name)?);
        }
        if let Some(media_type) = self.media_type {
            criteria = criteria.media_type(media_type);
        }
        if let Some(minutes) = self.max_length {
            criteria = criteria.max_length(minutes);
        }
        Ok(criteria)
    }
}

fn print_facets(facets: &FacetValues, output: &Output) {
    let join = |values: Vec<String>| if values.is_empty() { "-".to_string() } else { values.join(", ") };
    output.info(format!("Genres: {}", join(facets.genres.iter().cloned().collect())));
    output.info(format!("Moods: {}", join(facets.moods.iter().cloned().collect())));
    output.info(format!(
        "Recommended by: {}",
        join(facets.recommended_by.iter().map(|p| p.to_string()).collect())
    ));
    output.info(format!(
        "Watching with: {}",
        join(facets.watching_with.iter().map(|p| p.to_string()).collect())
    ));
}

pub async fn run_list(ctx: &AppContext, args: ListArgs, output: &Output) -> Result<()> {
    let criteria = args.to_criteria()?;
    let service = ctx.service().await?;

    if service.entries().is_empty() {
        output.info("The watchlist is empty. Add something with `watchcraft add`.");
        output.json(&json!({ "entries": [], "shown": 0, "total": 0 }));
        return Ok(());
    }

    let filtered = service.filtered(&criteria);
    let summary = service.summary(&criteria);

    if let Some(owner) = &ctx.config.owner {
        output.info(format!("{}'s watchlist", owner));
    }
    output.table(&entries_table(
        &filtered,
        service.episodes_per_season(),
        ctx.config.catalog.partner_display_limit,
    ));
    output.info(summary.to_string());

    let facets = args.facets.then(|| service.facets());
    if let Some(facets) = &facets {
        print_facets(facets, output);
    }

    output.json(&json!({
        "entries": filtered,
        "shown": summary.shown,
        "total": summary.total,
        "facets": facets,
    }));
    Ok(())
}

pub async fn run_show(ctx: &AppContext, id: &str, output: &Output) -> Result<()> {
    let service = ctx.service().await?;
    let id = resolve_id(service.entries(), id)?;
    let entry = service.get(&id)?;

    output.table(&entry_detail_table(entry, service.episodes_per_season()));
    output.json(&json!({
        "entry": entry,
        "progressPercent": entry.media.main_progress_percent(service.episodes_per_season()),
        "lastAired": entry.media.last_aired(service.episodes_per_season()).map(|p| p.to_string()),
    }));
    Ok(())
}
