use chrono::Utc;
use clap::ValueEnum;
use color_eyre::Result;
use serde_json::json;
use watchcraft_core::WatchlistService;
use watchcraft_models::{CatalogEntry, EntryId, WatchStatus};

use super::context::{resolve_id, AppContext};
use crate::output::Output;
use crate::PartnerCommands;

async fn open(ctx: &AppContext, id: &str) -> Result<(WatchlistService, EntryId)> {
    let service = ctx.service().await?;
    let id = resolve_id(service.entries(), id)?;
    Ok((service, id))
}

fn report(service: &WatchlistService, id: &EntryId, message: String, output: &Output) -> Result<()> {
    let entry: &CatalogEntry = service.get(id)?;
    output.success(message);
    output.json(&json!({ "entry": entry }));
    Ok(())
}

/// Which list `tags` edits
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TagList {
    Genres,
    RecommendedBy,
    WatchingWith,
}

impl TagList {
    fn label(self) -> &'static str {
        match self {
            TagList::Genres => "Genres",
            TagList::RecommendedBy => "Recommended by",
            TagList::WatchingWith => "Watching with",
        }
    }
}

/// Existing values minus `remove`, then `add` appended in order without repeats
pub fn edit_list<S: AsRef<str>>(current: &[S], add: &[String], remove: &[String]) -> Vec<String> {
    let mut values: Vec<String> = current
        .iter()
        .map(|value| value.as_ref().to_string())
        .filter(|value| !remove.iter().any(|r| r.trim() == value.as_str()))
        .collect();
    for value in add {
        let value = value.trim();
        if !value.is_empty() && !values.iter().any(|v| v == value) {
            values.push(value.to_string());
        }
    }
    values
}

pub async fn run_remove(ctx: &AppContext, id: &str, output: &Output) -> Result<()> {
    let (mut service, id) = open(ctx, id).await?;
    let title = service.get(&id)?.title().to_string();
    service.delete(&id).await?;
    output.success(format!("Removed '{}'", title));
    output.json(&json!({ "removed": id }));
    Ok(())
}

pub async fn run_status(ctx: &AppContext, id: &str, status: WatchStatus, output: &Output) -> Result<()> {
    let (mut service, id) = open(ctx, id).await?;
    service.set_status(&id, status).await?;
    let title = service.get(&id)?.title().to_string();
    report(&service, &id, format!("'{}' is now {}", title, status.label()), output)
}

pub async fn run_moods(
    ctx: &AppContext,
    id: &str,
    add: Vec<String>,
    remove: Vec<String>,
    output: &Output,
) -> Result<()> {
    let (mut service, id) = open(ctx, id).await?;
    let moods = edit_list(&service.get(&id)?.media.moods, &add, &remove);
    service.set_moods(&id, moods.clone()).await?;

    let summary = if moods.is_empty() { "none".to_string() } else { moods.join(", ") };
    report(&service, &id, format!("Moods: {}", summary), output)
}

pub async fn run_tags(
    ctx: &AppContext,
    id: &str,
    list: TagList,
    add: Vec<String>,
    remove: Vec<String>,
    output: &Output,
) -> Result<()> {
    let (mut service, id) = open(ctx, id).await?;
    let media = &service.get(&id)?.media;
    let values = match list {
        TagList::Genres => {
            let current: Vec<&String> = media.genres.iter().collect();
            edit_list(&current, &add, &remove)
        }
        TagList::RecommendedBy => edit_list(&media.recommended_by, &add, &remove),
        TagList::WatchingWith => edit_list(&media.watching_with, &add, &remove),
    };

    match list {
        TagList::Genres => service.set_genres(&id, values).await?,
        TagList::RecommendedBy => service.set_recommended_by(&id, values).await?,
        TagList::WatchingWith => service.set_watching_with(&id, values).await?,
    }

    let media = &service.get(&id)?.media;
    let current: Vec<String> = match list {
        TagList::Genres => media.genres.iter().cloned().collect(),
        TagList::RecommendedBy => media.recommended_by.iter().map(ToString::to_string).collect(),
        TagList::WatchingWith => media.watching_with.iter().map(ToString::to_string).collect(),
    };
    let summary = if current.is_empty() { "none".to_string() } else { current.join(", ") };
    report(&service, &id, format!("{}: {}", list.label(), summary), output)
}

pub async fn run_progress(ctx: &AppContext, id: &str, season: i64, episode: i64, output: &Output) -> Result<()> {
    let (mut service, id) = open(ctx, id).await?;
    service.set_primary_progress(&id, season, episode).await?;

    let entry = service.get(&id)?;
    let mut message = format!("'{}' at {}", entry.title(), entry.media.primary_progress);
    if let Some(percent) = entry.media.main_progress_percent(service.episodes_per_season()) {
        message.push_str(&format!(" ({}%)", percent));
    }
    report(&service, &id, message, output)
}

pub async fn run_watched(ctx: &AppContext, id: &str, output: &Output) -> Result<()> {
    let (mut service, id) = open(ctx, id).await?;
    service.record_watch(&id, Utc::now()).await?;

    let entry = service.get(&id)?;
    let message = format!(
        "Recorded a viewing of '{}' ({} so far)",
        entry.title(),
        entry.media.watch_dates.len()
    );
    report(&service, &id, message, output)
}

pub async fn run_partner(ctx: &AppContext, cmd: PartnerCommands, output: &Output) -> Result<()> {
    match cmd {
        PartnerCommands::Add { id, name } => {
            let (mut service, id) = open(ctx, &id).await?;
            if service.add_partner(&id, &name).await? {
                report(&service, &id, format!("Tracking {} from S1E1", name.trim()), output)
            } else {
                output.warn(format!("{} is already tracked", name.trim()));
                Ok(())
            }
        }
        PartnerCommands::Set { id, name, season, episode } => {
            let (mut service, id) = open(ctx, &id).await?;
            service.set_partner_progress(&id, &name, season, episode).await?;
            let position = service
                .get(&id)?
                .media
                .viewing_progress
                .get(name.trim())
                .copied()
                .unwrap_or_default();
            report(&service, &id, format!("{} is at {}", name.trim(), position), output)
        }
        PartnerCommands::Remove { id, name } => {
            let (mut service, id) = open(ctx, &id).await?;
            if service.remove_partner(&id, &name).await? {
                report(&service, &id, format!("Stopped tracking {}", name.trim()), output)
            } else {
                output.warn(format!("{} was not tracked", name.trim()));
                Ok(())
            }
        }
    }
}
