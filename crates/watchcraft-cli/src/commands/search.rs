use chrono::Utc;
use color_eyre::Result;
use futures::future::join_all;
use serde_json::json;
use watchcraft_models::{CatalogEntry, EntryId, PersonName};
use watchcraft_sources::MetadataProvider;

use super::context::AppContext;
use super::render::{entry_detail_table, search_table};
use crate::output::Output;

pub async fn run_search(
    ctx: &AppContext,
    query: &str,
    actor: Option<String>,
    details: bool,
    output: &Output,
) -> Result<()> {
    ctx.require_provider()?;
    let actor = actor.map(PersonName::new).transpose()?;
    let service = ctx.service().await?;

    let hits = service.search(query, actor.as_ref()).await;
    if hits.is_empty() {
        // No match and a provider failure look the same from here
        output.warn(format!("No results for '{}'", query));
        return Ok(());
    }

    output.table(&search_table(&hits));
    output.json(&json!({ "query": query, "results": hits }));

    if details {
        let provider = ctx.provider()?;
        let lookups = hits
            .iter()
            .map(|hit| provider.get_details(&hit.result.external_id));
        let fetched = join_all(lookups).await;

        for (hit, media) in hits.iter().zip(fetched) {
            let Some(media) = media else {
                output.warn(format!("No details for {}", hit.result.external_id));
                continue;
            };
            // Details are not on the list yet; show them under the provider id
            let preview = CatalogEntry::new(EntryId::new(hit.result.external_id.clone()), media, Utc::now());
            output.table(&entry_detail_table(&preview, ctx.episodes_per_season()));
            output.json(&json!({ "details": preview.media }));
        }
    }

    Ok(())
}
