use color_eyre::Result;
use serde_json::json;
use watchcraft_core::RecommendOutcome;
use watchcraft_models::PersonName;

use super::context::AppContext;
use crate::output::Output;

pub async fn run_recommend(
    ctx: &AppContext,
    imdb_id: &str,
    actor: &str,
    together: bool,
    output: &Output,
) -> Result<()> {
    ctx.require_provider()?;
    let actor = PersonName::new(actor)?;
    let mut service = ctx.service().await?;

    let outcome = service.recommend(imdb_id, &actor, together).await?;
    match &outcome {
        RecommendOutcome::Created { id } => {
            let title = service.get(id)?.title().to_string();
            output.success(format!("{} recommended '{}'; added to the watchlist", actor, title));
        }
        RecommendOutcome::Merged { id } => {
            let title = service.get(id)?.title().to_string();
            let message = if together {
                format!("'{}' is already listed; {} recommends it and wants to watch together", title, actor)
            } else {
                format!("'{}' is already listed; added {} as a recommender", title, actor)
            };
            output.success(message);
        }
        RecommendOutcome::AlreadyStarted { id, completed } => {
            let title = service.get(id)?.title().to_string();
            let state = if *completed { "already been watched" } else { "already been started" };
            output.warn(format!("'{}' has {}; nothing changed", title, state));
        }
    }

    output.json(&json!({ "actor": actor, "result": outcome }));
    Ok(())
}
