use color_eyre::eyre::eyre;
use color_eyre::Result;
use comfy_table::{Attribute, Cell, Color};
use serde_json::json;
use std::path::PathBuf;
use watchcraft_config::{Config, PathManager, PLACEHOLDER_API_KEY};

use super::context::AppContext;
use crate::output::{new_table, Output};
use crate::ConfigCommands;

pub async fn run_config(cmd: ConfigCommands, config_override: Option<PathBuf>, output: &Output) -> Result<()> {
    match cmd {
        ConfigCommands::Init { api_key, owner, force } => {
            init_config(config_override, api_key, owner, force, output)
        }
        ConfigCommands::Show { full } => show_config(config_override, full, output),
    }
}

fn init_config(
    config_override: Option<PathBuf>,
    api_key: Option<String>,
    owner: Option<String>,
    force: bool,
    output: &Output,
) -> Result<()> {
    let paths = PathManager::default();
    let config_file = config_override.unwrap_or_else(|| paths.config_file());

    if config_file.exists() && !force {
        output.warn(format!(
            "Configuration already exists at {}; use --force to overwrite",
            config_file.display()
        ));
        return Ok(());
    }

    let mut config = Config::default();
    if let Some(key) = api_key.filter(|k| !k.trim().is_empty()) {
        config.provider.api_key = key.trim().to_string();
    }
    config.owner = owner.map(|o| o.trim().to_string()).filter(|o| !o.is_empty());

    paths
        .ensure_directories()
        .map_err(|e| eyre!("Failed to create {}: {}", paths.config_dir().display(), e))?;
    config
        .save_to_file(&config_file)
        .map_err(|e| eyre!("Failed to write {}: {}", config_file.display(), e))?;

    output.success(format!("Wrote configuration to {}", config_file.display()));
    if !config.is_provider_configured() {
        output.warn("No OMDb API key set; search, add --imdb and recommend need one (https://www.omdbapi.com/apikey.aspx)");
    }
    output.json(&json!({ "path": config_file.display().to_string(), "providerConfigured": config.is_provider_configured() }));
    Ok(())
}

fn show_config(config_override: Option<PathBuf>, full: bool, output: &Output) -> Result<()> {
    let ctx = AppContext::load(config_override)?;
    let config = &ctx.config;
    let api_key = if full {
        config.provider.api_key.clone()
    } else {
        mask_string(&config.provider.api_key)
    };

    let rows: Vec<(&str, String)> = vec![
        ("Config file", ctx.config_file.display().to_string()),
        ("Exists", ctx.config_file.exists().to_string()),
        ("Owner", config.owner.clone().unwrap_or_else(|| "<not set>".to_string())),
        ("OMDb API key", api_key.clone()),
        ("OMDb base URL", config.provider.base_url.clone()),
        ("Timeout (s)", config.provider.timeout_seconds.to_string()),
        ("Watchlist file", ctx.watchlist_file().display().to_string()),
        ("Episodes per season", config.catalog.episodes_per_season.to_string()),
        ("Partners shown", config.catalog.partner_display_limit.to_string()),
    ];

    let mut table = new_table();
    table.set_header(vec![
        Cell::new("Setting").fg(Color::Cyan).add_attribute(Attribute::Bold),
        Cell::new("Value").add_attribute(Attribute::Bold),
    ]);
    for (setting, value) in rows {
        table.add_row(vec![Cell::new(setting), Cell::new(value)]);
    }
    output.table(&table);

    output.json(&json!({
        "path": ctx.config_file.display().to_string(),
        "owner": config.owner,
        "provider": {
            "apiKey": api_key,
            "baseUrl": config.provider.base_url,
            "timeoutSeconds": config.provider.timeout_seconds,
        },
        "watchlistFile": ctx.watchlist_file().display().to_string(),
        "catalog": {
            "episodesPerSeason": config.catalog.episodes_per_season,
            "partnerDisplayLimit": config.catalog.partner_display_limit,
        },
    }));
    Ok(())
}

fn mask_string(s: &str) -> String {
    if s.is_empty() || s == PLACEHOLDER_API_KEY {
        return "<not set>".to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{}***{}", head, tail)
}
