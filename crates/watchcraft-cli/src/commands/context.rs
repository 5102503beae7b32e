use color_eyre::eyre::eyre;
use color_eyre::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;
use watchcraft_config::{Config, PathManager};
use watchcraft_core::WatchlistService;
use watchcraft_models::{CatalogEntry, EntryId};
use watchcraft_sources::{JsonFileStore, OmdbClient};

/// Resolved configuration and paths for one CLI invocation
pub struct AppContext {
    pub config: Config,
    pub config_file: PathBuf,
    pub paths: PathManager,
}

impl AppContext {
    pub fn load(config_override: Option<PathBuf>) -> Result<Self> {
        let paths = PathManager::default();
        let config_file = config_override.unwrap_or_else(|| paths.config_file());

        let mut config = Config::load_or_default(&config_file)
            .map_err(|e| eyre!("Failed to load config from {}: {}", config_file.display(), e))?;
        config.apply_env_overrides();
        config
            .validate()
            .map_err(|e| eyre!("Invalid config {}: {}", config_file.display(), e))?;

        debug!(config = %config_file.display(), "Loaded configuration");
        Ok(Self {
            config,
            config_file,
            paths,
        })
    }

    pub fn watchlist_file(&self) -> PathBuf {
        self.config
            .store
            .path
            .clone()
            .unwrap_or_else(|| self.paths.watchlist_file())
    }

    pub fn episodes_per_season(&self) -> u32 {
        self.config.catalog.episodes_per_season
    }

    /// Fail early with a helpful message when no OMDb key is configured
    pub fn require_provider(&self) -> Result<()> {
        self.config
            .require_provider()
            .map(|_| ())
            .map_err(|e| eyre!("{}", e))
    }

    pub fn provider(&self) -> Result<Arc<OmdbClient>> {
        let client = OmdbClient::from_config(&self.config.provider, self.episodes_per_season())?;
        Ok(Arc::new(client))
    }

    /// Service over the watchlist file, with its snapshot already loaded
    pub async fn service(&self) -> Result<WatchlistService> {
        let store = Arc::new(JsonFileStore::new(self.watchlist_file()));
        let mut service = WatchlistService::new(store, self.provider()?)
            .with_episodes_per_season(self.episodes_per_season());
        service.refresh().await?;
        Ok(service)
    }
}

/// Find an entry by full id or by a unique id prefix (as printed by `list`)
pub fn resolve_id(entries: &[CatalogEntry], input: &str) -> Result<EntryId> {
    let input = input.trim();
    if input.is_empty() {
        return Err(eyre!("Entry id cannot be empty"));
    }
    if let Some(entry) = entries.iter().find(|e| e.id.as_str() == input) {
        return Ok(entry.id.clone());
    }

    let matches: Vec<&CatalogEntry> = entries
        .iter()
        .filter(|e| e.id.as_str().starts_with(input))
        .collect();
    match matches.as_slice() {
        [entry] => Ok(entry.id.clone()),
        [] => Err(eyre!("No entry with id '{}'", input)),
        many => Err(eyre!(
            "Id '{}' is ambiguous ({} entries match); use more characters",
            input,
            many.len()
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use watchcraft_models::{MediaEntry, MediaType};

    fn catalog() -> Vec<CatalogEntry> {
        ["4f2a91c0", "4f2b7710", "9d0e55aa"]
            .into_iter()
            .map(|id| {
                CatalogEntry::new(
                    EntryId::new(id),
                    MediaEntry::new("Heat", MediaType::Movie).unwrap(),
                    Utc::now(),
                )
            })
            .collect()
    }

    #[test]
    fn test_resolve_full_and_prefix_ids() {
        let catalog = catalog();
        assert_eq!(resolve_id(&catalog, "9d0e55aa").unwrap(), EntryId::new("9d0e55aa"));
        assert_eq!(resolve_id(&catalog, "4f2b").unwrap(), EntryId::new("4f2b7710"));
    }

    #[test]
    fn test_resolve_rejects_ambiguous_and_unknown_ids() {
        let catalog = catalog();
        assert!(resolve_id(&catalog, "4f2").is_err());
        assert!(resolve_id(&catalog, "ffff").is_err());
        assert!(resolve_id(&catalog, " ").is_err());
    }
}
