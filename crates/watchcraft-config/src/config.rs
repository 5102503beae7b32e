use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use watchcraft_models::EPISODES_PER_SEASON;

/// Environment variable that overrides `provider.api_key`
pub const API_KEY_ENV: &str = "WATCHCRAFT_OMDB_API_KEY";

/// Value written by `config init` until a real key is supplied
pub const PLACEHOLDER_API_KEY: &str = "YOUR_OMDB_API_KEY";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Display name of the list owner
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
}

/// Metadata provider (OMDb) settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProviderConfig {
    #[serde(default = "default_api_key")]
    pub api_key: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StoreConfig {
    /// Watchlist file; defaults to `<data dir>/watchlist.json`
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogConfig {
    #[serde(default = "default_episodes_per_season")]
    pub episodes_per_season: u32,
    /// How many partners a compact progress line shows before "+N more"
    #[serde(default = "default_partner_display_limit")]
    pub partner_display_limit: usize,
}

fn default_api_key() -> String {
    PLACEHOLDER_API_KEY.to_string()
}

fn default_base_url() -> String {
    "https://www.omdbapi.com".to_string()
}

fn default_timeout_seconds() -> u64 {
    10
}

fn default_episodes_per_season() -> u32 {
    EPISODES_PER_SEASON
}

fn default_partner_display_limit() -> usize {
    2
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: default_api_key(),
            base_url: default_base_url(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            episodes_per_season: default_episodes_per_season(),
            partner_display_limit: default_partner_display_limit(),
        }
    }
}

impl Config {
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load the file if it exists, fall back to defaults otherwise
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save_to_file(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Replace the API key with the value from the environment, if set
    pub fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                self.provider.api_key = key;
            }
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.catalog.episodes_per_season == 0 {
            return Err(anyhow::anyhow!("catalog.episodes_per_season must be at least 1"));
        }
        if self.provider.base_url.trim().is_empty() {
            return Err(anyhow::anyhow!("provider.base_url cannot be empty"));
        }
        if self.provider.timeout_seconds == 0 {
            return Err(anyhow::anyhow!("provider.timeout_seconds must be at least 1"));
        }
        Ok(())
    }

    pub fn is_provider_configured(&self) -> bool {
        let key = self.provider.api_key.trim();
        !key.is_empty() && key != PLACEHOLDER_API_KEY
    }

    /// Fail unless a usable provider key is present
    pub fn require_provider(&self) -> anyhow::Result<&ProviderConfig> {
        if !self.is_provider_configured() {
            return Err(anyhow::anyhow!(
                "OMDb API key is not configured; run `watchcraft config init --api-key <KEY>` or set {}",
                API_KEY_ENV
            ));
        }
        Ok(&self.provider)
    }
}
