pub mod config;
pub mod paths;

pub use config::{CatalogConfig, Config, ProviderConfig, StoreConfig, API_KEY_ENV, PLACEHOLDER_API_KEY};
pub use paths::{base_path_override, PathManager};
