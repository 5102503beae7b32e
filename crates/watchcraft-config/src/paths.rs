use anyhow::Result;
use std::path::{Path, PathBuf};

/// Base directory from `WATCHCRAFT_BASE_PATH`, used in containers
pub fn base_path_override() -> Option<PathBuf> {
    std::env::var("WATCHCRAFT_BASE_PATH").ok().map(PathBuf::from)
}

pub struct PathManager {
    config_dir: PathBuf,
    data_dir: PathBuf,
    log_dir: PathBuf,
}

impl PathManager {
    pub fn new() -> Result<Self> {
        let base_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
            .join("watchcraft");
        Ok(Self::from_base(base_dir))
    }

    /// Config files at the base, data and logs in subdirectories
    pub fn from_base(base: impl Into<PathBuf>) -> Self {
        let base = base.into();
        Self {
            config_dir: base.clone(),
            data_dir: base.join("data"),
            log_dir: base.join("logs"),
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    pub fn watchlist_file(&self) -> PathBuf {
        self.data_dir.join("watchlist.json")
    }

    pub fn log_file(&self) -> PathBuf {
        self.log_dir.join("watchcraft.log")
    }

    pub fn ensure_directories(&self) -> Result<()> {
        std::fs::create_dir_all(&self.config_dir)?;
        std::fs::create_dir_all(&self.data_dir)?;
        std::fs::create_dir_all(&self.log_dir)?;
        Ok(())
    }
}

impl Default for PathManager {
    fn default() -> Self {
        if let Some(base) = base_path_override() {
            return Self::from_base(base);
        }

        // Platform-specific paths (e.g., ~/.config/watchcraft on Linux)
        Self::new().unwrap_or_else(|_| Self::from_base(std::env::temp_dir().join("watchcraft")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_from_base() {
        let paths = PathManager::from_base("/srv/watchcraft");
        assert_eq!(paths.config_file(), PathBuf::from("/srv/watchcraft/config.toml"));
        assert_eq!(paths.watchlist_file(), PathBuf::from("/srv/watchcraft/data/watchlist.json"));
        assert_eq!(paths.log_file(), PathBuf::from("/srv/watchcraft/logs/watchcraft.log"));
    }

    #[test]
    fn test_ensure_directories() {
        let dir = tempfile::tempdir().unwrap();
        let paths = PathManager::from_base(dir.path().join("wc"));
        paths.ensure_directories().unwrap();
        assert!(paths.data_dir().is_dir());
        assert!(paths.log_dir().is_dir());
    }
}
