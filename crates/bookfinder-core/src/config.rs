use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::models::SearchOptions;
use crate::storage::{DEFAULT_NAMESPACE, DEFAULT_QUOTA_BYTES};

pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/books/v1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Root application configuration, loaded from `~/.config/bookfinder/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub catalog: CatalogConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    File,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub namespace: String,
    pub directory: String,
    pub quota_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Options used when a search doesn't supply its own.
    pub search: SearchOptions,
}

// ─── Defaults ──────────────────────────────────────────────

impl Default for StorageConfig {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("~/.local/share"))
            .join("bookfinder")
            .join("storage");

        Self {
            backend: StorageBackend::File,
            namespace: DEFAULT_NAMESPACE.to_string(),
            directory: data_dir.to_string_lossy().to_string(),
            quota_bytes: DEFAULT_QUOTA_BYTES,
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: "bookfinder/0.1".to_string(),
            search: SearchOptions::default(),
        }
    }
}

// ─── Load / Save ───────────────────────────────────────────

impl AppConfig {
    /// Standard config file path: `~/.config/bookfinder/config.toml`
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("BOOKFINDER_CONFIG") {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("bookfinder")
            .join("config.toml")
    }

    /// Load config from disk, falling back to defaults if file doesn't exist.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load and validate config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let toml_str = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_str)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.storage.namespace.trim().is_empty() {
            return Err(CoreError::ConfigError("storage.namespace is empty".to_string()));
        }
        if self.storage.quota_bytes == 0 {
            return Err(CoreError::ConfigError("storage.quota_bytes must be positive".to_string()));
        }
        if self.storage.backend == StorageBackend::File && self.storage.directory.trim().is_empty() {
            return Err(CoreError::ConfigError("storage.directory is empty".to_string()));
        }
        if !(self.catalog.base_url.starts_with("http://")
            || self.catalog.base_url.starts_with("https://"))
        {
            return Err(CoreError::ConfigError(format!(
                "catalog.base_url is not an http(s) URL: {}",
                self.catalog.base_url
            )));
        }
        if self.catalog.timeout_secs == 0 {
            return Err(CoreError::ConfigError("catalog.timeout_secs must be positive".to_string()));
        }
        self.catalog.search.validate()
    }
}
