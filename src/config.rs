use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

pub const API_KEY_ENV: &str = "SPOONACULAR_API_KEY";

/// Runtime settings, read from `config.toml` with environment overrides
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_base_url: String,
    pub api_key: String,
    /// Bookmark database; defaults to the per-user data directory
    pub database_path: Option<PathBuf>,
    pub request_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.spoonacular.com".to_string(),
            api_key: String::new(),
            database_path: None,
            request_timeout_secs: 10,
        }
    }
}

impl AppConfig {
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_default()
            .join("recipe-finder")
            .join("config.toml")
    }

    /// Load from `path` (or the default location). A missing file means defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path.map(Path::to_path_buf).unwrap_or_else(Self::default_path);

        let config = if path.exists() {
            log::debug!("reading config from {}", path.display());
            let content = std::fs::read_to_string(&path)?;
            Self::from_toml(&content)?
        } else {
            log::debug!("no config at {}, using defaults", path.display());
            Self::default()
        };

        let config = config.with_api_key_override(std::env::var(API_KEY_ENV).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("failed to parse config: {}", e)))
    }

    /// A non-empty key from the environment wins over the file.
    pub fn with_api_key_override(mut self, key: Option<String>) -> Self {
        if let Some(key) = key.filter(|k| !k.trim().is_empty()) {
            self.api_key = key;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.api_base_url)
            .map_err(|e| Error::Config(format!("invalid api_base_url '{}': {}", self.api_base_url, e)))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(Error::Config(format!(
                "api_base_url must be http or https, got '{}'",
                url.scheme()
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(Error::Config("request_timeout_secs must be positive".to_string()));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn database_path(&self) -> PathBuf {
        self.database_path.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .or_else(|| std::env::current_dir().ok())
                .unwrap_or_default()
                .join("recipe-finder")
                .join("recipes.db")
        })
    }
}
