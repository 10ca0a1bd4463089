//! Client configuration handling.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Base URL used when no configuration file is present.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Origin prefix for all backend endpoints, e.g. `http://localhost:8000/api`.
    pub api_base_url: String,

    /// Path to the configuration file that was loaded.
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Directory for the credential slot files.
    pub data_dir: PathBuf,

    /// Path of the local product cache database.
    pub cache_path: PathBuf,

    /// Logging level.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        let dirs = project_dirs();
        let data_dir = dirs
            .as_ref()
            .map(|d| d.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from(".tillpoint"));
        let cache_path = data_dir.join("products.db");

        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            config_path: PathBuf::new(),
            data_dir,
            cache_path,
            log_level: default_log_level(),
        }
    }
}

/// Load configuration from the default location or create defaults.
pub fn load_config() -> Result<ClientConfig> {
    let dirs = project_dirs();
    let config_path = dirs
        .as_ref()
        .map(|d| d.config_dir().join("client.toml"))
        .unwrap_or_else(|| PathBuf::from("tillpoint-client.toml"));

    let mut config = if config_path.exists() {
        let contents = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config from {:?}", config_path))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config from {:?}", config_path))?
    } else {
        ClientConfig::default()
    };

    config.config_path = config_path;

    std::fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("Failed to create data directory {:?}", config.data_dir))?;

    Ok(config)
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "tillpoint", "tillpoint")
}
