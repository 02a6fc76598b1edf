use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

use chanjo_core::config::ApiConfig;

/// CLI configuration loaded from TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// Backend API base URL override.
    #[serde(default)]
    pub api_url: Option<String>,

    /// Baby selected when a command gives no `--baby`.
    #[serde(default)]
    pub default_baby: Option<String>,

    /// YAML file replacing the built-in national rule table.
    #[serde(default)]
    pub rules_file: Option<PathBuf>,
}

impl CliConfig {
    /// Return the default config directory path: ~/.config/chanjo/
    pub fn default_config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("could not determine user config directory")?
            .join("chanjo");
        Ok(config_dir)
    }

    /// Return the default config file path.
    pub fn default_config_path() -> Result<PathBuf> {
        Ok(Self::default_config_dir()?.join("config.toml"))
    }

    /// Ensure the config directory exists.
    pub fn ensure_config_dir() -> Result<PathBuf> {
        let dir = Self::default_config_dir()?;
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create config dir: {}", dir.display()))?;
        Ok(dir)
    }

    /// Load config from the given path, or the default path.
    /// Returns default config if the file does not exist.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let config_path = match path {
            Some(p) => PathBuf::from(p),
            None => Self::default_config_path()?,
        };

        if config_path.exists() {
            debug!(?config_path, "Loading config");
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("failed to read config: {}", config_path.display()))?;
            let config: Self = toml::from_str(&content)
                .with_context(|| format!("failed to parse config: {}", config_path.display()))?;
            Ok(config)
        } else {
            debug!(?config_path, "Config file not found, using defaults");
            let config = Self::default();
            // Create directory and write default config
            if let Some(parent) = config_path.parent() {
                std::fs::create_dir_all(parent).ok();
            }
            if let Ok(toml_str) = toml::to_string_pretty(&config) {
                std::fs::write(&config_path, toml_str).ok();
            }
            Ok(config)
        }
    }

    /// Resolve the API base URL.
    /// Priority: cli_override > config file > environment config.
    pub fn resolve_api_url(&self, cli_override: Option<&str>, env: &ApiConfig) -> String {
        if let Some(url) = cli_override {
            return url.to_string();
        }
        if let Some(url) = &self.api_url {
            return url.clone();
        }
        env.base_url.clone()
    }

    /// Resolve the baby selector for a command.
    /// Priority: cli_override > config file default.
    pub fn resolve_baby<'a>(&'a self, cli_override: Option<&'a str>) -> Option<&'a str> {
        cli_override.or(self.default_baby.as_deref())
    }
}
