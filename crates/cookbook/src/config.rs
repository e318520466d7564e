//! Configuration management for cookbook.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "cookbook";

/// Default recipe directory name inside the data directory.
const RECIPE_DIR_NAME: &str = "recipes";

/// Prefix for environment overrides.
const ENV_PREFIX: &str = "COOKBOOK_";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `COOKBOOK_`, sections split on
///    `__`, e.g. `COOKBOOK_REMOTE__TOKEN`)
/// 2. TOML config file at `~/.config/cookbook/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Remote mirror configuration.
    pub remote: RemoteConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding the recipe files.
    /// Defaults to `~/.local/share/cookbook/recipes`
    pub recipe_dir: Option<PathBuf>,
}

/// Remote mirror configuration.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Mirror local changes to the remote repository.
    pub enabled: bool,
    /// Access token sent as a bearer credential.
    pub token: Option<String>,
    /// Repository as `owner/name`.
    pub repository: Option<String>,
    /// Branch to commit to.
    pub branch: String,
    /// Base URL of the contents API.
    pub api_url: String,
    /// Directory inside the repository holding the recipe files.
    pub path_prefix: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            token: None,
            repository: None,
            branch: "main".to_string(),
            api_url: "https://api.github.com".to_string(),
            path_prefix: RECIPE_DIR_NAME.to_string(),
            timeout_secs: 30,
        }
    }
}

impl RemoteConfig {
    /// Per-request timeout as a Duration.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl std::fmt::Debug for RemoteConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteConfig")
            .field("enabled", &self.enabled)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("repository", &self.repository)
            .field("branch", &self.branch)
            .field("api_url", &self.api_url)
            .field("path_prefix", &self.path_prefix)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// Configuration is loaded in this order (later sources override earlier):
    /// 1. Default values
    /// 2. TOML config file (if exists)
    /// 3. Environment variables (prefixed with `COOKBOOK_`)
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file).nested())
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        let remote = &self.remote;

        if remote.timeout_secs == 0 {
            return Err(Error::ConfigValidation {
                message: "remote.timeout_secs must be greater than 0".to_string(),
            });
        }

        if remote.branch.trim().is_empty() {
            return Err(Error::ConfigValidation {
                message: "remote.branch cannot be empty".to_string(),
            });
        }

        if let Some(repository) = &remote.repository {
            let mut parts = repository.split('/');
            let valid = matches!(
                (parts.next(), parts.next(), parts.next()),
                (Some(owner), Some(name), None) if !owner.is_empty() && !name.is_empty()
            );
            if !valid {
                return Err(Error::ConfigValidation {
                    message: format!("remote.repository must be owner/name, got '{repository}'"),
                });
            }
        }

        if remote.enabled {
            if remote.token.as_deref().map_or(true, str::is_empty) {
                return Err(Error::ConfigValidation {
                    message: "remote.token is required when remote.enabled is set".to_string(),
                });
            }
            if remote.repository.is_none() {
                return Err(Error::ConfigValidation {
                    message: "remote.repository is required when remote.enabled is set"
                        .to_string(),
                });
            }
        }

        Ok(())
    }

    /// Get the recipe directory, resolving defaults if not set.
    #[must_use]
    pub fn recipe_dir(&self) -> PathBuf {
        self.storage
            .recipe_dir
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(RECIPE_DIR_NAME))
    }
}
