//! Configuration management for the client.

use crate::{CoreResult, Paths};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default API URL (can be overridden at compile time via BAZAAR_API_URL env var).
pub const DEFAULT_API_URL: &str = match option_env!("BAZAAR_API_URL") {
    Some(url) => url,
    None => "https://api.bazaar.app",
};

/// Default publishable API key (can be overridden at compile time via BAZAAR_PUBLISHABLE_KEY env var).
pub const DEFAULT_PUBLISHABLE_KEY: &str = match option_env!("BAZAAR_PUBLISHABLE_KEY") {
    Some(key) => key,
    None => "pk-bazaar-dev",
};

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Main client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    /// Auth API base URL.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Publishable API key (public, safe to expose).
    #[serde(default = "default_publishable_key")]
    pub publishable_key: String,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_publishable_key() -> String {
    DEFAULT_PUBLISHABLE_KEY.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            publishable_key: DEFAULT_PUBLISHABLE_KEY.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a file, falling back to defaults.
    /// Note: api_url and publishable_key are compile-time only and will
    /// always use the built-in defaults, regardless of what's in the
    /// config file.
    pub fn load(paths: &Paths) -> CoreResult<Self> {
        let config_path = paths.config_file();

        let mut config = if config_path.exists() {
            Self::load_from_file(&config_path)?
        } else {
            Self::default()
        };

        // Force compile-time values (never from config file)
        config.api_url = DEFAULT_API_URL.to_string();
        config.publishable_key = DEFAULT_PUBLISHABLE_KEY.to_string();

        // Environment variables can only override log_level
        config.load_from_env();

        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a file.
    pub fn save(&self, paths: &Paths) -> CoreResult<()> {
        paths.ensure_dirs()?;
        let config_path = paths.config_file();
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    /// Override configuration from environment variables.
    /// Only log_level can be overridden at runtime.
    fn load_from_env(&mut self) {
        if let Ok(log_level) = std::env::var("BAZAAR_LOG_LEVEL") {
            self.log_level = log_level;
        }
    }
}
