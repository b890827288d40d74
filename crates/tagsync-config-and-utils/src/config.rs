//! Configuration management for tagsync.

use crate::{CoreError, CoreResult, Paths};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Default inventory API root.
pub const DEFAULT_INVENTORY_URL: &str = "http://localhost:8080/api";

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default per-request timeout for inventory calls.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

const DEFAULT_REQUEST_PREFIX: &str = "sir-";

/// Main tagsync configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Inventory API root URL.
    #[serde(default = "default_inventory_url")]
    pub inventory_url: String,
    /// Bearer token for the inventory API.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    /// Timeout applied to each inventory request.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Identifier prefix marking request-style resources.
    #[serde(default = "default_request_prefix")]
    pub request_prefix: String,
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_inventory_url() -> String {
    DEFAULT_INVENTORY_URL.to_string()
}

const fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_request_prefix() -> String {
    DEFAULT_REQUEST_PREFIX.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            inventory_url: default_inventory_url(),
            api_token: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            request_prefix: default_request_prefix(),
        }
    }
}

impl Config {
    /// Load configuration from the default config file, falling back to
    /// defaults when it does not exist, then apply environment overrides.
    pub fn load(paths: &Paths) -> CoreResult<Self> {
        let config = Self::resolve(&paths.config_file(), false)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from an explicitly named config file. The file
    /// must exist.
    pub fn load_from_path(config_path: &Path) -> CoreResult<Self> {
        let config = Self::resolve(config_path, true)?;
        config.validate()?;
        Ok(config)
    }

    /// Layer the config file (or defaults) and environment overrides
    /// without validating the result.
    ///
    /// With `required`, a missing file is an error instead of defaults.
    pub fn resolve(config_path: &Path, required: bool) -> CoreResult<Self> {
        Self::resolve_with(config_path, required, |name| std::env::var(name).ok())
    }

    fn resolve_with<F>(config_path: &Path, required: bool, lookup: F) -> CoreResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = if config_path.exists() {
            Self::load_from_file(config_path)?
        } else if required {
            return Err(CoreError::Config(format!(
                "config file not found: {}",
                config_path.display()
            )));
        } else {
            Self::default()
        };

        config.apply_overrides(lookup);
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
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(paths.config_file(), content)?;
        Ok(())
    }

    /// Override configuration from `TAGSYNC_*` variables found by `lookup`.
    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |name: &str| lookup(name).and_then(non_empty);

        if let Some(log_level) = lookup("TAGSYNC_LOG_LEVEL") {
            self.log_level = log_level;
        }
        if let Some(url) = lookup("TAGSYNC_INVENTORY_URL") {
            self.inventory_url = url;
        }
        if let Some(token) = lookup("TAGSYNC_API_TOKEN") {
            self.api_token = Some(token);
        }
    }

    /// Reject values the clients cannot work with.
    pub fn validate(&self) -> CoreResult<()> {
        self.inventory_url()?;
        if self.request_timeout_secs == 0 {
            return Err(CoreError::Config(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Get the inventory URL as a parsed URL.
    pub fn inventory_url(&self) -> CoreResult<Url> {
        Url::parse(&self.inventory_url).map_err(CoreError::from)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn non_empty(raw: String) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
