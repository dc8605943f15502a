//! Configuration loading for the Holocron TUI.
//!
//! Every field has a default, so a config file only needs to name what it
//! changes. Without `--config` or `HOLOCRON_TUI_CONFIG` the defaults are used.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TuiConfig {
    pub api_base_url: String,
    pub request_timeout_ms: u64,
    pub tick_rate_ms: u64,
    pub debounce_ms: u64,
    pub error_log_path: PathBuf,
    pub log_filter: String,
    pub list: ListConfig,
    pub cache: CacheSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ListConfig {
    /// Terminal rows per person.
    pub item_height: u64,
    /// Rows rendered beyond each edge of the viewport, in items.
    pub overscan: usize,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheSettings {
    pub keep_unused_for_ms: u64,
}

impl Default for TuiConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://swapi.py4e.com".to_string(),
            request_timeout_ms: 10_000,
            tick_rate_ms: 250,
            debounce_ms: 500,
            error_log_path: PathBuf::from("holocron-tui.log"),
            log_filter: "holocron_tui=info,holocron_cache=info,warn".to_string(),
            list: ListConfig::default(),
            cache: CacheSettings::default(),
        }
    }
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            item_height: 4,
            overscan: holocron_core::DEFAULT_OVERSCAN,
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            keep_unused_for_ms: 60_000,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

impl TuiConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_path_from_args().or_else(config_path_from_env);
        let config = match path {
            Some(path) => Self::from_path(&path)?,
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let base = self.api_base_url.trim();
        if base.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "api_base_url",
                reason: "must not be empty".to_string(),
            });
        }
        if let Err(err) = url::Url::parse(base) {
            return Err(ConfigError::InvalidValue {
                field: "api_base_url",
                reason: format!("must be an absolute URL ({})", err),
            });
        }
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout_ms",
                reason: "must be > 0".to_string(),
            });
        }
        if self.tick_rate_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "tick_rate_ms",
                reason: "must be > 0".to_string(),
            });
        }
        if self.error_log_path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "error_log_path",
                reason: "must not be empty".to_string(),
            });
        }
        if self.log_filter.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "log_filter",
                reason: "must not be empty".to_string(),
            });
        }
        if self.list.item_height == 0 {
            return Err(ConfigError::InvalidValue {
                field: "list.item_height",
                reason: "must be > 0".to_string(),
            });
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms)
    }

    pub fn debounce_delay(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn keep_unused_for(&self) -> Duration {
        Duration::from_millis(self.cache.keep_unused_for_ms)
    }
}

fn config_path_from_env() -> Option<PathBuf> {
    std::env::var("HOLOCRON_TUI_CONFIG").ok().map(PathBuf::from)
}

fn config_path_from_args() -> Option<PathBuf> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            return args.next().map(PathBuf::from);
        }
    }
    None
}
