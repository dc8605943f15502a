//! Log setup.
//!
//! The terminal belongs to the UI, so logs go to the configured file with
//! ANSI colors disabled. `RUST_LOG` overrides the configured filter.

use crate::config::TuiConfig;
use crate::error::TuiError;
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Build the filter: `RUST_LOG` when set and valid, otherwise `fallback`.
pub fn env_filter(fallback: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
}

/// Install the global subscriber writing to `config.error_log_path`.
pub fn init_logging(config: &TuiConfig) -> Result<(), TuiError> {
    if let Some(parent) = config.error_log_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.error_log_path)?;

    tracing_subscriber::registry()
        .with(env_filter(&config.log_filter))
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_target(true)
                .with_writer(Mutex::new(file)),
        )
        .try_init()
        .map_err(|e| TuiError::Logging(e.to_string()))
}
