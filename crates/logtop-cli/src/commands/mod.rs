pub mod analyze;
pub mod completion;
pub mod report;

use anyhow::{Context, Result};
use logtop_core::Config;
use std::path::Path;

/// Build the run configuration: defaults, merged with the config file if one was requested
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config file {}", path.display())),
        None => Ok(Config::default()),
    }
}

/// Report where the configuration came from, once logging is up
pub fn log_config(path: Option<&Path>, config: &Config) {
    match path {
        Some(path) => tracing::info!("Using config file {}", path.display()),
        None => tracing::debug!("No config file given, using defaults"),
    }

    if !config.extra.is_empty() {
        tracing::debug!(
            "Unrecognized config keys: {}",
            config.extra.keys().cloned().collect::<Vec<_>>().join(", ")
        );
    }
}
