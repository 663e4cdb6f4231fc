//! Subcommand implementations.

pub mod config;
pub mod extract;
pub mod validate;

use std::path::Path;

use radval_core::RadvalConfig;

/// Load the config file (explicit path, else the default location if present),
/// then apply environment overrides.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<RadvalConfig> {
    let mut config = match config_path {
        Some(path) => RadvalConfig::from_file(Path::new(path))
            .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path, e))?,
        None => {
            let default_path = config::default_config_path();
            if default_path.exists() {
                RadvalConfig::from_file(&default_path)?
            } else {
                RadvalConfig::default()
            }
        }
    };

    config.apply_env();
    Ok(config)
}
