//! Configuration file loader for the `.stitch-kit/` directory.
//!
//! This module loads:
//! - `config.toml`: Session settings (staging and gallery directories)
//! - `options.toml`: Stitch options handed to the engine

use crate::config::error::ConfigError;
use crate::config::error::ConfigResult;
use crate::config::models::AppConfig;
use serde::de::DeserializeOwned;
use sk_protocol::config_models::SessionConfig;
use sk_protocol::options_models::StitchOptions;
use std::path::{Path, PathBuf};

/// Name of the configuration directory under a session root.
pub const CONFIG_DIR: &str = ".stitch-kit";

/// Loads all configuration from the `.stitch-kit/` directory.
///
/// # Arguments
///
/// * `root` - Root directory containing the `.stitch-kit/` folder
///
/// # Returns
///
/// An `AppConfig` with every directory resolved. If the directory or
/// `config.toml` is missing, defaults are used rather than an error.
///
/// # Errors
///
/// Returns `ConfigError` if `config.toml` exists but cannot be read or
/// has invalid TOML syntax.
///
/// # Example
///
/// ```rust,no_run
/// use sk_core::config::loader::load_config;
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("."))?;
/// println!("Staging outputs in {}", config.cache_dir.display());
/// # Ok(())
/// # }
/// ```
pub fn load_config(root: &Path) -> ConfigResult<AppConfig> {
    let sk_dir = root.join(CONFIG_DIR);

    let session = load_session_config(&sk_dir)?;

    Ok(AppConfig::resolve(root, session))
}

/// Loads session settings from `config.toml`.
fn load_session_config(sk_dir: &Path) -> ConfigResult<SessionConfig> {
    let config_path = sk_dir.join("config.toml");

    Ok(read_toml(&config_path)?.unwrap_or_default())
}

/// Loads stitch options from the given `options.toml`.
///
/// Returns `Ok(None)` when no options were stored, so callers can fall
/// back to `StitchOptions::default()`.
pub fn load_options(path: &Path) -> ConfigResult<Option<StitchOptions>> {
    read_toml(path)
}

/// Path of the options file for a session root.
pub fn options_path(root: &Path) -> PathBuf {
    root.join(CONFIG_DIR).join("options.toml")
}

fn read_toml<T: DeserializeOwned>(path: &Path) -> ConfigResult<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let value = toml::from_str(&content).map_err(|source| ConfigError::TomlParse {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(Some(value))
}
