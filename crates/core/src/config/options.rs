//! Stitch option providers and canonical serialization.
//!
//! The canonical JSON string is what the engine receives and what a
//! session compares to detect option drift between attempts.

use crate::config::error::{ConfigError, ConfigResult};
use crate::config::loader::load_options;
use sk_protocol::options_models::StitchOptions;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

/// Supplies the user's stored stitch options.
///
/// `Ok(None)` means nothing is stored and defaults apply.
pub trait OptionsProvider: Send + Sync {
    fn get_options(&self) -> ConfigResult<Option<StitchOptions>>;
}

/// Reads options from an `options.toml` file on every call.
#[derive(Debug, Clone)]
pub struct FileOptionsProvider {
    path: PathBuf,
}

impl FileOptionsProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl OptionsProvider for FileOptionsProvider {
    fn get_options(&self) -> ConfigResult<Option<StitchOptions>> {
        load_options(&self.path)
    }
}

/// Options held in memory by the host, e.g. after a settings screen saved them.
#[derive(Debug, Clone, Default)]
pub struct MemoryOptionsProvider {
    options: Arc<RwLock<Option<StitchOptions>>>,
}

impl MemoryOptionsProvider {
    pub fn new(options: Option<StitchOptions>) -> Self {
        Self {
            options: Arc::new(RwLock::new(options)),
        }
    }

    /// Replace the stored options. Clones of this provider see the change.
    pub fn set(&self, options: Option<StitchOptions>) {
        match self.options.write() {
            Ok(mut guard) => *guard = options,
            Err(poisoned) => *poisoned.into_inner() = options,
        }
    }
}

impl OptionsProvider for MemoryOptionsProvider {
    fn get_options(&self) -> ConfigResult<Option<StitchOptions>> {
        let guard = match self.options.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        Ok(guard.clone())
    }
}

/// Serialize options into the canonical string handed to the engine.
///
/// Field order follows the struct definition, so equal options always
/// produce equal strings.
///
/// # Errors
///
/// Returns `ConfigError::InvalidOption` if `quality` is outside 1..=100.
pub fn canonical_json(options: &StitchOptions) -> ConfigResult<String> {
    if !(1..=100).contains(&options.quality) {
        return Err(ConfigError::InvalidOption {
            field: "quality",
            reason: format!("{} is outside 1..=100", options.quality),
        });
    }

    serde_json::to_string(options).map_err(|source| ConfigError::JsonSerialize { source })
}

/// Resolve the effective options and their canonical string.
///
/// Falls back to `StitchOptions::default()` when nothing is stored.
pub fn resolve_options(provider: &dyn OptionsProvider) -> ConfigResult<(StitchOptions, String)> {
    let options = provider.get_options()?.unwrap_or_default();
    let json = canonical_json(&options)?;
    Ok((options, json))
}
