//! Session configuration models for `.stitch-kit/config.toml`.
//!
//! This module defines where a session stages its outputs and where
//! exports are written.

use serde::Deserialize;
use serde::Serialize;
use std::path::PathBuf;
use ts_rs::TS;

/// Represents session settings from `.stitch-kit/config.toml`.
///
/// Missing entries fall back to defaults chosen by the core: the system
/// temporary directory for staging and `<root>/gallery` for exports.
///
/// # Example
///
/// ```toml
/// # .stitch-kit/config.toml
/// cache-dir = "/var/cache/stitch-kit"
/// gallery-dir = "/home/me/Pictures"
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, TS)]
#[serde(rename_all = "kebab-case")]
pub struct SessionConfig {
    /// Directory where each attempt stages its temporary output file.
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,

    /// Directory backing the persistent image collection.
    #[serde(default)]
    pub gallery_dir: Option<PathBuf>,
}
