//! Resolved configuration for a stitch session.

use crate::config::loader::options_path;
use sk_protocol::config_models::SessionConfig;
use std::path::{Path, PathBuf};

/// Session configuration with every directory resolved.
///
/// Built from `.stitch-kit/config.toml`; entries missing there are filled
/// with defaults relative to the session root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Where each attempt stages its temporary output file.
    pub cache_dir: PathBuf,

    /// Directory backing the persistent image collection.
    pub gallery_dir: PathBuf,

    /// Location of `options.toml`, re-read on every attempt.
    pub options_path: PathBuf,
}

impl AppConfig {
    pub fn resolve(root: &Path, session: SessionConfig) -> Self {
        Self {
            cache_dir: session.cache_dir.unwrap_or_else(std::env::temp_dir),
            gallery_dir: session
                .gallery_dir
                .unwrap_or_else(|| root.join("gallery")),
            options_path: options_path(root),
        }
    }
}
