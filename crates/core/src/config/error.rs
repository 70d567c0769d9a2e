//! Error types for configuration loading.
//!
//! This module defines all errors that can occur while reading the session
//! configuration and the stitch options.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read a configuration file from disk.
    #[error("Failed to read config file at {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to parse TOML configuration.
    #[error("Failed to parse TOML file at {path}: {source}")]
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// Failed to serialize options into their canonical JSON form.
    #[error("Failed to serialize options: {source}")]
    JsonSerialize { source: serde_json::Error },

    /// Options parsed but hold a value the engine cannot accept.
    #[error("Invalid option {field}: {reason}")]
    InvalidOption { field: &'static str, reason: String },
}

/// Type alias for Result with ConfigError.
pub type ConfigResult<T> = Result<T, ConfigError>;
