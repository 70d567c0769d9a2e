//! Processing state models.
//!
//! This module defines the observable outcome of stitch attempts and the
//! input selection they read from.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use ts_rs::TS;

/// Opaque reference to one input image, as supplied by the selection source.
///
/// No syntax validation is performed on locators; they are resolved only
/// when an attempt opens its inputs.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash, TS)]
pub struct InputLocator(pub String);

impl InputLocator {
    pub fn new(locator: impl Into<String>) -> Self {
        Self(locator.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InputLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for InputLocator {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// The tag of a [`ProcessingState`], without its payload.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcessingStatus {
    /// Nothing selected, or the selection was cleared.
    Empty,

    /// An attempt is running.
    Loading,

    /// The latest attempt produced an output file.
    Completed,

    /// The latest attempt failed.
    Failed,
}

/// The single current outcome observed by presentation layers.
///
/// Each variant carries only the payload valid for it: a path for
/// `Completed`, a human-readable message for `Failed`, nothing otherwise.
///
/// Serialized as a tagged object:
/// ```json
/// { "status": "COMPLETED", "output_path": "/tmp/stitch_preview123.png" }
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default, TS)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcessingState {
    #[default]
    Empty,

    Loading,

    Completed {
        /// Path of the staged output file written by the engine.
        output_path: PathBuf,
    },

    Failed {
        /// User-facing description of what went wrong.
        error: String,
    },
}

impl ProcessingState {
    pub fn completed(output_path: impl Into<PathBuf>) -> Self {
        Self::Completed {
            output_path: output_path.into(),
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self::Failed {
            error: error.into(),
        }
    }

    pub fn status(&self) -> ProcessingStatus {
        match self {
            Self::Empty => ProcessingStatus::Empty,
            Self::Loading => ProcessingStatus::Loading,
            Self::Completed { .. } => ProcessingStatus::Completed,
            Self::Failed { .. } => ProcessingStatus::Failed,
        }
    }

    /// The output path when this state is `Completed`.
    pub fn output_path(&self) -> Option<&PathBuf> {
        match self {
            Self::Completed { output_path } => Some(output_path),
            _ => None,
        }
    }

    /// The error message when this state is `Failed`.
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed { error } => Some(error),
            _ => None,
        }
    }

    /// Whether an attempt has reached a terminal outcome.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed { .. } | Self::Failed { .. })
    }
}
