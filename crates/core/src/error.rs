//! Error types for stitch attempts and gallery exports.
//!
//! Every pipeline error is terminal for its attempt and is surfaced as a
//! `Failed` state whose message is this error's `Display` output. Export
//! errors are returned to the caller instead and never touch the state.

use thiserror::Error;

/// Errors produced by stitch attempts and exports.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StitchError {
    /// One or more inputs could not be opened or have an unrecognized type.
    #[error("Cannot open input {locator}: {reason}")]
    InputOpen { locator: String, reason: String },

    /// The stitch options could not be loaded or serialized.
    #[error("Cannot read stitch options: {0}")]
    ConfigSerialization(String),

    /// The temporary output file could not be created or opened.
    #[error("Cannot open output file")]
    OutputStaging(String),

    /// The native engine reported a failure; the message is shown as-is.
    #[error("{0}")]
    Engine(String),

    /// Export was requested while no completed output is visible.
    #[error("The stitch output isn't ready yet")]
    ExportNotReady,

    /// The output path has no extension or no longer exists.
    #[error("Cannot read the output file")]
    ExportPath(String),

    /// The gallery entry could not be allocated or written.
    #[error("Cannot write to the media gallery")]
    ExportStorage(String),
}

impl StitchError {
    /// Technical detail for logs, where the user-facing message hides it.
    pub fn detail(&self) -> &str {
        match self {
            Self::InputOpen { reason, .. } => reason,
            Self::ConfigSerialization(detail)
            | Self::OutputStaging(detail)
            | Self::Engine(detail)
            | Self::ExportPath(detail)
            | Self::ExportStorage(detail) => detail,
            Self::ExportNotReady => "state is not Completed",
        }
    }
}

/// Type alias for Result with StitchError.
pub type StitchResult<T> = Result<T, StitchError>;
