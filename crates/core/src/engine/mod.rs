//! The stitching engine boundary.
//!
//! Pixel processing is delegated to an external, independently versioned
//! engine through a data-only contract: an options string, ordered input
//! handles with their media types, and one output handle. No object graph
//! crosses the boundary.
//!
//! ## Handle ownership
//!
//! The engine borrows every handle for the duration of [`StitchEngine::stitch`]
//! and must not retain or close them. Once the call returns, the caller
//! closes all of them.

pub mod mock;
#[cfg(unix)]
pub mod native;

use std::fs::File;

pub use mock::MockEngine;
#[cfg(unix)]
pub use native::NativeEngine;

/// Everything the engine receives for one stitch.
#[derive(Debug, Clone, Copy)]
pub struct NativeRequest<'a> {
    /// Canonical options string; its format is opaque to the core.
    pub options_json: &'a str,

    /// Readable input handles, in selection order.
    pub input_handles: &'a [File],

    /// Media type of each input; same length and order as `input_handles`.
    pub input_mimes: &'a [String],

    /// Writable handle of the staged output file.
    pub output_handle: &'a File,

    /// Media type the output must be encoded as.
    pub output_mime: &'a str,
}

/// A stitching engine.
///
/// Implementations block until the output has been written. `None` means
/// success; `Some(message)` is a failure whose message is shown to the user.
pub trait StitchEngine: Send + Sync {
    fn stitch(&self, request: NativeRequest<'_>) -> Option<String>;
}
