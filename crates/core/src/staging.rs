//! Temporary output files for stitch attempts.
//!
//! Each attempt stages a fresh `stitch_preview*.<ext>` file in the cache
//! directory and hands its writable handle to the engine. The file is kept
//! on disk after the handle closes so a `Completed` path stays readable.

use crate::error::{StitchError, StitchResult};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const OUTPUT_PREFIX: &str = "stitch_preview";

/// A staged output file and its open read-write handle.
#[derive(Debug)]
pub struct StagedOutput {
    pub path: PathBuf,
    pub handle: File,
}

impl StagedOutput {
    /// Close the handle and delete the file.
    ///
    /// Used when the attempt ends without publishing this path.
    pub fn discard(self) {
        let Self { path, handle } = self;
        drop(handle);
        if let Err(e) = std::fs::remove_file(&path) {
            warn!(path = %path.display(), error = %e, "Failed to remove staged output");
        }
    }
}

/// Allocates output files in one cache directory.
#[derive(Debug, Clone)]
pub struct OutputStaging {
    cache_dir: PathBuf,
}

impl OutputStaging {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Create a uniquely named output file with the given extension.
    ///
    /// # Errors
    ///
    /// Returns `StitchError::OutputStaging` if the directory cannot be
    /// created or the file cannot be opened for writing.
    pub fn stage(&self, extension: &str) -> StitchResult<StagedOutput> {
        std::fs::create_dir_all(&self.cache_dir)
            .map_err(|e| StitchError::OutputStaging(e.to_string()))?;

        let suffix = format!(".{extension}");
        let temp = tempfile::Builder::new()
            .prefix(OUTPUT_PREFIX)
            .suffix(&suffix)
            .tempfile_in(&self.cache_dir)
            .map_err(|e| StitchError::OutputStaging(e.to_string()))?;

        let (handle, path) = temp
            .keep()
            .map_err(|e| StitchError::OutputStaging(e.error.to_string()))?;

        debug!(path = %path.display(), "Output staged");
        Ok(StagedOutput { path, handle })
    }
}
