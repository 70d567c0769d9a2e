//! Opening input images as raw readable handles.
//!
//! An attempt opens every locator in its selection snapshot before doing
//! anything else. Opening is all-or-nothing: a single bad locator fails the
//! whole call and the handles opened so far are closed before returning.

use crate::error::{StitchError, StitchResult};
use sk_protocol::state_models::InputLocator;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Handles and media types for one attempt's inputs, in selection order.
///
/// Both vectors always have the same length. Dropping this value closes
/// every handle.
#[derive(Debug, Default)]
pub struct OpenedInputs {
    pub handles: Vec<File>,
    pub mime_types: Vec<String>,
}

impl OpenedInputs {
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    fn push(&mut self, handle: File, mime_type: String) {
        self.handles.push(handle);
        self.mime_types.push(mime_type);
    }
}

/// Turns opaque locators into readable handles.
pub trait ResourceOpener: Send + Sync {
    fn open(&self, locators: &[InputLocator]) -> StitchResult<OpenedInputs>;
}

/// Opens locators as filesystem paths, with or without a `file://` prefix.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileResourceOpener;

impl FileResourceOpener {
    fn resolve(locator: &InputLocator) -> PathBuf {
        let raw = locator.as_str();
        PathBuf::from(raw.strip_prefix("file://").unwrap_or(raw))
    }
}

impl ResourceOpener for FileResourceOpener {
    fn open(&self, locators: &[InputLocator]) -> StitchResult<OpenedInputs> {
        let mut opened = OpenedInputs::default();

        for locator in locators {
            let path = Self::resolve(locator);

            // Early returns drop `opened`, closing every handle taken so far.
            let mime_type = mime_type_for_path(&path).ok_or_else(|| StitchError::InputOpen {
                locator: locator.to_string(),
                reason: "unrecognized image type".to_string(),
            })?;

            let handle = File::open(&path).map_err(|e| StitchError::InputOpen {
                locator: locator.to_string(),
                reason: e.to_string(),
            })?;

            if !handle
                .metadata()
                .map(|meta| meta.is_file())
                .unwrap_or(false)
            {
                return Err(StitchError::InputOpen {
                    locator: locator.to_string(),
                    reason: "not a regular file".to_string(),
                });
            }

            debug!(locator = %locator, mime_type, "Input opened");
            opened.push(handle, mime_type.to_string());
        }

        Ok(opened)
    }
}

/// Media type of an image path, judged by its extension.
pub fn mime_type_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "bmp" => Some("image/bmp"),
        "webp" => Some("image/webp"),
        "tif" | "tiff" => Some("image/tiff"),
        _ => None,
    }
}
