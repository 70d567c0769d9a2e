//! Stitch option models for `.stitch-kit/options.toml`.
//!
//! The options are handed to the native engine as canonical JSON; the core
//! never interprets them beyond picking the output container.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// How input images are arranged in the output.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default, TS)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    /// Let the engine pick a roughly square grid.
    #[default]
    Grid,

    /// Place all images in a single row.
    Horizontal,

    /// Place all images in a single column.
    Vertical,
}

/// Output container written by the engine.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default, TS)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Jpeg,
    #[default]
    Png,
    Gif,
    Bmp,
}

impl OutputFormat {
    pub fn file_extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Gif => "gif",
            Self::Bmp => "bmp",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Gif => "image/gif",
            Self::Bmp => "image/bmp",
        }
    }
}

/// The user's stitching options.
///
/// # Example
///
/// ```toml
/// # .stitch-kit/options.toml
/// alignment = "horizontal"
/// max-width = 4096
/// quality = 90
/// output-format = "jpeg"
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
#[serde(rename_all = "kebab-case", default)]
pub struct StitchOptions {
    pub alignment: Alignment,

    /// Maximum output width in pixels; 0 means unlimited.
    pub max_width: u32,

    /// Maximum output height in pixels; 0 means unlimited.
    pub max_height: u32,

    /// Encoder quality, 1 to 100. Only JPEG output uses it.
    pub quality: u32,

    pub output_format: OutputFormat,
}

impl Default for StitchOptions {
    fn default() -> Self {
        Self {
            alignment: Alignment::Grid,
            max_width: 0,
            max_height: 0,
            quality: 100,
            output_format: OutputFormat::Png,
        }
    }
}

impl StitchOptions {
    pub fn file_extension(&self) -> &'static str {
        self.output_format.file_extension()
    }

    pub fn mime_type(&self) -> &'static str {
        self.output_format.mime_type()
    }
}
