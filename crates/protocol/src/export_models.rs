//! Gallery export result models.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// The outcome of exporting a completed stitch into the gallery.
///
/// Returned from a single export call and never stored.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
pub struct ExportResult {
    /// Generated display name, e.g. `stitch_20240102_031504.png`.
    pub display_name: String,

    /// Reference usable to locate or open the exported item.
    pub uri: String,
}
