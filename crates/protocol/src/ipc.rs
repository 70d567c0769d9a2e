//! Host communication protocol.
//!
//! This module defines the message types exchanged between an embedding
//! host (the visual shell) and a stitch session.
//!
//! The protocol follows an Operation/Event pattern:
//! - `Op`: Commands sent from the host to the session
//! - `Event`: Notifications sent from the session to the host

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::state_models::{InputLocator, ProcessingState};

/// Operations sent from the host to the session.
///
/// Uses tagged enum serialization for TypeScript compatibility:
/// ```json
/// {
///   "type": "addInputs",
///   "payload": { "locators": ["/sdcard/a.png", "/sdcard/b.png"] }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum Op {
    /// Append inputs to the selection and restitch.
    AddInputs { locators: Vec<InputLocator> },

    /// Drop the whole selection and the current result.
    ClearInputs,

    /// The host returned to the foreground; restitch if options drifted.
    Resume,

    /// Copy the completed output into the gallery.
    Export,
}

/// Events sent from the session to the host.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum Event {
    /// The input selection was replaced.
    SelectionChanged { locators: Vec<InputLocator> },

    /// A new stitch attempt was spawned.
    AttemptStarted {
        #[ts(type = "string")]
        attempt_id: Uuid,
        input_count: usize,
    },

    /// The visible processing state changed.
    StateChanged { state: ProcessingState },
}
