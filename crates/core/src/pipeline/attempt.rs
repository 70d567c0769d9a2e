//! Handles to running stitch attempts.

use crate::error::StitchError;
use crate::state::ProcessingStateStore;
use std::path::PathBuf;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// How an attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// The engine succeeded and `Completed` was published with this path.
    Completed(PathBuf),

    /// `Failed` was published with this error.
    Failed(StitchError),

    /// The attempt was cancelled and exited without a terminal publication.
    Cancelled,
}

/// A spawned attempt.
///
/// Dropping the handle does not stop the attempt; call [`AttemptHandle::cancel`].
#[derive(Debug)]
pub struct AttemptHandle {
    id: Uuid,
    token: CancellationToken,
    store: ProcessingStateStore,
    join: JoinHandle<AttemptOutcome>,
}

impl AttemptHandle {
    pub(crate) fn new(
        id: Uuid,
        token: CancellationToken,
        store: ProcessingStateStore,
        join: JoinHandle<AttemptOutcome>,
    ) -> Self {
        Self {
            id,
            token,
            store,
            join,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Stop the attempt from publishing anything further.
    ///
    /// Work already handed to the engine runs to completion; its result is
    /// discarded.
    pub fn cancel(&self) {
        self.store.revoke(&self.token);
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Wait for the attempt to end.
    pub async fn join(self) -> AttemptOutcome {
        match self.join.await {
            Ok(outcome) => outcome,
            Err(e) if e.is_cancelled() => AttemptOutcome::Cancelled,
            Err(e) => AttemptOutcome::Failed(StitchError::Engine(format!(
                "Internal error: attempt stopped unexpectedly ({e})"
            ))),
        }
    }
}
