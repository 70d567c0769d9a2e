//! Observable store for the current processing state and input selection.
//!
//! The store holds exactly one current [`ProcessingState`] and one current
//! selection. Writes overwrite unconditionally (last writer wins); readers
//! see the latest value and every later change. Each change is also
//! broadcast as an [`Event`] for hosts that forward notifications.

use sk_protocol::ipc::Event;
use sk_protocol::state_models::{InputLocator, ProcessingState};
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{broadcast, watch};
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;
use tracing::debug;

const EVENT_CAPACITY: usize = 64;

struct Inner {
    state: watch::Sender<ProcessingState>,
    selection: watch::Sender<Vec<InputLocator>>,
    events: broadcast::Sender<Event>,

    /// Serializes attempt publications against revocations.
    publish_lock: Mutex<()>,
}

/// Session-scoped state cell shared by the session and its attempts.
///
/// Cloning is cheap; all clones observe and write the same state.
#[derive(Clone)]
pub struct ProcessingStateStore {
    inner: Arc<Inner>,
}

impl fmt::Debug for ProcessingStateStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessingStateStore")
            .field("state", &*self.inner.state.borrow())
            .field("selection", &*self.inner.selection.borrow())
            .finish()
    }
}

impl Default for ProcessingStateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessingStateStore {
    /// Create a store in the `Empty` state with no selection.
    pub fn new() -> Self {
        let (state, _) = watch::channel(ProcessingState::Empty);
        let (selection, _) = watch::channel(Vec::new());
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Self {
            inner: Arc::new(Inner {
                state,
                selection,
                events,
                publish_lock: Mutex::new(()),
            }),
        }
    }

    /// The current state.
    pub fn state(&self) -> ProcessingState {
        self.inner.state.borrow().clone()
    }

    /// The current selection.
    pub fn selection(&self) -> Vec<InputLocator> {
        self.inner.selection.borrow().clone()
    }

    /// Overwrite the current state.
    pub fn post_state(&self, state: ProcessingState) {
        debug!(status = ?state.status(), "State posted");
        self.inner.state.send_replace(state.clone());
        let _ = self.inner.events.send(Event::StateChanged { state });
    }

    /// Overwrite the current selection.
    pub fn post_selection(&self, locators: Vec<InputLocator>) {
        debug!(count = locators.len(), "Selection posted");
        self.inner.selection.send_replace(locators.clone());
        let _ = self.inner.events.send(Event::SelectionChanged { locators });
    }

    /// Publish on behalf of an attempt unless it has been revoked.
    ///
    /// Returns `false` without publishing when `token` is cancelled.
    pub fn publish_for_attempt(&self, token: &CancellationToken, state: ProcessingState) -> bool {
        self.run_for_attempt(token, || self.post_state(state))
    }

    /// Run `action` on behalf of an attempt unless it has been revoked.
    ///
    /// `action` runs while revocations are held off, so it must not cancel
    /// attempts itself. Returns `false` without running it when `token` is
    /// cancelled.
    pub fn run_for_attempt<F>(&self, token: &CancellationToken, action: F) -> bool
    where
        F: FnOnce(),
    {
        let _guard = self
            .inner
            .publish_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if token.is_cancelled() {
            return false;
        }
        action();
        true
    }

    /// Cancel an attempt's token so it can no longer publish.
    ///
    /// Any publication racing with this call either completes before it
    /// returns or is refused.
    pub fn revoke(&self, token: &CancellationToken) {
        let _guard = self
            .inner
            .publish_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        token.cancel();
    }

    /// Announce a host-level event that is not a state or selection change.
    pub fn notify(&self, event: Event) {
        let _ = self.inner.events.send(event);
    }

    /// Watch the state; the receiver starts at the current value.
    pub fn subscribe_state(&self) -> watch::Receiver<ProcessingState> {
        self.inner.state.subscribe()
    }

    /// Watch the selection; the receiver starts at the current value.
    pub fn subscribe_selection(&self) -> watch::Receiver<Vec<InputLocator>> {
        self.inner.selection.subscribe()
    }

    /// The state as a stream that yields the current value first.
    pub fn state_stream(&self) -> WatchStream<ProcessingState> {
        WatchStream::new(self.subscribe_state())
    }

    /// Every event published from now on.
    pub fn subscribe_events(&self) -> broadcast::Receiver<Event> {
        self.inner.events.subscribe()
    }
}
