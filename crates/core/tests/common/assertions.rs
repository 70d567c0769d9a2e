//! Custom assertion helpers for integration tests.

use sk_core::state::ProcessingStateStore;
use sk_protocol::ipc::Event;
use sk_protocol::state_models::ProcessingState;
use std::time::Duration;
use tokio::sync::broadcast;

/// Wait until the store shows a terminal state and return it.
#[allow(dead_code)]
pub async fn wait_for_terminal(store: &ProcessingStateStore) -> ProcessingState {
    let mut rx = store.subscribe_state();
    let state = tokio::time::timeout(
        Duration::from_secs(5),
        rx.wait_for(ProcessingState::is_terminal),
    )
    .await
    .expect("Timed out waiting for a terminal state")
    .expect("State store dropped");
    state.clone()
}

/// The next published state, skipping other events.
#[allow(dead_code)]
pub async fn next_state(rx: &mut broadcast::Receiver<Event>) -> ProcessingState {
    loop {
        let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("Timed out waiting for a state")
            .expect("Event channel closed");
        if let Event::StateChanged { state } = event {
            return state;
        }
    }
}

/// Collect every published state until the first terminal one.
#[allow(dead_code)]
pub async fn collect_states(rx: &mut broadcast::Receiver<Event>) -> Vec<ProcessingState> {
    let mut states = Vec::new();
    loop {
        let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("Timed out waiting for events")
            .expect("Event channel closed");
        if let Event::StateChanged { state } = event {
            let terminal = state.is_terminal();
            states.push(state);
            if terminal {
                return states;
            }
        }
    }
}

/// Assert that a state sequence went `Loading` then one terminal state.
#[allow(dead_code)]
pub fn assert_loading_then(states: &[ProcessingState], terminal: &ProcessingState) {
    assert!(
        matches!(states.first(), Some(ProcessingState::Loading)),
        "First state should be Loading, got: {:?}",
        states
    );
    assert_eq!(states.last(), Some(terminal));
    assert_single_terminal(states);
}

/// Assert that exactly one terminal state appears in the sequence.
#[allow(dead_code)]
pub fn assert_single_terminal(states: &[ProcessingState]) {
    let terminal = states.iter().filter(|s| s.is_terminal()).count();
    assert_eq!(terminal, 1, "Expected one terminal state in {:?}", states);
}

/// Assert that no further state arrives within a short grace period.
#[allow(dead_code)]
pub async fn assert_no_more_states(rx: &mut broadcast::Receiver<Event>) {
    let deadline = tokio::time::Instant::now() + Duration::from_millis(200);
    loop {
        match tokio::time::timeout_at(deadline, rx.recv()).await {
            Err(_) => return,
            Ok(Ok(Event::StateChanged { state })) => {
                panic!("Unexpected state published: {:?}", state)
            }
            Ok(Ok(_)) => continue,
            Ok(Err(e)) => panic!("Event channel failed: {e}"),
        }
    }
}
