//! Mock engine implementation for testing and host demos.

use super::{NativeRequest, StitchEngine};
use std::io::{Read, Write};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use tokio::sync::Notify;

/// What a [`MockEngine`] receives on each call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockCall {
    pub options_json: String,
    pub input_mimes: Vec<String>,
    pub output_mime: String,
}

#[derive(Debug, Clone)]
enum Outcome {
    /// Write a header followed by every input's bytes.
    Concatenate,
    /// Report this message without writing anything.
    Fail(String),
}

#[derive(Debug, Default)]
struct Gate {
    open: Mutex<bool>,
    opened: Condvar,
    entered: Notify,
}

/// A scripted [`StitchEngine`].
///
/// Clones share the call log and the gate, so a test can keep one clone
/// and hand another to the orchestrator.
#[derive(Debug, Clone)]
pub struct MockEngine {
    outcome: Outcome,
    calls: Arc<Mutex<Vec<MockCall>>>,
    gate: Option<Arc<Gate>>,
}

impl MockEngine {
    pub const HEADER: &'static [u8] = b"STITCH";

    fn with_outcome(outcome: Outcome) -> Self {
        Self {
            outcome,
            calls: Arc::new(Mutex::new(Vec::new())),
            gate: None,
        }
    }

    /// Writes `HEADER` plus every input's bytes, then succeeds.
    pub fn success() -> Self {
        Self::with_outcome(Outcome::Concatenate)
    }

    /// Always fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_outcome(Outcome::Fail(message.into()))
    }

    /// Block inside every call until [`MockEngine::open_gate`] is called.
    pub fn gated(mut self) -> Self {
        self.gate = Some(Arc::new(Gate::default()));
        self
    }

    /// Let blocked and future calls proceed.
    pub fn open_gate(&self) {
        if let Some(gate) = &self.gate {
            let mut open = gate.open.lock().unwrap_or_else(PoisonError::into_inner);
            *open = true;
            gate.opened.notify_all();
        }
    }

    /// Wait until a call has reached the gate.
    pub async fn entered(&self) {
        if let Some(gate) = &self.gate {
            gate.entered.notified().await;
        }
    }

    /// Every call received so far, oldest first.
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn wait_at_gate(&self) {
        let Some(gate) = &self.gate else {
            return;
        };
        gate.entered.notify_one();
        let mut open = gate.open.lock().unwrap_or_else(PoisonError::into_inner);
        while !*open {
            open = gate
                .opened
                .wait(open)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }
}

impl StitchEngine for MockEngine {
    fn stitch(&self, request: NativeRequest<'_>) -> Option<String> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(MockCall {
                options_json: request.options_json.to_string(),
                input_mimes: request.input_mimes.to_vec(),
                output_mime: request.output_mime.to_string(),
            });

        self.wait_at_gate();

        match &self.outcome {
            Outcome::Fail(message) => Some(message.clone()),
            Outcome::Concatenate => {
                let mut output = request.output_handle;
                if let Err(e) = output.write_all(Self::HEADER) {
                    return Some(e.to_string());
                }
                for mut input in request.input_handles {
                    let mut bytes = Vec::new();
                    if let Err(e) = input.read_to_end(&mut bytes) {
                        return Some(e.to_string());
                    }
                    if let Err(e) = output.write_all(&bytes) {
                        return Some(e.to_string());
                    }
                }
                None
            }
        }
    }
}
