//! Collaborators that can hold an attempt inside a blocking step.
//!
//! A [`Gate`] is armed for one pass: the next call through it signals
//! `entered` and blocks until the gate is opened. Unarmed calls pass
//! straight through.

use sk_core::config::error::ConfigResult;
use sk_core::config::options::OptionsProvider;
use sk_core::error::StitchResult;
use sk_core::inputs::{OpenedInputs, ResourceOpener};
use sk_protocol::options_models::StitchOptions;
use sk_protocol::state_models::InputLocator;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use tokio::sync::Notify;

#[allow(dead_code)]
#[derive(Debug, Default)]
pub struct Gate {
    armed: AtomicBool,
    open: Mutex<bool>,
    opened: Condvar,
    entered: Notify,
}

#[allow(dead_code)]
impl Gate {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Block the next call until [`Gate::open`].
    pub fn arm(&self) {
        *self.open.lock().unwrap() = false;
        self.armed.store(true, Ordering::SeqCst);
    }

    pub fn open(&self) {
        *self.open.lock().unwrap() = true;
        self.opened.notify_all();
    }

    /// Wait until an armed call is blocked at the gate.
    pub async fn entered(&self) {
        self.entered.notified().await;
    }

    fn pass(&self) {
        if !self.armed.swap(false, Ordering::SeqCst) {
            return;
        }
        self.entered.notify_one();
        let mut open = self.open.lock().unwrap();
        while !*open {
            open = self.opened.wait(open).unwrap();
        }
    }
}

/// A [`ResourceOpener`] that waits at a gate before opening.
#[allow(dead_code)]
pub struct GatedOpener<O> {
    pub inner: O,
    pub gate: Arc<Gate>,
}

impl<O: ResourceOpener> ResourceOpener for GatedOpener<O> {
    fn open(&self, locators: &[InputLocator]) -> StitchResult<OpenedInputs> {
        self.gate.pass();
        self.inner.open(locators)
    }
}

/// An [`OptionsProvider`] that waits at a gate before reading.
#[allow(dead_code)]
pub struct GatedOptions<P> {
    pub inner: P,
    pub gate: Arc<Gate>,
}

impl<P: OptionsProvider> OptionsProvider for GatedOptions<P> {
    fn get_options(&self) -> ConfigResult<Option<StitchOptions>> {
        self.gate.pass();
        self.inner.get_options()
    }
}
