//! Stitch pipeline orchestration.
//!
//! The PipelineOrchestrator drives one stitch attempt end-to-end as a
//! cancellable tokio task: it opens the inputs, resolves the options,
//! stages an output file, calls the engine and publishes the outcome to
//! the session's [`ProcessingStateStore`].

pub mod attempt;

use crate::config::options::{resolve_options, OptionsProvider};
use crate::engine::{NativeRequest, StitchEngine};
use crate::error::StitchError;
use crate::inputs::ResourceOpener;
use crate::staging::OutputStaging;
use crate::state::ProcessingStateStore;
use sk_protocol::ipc::Event;
use sk_protocol::state_models::{InputLocator, ProcessingState};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

pub use attempt::{AttemptHandle, AttemptOutcome};

/// Spawns stitch attempts against one set of collaborators.
///
/// At most one attempt is meaningful at a time. The orchestrator does not
/// stop earlier attempts by itself; callers cancel the previous handle when
/// they spawn a superseding one.
#[derive(Clone)]
pub struct PipelineOrchestrator {
    store: ProcessingStateStore,
    opener: Arc<dyn ResourceOpener>,
    options: Arc<dyn OptionsProvider>,
    staging: OutputStaging,
    engine: Arc<dyn StitchEngine>,
}

impl PipelineOrchestrator {
    /// Create a new PipelineOrchestrator.
    ///
    /// # Arguments
    ///
    /// * `store` - The session's state store that attempts publish to
    /// * `opener` - Resolves input locators to readable handles
    /// * `options` - Supplies the stored stitch options
    /// * `staging` - Allocates temporary output files
    /// * `engine` - The stitching engine
    pub fn new(
        store: ProcessingStateStore,
        opener: Arc<dyn ResourceOpener>,
        options: Arc<dyn OptionsProvider>,
        staging: OutputStaging,
        engine: Arc<dyn StitchEngine>,
    ) -> Self {
        Self {
            store,
            opener,
            options,
            staging,
            engine,
        }
    }

    pub fn store(&self) -> &ProcessingStateStore {
        &self.store
    }

    pub fn options(&self) -> &Arc<dyn OptionsProvider> {
        &self.options
    }

    /// Start an attempt over a selection snapshot.
    ///
    /// `Loading` is published before this returns. `on_config_resolved`
    /// receives the canonical options string once the options have been
    /// resolved, before the output is staged. It is never called after the
    /// attempt is cancelled and must not cancel attempts itself.
    ///
    /// Must be called from within a tokio runtime.
    pub fn run<F>(&self, selection: Vec<InputLocator>, on_config_resolved: F) -> AttemptHandle
    where
        F: FnOnce(String) + Send + 'static,
    {
        let id = Uuid::new_v4();
        let token = CancellationToken::new();

        self.store.notify(Event::AttemptStarted {
            attempt_id: id,
            input_count: selection.len(),
        });
        self.store
            .publish_for_attempt(&token, ProcessingState::Loading);

        let attempt = Attempt {
            token: token.clone(),
            orchestrator: self.clone(),
        };
        let span = info_span!("attempt", attempt_id = %id);
        let join = tokio::spawn(attempt.execute(selection, on_config_resolved).instrument(span));

        AttemptHandle::new(id, token, self.store.clone(), join)
    }
}

/// One attempt's private view of the orchestrator.
struct Attempt {
    token: CancellationToken,
    orchestrator: PipelineOrchestrator,
}

/// Run blocking work off the async workers, mapping a panic to `on_panic`.
async fn blocking<T, F>(work: F, on_panic: fn(String) -> StitchError) -> Result<T, StitchError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| on_panic(format!("worker stopped unexpectedly: {e}")))
}

impl Attempt {
    fn cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Publish `Failed` unless cancelled.
    fn fail(&self, error: StitchError) -> AttemptOutcome {
        warn!(error = %error, detail = error.detail(), "Attempt failed");
        if self
            .orchestrator
            .store
            .publish_for_attempt(&self.token, ProcessingState::failed(error.to_string()))
        {
            AttemptOutcome::Failed(error)
        } else {
            debug!("Attempt cancelled; failure not published");
            AttemptOutcome::Cancelled
        }
    }

    async fn execute<F>(self, selection: Vec<InputLocator>, on_config_resolved: F) -> AttemptOutcome
    where
        F: FnOnce(String) + Send + 'static,
    {
        info!(inputs = selection.len(), "Attempt started");

        // Open inputs
        let opener = Arc::clone(&self.orchestrator.opener);
        let opened = blocking(move || opener.open(&selection), |detail| {
            StitchError::InputOpen {
                locator: "(selection)".to_string(),
                reason: detail,
            }
        })
        .await
        .and_then(|result| result);
        if self.cancelled() {
            return AttemptOutcome::Cancelled;
        }
        let opened = match opened {
            Ok(opened) => opened,
            Err(e) => return self.fail(e),
        };

        // Resolve options, or use defaults if there were none
        let provider = Arc::clone(&self.orchestrator.options);
        let resolved = blocking(
            move || {
                resolve_options(provider.as_ref())
                    .map_err(|e| StitchError::ConfigSerialization(e.to_string()))
            },
            StitchError::ConfigSerialization,
        )
        .await
        .and_then(|result| result);
        if self.cancelled() {
            return AttemptOutcome::Cancelled;
        }
        let (options, options_json) = match resolved {
            Ok(resolved) => resolved,
            Err(e) => return self.fail(e),
        };

        // Report the options unless a successor already superseded us
        let reported = options_json.clone();
        if !self
            .orchestrator
            .store
            .run_for_attempt(&self.token, move || on_config_resolved(reported))
        {
            return AttemptOutcome::Cancelled;
        }

        // Stage output file including its media type
        let staging = self.orchestrator.staging.clone();
        let extension = options.file_extension();
        let staged = blocking(move || staging.stage(extension), StitchError::OutputStaging)
            .await
            .and_then(|result| result);
        let staged = match staged {
            Ok(staged) => staged,
            Err(e) if self.cancelled() => {
                debug!(error = %e, "Staging failed after cancellation");
                return AttemptOutcome::Cancelled;
            }
            Err(e) => return self.fail(e),
        };

        // Check if cancelled
        if self.cancelled() {
            staged.discard();
            return AttemptOutcome::Cancelled;
        }

        // Run the engine; handles are closed when the closure's values drop
        let engine = Arc::clone(&self.orchestrator.engine);
        let output_mime = options.mime_type();
        let output_path: PathBuf = staged.path.clone();
        let message = blocking(
            move || {
                let message = engine.stitch(NativeRequest {
                    options_json: &options_json,
                    input_handles: &opened.handles,
                    input_mimes: &opened.mime_types,
                    output_handle: &staged.handle,
                    output_mime,
                });
                drop(opened);
                drop(staged.handle);
                message
            },
            StitchError::Engine,
        )
        .await;

        let message = match message {
            Ok(message) => message,
            Err(e) => {
                remove_output(&output_path);
                if self.cancelled() {
                    return AttemptOutcome::Cancelled;
                }
                return self.fail(e);
            }
        };

        match message {
            None => {
                let published = self.orchestrator.store.publish_for_attempt(
                    &self.token,
                    ProcessingState::completed(output_path.clone()),
                );
                if published {
                    info!(output = %output_path.display(), "Attempt completed");
                    AttemptOutcome::Completed(output_path)
                } else {
                    debug!("Attempt cancelled; result discarded");
                    remove_output(&output_path);
                    AttemptOutcome::Cancelled
                }
            }
            Some(message) => {
                remove_output(&output_path);
                self.fail(StitchError::Engine(message))
            }
        }
    }
}

fn remove_output(path: &std::path::Path) {
    if let Err(e) = std::fs::remove_file(path) {
        debug!(path = %path.display(), error = %e, "Staged output not removed");
    }
}
