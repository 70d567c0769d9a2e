//! Host-facing owner of one stitch session.
//!
//! The StitchSession ties the state store, the orchestrator and the
//! exporter together. It keeps the selection, tracks the one current
//! attempt, remembers the canonical options used by the last attempt and
//! re-stitches when they drift.

use crate::config::models::AppConfig;
use crate::config::options::{resolve_options, FileOptionsProvider};
use crate::engine::StitchEngine;
use crate::error::{StitchError, StitchResult};
use crate::export::{DirectoryGallery, ResultExporter};
use crate::inputs::FileResourceOpener;
use crate::pipeline::{AttemptHandle, PipelineOrchestrator};
use crate::staging::OutputStaging;
use crate::state::ProcessingStateStore;
use sk_protocol::export_models::ExportResult;
use sk_protocol::ipc::Op;
use sk_protocol::state_models::{InputLocator, ProcessingState, ProcessingStatus};
use std::sync::{Arc, PoisonError};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// What applying an [`Op`] produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpOutcome {
    /// A new attempt was started.
    Started(Uuid),

    /// The op finished without starting an attempt.
    Done,

    /// An export finished.
    Exported(ExportResult),
}

/// One stitch session.
pub struct StitchSession {
    store: ProcessingStateStore,
    orchestrator: PipelineOrchestrator,
    exporter: ResultExporter,

    /// The latest spawned attempt, if any.
    current: Mutex<Option<AttemptHandle>>,

    /// Canonical options string of the latest attempt or detected drift.
    last_options: Arc<std::sync::Mutex<Option<String>>>,

    /// Held while resume reconciles; never awaited, only tried.
    reconciling: Mutex<()>,
}

impl StitchSession {
    /// Create a session from its collaborators.
    ///
    /// `orchestrator` and `exporter` must publish to and read from `store`.
    pub fn new(
        store: ProcessingStateStore,
        orchestrator: PipelineOrchestrator,
        exporter: ResultExporter,
    ) -> Self {
        Self {
            store,
            orchestrator,
            exporter,
            current: Mutex::new(None),
            last_options: Arc::new(std::sync::Mutex::new(None)),
            reconciling: Mutex::new(()),
        }
    }

    /// Create a filesystem-backed session.
    ///
    /// # Arguments
    ///
    /// * `config` - Resolved directories and options location
    /// * `engine` - The stitching engine supplied by the host
    pub fn from_config(config: &AppConfig, engine: Arc<dyn StitchEngine>) -> Self {
        let store = ProcessingStateStore::new();
        let orchestrator = PipelineOrchestrator::new(
            store.clone(),
            Arc::new(FileResourceOpener),
            Arc::new(FileOptionsProvider::new(&config.options_path)),
            OutputStaging::new(&config.cache_dir),
            engine,
        );
        let exporter = ResultExporter::new(
            store.clone(),
            Arc::new(DirectoryGallery::new(&config.gallery_dir)),
        );
        Self::new(store, orchestrator, exporter)
    }

    pub fn store(&self) -> &ProcessingStateStore {
        &self.store
    }

    /// Id of the latest spawned attempt.
    pub async fn current_attempt_id(&self) -> Option<Uuid> {
        self.current.lock().await.as_ref().map(AttemptHandle::id)
    }

    /// The canonical options string the session last stitched with.
    pub fn last_options(&self) -> Option<String> {
        self.last_options
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record_options(&self, options_json: String) {
        *self
            .last_options
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(options_json);
    }

    /// Append inputs to the selection and re-stitch.
    ///
    /// Returns the new attempt's id, or `None` when `locators` is empty.
    pub async fn add_inputs(&self, locators: Vec<InputLocator>) -> Option<Uuid> {
        if locators.is_empty() {
            debug!("No inputs to add");
            return None;
        }

        let mut current = self.current.lock().await;
        let mut selection = self.store.selection();
        selection.extend(locators);
        self.store.post_selection(selection.clone());

        Some(self.start_attempt(&mut current, selection))
    }

    /// Drop the selection and any result.
    pub async fn clear_inputs(&self) {
        let mut current = self.current.lock().await;
        if let Some(previous) = current.take() {
            previous.cancel();
        }
        self.store.post_selection(Vec::new());
        self.store.post_state(ProcessingState::Empty);
        info!("Selection cleared");
    }

    /// Re-stitch the current selection if the options changed since the
    /// latest attempt resolved them.
    ///
    /// Returns the id of the superseding attempt, or `None` when nothing
    /// drifted or another reconciliation is already running.
    ///
    /// # Errors
    ///
    /// Returns `ConfigSerialization` if the current options cannot be read.
    pub async fn resume(&self) -> StitchResult<Option<Uuid>> {
        let Ok(_reconciling) = self.reconciling.try_lock() else {
            debug!("Reconciliation already running");
            return Ok(None);
        };

        let Some(previous) = self.last_options() else {
            return Ok(None);
        };
        if self.store.state().status() == ProcessingStatus::Empty {
            return Ok(None);
        }

        let provider = Arc::clone(self.orchestrator.options());
        let (_, latest) = tokio::task::spawn_blocking(move || resolve_options(provider.as_ref()))
            .await
            .map_err(|e| StitchError::ConfigSerialization(e.to_string()))?
            .map_err(|e| {
                warn!(error = %e, "Cannot resolve options on resume");
                StitchError::ConfigSerialization(e.to_string())
            })?;
        if latest == previous {
            debug!("Options unchanged");
            return Ok(None);
        }

        let mut current = self.current.lock().await;
        let status = self.store.state().status();
        if status == ProcessingStatus::Empty {
            return Ok(None);
        }
        info!(?status, "Options changed; re-stitching");

        // Revoke first so the stale attempt cannot report its options after
        // the drift has been recorded.
        if let Some(previous) = current.take() {
            previous.cancel();
            debug!(attempt_id = %previous.id(), "Stale attempt cancelled");
        }
        self.record_options(latest);

        let selection = self.store.selection();
        Ok(Some(self.start_attempt(&mut current, selection)))
    }

    /// Export the current `Completed` output to the gallery.
    ///
    /// # Errors
    ///
    /// Returns `ExportNotReady` when there is no completed output, or the
    /// exporter's error.
    pub async fn export(&self) -> StitchResult<ExportResult> {
        let Some(output_path) = self.store.state().output_path().cloned() else {
            return Err(StitchError::ExportNotReady);
        };
        let exporter = self.exporter.clone();
        tokio::task::spawn_blocking(move || exporter.export(&output_path))
            .await
            .map_err(|e| StitchError::ExportStorage(e.to_string()))?
    }

    /// Dispatch a protocol command.
    pub async fn apply(&self, op: Op) -> StitchResult<OpOutcome> {
        match op {
            Op::AddInputs { locators } => Ok(self
                .add_inputs(locators)
                .await
                .map_or(OpOutcome::Done, OpOutcome::Started)),
            Op::ClearInputs => {
                self.clear_inputs().await;
                Ok(OpOutcome::Done)
            }
            Op::Resume => Ok(self
                .resume()
                .await?
                .map_or(OpOutcome::Done, OpOutcome::Started)),
            Op::Export => self.export().await.map(OpOutcome::Exported),
        }
    }

    /// Stop the current attempt from publishing; used on teardown.
    pub async fn shutdown(&self) {
        if let Some(previous) = self.current.lock().await.take() {
            previous.cancel();
            debug!(attempt_id = %previous.id(), "Attempt cancelled on shutdown");
        }
    }

    /// Cancel the previous attempt and start one over `selection`.
    fn start_attempt(
        &self,
        current: &mut Option<AttemptHandle>,
        selection: Vec<InputLocator>,
    ) -> Uuid {
        if let Some(previous) = current.take() {
            previous.cancel();
            debug!(attempt_id = %previous.id(), "Previous attempt superseded");
        }

        let last_options = Arc::clone(&self.last_options);
        let handle = self.orchestrator.run(selection, move |options_json| {
            *last_options.lock().unwrap_or_else(PoisonError::into_inner) = Some(options_json);
        });
        let id = handle.id();
        *current = Some(handle);
        id
    }
}
