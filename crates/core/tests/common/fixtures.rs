//! Test fixtures for creating session roots and sample inputs.

use sk_core::config::loader::{load_config, options_path, CONFIG_DIR};
use sk_core::config::options::OptionsProvider;
use sk_core::engine::MockEngine;
use sk_core::export::{DirectoryGallery, ResultExporter};
use sk_core::inputs::ResourceOpener;
use sk_core::pipeline::PipelineOrchestrator;
use sk_core::staging::OutputStaging;
use sk_core::state::ProcessingStateStore;
use sk_core::StitchSession;
use sk_protocol::state_models::InputLocator;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// Create a temporary session root with `.stitch-kit/config.toml`.
///
/// This creates:
/// - `.stitch-kit/config.toml` pointing staging at `cache/` and the
///   gallery at `gallery/`
/// - `inputs/a.png` and `inputs/b.jpg` with one byte each
///
/// Returns a TempDir that must be kept alive for the test duration.
#[allow(dead_code)]
pub fn create_test_root() -> std::io::Result<TempDir> {
    let temp_dir = tempfile::tempdir()?;
    let root = temp_dir.path();

    std::fs::create_dir_all(root.join(CONFIG_DIR))?;
    std::fs::create_dir_all(root.join("inputs"))?;

    let config = format!(
        "cache-dir = {:?}\ngallery-dir = {:?}\n",
        root.join("cache").to_string_lossy(),
        root.join("gallery").to_string_lossy(),
    );
    std::fs::write(root.join(CONFIG_DIR).join("config.toml"), config)?;

    std::fs::write(root.join("inputs/a.png"), b"A")?;
    std::fs::write(root.join("inputs/b.jpg"), b"B")?;

    Ok(temp_dir)
}

/// Locator for a file under `inputs/`.
#[allow(dead_code)]
pub fn input(root: &Path, name: &str) -> InputLocator {
    InputLocator::new(root.join("inputs").join(name).to_string_lossy())
}

/// Overwrite `.stitch-kit/options.toml`.
#[allow(dead_code)]
pub fn write_options(root: &Path, toml: &str) {
    std::fs::write(options_path(root), toml).unwrap();
}

/// Build a filesystem-backed session over `root` with the given engine.
#[allow(dead_code)]
pub fn create_test_session(root: &Path, engine: MockEngine) -> StitchSession {
    let config = load_config(root).unwrap();
    StitchSession::from_config(&config, Arc::new(engine))
}

/// Build a session over `root` with custom opener and options.
#[allow(dead_code)]
pub fn create_custom_session(
    root: &Path,
    opener: Arc<dyn ResourceOpener>,
    options: Arc<dyn OptionsProvider>,
    engine: MockEngine,
) -> StitchSession {
    let store = ProcessingStateStore::new();
    let orchestrator = PipelineOrchestrator::new(
        store.clone(),
        opener,
        options,
        OutputStaging::new(root.join("cache")),
        Arc::new(engine),
    );
    let exporter = ResultExporter::new(
        store.clone(),
        Arc::new(DirectoryGallery::new(root.join("gallery"))),
    );
    StitchSession::new(store, orchestrator, exporter)
}

/// Every file currently staged under `cache/`.
#[allow(dead_code)]
pub fn staged_files(root: &Path) -> Vec<PathBuf> {
    match std::fs::read_dir(root.join("cache")) {
        Ok(entries) => entries.map(|entry| entry.unwrap().path()).collect(),
        Err(_) => Vec::new(),
    }
}
