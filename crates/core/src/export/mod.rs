//! Exporting completed stitches into the gallery.
//!
//! Export is a side operation: it reads the `Completed` payload and copies
//! the staged file into persistent storage. Its errors go back to the
//! caller and never change the processing state.

pub mod gallery;

use crate::error::{StitchError, StitchResult};
use crate::state::ProcessingStateStore;
use chrono::{DateTime, Local};
use sk_protocol::export_models::ExportResult;
use sk_protocol::state_models::ProcessingStatus;
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};

pub use gallery::{DirectoryGallery, GalleryStore, MediaCollection, MediaUri, WriteMode};

/// Size of the buffer used to copy an output into the gallery.
pub const COPY_BUFFER_SIZE: usize = 4096;

/// Source of the export timestamp.
pub type Clock = Arc<dyn Fn() -> DateTime<Local> + Send + Sync>;

/// Copies completed outputs into a gallery collection.
#[derive(Clone)]
pub struct ResultExporter {
    store: ProcessingStateStore,
    gallery: Arc<dyn GalleryStore>,
    collection: MediaCollection,
    clock: Clock,
}

impl ResultExporter {
    pub fn new(store: ProcessingStateStore, gallery: Arc<dyn GalleryStore>) -> Self {
        Self {
            store,
            gallery,
            collection: MediaCollection::images(),
            clock: Arc::new(Local::now),
        }
    }

    /// Use a fixed time source, e.g. in tests.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Export the file at `output_path` into the image collection.
    ///
    /// # Errors
    ///
    /// - `ExportNotReady` if the visible state is not `Completed`; storage
    ///   is not touched
    /// - `ExportPath` if the path has no extension or is not a regular file
    /// - `ExportStorage` if the entry cannot be allocated or written; a
    ///   partially written entry is left in place
    pub fn export(&self, output_path: &Path) -> StitchResult<ExportResult> {
        if self.store.state().status() != ProcessingStatus::Completed {
            error!("The stitch output doesn't appear to be ready");
            return Err(StitchError::ExportNotReady);
        }

        let extension = output_extension(output_path).ok_or_else(|| {
            error!(path = %output_path.display(), "Failed reading file extension");
            StitchError::ExportPath("missing file extension".to_string())
        })?;

        if !output_path.is_file() {
            error!(path = %output_path.display(), "Output file does not exist");
            return Err(StitchError::ExportPath("output file does not exist".to_string()));
        }

        let display_name = output_file_name(&(self.clock)(), &extension);

        let uri = self
            .gallery
            .insert_entry(&self.collection, &display_name)
            .ok_or_else(|| {
                error!(display_name, "A problem occurred writing the gallery");
                StitchError::ExportStorage("entry allocation refused".to_string())
            })?;

        let mut input = File::open(output_path).map_err(|e| {
            error!(error = %e, "A problem occurred accessing the file");
            StitchError::ExportStorage(e.to_string())
        })?;
        let mut output = self
            .gallery
            .open_output_stream(&uri, WriteMode::Truncate)
            .ok_or_else(|| {
                error!(uri = %uri, "A problem occurred opening the file");
                StitchError::ExportStorage("cannot open gallery entry".to_string())
            })?;

        let copied = sink_stream(&mut input, &mut output)
            .and_then(|copied| output.flush().map(|()| copied))
            .map_err(|e| {
                error!(error = %e, "A problem occurred writing the file");
                StitchError::ExportStorage(e.to_string())
            })?;

        info!(display_name, uri = %uri, bytes = copied, "Stitch exported");
        Ok(ExportResult {
            display_name,
            uri: uri.to_string(),
        })
    }
}

/// Extension after the last `.`, if it is neither leading nor trailing.
fn output_extension(path: &Path) -> Option<String> {
    let text = path.to_string_lossy();
    let dot = text.rfind('.')?;
    if dot == 0 || dot + 1 >= text.len() {
        return None;
    }
    let extension = &text[dot + 1..];
    if extension.contains(['/', '\\']) {
        return None;
    }
    Some(extension.to_string())
}

/// `stitch_<yyyyMMdd_hhmmss>.<ext>`, with a 12-hour `hh`.
pub fn output_file_name(now: &DateTime<Local>, extension: &str) -> String {
    format!("stitch_{}.{extension}", now.format("%Y%m%d_%I%M%S"))
}

/// Copy everything from `input` to `output` through a fixed-size buffer.
///
/// Returns the number of bytes copied.
pub fn sink_stream<R, W>(input: &mut R, output: &mut W) -> io::Result<u64>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let mut buffer = [0u8; COPY_BUFFER_SIZE];
    let mut total = 0u64;
    loop {
        let read = match input.read(&mut buffer) {
            Ok(0) => return Ok(total),
            Ok(read) => read,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        output.write_all(&buffer[..read])?;
        total += read as u64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use sk_protocol::state_models::ProcessingState;
    use std::io::Cursor;
    use tempfile::tempdir;

    fn fixed_clock(hour: u32, second: u32) -> Clock {
        Arc::new(move || {
            Local
                .with_ymd_and_hms(2024, 1, 2, hour, 15, second)
                .single()
                .unwrap()
        })
    }

    #[test]
    fn test_sink_stream_sizes() {
        for size in [0usize, 1, 4096, 4097, 1_048_576] {
            let source: Vec<u8> = (0..size).map(|i| (i % 251) as u8).collect();
            let mut input = Cursor::new(source.clone());
            let mut output = Vec::new();

            let copied = sink_stream(&mut input, &mut output).unwrap();

            assert_eq!(copied, size as u64);
            assert_eq!(output, source, "mismatch for size {size}");
        }
    }

    #[test]
    fn test_output_file_name_uses_twelve_hour_clock() {
        let now = Local.with_ymd_and_hms(2024, 1, 2, 15, 4, 5).single().unwrap();
        assert_eq!(output_file_name(&now, "png"), "stitch_20240102_030405.png");
    }

    #[test]
    fn test_output_extension() {
        assert_eq!(output_extension(Path::new("/tmp/out.png")), Some("png".to_string()));
        assert_eq!(output_extension(Path::new("/tmp/out.")), None);
        assert_eq!(output_extension(Path::new("/tmp/out")), None);
        assert_eq!(output_extension(Path::new("/tmp.d/out")), None);
    }

    #[test]
    fn test_export_requires_completed_state() {
        let dir = tempdir().unwrap();
        let store = ProcessingStateStore::new();
        store.post_state(ProcessingState::Loading);
        let exporter = ResultExporter::new(store, Arc::new(DirectoryGallery::new(dir.path())));

        let result = exporter.export(&dir.path().join("out.png"));

        assert_eq!(result, Err(StitchError::ExportNotReady));
        assert!(!dir.path().join("images").exists());
    }

    #[test]
    fn test_export_copies_file() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("stitch_preview1.png");
        std::fs::write(&output, b"pixels").unwrap();
        let store = ProcessingStateStore::new();
        store.post_state(ProcessingState::completed(output.clone()));
        let gallery = dir.path().join("gallery");
        let exporter = ResultExporter::new(store, Arc::new(DirectoryGallery::new(&gallery)))
            .with_clock(fixed_clock(9, 30));

        let result = exporter.export(&output).unwrap();

        assert_eq!(result.display_name, "stitch_20240102_091530.png");
        let exported = MediaUri::new(result.uri).to_path().unwrap();
        assert_eq!(exported, gallery.join("images").join("stitch_20240102_091530.png"));
        assert_eq!(std::fs::read(exported).unwrap(), b"pixels");
    }

    #[test]
    fn test_export_missing_file() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("gone.png");
        let store = ProcessingStateStore::new();
        store.post_state(ProcessingState::completed(output.clone()));
        let exporter = ResultExporter::new(store, Arc::new(DirectoryGallery::new(dir.path())));

        let result = exporter.export(&output);
        assert!(matches!(result, Err(StitchError::ExportPath(_))));
    }

    #[test]
    fn test_export_without_extension() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("noext");
        std::fs::write(&output, b"pixels").unwrap();
        let store = ProcessingStateStore::new();
        store.post_state(ProcessingState::completed(output.clone()));
        let exporter = ResultExporter::new(store, Arc::new(DirectoryGallery::new(dir.path())));

        let result = exporter.export(&output);
        assert!(matches!(result, Err(StitchError::ExportPath(_))));
    }

    struct RefusingGallery;

    impl GalleryStore for RefusingGallery {
        fn insert_entry(&self, _: &MediaCollection, _: &str) -> Option<MediaUri> {
            None
        }

        fn open_output_stream(&self, _: &MediaUri, _: WriteMode) -> Option<Box<dyn Write + Send>> {
            None
        }
    }

    #[test]
    fn test_export_allocation_refused() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("out.png");
        std::fs::write(&output, b"pixels").unwrap();
        let store = ProcessingStateStore::new();
        store.post_state(ProcessingState::completed(output.clone()));
        let exporter = ResultExporter::new(store.clone(), Arc::new(RefusingGallery));

        let result = exporter.export(&output);

        assert!(matches!(result, Err(StitchError::ExportStorage(_))));
        assert_eq!(store.state(), ProcessingState::completed(output));
    }

    struct BrokenWriter;

    impl Write for BrokenWriter {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "disk full"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct BrokenGallery {
        allocated: std::sync::Mutex<Vec<String>>,
    }

    impl GalleryStore for BrokenGallery {
        fn insert_entry(&self, _: &MediaCollection, name: &str) -> Option<MediaUri> {
            self.allocated.lock().unwrap().push(name.to_string());
            Some(MediaUri::new(format!("file:///broken/{name}")))
        }

        fn open_output_stream(&self, _: &MediaUri, _: WriteMode) -> Option<Box<dyn Write + Send>> {
            Some(Box::new(BrokenWriter))
        }
    }

    #[test]
    fn test_export_write_failure_leaves_entry() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("out.png");
        std::fs::write(&output, b"pixels").unwrap();
        let store = ProcessingStateStore::new();
        store.post_state(ProcessingState::completed(output.clone()));
        let gallery = Arc::new(BrokenGallery {
            allocated: std::sync::Mutex::new(Vec::new()),
        });
        let exporter = ResultExporter::new(store, gallery.clone());

        let result = exporter.export(&output);

        assert!(matches!(result, Err(StitchError::ExportStorage(detail)) if detail == "disk full"));
        assert_eq!(gallery.allocated.lock().unwrap().len(), 1);
    }
}
