//! Persistent gallery storage.
//!
//! A gallery hands out entries in a named collection and opens them for
//! writing. Entries are referenced by URI so hosts can open them later.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const FILE_SCHEME: &str = "file://";

/// A collection within the gallery, e.g. images.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MediaCollection(String);

impl MediaCollection {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The collection stitched images are exported to.
    pub fn images() -> Self {
        Self::new("images")
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

/// Reference to one gallery entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MediaUri(String);

impl MediaUri {
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    pub fn from_path(path: &Path) -> Self {
        Self(format!("{FILE_SCHEME}{}", path.display()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The filesystem path behind a `file://` URI.
    pub fn to_path(&self) -> Option<PathBuf> {
        self.0.strip_prefix(FILE_SCHEME).map(PathBuf::from)
    }
}

impl fmt::Display for MediaUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How an entry is opened for writing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Replace any existing content.
    Truncate,
    /// Keep existing content and write after it.
    Append,
}

/// Persistent storage for exported images.
pub trait GalleryStore: Send + Sync {
    /// Allocate a new entry; `None` if the gallery refuses.
    fn insert_entry(&self, collection: &MediaCollection, display_name: &str) -> Option<MediaUri>;

    /// Open an allocated entry for writing; `None` if it cannot be opened.
    fn open_output_stream(&self, uri: &MediaUri, mode: WriteMode) -> Option<Box<dyn Write + Send>>;
}

/// A gallery backed by a directory, one subdirectory per collection.
///
/// Like a media store, inserting a name that already exists allocates a
/// distinct file (`name (1).ext`) instead of replacing the old one.
#[derive(Debug, Clone)]
pub struct DirectoryGallery {
    root: PathBuf,
}

impl DirectoryGallery {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn collection_dir(&self, collection: &MediaCollection) -> PathBuf {
        self.root.join(collection.name())
    }

    fn candidate(dir: &Path, display_name: &str, attempt: u32) -> PathBuf {
        if attempt == 0 {
            return dir.join(display_name);
        }
        let name = Path::new(display_name);
        let stem = name
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        match name.extension() {
            Some(ext) => dir.join(format!("{stem} ({attempt}).{}", ext.to_string_lossy())),
            None => dir.join(format!("{stem} ({attempt})")),
        }
    }
}

const MAX_NAME_ATTEMPTS: u32 = 100;

impl GalleryStore for DirectoryGallery {
    fn insert_entry(&self, collection: &MediaCollection, display_name: &str) -> Option<MediaUri> {
        if display_name.is_empty() || display_name.contains(['/', '\\']) {
            warn!(display_name, "Rejected gallery entry name");
            return None;
        }

        let dir = self.collection_dir(collection);
        if let Err(e) = std::fs::create_dir_all(&dir) {
            warn!(dir = %dir.display(), error = %e, "Cannot create gallery collection");
            return None;
        }

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let path = Self::candidate(&dir, display_name, attempt);
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(_) => {
                    debug!(path = %path.display(), "Gallery entry allocated");
                    return Some(MediaUri::from_path(&path));
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Cannot allocate gallery entry");
                    return None;
                }
            }
        }
        None
    }

    fn open_output_stream(&self, uri: &MediaUri, mode: WriteMode) -> Option<Box<dyn Write + Send>> {
        let path = uri.to_path()?;
        if !path.starts_with(&self.root) {
            return None;
        }
        let mut options = OpenOptions::new();
        options.write(true);
        match mode {
            WriteMode::Truncate => options.truncate(true),
            WriteMode::Append => options.append(true),
        };
        let file: File = options.open(&path).ok()?;
        Some(Box::new(file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_insert_entry_creates_file() {
        let dir = tempdir().unwrap();
        let gallery = DirectoryGallery::new(dir.path());

        let uri = gallery
            .insert_entry(&MediaCollection::images(), "stitch_1.png")
            .unwrap();

        let path = uri.to_path().unwrap();
        assert_eq!(path, dir.path().join("images").join("stitch_1.png"));
        assert!(path.exists());
        assert!(uri.as_str().starts_with("file://"));
    }

    #[test]
    fn test_insert_entry_never_replaces() {
        let dir = tempdir().unwrap();
        let gallery = DirectoryGallery::new(dir.path());
        let images = MediaCollection::images();

        let first = gallery.insert_entry(&images, "stitch_1.png").unwrap();
        let second = gallery.insert_entry(&images, "stitch_1.png").unwrap();

        assert_ne!(first, second);
        assert!(second.as_str().ends_with("stitch_1 (1).png"));
    }

    #[test]
    fn test_insert_entry_rejects_path_names() {
        let dir = tempdir().unwrap();
        let gallery = DirectoryGallery::new(dir.path());

        assert!(gallery
            .insert_entry(&MediaCollection::images(), "../escape.png")
            .is_none());
        assert!(gallery.insert_entry(&MediaCollection::images(), "").is_none());
    }

    #[test]
    fn test_open_output_stream_write_modes() {
        let dir = tempdir().unwrap();
        let gallery = DirectoryGallery::new(dir.path());
        let uri = gallery
            .insert_entry(&MediaCollection::images(), "a.png")
            .unwrap();

        gallery
            .open_output_stream(&uri, WriteMode::Truncate)
            .unwrap()
            .write_all(b"one")
            .unwrap();
        gallery
            .open_output_stream(&uri, WriteMode::Append)
            .unwrap()
            .write_all(b"two")
            .unwrap();
        assert_eq!(std::fs::read(uri.to_path().unwrap()).unwrap(), b"onetwo");

        gallery
            .open_output_stream(&uri, WriteMode::Truncate)
            .unwrap()
            .write_all(b"3")
            .unwrap();
        assert_eq!(std::fs::read(uri.to_path().unwrap()).unwrap(), b"3");
    }

    #[test]
    fn test_open_output_stream_outside_gallery() {
        let dir = tempdir().unwrap();
        let other = tempdir().unwrap();
        let gallery = DirectoryGallery::new(dir.path());
        let foreign = MediaUri::from_path(&other.path().join("x.png"));

        assert!(gallery
            .open_output_stream(&foreign, WriteMode::Truncate)
            .is_none());
    }
}
