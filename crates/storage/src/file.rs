//! Directory entry metadata returned by storage backends.

use std::path::PathBuf;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FileKind {
    File,
    Directory,
}

/// Metadata for a single directory entry.
///
/// Sizes come straight from the listing; nothing is read to produce them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    /// Relative path from storage root
    pub path: PathBuf,
    /// File size in bytes (zero for directories)
    pub size: u64,
    pub kind: FileKind,
}
impl FileInfo {
    pub fn file(path: impl Into<PathBuf>, size: u64) -> Self {
        Self { path: path.into(), size, kind: FileKind::File }
    }

    pub fn directory(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), size: 0, kind: FileKind::Directory }
    }

    pub fn is_dir(&self) -> bool {
        self.kind == FileKind::Directory
    }

    /// Final path component, if it is valid UTF-8.
    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name().and_then(|name| name.to_str())
    }
}
