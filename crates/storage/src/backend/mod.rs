//! Storage backend trait and implementations.
//!
//! This module defines the `StorageBackend` trait, the read-only view of an
//! artifact directory tree that metadata generation and file downloads are
//! built on.

mod local;
#[cfg(feature = "mock")]
mod mock;

pub use self::local::LocalBackend;
#[cfg(feature = "mock")]
pub use self::mock::MockBackend;
use crate::error::Result;
use crate::file::FileInfo;
use async_trait::async_trait;
use futures::{Stream, TryStreamExt};
use std::io::Read;
use std::path::Path;
use std::pin::Pin;
use tokio::io::AsyncRead;

pub(crate) type FileInfoStream<'a> = Pin<Box<dyn Stream<Item = Result<FileInfo>> + Send + 'a>>;
pub type BoxSyncRead = Box<dyn Read + Send + 'static>;
pub type BoxAsyncRead = Pin<Box<dyn AsyncRead + Send + 'static>>;

/// Unified, read-only interface for storage backends.
///
/// All paths are relative to the storage root and are validated using
/// [`validate_path`](crate::validate_path) before use.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use simplestreams_storage::{backend::StorageBackend, error::Result};
///
/// async fn total_bytes(backend: &dyn StorageBackend) -> Result<u64> {
///     let entries = backend.list(Path::new("released")).await?;
///     Ok(entries.iter().filter(|e| !e.is_dir()).map(|e| e.size).sum())
/// }
/// ```
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Name of the configured backend (used for logging only).
    fn name(&self) -> &str;

    /// List the immediate children of a directory.
    ///
    /// Default implementation collects [`list_stream()`](Self::list_stream)
    /// into a [`Vec`].
    async fn list(&self, dir: &Path) -> Result<Vec<FileInfo>> {
        self.list_stream(dir).try_collect().await
    }

    /// Stream the immediate children of a directory, files and
    /// subdirectories alike. Listing is never recursive.
    ///
    /// A directory that does not exist yields a single
    /// [`NotFound`](crate::error::ErrorKind::NotFound) error, which callers
    /// are expected to tell apart from every other failure.
    ///
    /// # Examples
    ///
    /// ```
    /// use futures::TryStreamExt;
    /// use std::path::Path;
    /// # use simplestreams_storage::{backend::StorageBackend, error::Result};
    /// # async fn example(backend: &dyn StorageBackend) -> Result<()> {
    /// let mut stream = backend.list_stream(Path::new("released"));
    /// while let Some(info) = stream.try_next().await? {
    ///     println!("{}: {} bytes", info.path.display(), info.size);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    fn list_stream<'a>(&'a self, dir: &'a Path) -> FileInfoStream<'a>;

    /// Open a file for blocking, streaming reads.
    ///
    /// Returns a `'static` boxed [`Read`](std::io::Read) suitable for use
    /// inside [`spawn_blocking`](tokio::task::spawn_blocking). The handle is
    /// closed when the box is dropped.
    ///
    /// ```no_run
    /// use std::path::Path;
    /// # use simplestreams_storage::{backend::StorageBackend, error::Result};
    /// # async fn example(backend: &dyn StorageBackend) -> Result<()> {
    /// let mut reader = backend.reader(Path::new("released/juju-2.9.0-linux-amd64.tgz")).await?;
    /// let length = tokio::task::spawn_blocking(move || {
    ///     std::io::copy(&mut reader, &mut std::io::sink())
    /// }).await.unwrap().unwrap();
    /// # Ok(())
    /// # }
    /// ```
    async fn reader(&self, path: &Path) -> Result<BoxSyncRead>;

    /// Open a file for async streaming reads.
    async fn open(&self, path: &Path) -> Result<BoxAsyncRead>;

    /// Get file metadata without reading contents.
    ///
    /// Returns [`NotFound`](crate::error::ErrorKind::NotFound) if the file
    /// does not exist.
    async fn stat(&self, path: &Path) -> Result<FileInfo>;
}
