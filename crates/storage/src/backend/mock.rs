//! In-memory storage backend for testing.

use super::{BoxAsyncRead, BoxSyncRead, FileInfoStream};
use crate::StorageBackend;
use crate::error::{ErrorKind, Result};
use crate::file::FileInfo;
use crate::path::validate as validate_path;
use async_stream::stream;
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::io::{self, Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio::sync::RwLock;

/// In-memory storage backend for testing.
///
/// Files live in a map behind a [`RwLock`]; directories are implied by the
/// files beneath them, or declared explicitly with
/// [`with_dirs`](Self::with_dirs) to model empty ones. Every call to
/// [`reader`](StorageBackend::reader) or [`open`](StorageBackend::open) is
/// counted per path, so tests can assert how often a file's contents were
/// read.
///
/// # Examples
///
/// ```
/// use simplestreams_storage::backend::{MockBackend, StorageBackend};
/// use std::path::Path;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = MockBackend::with_files([
///     ("released/juju-2.9.0-linux-amd64.tgz", b"tarball"),
/// ]);
/// assert_eq!(backend.stat(Path::new("released/juju-2.9.0-linux-amd64.tgz")).await?.size, 7);
/// assert_eq!(backend.opens(Path::new("released/juju-2.9.0-linux-amd64.tgz")), 0);
/// # Ok(())
/// # }
/// ```
pub struct MockBackend {
    name: String,
    storage: RwLock<BTreeMap<PathBuf, Vec<u8>>>,
    dirs: HashSet<PathBuf>,
    failing: HashSet<PathBuf>,
    broken: HashSet<PathBuf>,
    opens: Mutex<HashMap<PathBuf, usize>>,
}

impl MockBackend {
    /// Create a mock backend pre-populated with files.
    ///
    /// Panics if any path fails validation (e.g. path traversal). If test
    /// setup is wrong, then test should not pass.
    pub fn with_files(files: impl IntoIterator<Item = (impl Into<PathBuf>, impl Into<Vec<u8>>)>) -> Self {
        let mut map = BTreeMap::new();
        for (path, data) in files {
            map.insert(Self::validated(path.into()), data.into());
        }
        Self {
            name: "mock".to_string(),
            storage: RwLock::new(map),
            dirs: HashSet::new(),
            failing: HashSet::new(),
            broken: HashSet::new(),
            opens: Mutex::new(HashMap::new()),
        }
    }

    /// Declare directories that exist even when nothing is stored in them.
    pub fn with_dirs(mut self, dirs: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        self.dirs.extend(dirs.into_iter().map(|d| Self::validated(d.into())));
        self
    }

    /// Make every listing, open or stat of these paths fail with
    /// [`PermissionDenied`](ErrorKind::PermissionDenied).
    pub fn with_failing(mut self, paths: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        self.failing.extend(paths.into_iter().map(|p| Self::validated(p.into())));
        self
    }

    /// Make the blocking [`reader`](StorageBackend::reader) of these files
    /// yield their contents and then fail with an I/O error instead of EOF.
    pub fn with_broken_reads(mut self, paths: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        self.broken.extend(paths.into_iter().map(|p| Self::validated(p.into())));
        self
    }

    /// Number of times the file's contents have been opened for reading.
    pub fn opens(&self, path: &Path) -> usize {
        let Ok(path) = validate_path(path) else {
            return 0;
        };
        self.opens.lock().map(|opens| opens.get(&path).copied().unwrap_or(0)).unwrap_or(0)
    }

    fn validated(path: PathBuf) -> PathBuf {
        match validate_path(&path) {
            Ok(validated) => validated,
            // The panic here is DELIBERATE. MockBackend is intended to be
            // used in tests; panics are expected. There is no error result.
            Err(_) => panic!("MockBackend: invalid path {}", path.display()),
        }
    }

    fn check_failing(&self, path: &Path) -> Result<()> {
        if self.failing.contains(path) {
            exn::bail!(ErrorKind::PermissionDenied(path.to_path_buf()));
        }
        Ok(())
    }

    async fn contents(&self, path: &Path) -> Result<Vec<u8>> {
        let path = validate_path(path)?;
        self.check_failing(&path)?;
        let data = self
            .storage
            .read()
            .await
            .get(&path)
            .cloned()
            .ok_or_else(|| exn::Exn::from(ErrorKind::NotFound(path.clone())))?;
        if let Ok(mut opens) = self.opens.lock() {
            *opens.entry(path).or_default() += 1;
        }
        Ok(data)
    }

    /// Snapshot the immediate children of `dir`, or `None` if the directory
    /// does not exist.
    async fn children(&self, dir: &Path) -> Option<Vec<FileInfo>> {
        let mut exists = self.dirs.contains(dir);
        let mut subdirs = BTreeSet::new();
        let mut files = Vec::new();
        let guard = self.storage.read().await;
        let nested = guard.iter().map(|(path, data)| (path, Some(data.len() as u64)));
        let declared = self.dirs.iter().map(|path| (path, None));
        for (path, size) in nested.chain(declared) {
            let Ok(relative) = path.strip_prefix(dir) else {
                continue;
            };
            let mut components = relative.components();
            let Some(first) = components.next() else {
                continue;
            };
            exists = true;
            match (components.next(), size) {
                (None, Some(size)) => files.push(FileInfo::file(path.clone(), size)),
                _ => {
                    subdirs.insert(dir.join(first));
                },
            }
        }
        exists.then(|| files.into_iter().chain(subdirs.into_iter().map(FileInfo::directory)).collect())
    }
}
impl Default for MockBackend {
    fn default() -> Self {
        let files: [(&str, &str); 0] = [];
        Self::with_files(files)
    }
}

#[async_trait]
impl StorageBackend for MockBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn list_stream<'a>(&'a self, dir: &'a Path) -> FileInfoStream<'a> {
        let dir = match validate_path(dir) {
            Ok(dir) => dir,
            Err(e) => return Box::pin(futures::stream::once(async { Err(e) })),
        };

        Box::pin(stream! {
            if let Err(e) = self.check_failing(&dir) {
                yield Err(e);
            } else {
                match self.children(&dir).await {
                    Some(entries) => for entry in entries {
                        yield Ok(entry);
                    },
                    None => yield Err(exn::Exn::from(ErrorKind::NotFound(dir.clone()))),
                }
            }
        })
    }

    async fn reader(&self, path: &Path) -> Result<BoxSyncRead> {
        let data = Cursor::new(self.contents(path).await?);
        if self.broken.contains(&validate_path(path)?) {
            return Ok(Box::new(BrokenRead(data)));
        }
        Ok(Box::new(data))
    }

    async fn open(&self, path: &Path) -> Result<BoxAsyncRead> {
        Ok(Box::pin(Cursor::new(self.contents(path).await?)))
    }

    async fn stat(&self, path: &Path) -> Result<FileInfo> {
        let path = validate_path(path)?;
        self.check_failing(&path)?;
        let guard = self.storage.read().await;
        let data = guard.get(&path).ok_or_else(|| exn::Exn::from(ErrorKind::NotFound(path.clone())))?;
        Ok(FileInfo::file(path.clone(), data.len() as u64))
    }
}

/// Reads like the wrapped cursor, but fails where EOF would be.
struct BrokenRead(Cursor<Vec<u8>>);
impl Read for BrokenRead {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.0.read(buf)? {
            0 if !buf.is_empty() => Err(io::Error::new(io::ErrorKind::UnexpectedEof, "read interrupted by mock")),
            read => Ok(read),
        }
    }
}
