//! Content digests published alongside every binary.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use md5::Md5;
use sha2::{Digest, Sha256};
use simplestreams_storage::BackendHandle;
use std::io::{self, Read};
use std::path::Path;

const BUFFER_SIZE: usize = 64 * 1024;

/// Lowercase hex SHA-256 and MD5 of one file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Digests {
    pub sha256: String,
    pub md5: String,
}
impl Digests {
    /// Hashes everything `reader` yields in a single sequential pass, feeding
    /// both hashers from the same buffer.
    pub fn from_reader(mut reader: impl Read) -> io::Result<Self> {
        let mut sha256 = Sha256::new();
        let mut md5 = Md5::new();
        let mut buffer = vec![0u8; BUFFER_SIZE];
        loop {
            let read = match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(read) => read,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            sha256.update(&buffer[..read]);
            md5.update(&buffer[..read]);
        }
        Ok(Self { sha256: hex::encode(sha256.finalize()), md5: hex::encode(md5.finalize()) })
    }

    /// Opens `path` once and hashes it on the blocking pool.
    pub async fn compute(backend: &BackendHandle, path: &Path) -> Result<Self> {
        let reader = backend.reader(path).await.or_raise(|| ErrorKind::Storage)?;
        tokio::task::spawn_blocking(move || Self::from_reader(reader))
            .await
            .or_raise(|| ErrorKind::Digest)?
            .or_raise(|| ErrorKind::Digest)
    }
}
