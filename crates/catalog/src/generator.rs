//! The generation engine shared by every request.

use crate::clock::{Clock, SystemClock};
use crate::error::{ErrorKind, Result};
use crate::parse::FilenameParser;
use crate::platform::PlatformResolver;
use crate::stream::Stream;
use exn::ResultExt;
use simplestreams_config::Config;
use simplestreams_storage::error::ErrorKind as StorageErrorKind;
use simplestreams_storage::{BackendHandle, FileInfo};
use std::ops::Deref;
use std::sync::Arc;
use tracing::debug;

/// An artifact file whose name matched the filename pattern.
#[derive(Clone, Debug)]
pub(crate) struct Artifact {
    pub file: FileInfo,
    pub file_name: String,
    pub version: String,
    pub os: String,
    pub arch: String,
}

/// Builds index and catalog documents from a storage backend.
///
/// Holds only immutable configuration, so one instance can be shared behind
/// an [`Arc`] and serve any number of generations concurrently. Nothing is
/// cached between generations: every call re-lists storage.
pub struct Generator {
    pub(crate) backend: BackendHandle,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) parser: FilenameParser,
    pub(crate) resolver: PlatformResolver,
    pub(crate) file_type: String,
    streams: Vec<Stream>,
    index_streams: Vec<String>,
}
impl Generator {
    pub fn new(config: &Config, backend: BackendHandle) -> Result<Self> {
        let parser = FilenameParser::new(&config.artifacts.prefix, &config.artifacts.extension)?;
        let streams = config.streams.iter().map(Stream::from_config).collect::<Result<Vec<_>>>()?;
        if let Some(unknown) = config.index.streams.iter().find(|key| !streams.iter().any(|s| &s.key == *key)) {
            exn::bail!(ErrorKind::Config(format!("index references unknown stream `{unknown}`")));
        }
        Ok(Self {
            backend,
            clock: Arc::new(SystemClock),
            parser,
            resolver: PlatformResolver::from_config(config),
            file_type: config.artifacts.file_type.clone(),
            streams,
            index_streams: config.index.streams.clone(),
        })
    }

    /// Replaces the system clock, e.g. with a
    /// [`FixedClock`](crate::clock::FixedClock).
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn backend(&self) -> &BackendHandle {
        &self.backend
    }

    /// Every configured stream, in declaration order.
    pub fn streams(&self) -> impl Iterator<Item = &Stream> {
        self.streams.iter()
    }

    pub fn stream(&self, key: &str) -> Option<&Stream> {
        self.streams.iter().find(|stream| stream.key == key)
    }

    pub fn stream_by_slug(&self, slug: &str) -> Option<&Stream> {
        self.streams.iter().find(|stream| stream.slug == slug)
    }

    /// The streams published by the default index.
    pub fn index_streams(&self) -> Vec<&Stream> {
        self.index_streams.iter().filter_map(|key| self.stream(key)).collect()
    }

    /// Lists the artifact files directly inside a stream's directory.
    ///
    /// A missing directory is an empty stream. Subdirectories and names that
    /// don't match the filename pattern are skipped.
    pub(crate) async fn artifacts(&self, stream: &Stream) -> Result<Vec<Artifact>> {
        let entries = match self.backend.list(stream.directory()).await {
            Ok(entries) => entries,
            Err(e) if matches!(e.deref(), StorageErrorKind::NotFound(_)) => {
                debug!(directory = %stream.directory().display(), "Stream directory does not exist");
                return Ok(Vec::new());
            },
            Err(e) => Err(e).or_raise(|| ErrorKind::Storage)?,
        };
        let mut artifacts = Vec::with_capacity(entries.len());
        for file in entries {
            if file.is_dir() {
                continue;
            }
            let Some(file_name) = file.file_name().map(str::to_string) else {
                continue;
            };
            let Some(parsed) = self.parser.parse(&file_name) else {
                debug!(file = %file_name, "Skipping file that is not an artifact");
                continue;
            };
            let (version, os, arch) = (parsed.version.to_string(), parsed.os.to_string(), parsed.arch.to_string());
            artifacts.push(Artifact { file, file_name, version, os, arch });
        }
        Ok(artifacts)
    }
}
