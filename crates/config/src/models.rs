//! Configuration sections.

use crate::defaults;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address the HTTP server binds to.
    pub listen: String,
    /// Download bandwidth limit per request, in KiB/s. `None` or `0` means
    /// unlimited.
    pub rate_limit: Option<u64>,
}
impl Default for ServerConfig {
    fn default() -> Self {
        Self { listen: "0.0.0.0:9999".to_string(), rate_limit: None }
    }
}
impl ServerConfig {
    /// Rate limit converted to bytes per second, if one applies.
    pub fn rate_limit_bytes(&self) -> Option<u64> {
        self.rate_limit.filter(|kib| *kib > 0).map(|kib| kib.saturating_mul(1024))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding one subdirectory per stream.
    pub root: PathBuf,
}
impl Default for StorageConfig {
    fn default() -> Self {
        Self { root: PathBuf::from(".") }
    }
}

/// What to do with an architecture token missing from the architecture table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownArchPolicy {
    /// Use the raw token unchanged.
    #[default]
    Passthrough,
    /// Fail the generation.
    Reject,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactConfig {
    /// Tool-family prefix every artifact filename starts with.
    pub prefix: String,
    /// Archive extension every artifact filename ends with (without the dot).
    pub extension: String,
    /// Value published in the `ftype` fields.
    pub file_type: String,
    pub unknown_arch: UnknownArchPolicy,
}
impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            prefix: "juju".to_string(),
            extension: "tgz".to_string(),
            file_type: "tar.gz".to_string(),
            unknown_arch: UnknownArchPolicy::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformConfig {
    /// OS token, as embedded in artifact filenames.
    pub os: String,
    pub series: String,
    pub release: String,
}
impl PlatformConfig {
    pub fn new(os: impl Into<String>, series: impl Into<String>, release: impl Into<String>) -> Self {
        Self { os: os.into(), series: series.into(), release: release.into() }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Route key, also the first segment of every published binary path.
    pub key: String,
    /// Storage subdirectory holding the stream's artifacts.
    pub directory: String,
    /// Globally unique content id (e.g. `com.ubuntu.juju:released:tools`).
    pub content_id: String,
    /// URL-safe name of the stream's catalog document.
    pub slug: String,
    /// Product name template over `series` and `arch`.
    pub product_name: String,
    /// Version-item name template over `version`, `release` and `arch`.
    pub version_name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Stream keys published by the default index document.
    pub streams: Vec<String>,
}
impl Default for IndexConfig {
    fn default() -> Self {
        Self { streams: vec!["released-tools".to_string()] }
    }
}

/// Complete, immutable runtime configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub artifacts: ArtifactConfig,
    /// Raw architecture token to published architecture label.
    pub architectures: BTreeMap<String, String>,
    /// Ordered platform list; the same OS may appear several times.
    pub platforms: Vec<PlatformConfig>,
    /// Ordered stream list.
    pub streams: Vec<StreamConfig>,
    pub index: IndexConfig,
}
impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            storage: StorageConfig::default(),
            artifacts: ArtifactConfig::default(),
            architectures: defaults::architectures(),
            platforms: defaults::platforms(),
            streams: defaults::streams(),
            index: IndexConfig::default(),
        }
    }
}
