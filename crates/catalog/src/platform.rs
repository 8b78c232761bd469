//! Platform and architecture resolution.

use crate::error::{ErrorKind, Result};
use simplestreams_config::{Config, UnknownArchPolicy};
use std::collections::BTreeMap;

pub use simplestreams_config::PlatformConfig as Platform;

/// Maps OS tokens onto the configured platforms and raw architecture tokens
/// onto published architecture labels.
#[derive(Clone, Debug)]
pub struct PlatformResolver {
    platforms: Vec<Platform>,
    architectures: BTreeMap<String, String>,
    unknown: UnknownArchPolicy,
}
impl PlatformResolver {
    pub fn new(
        platforms: impl IntoIterator<Item = Platform>,
        architectures: BTreeMap<String, String>,
        unknown: UnknownArchPolicy,
    ) -> Self {
        Self { platforms: platforms.into_iter().collect(), architectures, unknown }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.platforms.iter().cloned(), config.architectures.clone(), config.artifacts.unknown_arch)
    }

    /// Translates a raw architecture token (`ppc64le`) into the label used in
    /// product names (`ppc64el`).
    ///
    /// Tokens missing from the table are returned unchanged under
    /// [`UnknownArchPolicy::Passthrough`] and raise
    /// [`ErrorKind::UnknownArchitecture`] under [`UnknownArchPolicy::Reject`].
    pub fn architecture_label<'a>(&'a self, raw: &'a str) -> Result<&'a str> {
        match (self.architectures.get(raw), self.unknown) {
            (Some(label), _) => Ok(label.as_str()),
            (None, UnknownArchPolicy::Passthrough) => Ok(raw),
            (None, UnknownArchPolicy::Reject) => exn::bail!(ErrorKind::UnknownArchitecture(raw.to_string())),
        }
    }

    /// Every platform declared for `os`, in declaration order.
    pub fn platforms_for_os<'a>(&'a self, os: &'a str) -> impl Iterator<Item = &'a Platform> + 'a {
        self.platforms.iter().filter(move |platform| platform.os == os)
    }
}
