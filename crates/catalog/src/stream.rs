use crate::error::{ErrorKind, Result};
use crate::template::NameTemplate;
use exn::ResultExt;
use simplestreams_config::StreamConfig;
use std::path::{Path, PathBuf};

/// A configured stream with its naming templates compiled.
#[derive(Debug)]
pub struct Stream {
    pub key: String,
    pub directory: PathBuf,
    pub content_id: String,
    pub slug: String,
    product_name: NameTemplate,
    version_name: NameTemplate,
}
impl Stream {
    pub fn from_config(config: &StreamConfig) -> Result<Self> {
        let compile = |source: &str| {
            source
                .parse::<NameTemplate>()
                .or_raise(|| ErrorKind::Config(format!("stream `{}` has an invalid name template", config.key)))
        };
        Ok(Self {
            key: config.key.clone(),
            directory: PathBuf::from(&config.directory),
            content_id: config.content_id.clone(),
            slug: config.slug.clone(),
            product_name: compile(&config.product_name)?,
            version_name: compile(&config.version_name)?,
        })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Where this stream's catalog is published, relative to the mirror root.
    pub fn catalog_path(&self) -> String {
        format!("streams/v1/{}.json", self.slug)
    }

    /// Published path of an artifact file in this stream.
    pub fn binary_path(&self, file_name: &str) -> String {
        format!("{}/{}", self.key, file_name)
    }

    pub fn product_name(&self, series: &str, arch: &str) -> Result<String> {
        self.product_name.render([("series", series), ("arch", arch)])
    }

    pub fn version_name(&self, version: &str, release: &str, arch: &str) -> Result<String> {
        self.version_name.render([("version", version), ("release", release), ("arch", arch)])
    }
}
