//! Configuration loading and validation.
//!
//! Configuration is layered with [figment], later sources overriding earlier
//! ones:
//!
//! 1. Built-in defaults (the four `com.ubuntu.juju` streams and the `linux`
//!    platforms),
//! 2. An optional configuration file (TOML, YAML or JSON, chosen by
//!    extension),
//! 3. `SIMPLESTREAMS_*` environment variables, nested keys separated by `__`
//!    (e.g. `SIMPLESTREAMS_SERVER__RATE_LIMIT=512`).
//!
//! Command-line flags are applied on top by the binary. The resulting
//! [`Config`] is validated once and treated as read-only from then on.

mod defaults;
pub mod error;
mod models;

pub use crate::models::{
    ArtifactConfig, Config, IndexConfig, PlatformConfig, ServerConfig, StorageConfig, StreamConfig, UnknownArchPolicy,
};
use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

const ENV_PREFIX: &str = "SIMPLESTREAMS_";
/// Document names under `streams/v1/` that are taken by the indexes.
const RESERVED_SLUGS: [&str; 2] = ["index", "index2"];

impl Config {
    /// Location of the per-user configuration file, if it exists.
    pub fn default_file() -> Option<PathBuf> {
        ProjectDirs::from("", "", "simplestreams")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .filter(|path| path.is_file())
    }

    /// Builds the layered provider chain without extracting it.
    pub fn figment(file: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = file {
            if !path.is_file() {
                exn::bail!(ErrorKind::Invalid(format!("config file not found: {}", path.display())));
            }
            tracing::debug!(path = %path.display(), "Loading configuration file");
            figment = match path.extension().and_then(|ext| ext.to_str()) {
                Some("yaml" | "yml") => figment.merge(Yaml::file_exact(path)),
                Some("json") => figment.merge(Json::file_exact(path)),
                _ => figment.merge(Toml::file_exact(path)),
            };
        }
        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// Loads and validates the configuration.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        Self::from_figment(Self::figment(file)?)
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: Config = figment.extract().or_raise(|| ErrorKind::Load)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the invariants the rest of the system relies on: at least one
    /// stream, unique stream keys, slugs and content ids, and index streams
    /// that exist.
    pub fn validate(&self) -> Result<()> {
        if self.streams.is_empty() {
            exn::bail!(ErrorKind::Invalid("no streams configured".to_string()));
        }
        if self.artifacts.prefix.is_empty() || self.artifacts.extension.is_empty() {
            exn::bail!(ErrorKind::Invalid("artifact prefix and extension must not be empty".to_string()));
        }
        let mut keys = HashSet::new();
        let mut slugs = HashSet::new();
        let mut content_ids = HashSet::new();
        for stream in &self.streams {
            for (field, value) in [("key", &stream.key), ("slug", &stream.slug)] {
                if value.is_empty() || value.contains('/') {
                    exn::bail!(ErrorKind::Invalid(format!("stream {field} `{value}` must be a single path segment")));
                }
            }
            if RESERVED_SLUGS.contains(&stream.slug.as_str()) {
                exn::bail!(ErrorKind::Invalid(format!("stream slug `{}` is reserved for the index", stream.slug)));
            }
            let directory = Path::new(&stream.directory);
            if stream.directory.is_empty() || directory.components().any(|c| !matches!(c, Component::Normal(_))) {
                exn::bail!(ErrorKind::Invalid(format!(
                    "stream `{}` directory `{}` must be relative to the storage root",
                    stream.key, stream.directory
                )));
            }
            if !keys.insert(stream.key.as_str()) {
                exn::bail!(ErrorKind::Invalid(format!("duplicate stream key `{}`", stream.key)));
            }
            if !slugs.insert(stream.slug.as_str()) {
                exn::bail!(ErrorKind::Invalid(format!("duplicate stream slug `{}`", stream.slug)));
            }
            if !content_ids.insert(stream.content_id.as_str()) {
                exn::bail!(ErrorKind::Invalid(format!("duplicate stream content id `{}`", stream.content_id)));
            }
        }
        if let Some(unknown) = self.index.streams.iter().find(|key| !keys.contains(key.as_str())) {
            exn::bail!(ErrorKind::Invalid(format!("index references unknown stream `{unknown}`")));
        }
        Ok(())
    }

    pub fn stream(&self, key: &str) -> Option<&StreamConfig> {
        self.streams.iter().find(|stream| stream.key == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use rstest::rstest;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        config.validate().unwrap();
        assert_eq!(config.streams.len(), 4);
        assert_eq!(config.index.streams, vec!["released-tools"]);
        let released = config.stream("released-tools").unwrap();
        assert_eq!(released.directory, "released");
        assert_eq!(released.content_id, "com.ubuntu.juju:released:tools");
        assert_eq!(released.slug, "com.ubuntu.juju-released-tools");
        assert_eq!(config.platforms.iter().filter(|p| p.os == "linux").count(), 2);
        assert_eq!(config.architectures.get("ppc64le").map(String::as_str), Some("ppc64el"));
    }

    #[test]
    fn test_rate_limit_bytes() {
        let mut server = ServerConfig::default();
        assert_eq!(server.rate_limit_bytes(), None);
        server.rate_limit = Some(0);
        assert_eq!(server.rate_limit_bytes(), None);
        server.rate_limit = Some(4);
        assert_eq!(server.rate_limit_bytes(), Some(4096));
    }

    #[test]
    fn test_load_toml_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "simplestreams.toml",
                r#"
                [server]
                listen = "127.0.0.1:8080"

                [artifacts]
                unknown_arch = "reject"

                [architectures]
                loong64 = "loong64"

                [[platforms]]
                os = "windows"
                series = "win2019"
                release = "win2019"
                "#,
            )?;
            let config = Config::load(Some(Path::new("simplestreams.toml"))).unwrap();
            assert_eq!(config.server.listen, "127.0.0.1:8080");
            assert_eq!(config.artifacts.unknown_arch, UnknownArchPolicy::Reject);
            // Tables merge with the defaults, lists replace them.
            assert_eq!(config.architectures.get("loong64").map(String::as_str), Some("loong64"));
            assert_eq!(config.architectures.get("amd64").map(String::as_str), Some("amd64"));
            assert_eq!(config.platforms, vec![PlatformConfig::new("windows", "win2019", "win2019")]);
            assert_eq!(config.streams.len(), 4);
            Ok(())
        });
    }

    #[test]
    fn test_load_yaml_file() {
        Jail::expect_with(|jail| {
            jail.create_file("simplestreams.yaml", "index:\n  streams: [released-tools, proposed-tools]\n")?;
            let config = Config::load(Some(Path::new("simplestreams.yaml"))).unwrap();
            assert_eq!(config.index.streams, vec!["released-tools", "proposed-tools"]);
            Ok(())
        });
    }

    #[test]
    fn test_environment_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file("simplestreams.toml", "[server]\nrate_limit = 10\n")?;
            jail.set_env("SIMPLESTREAMS_SERVER__RATE_LIMIT", "256");
            jail.set_env("SIMPLESTREAMS_STORAGE__ROOT", "/srv/streams");
            let config = Config::load(Some(Path::new("simplestreams.toml"))).unwrap();
            assert_eq!(config.server.rate_limit, Some(256));
            assert_eq!(config.storage.root, PathBuf::from("/srv/streams"));
            Ok(())
        });
    }

    #[test]
    fn test_missing_explicit_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let err = Config::load(Some(&temp_dir.path().join("missing.toml"))).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Invalid(_)));
    }

    #[test]
    fn test_malformed_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("broken.toml");
        std::fs::write(&path, "[server\nlisten = ").unwrap();
        let err = Config::load(Some(&path)).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Load));
    }

    #[rstest]
    #[case::no_streams(|c: &mut Config| c.streams.clear())]
    #[case::duplicate_key(|c: &mut Config| c.streams[1].key = c.streams[0].key.clone())]
    #[case::duplicate_slug(|c: &mut Config| c.streams[2].slug = c.streams[0].slug.clone())]
    #[case::duplicate_content_id(|c: &mut Config| c.streams[3].content_id = c.streams[1].content_id.clone())]
    #[case::reserved_slug(|c: &mut Config| c.streams[0].slug = "index".to_string())]
    #[case::reserved_slug_full_index(|c: &mut Config| c.streams[3].slug = "index2".to_string())]
    #[case::slug_with_slash(|c: &mut Config| c.streams[0].slug = "a/b".to_string())]
    #[case::escaping_directory(|c: &mut Config| c.streams[0].directory = "../elsewhere".to_string())]
    #[case::absolute_directory(|c: &mut Config| c.streams[0].directory = "/srv".to_string())]
    #[case::unknown_index_stream(|c: &mut Config| c.index.streams.push("nightly-tools".to_string()))]
    #[case::empty_prefix(|c: &mut Config| c.artifacts.prefix.clear())]
    fn test_invalid_configurations(#[case] mutate: fn(&mut Config)) {
        let mut config = Config::default();
        mutate(&mut config);
        let err = config.validate().unwrap_err();
        assert!(matches!(&*err, ErrorKind::Invalid(_)));
    }
}
