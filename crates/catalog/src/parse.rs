//! Artifact filename parsing.
//!
//! Artifact filenames look like `juju-2.9.42-linux-amd64.tgz`: a tool-family
//! prefix, a version, an OS token, an architecture token and an archive
//! extension. The match is anchored on the right, so the OS and architecture
//! are always the last two dash-separated tokens and the version keeps any
//! dashes of its own (`juju-3.0-rc1-linux-arm64.tgz`).

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use regex::Regex;
use std::sync::LazyLock;

const DEFAULT_PREFIX: &str = "juju";
const DEFAULT_EXTENSION: &str = "tgz";

static DEFAULT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&pattern(DEFAULT_PREFIX, DEFAULT_EXTENSION)).unwrap());

fn pattern(prefix: &str, extension: &str) -> String {
    format!(r"^{}-(.+)-([^-]+)-([^-]+)\.{}$", regex::escape(prefix), regex::escape(extension))
}

/// The `(version, os, arch)` triple embedded in an artifact filename.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParsedArtifact<'a> {
    pub version: &'a str,
    pub os: &'a str,
    pub arch: &'a str,
}

#[derive(Clone, Debug)]
pub struct FilenameParser {
    regex: Regex,
}
impl Default for FilenameParser {
    fn default() -> Self {
        Self { regex: DEFAULT_PATTERN.clone() }
    }
}
impl FilenameParser {
    /// Builds a parser for a custom prefix and extension (without the dot).
    /// Both are matched literally.
    pub fn new(prefix: &str, extension: &str) -> Result<Self> {
        let regex = Regex::new(&pattern(prefix, extension)).or_raise(|| ErrorKind::Pattern)?;
        Ok(Self { regex })
    }

    /// Extracts the artifact triple, or `None` if the name doesn't look like
    /// an artifact at all.
    pub fn parse<'a>(&self, name: &'a str) -> Option<ParsedArtifact<'a>> {
        let captures = self.regex.captures(name)?;
        Some(ParsedArtifact {
            version: captures.get(1)?.as_str(),
            os: captures.get(2)?.as_str(),
            arch: captures.get(3)?.as_str(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("2.9.42", "linux", "amd64")]
    #[case("3.0-rc1", "linux", "arm64")]
    #[case("3.1.2-beta.1", "windows", "s390x")]
    #[case("1", "centos", "ppc64el")]
    #[case("2.9.42.1-proposed-build", "linux", "riscv64")]
    fn test_recovers_components(#[case] version: &str, #[case] os: &str, #[case] arch: &str) {
        let name = format!("juju-{version}-{os}-{arch}.tgz");
        let parsed = FilenameParser::default().parse(&name).unwrap();
        assert_eq!(parsed, ParsedArtifact { version, os, arch });
    }

    #[rstest]
    #[case::missing_extension("juju-2.9.42-linux-amd64")]
    #[case::wrong_extension("juju-2.9.42-linux-amd64.tar.gz")]
    #[case::trailing_suffix("juju-2.9.42-linux-amd64.tgz.sha256")]
    #[case::wrong_prefix("jujud-2.9.42-linux-amd64.tgz")]
    #[case::leading_junk("xjuju-2.9.42-linux-amd64.tgz")]
    #[case::missing_version("juju-linux-amd64.tgz")]
    #[case::empty_arch("juju-2.9.42-linux-.tgz")]
    #[case::unrelated("README.md")]
    #[case::directory_name("released")]
    #[case::empty("")]
    fn test_rejects_non_artifacts(#[case] name: &str) {
        assert_eq!(FilenameParser::default().parse(name), None);
    }

    #[test]
    fn test_extension_is_literal() {
        // An unescaped `.` would accept any character here.
        assert_eq!(FilenameParser::default().parse("juju-2.9-linux-amd64xtgz"), None);
    }

    #[test]
    fn test_custom_prefix_and_extension() {
        let parser = FilenameParser::new("lxd+agent", "tar.xz").unwrap();
        let parsed = parser.parse("lxd+agent-5.21-linux-arm64.tar.xz").unwrap();
        assert_eq!(parsed, ParsedArtifact { version: "5.21", os: "linux", arch: "arm64" });
        assert_eq!(parser.parse("juju-5.21-linux-arm64.tgz"), None);
        assert_eq!(parser.parse("lxdxagent-5.21-linux-arm64.tar.xz"), None);
    }
}
