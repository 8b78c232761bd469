//! Product and version-item naming.
//!
//! Each stream names its products and version items with a pair of
//! user-configured [upon] templates (`{{ variable }}` syntax) rendered against
//! a flat map of string variables:
//!
//! | Template       | Variables                        | Example output                  |
//! |----------------|----------------------------------|---------------------------------|
//! | product name   | `series`, `arch`                 | `com.ubuntu.juju:ubuntu:amd64`  |
//! | version item   | `version`, `release`, `arch`     | `2.9.42-ubuntu-amd64`           |
//!
//! Referencing a variable that isn't provided is a render error, not an empty
//! string.
//!
//! # Example
//!
//! ```
//! use simplestreams_catalog::NameTemplate;
//!
//! let template: NameTemplate = "com.ubuntu.juju:{{ series }}:{{ arch }}".parse().unwrap();
//! let name = template.render([("series", "ubuntu"), ("arch", "amd64")]).unwrap();
//! assert_eq!(name, "com.ubuntu.juju:ubuntu:amd64");
//! ```

use crate::error::{Error, ErrorKind, Result};
use exn::ResultExt;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use upon::{Engine, Template, Value};

/// A compiled naming template.
///
/// Constructed via [`FromStr`], which compiles the template eagerly so that
/// syntax errors surface at startup rather than on the first request.
pub struct NameTemplate {
    engine: Engine<'static>,
    template: Template<'static>,
    source: String,
}
impl FromStr for NameTemplate {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let engine = Engine::new();
        let template = engine.compile(s.to_string()).or_raise(|| ErrorKind::Template)?;
        Ok(Self { engine, template, source: s.to_string() })
    }
}
impl NameTemplate {
    /// Renders the template against the given variables.
    pub fn render<'a>(&self, variables: impl IntoIterator<Item = (&'a str, &'a str)>) -> Result<String> {
        let context: BTreeMap<String, Value> =
            variables.into_iter().map(|(key, value)| (key.to_string(), Value::String(value.to_string()))).collect();
        self.template.render(&self.engine, Value::Map(context)).to_string().or_raise(|| ErrorKind::Template)
    }

    /// The template text this was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }
}
impl fmt::Debug for NameTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NameTemplate").field(&self.source).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renders_product_name() {
        let template: NameTemplate = "com.ubuntu.juju:{{ series }}:{{ arch }}".parse().unwrap();
        let name = template.render([("series", "centos"), ("arch", "arm64")]).unwrap();
        assert_eq!(name, "com.ubuntu.juju:centos:arm64");
    }

    #[test]
    fn test_renders_version_name() {
        let template: NameTemplate = "{{ version }}-{{ release }}-{{ arch }}".parse().unwrap();
        let name = template.render([("version", "3.0-rc1"), ("release", "ubuntu"), ("arch", "ppc64el")]).unwrap();
        assert_eq!(name, "3.0-rc1-ubuntu-ppc64el");
    }

    #[test]
    fn test_unused_variables_are_ignored() {
        let template: NameTemplate = "static-name".parse().unwrap();
        assert_eq!(template.render([("series", "ubuntu")]).unwrap(), "static-name");
    }

    #[test]
    fn test_missing_variable_is_an_error() {
        let template: NameTemplate = "{{ series }}:{{ flavour }}".parse().unwrap();
        let err = template.render([("series", "ubuntu")]).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Template));
    }

    #[test]
    fn test_invalid_syntax_fails_at_compile_time() {
        let err = "{{ series ".parse::<NameTemplate>().unwrap_err();
        assert!(matches!(&*err, ErrorKind::Template));
    }

    #[test]
    fn test_source_is_kept() {
        let template: NameTemplate = "{{ arch }}".parse().unwrap();
        assert_eq!(template.source(), "{{ arch }}");
        assert_eq!(format!("{template:?}"), r#"NameTemplate("{{ arch }}")"#);
    }
}
