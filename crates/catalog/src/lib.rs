//! Simplestreams metadata generation.
//!
//! A [`Generator`] scans each stream's storage directory, parses artifact
//! filenames into `(version, os, arch)`, fans every artifact out to the
//! platforms declared for its OS and folds the result into two documents:
//!
//! - the per-stream [`CatalogDocument`] (`streams/v1/<slug>.json`), with
//!   size and digests for every binary, from [`Generator::build_catalog`];
//! - the [`IndexDocument`] (`streams/v1/index.json`), listing product names
//!   per stream without reading file contents, from
//!   [`Generator::build_index`].
//!
//! Documents are built fresh on every call and never cached.

mod catalog;
pub mod clock;
mod digest;
pub mod error;
mod generator;
mod index;
pub mod models;
mod parse;
mod platform;
mod stream;
mod template;

pub use crate::clock::{Clock, FixedClock, SystemClock};
pub use crate::digest::Digests;
pub use crate::generator::Generator;
pub use crate::models::{Binary, CatalogDocument, IndexDocument, IndexStreamEntry, Product, VersionGroup};
pub use crate::parse::{FilenameParser, ParsedArtifact};
pub use crate::platform::{Platform, PlatformResolver};
pub use crate::stream::Stream;
pub use crate::template::NameTemplate;
