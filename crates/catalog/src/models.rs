//! Published documents.
//!
//! Field names are the wire names. Every map is a [`BTreeMap`] so that two
//! generations over the same files serialize byte-for-byte identically.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const INDEX_FORMAT: &str = "index:1.0";
pub const PRODUCTS_FORMAT: &str = "products:1.0";
pub const CONTENT_DOWNLOAD: &str = "content-download";

/// `streams/v1/index.json`: one entry per stream, keyed by content id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDocument {
    pub index: BTreeMap<String, IndexStreamEntry>,
    pub updated: String,
    pub format: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStreamEntry {
    pub updated: String,
    pub format: String,
    pub datatype: String,
    /// Location of the stream's catalog, relative to the mirror root.
    pub path: String,
    /// Sorted and deduplicated product names.
    pub products: Vec<String>,
}

/// `streams/v1/<slug>.json`: every product of one stream.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogDocument {
    pub content_id: String,
    pub updated: String,
    pub format: String,
    pub datatype: String,
    pub products: BTreeMap<String, Product>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub datatype: String,
    pub format: String,
    pub arch: String,
    #[serde(rename = "ftype")]
    pub file_type: String,
    pub release: String,
    /// Keyed by `YYYYMMDD` date bucket.
    pub versions: BTreeMap<String, VersionGroup>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionGroup {
    pub updated: String,
    pub items: BTreeMap<String, Binary>,
}

/// One downloadable file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binary {
    /// `<stream-key>/<filename>`.
    pub path: String,
    pub size: u64,
    pub sha256: String,
    pub md5: String,
    pub arch: String,
    #[serde(rename = "ftype")]
    pub file_type: String,
    pub release: String,
    pub version: String,
}
