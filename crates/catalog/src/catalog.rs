//! Per-stream product catalogs.

use crate::clock;
use crate::digest::Digests;
use crate::error::Result;
use crate::generator::Generator;
use crate::models::{Binary, CONTENT_DOWNLOAD, CatalogDocument, PRODUCTS_FORMAT, Product, VersionGroup};
use crate::stream::Stream;
use std::collections::BTreeMap;
use tracing::{debug, info, instrument};

impl Generator {
    /// Builds the full product catalog of one stream, hashing every artifact
    /// that belongs to at least one configured platform.
    ///
    /// Each file is opened at most once, however many platforms it fans out
    /// to. Any storage, digest or template failure aborts the whole catalog.
    #[instrument(skip_all, fields(stream = %stream.key))]
    pub async fn build_catalog(&self, stream: &Stream) -> Result<CatalogDocument> {
        let now = self.clock.now();
        let updated = clock::updated(now)?;
        let bucket = clock::date_bucket(now)?;

        let mut products: BTreeMap<String, Product> = BTreeMap::new();
        let mut hashed = 0usize;
        for artifact in self.artifacts(stream).await? {
            let platforms: Vec<_> = self.resolver.platforms_for_os(&artifact.os).collect();
            if platforms.is_empty() {
                debug!(file = %artifact.file_name, os = %artifact.os, "No platform for operating system");
                continue;
            }
            let arch = self.resolver.architecture_label(&artifact.arch)?;
            let digests = Digests::compute(&self.backend, &artifact.file.path).await?;
            hashed += 1;

            for platform in platforms {
                let product_name = stream.product_name(&platform.series, arch)?;
                let item_name = stream.version_name(&artifact.version, &platform.release, arch)?;
                let product = products.entry(product_name).or_insert_with(|| Product {
                    datatype: CONTENT_DOWNLOAD.to_string(),
                    format: PRODUCTS_FORMAT.to_string(),
                    arch: arch.to_string(),
                    file_type: self.file_type.clone(),
                    release: platform.release.clone(),
                    versions: BTreeMap::new(),
                });
                let group = product
                    .versions
                    .entry(bucket.clone())
                    .or_insert_with(|| VersionGroup { updated: updated.clone(), items: BTreeMap::new() });
                group.items.insert(
                    item_name,
                    Binary {
                        path: stream.binary_path(&artifact.file_name),
                        size: artifact.file.size,
                        sha256: digests.sha256.clone(),
                        md5: digests.md5.clone(),
                        arch: arch.to_string(),
                        file_type: self.file_type.clone(),
                        release: platform.release.clone(),
                        version: artifact.version.clone(),
                    },
                );
            }
        }

        info!(files = hashed, products = products.len(), "Built catalog");
        Ok(CatalogDocument {
            content_id: stream.content_id.clone(),
            updated,
            format: PRODUCTS_FORMAT.to_string(),
            datatype: CONTENT_DOWNLOAD.to_string(),
            products,
        })
    }
}
