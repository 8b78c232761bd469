//! The top-level index.

use crate::clock;
use crate::error::Result;
use crate::generator::Generator;
use crate::models::{CONTENT_DOWNLOAD, INDEX_FORMAT, IndexDocument, IndexStreamEntry, PRODUCTS_FORMAT};
use crate::stream::Stream;
use futures::future::try_join_all;
use std::collections::BTreeSet;
use tracing::{info, instrument};

impl Generator {
    /// Builds an index over `streams`, naming the products each one would
    /// publish without reading any file contents.
    ///
    /// Streams are scanned concurrently. Streams whose directory is missing
    /// still get an entry, with no products.
    #[instrument(skip_all, fields(streams = streams.len()))]
    pub async fn build_index(&self, streams: &[&Stream]) -> Result<IndexDocument> {
        let updated = clock::updated(self.clock.now())?;
        let stamp = &updated;
        let scans = streams.iter().map(|stream| async move {
            let products = self.product_names(stream).await?;
            let entry = IndexStreamEntry {
                updated: stamp.clone(),
                format: PRODUCTS_FORMAT.to_string(),
                datatype: CONTENT_DOWNLOAD.to_string(),
                path: stream.catalog_path(),
                products,
            };
            Result::Ok((stream.content_id.clone(), entry))
        });
        let index = try_join_all(scans).await?.into_iter().collect();
        info!("Built index");
        Ok(IndexDocument { index, updated, format: INDEX_FORMAT.to_string() })
    }

    async fn product_names(&self, stream: &Stream) -> Result<Vec<String>> {
        let mut names = BTreeSet::new();
        for artifact in self.artifacts(stream).await? {
            let mut platforms = self.resolver.platforms_for_os(&artifact.os).peekable();
            if platforms.peek().is_none() {
                continue;
            }
            let arch = self.resolver.architecture_label(&artifact.arch)?;
            for platform in platforms {
                names.insert(stream.product_name(&platform.series, arch)?);
            }
        }
        Ok(names.into_iter().collect())
    }
}
