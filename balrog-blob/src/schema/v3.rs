//! Schema 3 release blobs.
//!
//! `fileUrls` maps each channel to one URL template; the per-source file
//! names and bouncer products live in `ftpFilenames` and `bouncerProducts`.

use std::collections::BTreeMap;

use serde::Serialize;

use super::{ReleaseHeader, ReleaseInputs};
use crate::{
    graph::ANY_BUILD,
    urls::{complete_bouncer_product, complete_mar, partial_bouncer_product, partial_mar},
    BlobResult, SourceMap, UpdateGraphBuilder,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseBlobV3 {
    #[serde(flatten)]
    pub header: ReleaseHeader,
    pub file_urls: BTreeMap<String, String>,
    pub ftp_filenames: SourceMap,
    pub bouncer_products: SourceMap,
}

pub fn assemble(
    header: ReleaseHeader,
    inputs: &ReleaseInputs,
    graph: &UpdateGraphBuilder,
) -> BlobResult<ReleaseBlobV3> {
    let coordinate = &inputs.coordinate;

    // mobile candidates are not under nightly/
    let nightly_dir = if coordinate.product.eq_ignore_ascii_case("mobile") {
        "candidates"
    } else {
        "nightly"
    };

    let mut file_urls = BTreeMap::new();
    for channel in &inputs.update_channels {
        let url = if graph.channel_rules().is_test_channel(channel) {
            inputs
                .urls
                .staging_file_url(coordinate, nightly_dir, "%FILENAME%")
        } else {
            inputs.urls.bouncer_url("%PRODUCT%")
        };
        file_urls.insert(channel.clone(), url);
    }

    let mut ftp_filenames = SourceMap::default();
    let mut bouncer_products = SourceMap::default();
    ftp_filenames
        .completes
        .insert(ANY_BUILD.to_string(), complete_mar(coordinate));
    bouncer_products
        .completes
        .insert(ANY_BUILD.to_string(), complete_bouncer_product(coordinate));

    let sources = graph.release_sources(coordinate, &inputs.partial_updates)?;
    if !sources.is_empty() {
        let mut filenames = BTreeMap::new();
        let mut products = BTreeMap::new();
        for (from, partial) in sources {
            filenames.insert(
                from.to_string(),
                partial_mar(coordinate, &partial.previous_version),
            );
            products.insert(
                from.into_string(),
                partial_bouncer_product(coordinate, &partial.previous_version),
            );
        }
        ftp_filenames.partials = Some(filenames);
        bouncer_products.partials = Some(products);
    }

    Ok(ReleaseBlobV3 {
        header,
        file_urls,
        ftp_filenames,
        bouncer_products,
    })
}
