//! Schema 4 release blobs: `fileUrls` is keyed by channel, then by
//! `completes`/`partials`, then by source blob name.

use serde::Serialize;

use super::{ReleaseHeader, ReleaseInputs};
use crate::{BlobResult, ChannelEdges, UpdateGraphBuilder};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseBlobV4 {
    #[serde(flatten)]
    pub header: ReleaseHeader,
    pub file_urls: ChannelEdges,
}

pub fn assemble(
    header: ReleaseHeader,
    inputs: &ReleaseInputs,
    graph: &UpdateGraphBuilder,
) -> BlobResult<ReleaseBlobV4> {
    let file_urls = graph.release_channels(
        &inputs.coordinate,
        &inputs.update_channels,
        &inputs.partial_updates,
        &inputs.urls,
    )?;

    Ok(ReleaseBlobV4 { header, file_urls })
}
