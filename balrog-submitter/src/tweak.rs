use std::sync::Arc;

use serde_json::Value;
use tracing::{info, instrument};

use balrog_blob::{BlobName, BlobResult, BlobTarget, MergeMode};

use crate::{SubmitContext, SubmitReceipt};

/// Ad-hoc edits to an existing document
pub struct BlobTweaker {
    context: Arc<SubmitContext>,
}

impl BlobTweaker {
    pub fn new(context: Arc<SubmitContext>) -> Self {
        Self { context }
    }

    /// Deep-merge `patch` into `name`, which must already exist.
    ///
    /// The product is the name's first dash-separated component.
    #[instrument(skip(self, patch), fields(blob = %name))]
    pub async fn run(&self, name: &BlobName, patch: Value) -> BlobResult<SubmitReceipt> {
        let product = name.as_str().split('-').next().unwrap_or(name.as_str());
        let target = BlobTarget::new(name.clone(), product);

        let outcome = self
            .context
            .merger()
            .merge_and_write(&target, patch, MergeMode::Existing)
            .await?;

        info!("Tweaked {} at data version {}", target.name, outcome.data_version);
        Ok(SubmitReceipt::new(target, &outcome))
    }
}
