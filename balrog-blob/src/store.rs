use async_trait::async_trait;
use serde_json::Value;

use crate::{BlobName, BlobResult, BlobTarget, DataVersion};

/// Remote blob and rule storage - implemented by every transport
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Read a document and the data version it was read at.
    ///
    /// Returns `BlobError::NotFound` when no document exists under `name`.
    async fn fetch(&self, name: &BlobName) -> BlobResult<FetchedBlob>;

    /// Replace a document.
    ///
    /// `data_version` is the version the caller read, or `None` when creating.
    /// Implementations must answer `BlobError::Conflict` when it is stale.
    async fn write(&self, request: WriteRequest) -> BlobResult<DataVersion>;

    /// Point a routing rule at a blob
    async fn update_rule(&self, rule_id: u64, mapping: &BlobName) -> BlobResult<()>;
}

/// Result of a successful fetch
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedBlob {
    pub document: Value,
    pub data_version: DataVersion,
}

/// A full-document write conditioned on a data version
#[derive(Debug, Clone, PartialEq)]
pub struct WriteRequest {
    pub target: BlobTarget,
    pub document: Value,
    pub data_version: Option<DataVersion>,
}

impl WriteRequest {
    pub fn name(&self) -> &BlobName {
        &self.target.name
    }
}
