use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use tracing::debug;

use crate::{
    store::{BlobStore, FetchedBlob, WriteRequest},
    BlobError, BlobName, BlobResult, DataVersion,
};

#[derive(Debug, Clone)]
struct StoredBlob {
    product: String,
    document: Value,
    data_version: DataVersion,
}

/// In-memory store for testing and local runs
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    /// Documents indexed by blob name
    blobs: Arc<RwLock<HashMap<BlobName, StoredBlob>>>,

    /// Rule id -> mapped blob name, if any
    rules: Arc<RwLock<HashMap<u64, Option<BlobName>>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Document currently stored under `name`
    pub fn document(&self, name: &BlobName) -> Option<Value> {
        self.blobs.read().get(name).map(|blob| blob.document.clone())
    }

    pub fn product(&self, name: &BlobName) -> Option<String> {
        self.blobs.read().get(name).map(|blob| blob.product.clone())
    }

    pub fn data_version(&self, name: &BlobName) -> Option<DataVersion> {
        self.blobs.read().get(name).map(|blob| blob.data_version)
    }

    /// Blob a rule currently maps to
    pub fn rule_mapping(&self, rule_id: u64) -> Option<BlobName> {
        self.rules.read().get(&rule_id).cloned().flatten()
    }

    /// Register a rule so it can be updated
    pub fn insert_rule(&self, rule_id: u64, mapping: Option<BlobName>) {
        self.rules.write().insert(rule_id, mapping);
    }

    /// Unconditionally store `document`, as another writer would.
    ///
    /// Bumps the data version so in-flight readers go stale.
    pub fn force_write(&self, name: &BlobName, product: &str, document: Value) -> DataVersion {
        let mut blobs = self.blobs.write();
        let data_version = blobs
            .get(name)
            .map(|blob| blob.data_version.next())
            .unwrap_or_else(DataVersion::initial);
        blobs.insert(
            name.clone(),
            StoredBlob {
                product: product.to_string(),
                document,
                data_version,
            },
        );
        data_version
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn fetch(&self, name: &BlobName) -> BlobResult<FetchedBlob> {
        let blobs = self.blobs.read();
        let blob = blobs.get(name).ok_or_else(|| BlobError::not_found(name.as_str()))?;

        Ok(FetchedBlob {
            document: blob.document.clone(),
            data_version: blob.data_version,
        })
    }

    async fn write(&self, request: WriteRequest) -> BlobResult<DataVersion> {
        let mut blobs = self.blobs.write();
        let name = request.target.name;

        let data_version = match (blobs.get(&name), request.data_version) {
            (None, None) => DataVersion::initial(),
            (Some(current), Some(read)) if current.data_version == read => read.next(),
            (None, Some(_)) => return Err(BlobError::not_found(name.as_str())),
            (Some(_), _) => return Err(BlobError::conflict(name.as_str())),
        };

        debug!("Stored {} at data version {}", name, data_version);

        blobs.insert(
            name,
            StoredBlob {
                product: request.target.product,
                document: request.document,
                data_version,
            },
        );

        Ok(data_version)
    }

    async fn update_rule(&self, rule_id: u64, mapping: &BlobName) -> BlobResult<()> {
        let mut rules = self.rules.write();
        let rule = rules
            .get_mut(&rule_id)
            .ok_or_else(|| BlobError::not_found(format!("rule {}", rule_id)))?;
        *rule = Some(mapping.clone());
        Ok(())
    }
}
