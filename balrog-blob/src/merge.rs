//! Read-merge-write against a store guarded by data versions.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, instrument, warn};

use crate::{
    schema::SCHEMA_VERSION_FIELD,
    store::{BlobStore, WriteRequest},
    BlobConfig, BlobError, BlobResult, BlobTarget, DataVersion,
};

/// Merge `patch` into `base`.
///
/// Objects present on both sides are merged key by key; any other pairing
/// replaces the base value. Keys only present in `base` are kept.
pub fn deep_merge(base: &mut Value, patch: Value) {
    match (base, patch) {
        (Value::Object(base), Value::Object(patch)) => {
            for (key, value) in patch {
                match base.get_mut(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

/// What to do when the document does not exist yet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeMode {
    /// Treat a missing document as empty and create it
    CreateOrUpdate,
    /// The document must already exist
    Existing,
}

/// Outcome of a successful merge-write
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    pub data_version: DataVersion,
    pub attempts: u32,
    pub document: Value,
}

/// Merges locally computed fields into remote documents
pub struct BlobMerger {
    store: Arc<dyn BlobStore>,
    max_attempts: u32,
}

impl BlobMerger {
    pub fn new(store: Arc<dyn BlobStore>, config: &BlobConfig) -> Self {
        Self {
            store,
            max_attempts: config.max_write_attempts.max(1),
        }
    }

    pub fn store(&self) -> &Arc<dyn BlobStore> {
        &self.store
    }

    /// Fetch, merge `patch` in, and write back with the data version read.
    ///
    /// A stale data version restarts the whole cycle from a fresh fetch.
    #[instrument(skip(self, patch), fields(blob = %target.name))]
    pub async fn merge_and_write(
        &self,
        target: &BlobTarget,
        patch: Value,
        mode: MergeMode,
    ) -> BlobResult<MergeOutcome> {
        let mut attempt = 1;
        loop {
            let (mut document, data_version) = match self.store.fetch(&target.name).await {
                Ok(fetched) => (fetched.document, Some(fetched.data_version)),
                Err(BlobError::NotFound { .. }) if mode == MergeMode::CreateOrUpdate => {
                    debug!("No existing document, creating");
                    (Value::Object(Map::new()), None)
                }
                Err(e) => return Err(e),
            };

            check_schema(target, &document, &patch)?;
            deep_merge(&mut document, patch.clone());

            let request = WriteRequest {
                target: target.clone(),
                document: document.clone(),
                data_version,
            };

            match self.store.write(request).await {
                Ok(data_version) => {
                    debug!("Wrote data version {} after {} attempt(s)", data_version, attempt);
                    return Ok(MergeOutcome {
                        data_version,
                        attempts: attempt,
                        document,
                    });
                }
                Err(e) if e.is_retryable() && attempt < self.max_attempts => {
                    warn!(
                        "Data version conflict on attempt {}/{}, retrying: {}",
                        attempt, self.max_attempts, e
                    );
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// A document keeps the schema generation it was created with.
fn check_schema(target: &BlobTarget, current: &Value, patch: &Value) -> BlobResult<()> {
    let existing = current.get(SCHEMA_VERSION_FIELD).and_then(Value::as_u64);
    let requested = patch.get(SCHEMA_VERSION_FIELD).and_then(Value::as_u64);

    match (existing, requested) {
        (Some(existing), Some(requested)) if existing != requested => Err(BlobError::SchemaMismatch {
            name: target.name.to_string(),
            existing,
            requested,
        }),
        _ => Ok(()),
    }
}
