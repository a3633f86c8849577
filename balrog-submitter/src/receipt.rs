use serde::{Deserialize, Serialize};

use balrog_blob::{
    schema::SCHEMA_VERSION_FIELD, BlobName, BlobTarget, DataVersion, MergeOutcome, SchemaVersion,
};

/// Receipt returned after a document was merged and written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitReceipt {
    pub name: BlobName,
    pub product: String,
    pub data_version: DataVersion,
    /// Read-merge-write cycles it took
    pub attempts: u32,
    pub schema_version: Option<SchemaVersion>,
    pub submitted_at: i64,
}

impl SubmitReceipt {
    pub fn new(target: BlobTarget, outcome: &MergeOutcome) -> Self {
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64;

        let schema_version = outcome
            .document
            .get(SCHEMA_VERSION_FIELD)
            .and_then(|v| v.as_u64())
            .and_then(|v| SchemaVersion::try_from(v).ok());

        Self {
            name: target.name,
            product: target.product,
            data_version: outcome.data_version,
            attempts: outcome.attempts,
            schema_version,
            submitted_at: now,
        }
    }
}

/// Rules moved onto a release blob
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushReceipt {
    pub mapping: BlobName,
    pub rule_ids: Vec<u64>,
}
