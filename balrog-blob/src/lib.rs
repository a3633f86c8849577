//! # balrog-blob: release metadata blobs for update servers
//!
//! `balrog-blob` turns already-decided build facts (versions, platforms,
//! hashes, update sources) into the blob documents an update server reads,
//! and writes them into a remote store that guards every document with a
//! data version.
//!
//! ## Key Features
//!
//! - **Stable names**: release and nightly blob names derived purely from build coordinates
//! - **Platform aliasing**: one canonical update platform per build, siblings stored as aliases
//! - **Update graph**: complete (`"*"`) and partial edges, with test-channel fan-out
//! - **Two schema generations**: v3 and v4 release blobs, never mixed within one document
//! - **Safe writes**: deep-merge into the current remote document, retrying on stale data versions
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use balrog_blob::prelude::*;
//! use serde_json::json;
//!
//! # #[tokio::main]
//! # async fn main() -> BlobResult<()> {
//! let store = Arc::new(MemoryBlobStore::new());
//! let merger = BlobMerger::new(store.clone(), &BlobConfig::default());
//!
//! let coordinate = ReleaseCoordinate::new("Firefox", "40.0", 2);
//! let name = release_blob_name(&coordinate, false);
//! assert_eq!(name.as_str(), "Firefox-40.0-build2");
//!
//! let target = BlobTarget::new(name, "Firefox");
//! merger.merge_and_write(&target, json!({"appVersion": "40.0"}), MergeMode::CreateOrUpdate).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  Orchestrators  │  ← balrog-submitter
//! ├─────────────────┤
//! │  BlobAssembler  │  ← names, platforms, update graph, schema v3/v4
//! ├─────────────────┤
//! │   BlobMerger    │  ← fetch → deep-merge → conditional write
//! ├─────────────────┤
//! │    BlobStore    │  ← transport (HTTP client, memory, ...)
//! └─────────────────┘
//! ```

pub mod assembler;
mod config;
mod error;
pub mod graph;
pub mod memory;
pub mod merge;
pub mod names;
pub mod platforms;
pub mod schema;
pub mod store;
mod types;
pub mod urls;
pub mod version;

// Re-export main types for clean API
pub use assembler::{BlobAssembler, LocaleSubmission};
pub use config::{BlobConfig, BuildTypeRule, BuildTypeRules, ChannelRules, PlatformMatch};
pub use error::{BlobError, BlobResult};
pub use graph::{
    BuildTarget, BuildUpdates, ChannelEdges, CompleteInfo, PartialInfo, PartialUpdate,
    Predecessor, SourceMap, UpdateEdge, UpdateGraphBuilder, ANY_BUILD,
};
pub use memory::MemoryBlobStore;
pub use merge::{deep_merge, BlobMerger, MergeMode, MergeOutcome};
pub use names::{
    nightly_blob_name, release_blob_name, NightlyCoordinate, NightlySuffix, ReleaseCoordinate,
};
pub use platforms::{PlatformEntry, PlatformSpec, PlatformTable, ResolvedPlatform};
pub use schema::{ReleaseInputs, SchemaVersion};
pub use store::{BlobStore, FetchedBlob, WriteRequest};
pub use types::{BlobName, BlobTarget, DataVersion};
pub use urls::UrlConfig;
pub use version::{DefaultVersionFormatter, VersionFormatter};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        nightly_blob_name, release_blob_name, BlobAssembler, BlobConfig, BlobError, BlobMerger,
        BlobName, BlobResult, BlobStore, BlobTarget, MemoryBlobStore, MergeMode,
        NightlyCoordinate, NightlySuffix, PlatformTable, ReleaseCoordinate, SchemaVersion,
    };
}
