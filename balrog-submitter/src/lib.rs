//! # balrog-submitter: publishing builds to an update server
//!
//! Thin orchestrators over [`balrog_blob`]. Each one takes the facts of a
//! finished build, assembles the partial document it contributes, and
//! merge-writes it into the shared store.
//!
//! | orchestrator       | writes                                                   |
//! |--------------------|----------------------------------------------------------|
//! | `ReleaseCreator`   | release document header, platforms and file URLs         |
//! | `ReleaseSubmitter` | one locale into the release document                     |
//! | `NightlySubmitter` | one locale into the buildID and `latest` documents       |
//! | `ReleasePusher`    | routing rules → release document                         |
//! | `BlobTweaker`      | arbitrary fields into an existing document               |
//!
//! ```rust
//! use std::sync::Arc;
//! use balrog_blob::{BlobConfig, MemoryBlobStore, ReleaseCoordinate};
//! use balrog_submitter::{ReleasePusher, SubmitContext};
//!
//! # #[tokio::main]
//! # async fn main() -> balrog_blob::BlobResult<()> {
//! let store = Arc::new(MemoryBlobStore::new());
//! store.insert_rule(1, None);
//!
//! let context = Arc::new(SubmitContext::new(store.clone(), BlobConfig::default()));
//! ReleasePusher::new(context)
//!     .run(&ReleaseCoordinate::new("Firefox", "40.0", 2), &[1])
//!     .await?;
//!
//! assert_eq!(store.rule_mapping(1).unwrap().as_str(), "Firefox-40.0-build2");
//! # Ok(())
//! # }
//! ```

mod config;
mod context;
pub mod nightly;
mod receipt;
pub mod release;
mod tweak;

pub use config::{SubmitterConfig, SubmitterConfigSnapshot};
pub use context::SubmitContext;
pub use nightly::{NightlyBuild, NightlySubmitter, DEFAULT_BUILD_TYPE};
pub use receipt::{PushReceipt, SubmitReceipt};
pub use release::{ReleaseBuild, ReleaseCreator, ReleasePusher, ReleaseSubmitter};
pub use tweak::BlobTweaker;
