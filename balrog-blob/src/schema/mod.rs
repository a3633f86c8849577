//! Blob schema generations.
//!
//! v3 and v4 release blobs describe the same facts with incompatible field
//! shapes, so the generation is always chosen by the caller and recorded in
//! `schema_version`; it is never guessed from a document.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    BlobError, BlobName, BuildUpdates, PartialUpdate, PlatformEntry, ReleaseCoordinate, UrlConfig,
};

pub mod v3;
pub mod v4;

/// Field holding the schema generation of a document
pub const SCHEMA_VERSION_FIELD: &str = "schema_version";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub enum SchemaVersion {
    V3,
    V4,
}

impl SchemaVersion {
    pub fn as_u64(self) -> u64 {
        match self {
            Self::V3 => 3,
            Self::V4 => 4,
        }
    }
}

impl TryFrom<u64> for SchemaVersion {
    type Error = BlobError;

    fn try_from(version: u64) -> Result<Self, Self::Error> {
        match version {
            3 => Ok(Self::V3),
            4 => Ok(Self::V4),
            version => Err(BlobError::UnsupportedSchemaVersion { version }),
        }
    }
}

impl From<SchemaVersion> for u64 {
    fn from(version: SchemaVersion) -> Self {
        version.as_u64()
    }
}

impl std::fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_u64())
    }
}

/// Everything a release creator knows about a release
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseInputs {
    pub coordinate: ReleaseCoordinate,
    pub app_version: String,
    pub hash_function: String,
    pub update_channels: Vec<String>,
    pub urls: UrlConfig,
    pub en_us_platforms: Vec<String>,
    pub open_url: Option<String>,
    pub partial_updates: Vec<PartialUpdate>,
}

/// Fields shared by every release blob generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseHeader {
    pub name: BlobName,
    #[serde(rename = "schema_version")]
    pub schema_version: SchemaVersion,
    pub hash_function: String,
    pub details_url: String,
    pub app_version: String,
    pub platform_version: String,
    pub display_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actions: Option<String>,
    #[serde(rename = "openURL", skip_serializing_if = "Option::is_none")]
    pub open_url: Option<String>,
    pub platforms: BTreeMap<String, PlatformEntry>,
}

/// Action tokens requested for a release, in the order they are emitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseAction {
    ShowUrl,
}

impl ReleaseAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ShowUrl => "showURL",
        }
    }
}

/// Space-joined action list, or `None` when nothing was requested
pub fn join_actions(actions: &[ReleaseAction]) -> Option<String> {
    if actions.is_empty() {
        return None;
    }
    Some(
        actions
            .iter()
            .map(|action| action.as_str())
            .collect::<Vec<_>>()
            .join(" "),
    )
}

/// One locale of one build, as submitted by nightly and release builders
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocaleBuild {
    #[serde(rename = "buildID")]
    pub build_id: String,
    #[serde(rename = "isOSUpdate", skip_serializing_if = "Option::is_none")]
    pub is_os_update: Option<bool>,
    #[serde(flatten)]
    pub updates: BuildUpdates,
}

/// Stored shape of a build target that carries locales
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocalePlatform {
    pub locales: BTreeMap<String, LocaleBuild>,
}

/// A `platforms` value written by a locale submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum LocaleBlobPlatform {
    Locales(LocalePlatform),
    Alias(PlatformEntry),
}

/// Partial document written by a locale submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocaleBlob {
    pub name: BlobName,
    #[serde(rename = "schema_version")]
    pub schema_version: SchemaVersion,
    pub hash_function: String,
    pub app_version: String,
    pub platform_version: String,
    pub display_version: String,
    pub platforms: BTreeMap<String, LocaleBlobPlatform>,
}
