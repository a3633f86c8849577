//! Canonical blob names.
//!
//! Downstream rules and update servers index on these strings, so both
//! families must stay byte-for-byte stable:
//!
//! ```text
//! release: {product}-{version}-build{build_number}[-dummy]
//! nightly: {product}-{branch}-{build_type}-{build_id|latest}[-dummy]
//! ```

use serde::{Deserialize, Serialize};

use crate::{BlobError, BlobName, BlobResult};

/// Coordinates of one release build
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReleaseCoordinate {
    pub product: String,
    pub version: String,
    pub build_number: u32,
}

impl ReleaseCoordinate {
    pub fn new<P: Into<String>, V: Into<String>>(product: P, version: V, build_number: u32) -> Self {
        Self {
            product: product.into(),
            version: version.into(),
            build_number,
        }
    }
}

/// Last component of a nightly name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NightlySuffix {
    BuildId(String),
    Latest,
}

impl NightlySuffix {
    pub fn as_str(&self) -> &str {
        match self {
            Self::BuildId(id) => id,
            Self::Latest => "latest",
        }
    }
}

/// Coordinates of one nightly (or dep) build
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NightlyCoordinate {
    pub product: String,
    pub branch: String,
    pub build_type: String,
    pub suffix: NightlySuffix,
}

impl NightlyCoordinate {
    pub fn new<P, B, T>(product: P, branch: B, build_type: T, suffix: NightlySuffix) -> Self
    where
        P: Into<String>,
        B: Into<String>,
        T: Into<String>,
    {
        Self {
            product: product.into(),
            branch: branch.into(),
            build_type: build_type.into(),
            suffix,
        }
    }

    /// Same branch and build type, different suffix
    pub fn with_suffix(&self, suffix: NightlySuffix) -> Self {
        Self {
            suffix,
            ..self.clone()
        }
    }
}

const DUMMY_SUFFIX: &str = "-dummy";

pub fn release_blob_name(coordinate: &ReleaseCoordinate, dummy: bool) -> BlobName {
    let name = format!(
        "{}-{}-build{}",
        coordinate.product, coordinate.version, coordinate.build_number
    );
    apply_dummy(name, dummy)
}

/// Fails when the build id already ends in `-dummy`, which would make the
/// name indistinguishable from a dummy one.
pub fn nightly_blob_name(coordinate: &NightlyCoordinate, dummy: bool) -> BlobResult<BlobName> {
    let suffix = coordinate.suffix.as_str();
    if suffix.ends_with(DUMMY_SUFFIX) {
        return Err(BlobError::invalid(format!(
            "Build id {} ends in reserved suffix {}",
            suffix, DUMMY_SUFFIX
        )));
    }

    let name = format!(
        "{}-{}-{}-{}",
        coordinate.product, coordinate.branch, coordinate.build_type, suffix
    );
    Ok(apply_dummy(name, dummy))
}

fn apply_dummy(mut name: String, dummy: bool) -> BlobName {
    if dummy {
        name.push_str(DUMMY_SUFFIX);
    }
    BlobName::from_string(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn firefox_40() -> ReleaseCoordinate {
        ReleaseCoordinate::new("Firefox", "40.0", 2)
    }

    #[test]
    fn test_release_name() {
        let coordinate = ReleaseCoordinate::new("firefox", "40.0", 2);
        assert_eq!(release_blob_name(&coordinate, false).as_str(), "firefox-40.0-build2");
        assert_eq!(
            release_blob_name(&coordinate, true).as_str(),
            "firefox-40.0-build2-dummy"
        );
    }

    #[test]
    fn test_nightly_name() {
        let coordinate = NightlyCoordinate::new(
            "firefox",
            "mozilla-central",
            "nightly",
            NightlySuffix::BuildId("20150101000000".to_string()),
        );
        assert_eq!(
            nightly_blob_name(&coordinate, false).unwrap().as_str(),
            "firefox-mozilla-central-nightly-20150101000000"
        );
    }

    #[test]
    fn test_nightly_dummy_goes_last() {
        let coordinate = NightlyCoordinate::new(
            "Firefox",
            "mozilla-central",
            "nightly",
            NightlySuffix::BuildId("20150101000000".to_string()),
        );
        assert_eq!(
            nightly_blob_name(&coordinate, true).unwrap().as_str(),
            "Firefox-mozilla-central-nightly-20150101000000-dummy"
        );
        let latest = coordinate.with_suffix(NightlySuffix::Latest);
        assert_eq!(
            nightly_blob_name(&latest, true).unwrap().as_str(),
            "Firefox-mozilla-central-nightly-latest-dummy"
        );
    }

    #[test]
    fn test_names_are_deterministic() {
        assert_eq!(release_blob_name(&firefox_40(), true), release_blob_name(&firefox_40(), true));
        assert_ne!(
            release_blob_name(&firefox_40(), false),
            release_blob_name(&ReleaseCoordinate::new("Firefox", "40.0", 3), false)
        );
        assert_ne!(
            release_blob_name(&firefox_40(), false),
            release_blob_name(&firefox_40(), true)
        );
    }

    #[test]
    fn test_dummy_flag_only_comes_from_the_flag() {
        let plain = release_blob_name(&firefox_40(), false);
        assert!(!plain.as_str().ends_with("-dummy"));
        assert_eq!(
            release_blob_name(&firefox_40(), true).as_str(),
            format!("{}-dummy", plain)
        );
    }

    #[test]
    fn test_build_id_cannot_mimic_dummy() {
        let spoofed = NightlyCoordinate::new(
            "Firefox",
            "mozilla-central",
            "nightly",
            NightlySuffix::BuildId("abc-dummy".to_string()),
        );
        assert!(matches!(nightly_blob_name(&spoofed, false), Err(BlobError::Invalid { .. })));
        assert!(matches!(nightly_blob_name(&spoofed, true), Err(BlobError::Invalid { .. })));

        let real = spoofed.with_suffix(NightlySuffix::BuildId("abc".to_string()));
        assert_eq!(
            nightly_blob_name(&real, true).unwrap().as_str(),
            "Firefox-mozilla-central-nightly-abc-dummy"
        );
        assert_ne!(
            nightly_blob_name(&real, false).unwrap(),
            nightly_blob_name(&real, true).unwrap()
        );
    }
}
