use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    names::release_blob_name,
    schema::{
        join_actions, v3, v4, LocaleBlob, LocaleBlobPlatform, LocaleBuild, LocalePlatform,
        ReleaseAction, ReleaseHeader, ReleaseInputs, SchemaVersion,
    },
    BlobConfig, BlobName, BlobResult, BuildUpdates, DefaultVersionFormatter, PlatformEntry,
    PlatformTable, ReleaseCoordinate, ResolvedPlatform, UpdateGraphBuilder, VersionFormatter,
};

/// One locale of one build, ready to be turned into a partial document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleSubmission {
    pub name: BlobName,
    pub hash_function: String,
    pub platform: ResolvedPlatform,
    /// Also write `{alias: canonical}` entries for the platform's siblings
    pub include_aliases: bool,
    pub locale: String,
    pub build_id: String,
    pub app_version: String,
    pub platform_version: String,
    /// Version rendered into `displayVersion`
    pub display_source: String,
    pub is_os_update: Option<bool>,
    pub updates: BuildUpdates,
}

/// Turns build facts into blob bodies for a given schema generation
pub struct BlobAssembler {
    config: BlobConfig,
    platforms: Arc<PlatformTable>,
    formatter: Arc<dyn VersionFormatter>,
    graph: UpdateGraphBuilder,
}

impl BlobAssembler {
    /// Create an assembler with the default version formatter
    pub fn new(config: BlobConfig, platforms: PlatformTable) -> Self {
        Self {
            graph: UpdateGraphBuilder::new(&config),
            config,
            platforms: Arc::new(platforms),
            formatter: Arc::new(DefaultVersionFormatter::new()),
        }
    }

    /// Swap in another version formatter
    pub fn with_formatter<F: VersionFormatter + 'static>(mut self, formatter: F) -> Self {
        self.formatter = Arc::new(formatter);
        self
    }

    pub fn config(&self) -> &BlobConfig {
        &self.config
    }

    pub fn platforms(&self) -> &PlatformTable {
        &self.platforms
    }

    pub fn graph(&self) -> &UpdateGraphBuilder {
        &self.graph
    }

    pub fn release_name(&self, coordinate: &ReleaseCoordinate) -> BlobName {
        release_blob_name(coordinate, self.config.dummy)
    }

    /// Full release blob in the requested schema generation
    pub fn release_blob(&self, schema: SchemaVersion, inputs: &ReleaseInputs) -> BlobResult<Value> {
        let header = self.release_header(schema, inputs)?;

        let body = match schema {
            SchemaVersion::V3 => serde_json::to_value(v3::assemble(header, inputs, &self.graph)?)?,
            SchemaVersion::V4 => serde_json::to_value(v4::assemble(header, inputs, &self.graph)?)?,
        };

        debug!(
            "Assembled schema {} release blob for {}",
            schema,
            self.release_name(&inputs.coordinate)
        );

        Ok(body)
    }

    fn release_header(&self, schema: SchemaVersion, inputs: &ReleaseInputs) -> BlobResult<ReleaseHeader> {
        let coordinate = &inputs.coordinate;

        let mut platforms = BTreeMap::new();
        for platform in &inputs.en_us_platforms {
            let resolved = self.platforms.resolve(platform)?;
            for (key, entry) in resolved.entries() {
                if let Some(previous) = platforms.insert(key.clone(), entry.clone()) {
                    if previous != entry {
                        warn!(
                            "Platform {} replaces {:?} with {:?} for {}",
                            platform, previous, entry, key
                        );
                    }
                }
            }
        }

        let mut actions = Vec::new();
        if inputs.open_url.is_some() {
            actions.push(ReleaseAction::ShowUrl);
        }

        Ok(ReleaseHeader {
            name: self.release_name(coordinate),
            schema_version: schema,
            hash_function: inputs.hash_function.clone(),
            details_url: self
                .formatter
                .product_details_url(&coordinate.product, &inputs.app_version),
            app_version: inputs.app_version.clone(),
            platform_version: inputs.app_version.clone(),
            display_version: self.formatter.pretty_version(&coordinate.version),
            actions: join_actions(&actions),
            open_url: inputs.open_url.clone(),
            platforms,
        })
    }

    /// Partial document carrying one locale of one build.
    ///
    /// The locale shape is shared by both generations; only the recorded
    /// `schema_version` differs.
    pub fn locale_blob(&self, schema: SchemaVersion, submission: &LocaleSubmission) -> BlobResult<Value> {
        let platform = &submission.platform;

        let mut locales = BTreeMap::new();
        locales.insert(
            submission.locale.clone(),
            LocaleBuild {
                build_id: submission.build_id.clone(),
                is_os_update: submission.is_os_update,
                updates: submission.updates.clone(),
            },
        );

        let mut platforms = BTreeMap::new();
        platforms.insert(
            platform.canonical.clone(),
            LocaleBlobPlatform::Locales(LocalePlatform { locales }),
        );
        if submission.include_aliases {
            for alias in &platform.aliases {
                platforms.insert(
                    alias.clone(),
                    LocaleBlobPlatform::Alias(PlatformEntry::Alias {
                        alias: platform.canonical.clone(),
                    }),
                );
            }
        }

        let blob = LocaleBlob {
            name: submission.name.clone(),
            schema_version: schema,
            hash_function: submission.hash_function.clone(),
            app_version: submission.app_version.clone(),
            platform_version: submission.platform_version.clone(),
            display_version: self.formatter.pretty_version(&submission.display_source),
            platforms,
        };

        Ok(serde_json::to_value(blob)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PartialUpdate, UrlConfig};
    use serde_json::json;
    use tracing_test::traced_test;

    fn release_inputs() -> ReleaseInputs {
        ReleaseInputs {
            coordinate: ReleaseCoordinate::new("Firefox", "40.0", 2),
            app_version: "40.0".to_string(),
            hash_function: "sha512".to_string(),
            update_channels: vec![
                "release".to_string(),
                "release-localtest".to_string(),
                "release-cdntest".to_string(),
            ],
            urls: UrlConfig::new("ftp.example.net", "download.example.net"),
            en_us_platforms: vec!["linux".to_string(), "win32".to_string()],
            open_url: None,
            partial_updates: vec![PartialUpdate::new("39.0", 5)],
        }
    }

    fn assembler() -> BlobAssembler {
        BlobAssembler::new(BlobConfig::default(), PlatformTable::builtin())
    }

    #[test]
    fn test_release_header_fields() {
        let body = assembler().release_blob(SchemaVersion::V4, &release_inputs()).unwrap();

        assert_eq!(body["name"], "Firefox-40.0-build2");
        assert_eq!(body["schema_version"], 4);
        assert_eq!(body["hashFunction"], "sha512");
        assert_eq!(body["appVersion"], "40.0");
        assert_eq!(body["platformVersion"], "40.0");
        assert_eq!(body["displayVersion"], "40.0");
        assert_eq!(
            body["detailsUrl"],
            "https://www.mozilla.org/%LOCALE%/firefox/40.0/releasenotes/"
        );
        assert!(body.get("actions").is_none());
        assert!(body.get("openURL").is_none());

        assert_eq!(
            body["platforms"]["WINNT_x86-msvc"],
            json!({"OS_BOUNCER": "win", "OS_FTP": "win32"})
        );
        assert_eq!(
            body["platforms"]["WINNT_x86-msvc-x64"],
            json!({"alias": "WINNT_x86-msvc"})
        );
        assert_eq!(
            body["platforms"]["Linux_x86-gcc3"],
            json!({"OS_BOUNCER": "linux", "OS_FTP": "linux-i686"})
        );
    }

    #[test]
    fn test_open_url_adds_action() {
        let mut inputs = release_inputs();
        inputs.open_url = Some("https://example.net/whatsnew".to_string());
        let body = assembler().release_blob(SchemaVersion::V3, &inputs).unwrap();

        assert_eq!(body["actions"], "showURL");
        assert_eq!(body["openURL"], "https://example.net/whatsnew");
    }

    #[test]
    fn test_v3_and_v4_shapes_diverge() {
        let inputs = release_inputs();
        let v3 = assembler().release_blob(SchemaVersion::V3, &inputs).unwrap();
        let v4 = assembler().release_blob(SchemaVersion::V4, &inputs).unwrap();

        assert_eq!(v3["schema_version"], 3);
        assert!(v3["fileUrls"]["release"].is_string());
        assert!(v3["fileUrls"]["release-localtest"].is_string());
        assert!(v3.get("ftpFilenames").is_some());
        assert!(v3.get("bouncerProducts").is_some());
        assert_eq!(
            v3["fileUrls"]["release"],
            "http://download.example.net/?product=%PRODUCT%&os=%OS_BOUNCER%&lang=%LOCALE%"
        );
        assert_eq!(
            v3["ftpFilenames"]["partials"]["Firefox-39.0-build5"],
            "firefox-39.0-40.0.partial.mar"
        );
        assert_eq!(
            v3["bouncerProducts"]["completes"]["*"],
            "firefox-40.0-complete"
        );

        assert_eq!(v4["schema_version"], 4);
        assert!(v4.get("ftpFilenames").is_none());
        assert!(v4.get("bouncerProducts").is_none());
        assert!(v4["fileUrls"]["*"]["completes"].is_object());
        assert!(v4["fileUrls"]["release-localtest"]["partials"].is_object());
        assert!(v4["fileUrls"].get("release").is_none());
    }

    #[test]
    fn test_mobile_v3_uses_candidates_dir() {
        let mut inputs = release_inputs();
        inputs.coordinate = ReleaseCoordinate::new("Mobile", "40.0", 2);
        inputs.en_us_platforms = vec!["android".to_string()];
        let body = assembler().release_blob(SchemaVersion::V3, &inputs).unwrap();

        assert_eq!(
            body["fileUrls"]["release-localtest"],
            "http://ftp.example.net/pub/mobile/candidates/40.0-candidates/build2/update/%OS_FTP%/%LOCALE%/%FILENAME%"
        );
    }

    #[test]
    fn test_unknown_platform_fails_assembly() {
        let mut inputs = release_inputs();
        inputs.en_us_platforms.push("amiga".to_string());
        let result = assembler().release_blob(SchemaVersion::V4, &inputs);
        assert!(matches!(result, Err(crate::BlobError::UnknownPlatform { .. })));
    }

    #[test]
    #[traced_test]
    fn test_shared_update_platform_overwrite_is_logged() {
        let mut inputs = release_inputs();
        inputs.en_us_platforms = vec!["android-api-9".to_string(), "android-api-11".to_string()];
        let body = assembler().release_blob(SchemaVersion::V4, &inputs).unwrap();

        assert_eq!(body["platforms"]["Android_arm-eabi-gcc3"]["OS_FTP"], "android-api-11");
        assert!(logs_contain("Platform android-api-11 replaces"));
    }

    #[test]
    #[traced_test]
    fn test_identical_entries_are_not_logged() {
        let mut inputs = release_inputs();
        inputs.en_us_platforms = vec!["win32".to_string(), "win32".to_string()];
        assembler().release_blob(SchemaVersion::V4, &inputs).unwrap();
        assert!(!logs_contain("replaces"));
    }

    #[test]
    fn test_locale_blob_shape() {
        let assembler = assembler();
        let platform = assembler.platforms().resolve("win64").unwrap();
        let submission = LocaleSubmission {
            name: BlobName::from_string("Firefox-mozilla-central-nightly-20150101000000".to_string()),
            hash_function: "sha512".to_string(),
            platform,
            include_aliases: true,
            locale: "de".to_string(),
            build_id: "20150101000000".to_string(),
            app_version: "42.0a1".to_string(),
            platform_version: "42.0a1".to_string(),
            display_source: "42.0a1".to_string(),
            is_os_update: None,
            updates: BuildUpdates::default(),
        };

        let body = assembler.locale_blob(SchemaVersion::V3, &submission).unwrap();
        assert_eq!(body["schema_version"], 3);
        assert_eq!(body["displayVersion"], "42.0 Alpha 1");
        assert_eq!(
            body["platforms"]["WINNT_x86_64-msvc"]["locales"]["de"],
            json!({"buildID": "20150101000000"})
        );
        assert_eq!(
            body["platforms"]["WINNT_x86_64-msvc-x64"],
            json!({"alias": "WINNT_x86_64-msvc"})
        );
    }
}
