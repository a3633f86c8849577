use std::sync::Arc;

use tracing::{info, instrument};

use balrog_blob::{
    nightly_blob_name, BlobResult, BlobTarget, BuildTarget, CompleteInfo, LocaleSubmission,
    MergeMode, NightlyCoordinate, NightlySuffix, PartialInfo, ResolvedPlatform, SchemaVersion,
};

use crate::{SubmitContext, SubmitReceipt};

/// Build type nightlies are published under unless overridden
pub const DEFAULT_BUILD_TYPE: &str = "nightly";

/// One locale of one nightly build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NightlyBuild {
    pub platform: String,
    pub build_id: String,
    pub product: String,
    pub branch: String,
    pub build_type: String,
    pub app_version: String,
    pub locale: String,
    pub hash_function: String,
    pub ext_version: String,
    pub is_os_update: Option<bool>,
    pub completes: Vec<CompleteInfo>,
    pub partials: Vec<PartialInfo>,
}

/// Adds a nightly locale to its buildID document and to the branch's
/// `latest` document.
pub struct NightlySubmitter {
    context: Arc<SubmitContext>,
}

impl NightlySubmitter {
    pub fn new(context: Arc<SubmitContext>) -> Self {
        Self { context }
    }

    /// Coordinate of `build`, with the platform's build-type override applied
    pub fn coordinate(&self, build: &NightlyBuild) -> BlobResult<NightlyCoordinate> {
        let platform = self.context.assembler().platforms().resolve(&build.platform)?;
        Ok(self.coordinate_on(&platform, build))
    }

    fn coordinate_on(&self, platform: &ResolvedPlatform, build: &NightlyBuild) -> NightlyCoordinate {
        let build_type = self
            .context
            .config()
            .build_type_rules
            .build_type(platform, &build.build_type);

        NightlyCoordinate::new(
            build.product.clone(),
            build.branch.clone(),
            build_type,
            NightlySuffix::BuildId(build.build_id.clone()),
        )
    }

    /// Returns one receipt per written document, buildID first.
    #[instrument(skip(self, build), fields(platform = %build.platform, build_id = %build.build_id, locale = %build.locale))]
    pub async fn run(&self, build: &NightlyBuild, schema: SchemaVersion) -> BlobResult<Vec<SubmitReceipt>> {
        let assembler = self.context.assembler();
        let dummy = self.context.config().dummy;

        let platform = assembler.platforms().resolve(&build.platform)?;
        let coordinate = self.coordinate_on(&platform, build);
        let updates = assembler.graph().build_edges(
            &BuildTarget::Nightly(coordinate.clone()),
            &build.completes,
            &build.partials,
        )?;

        let names = [
            nightly_blob_name(&coordinate, dummy)?,
            nightly_blob_name(&coordinate.with_suffix(NightlySuffix::Latest), dummy)?,
        ];

        let mut receipts = Vec::with_capacity(names.len());
        for name in names {
            let target = BlobTarget::new(name, build.product.clone());
            let submission = LocaleSubmission {
                name: target.name.clone(),
                hash_function: build.hash_function.clone(),
                platform: platform.clone(),
                include_aliases: true,
                locale: build.locale.clone(),
                build_id: build.build_id.clone(),
                app_version: build.app_version.clone(),
                platform_version: build.ext_version.clone(),
                display_source: build.app_version.clone(),
                is_os_update: build.is_os_update,
                updates: updates.clone(),
            };
            let body = assembler.locale_blob(schema, &submission)?;

            let outcome = self
                .context
                .merger()
                .merge_and_write(&target, body, MergeMode::CreateOrUpdate)
                .await?;

            info!(
                "Submitted {} {} to {} at data version {}",
                platform.canonical, build.locale, target.name, outcome.data_version
            );
            receipts.push(SubmitReceipt::new(target, &outcome));
        }

        Ok(receipts)
    }
}
