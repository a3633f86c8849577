use std::sync::Arc;

use tracing::{debug, info, instrument};

use balrog_blob::{
    BlobResult, BlobTarget, BuildTarget, CompleteInfo, LocaleSubmission, MergeMode, PartialInfo,
    ReleaseCoordinate, ReleaseInputs, SchemaVersion,
};

use crate::{PushReceipt, SubmitContext, SubmitReceipt};

/// Writes the top-level document of a release build
pub struct ReleaseCreator {
    context: Arc<SubmitContext>,
}

impl ReleaseCreator {
    pub fn new(context: Arc<SubmitContext>) -> Self {
        Self { context }
    }

    #[instrument(skip(self, inputs), fields(product = %inputs.coordinate.product, version = %inputs.coordinate.version))]
    pub async fn run(&self, inputs: &ReleaseInputs, schema: SchemaVersion) -> BlobResult<SubmitReceipt> {
        let assembler = self.context.assembler();
        let body = assembler.release_blob(schema, inputs)?;
        let target = BlobTarget::new(
            assembler.release_name(&inputs.coordinate),
            inputs.coordinate.product.clone(),
        );

        let outcome = self
            .context
            .merger()
            .merge_and_write(&target, body, MergeMode::CreateOrUpdate)
            .await?;

        info!("Created release blob {} at data version {}", target.name, outcome.data_version);
        Ok(SubmitReceipt::new(target, &outcome))
    }
}

/// One locale of one release build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseBuild {
    pub platform: String,
    pub product: String,
    pub app_version: String,
    pub version: String,
    pub build_number: u32,
    pub locale: String,
    pub hash_function: String,
    pub ext_version: String,
    pub build_id: String,
    pub completes: Vec<CompleteInfo>,
    pub partials: Vec<PartialInfo>,
}

impl ReleaseBuild {
    pub fn coordinate(&self) -> ReleaseCoordinate {
        ReleaseCoordinate::new(self.product.clone(), self.version.clone(), self.build_number)
    }
}

/// Adds a locale of a release build to the release document
pub struct ReleaseSubmitter {
    context: Arc<SubmitContext>,
}

impl ReleaseSubmitter {
    pub fn new(context: Arc<SubmitContext>) -> Self {
        Self { context }
    }

    #[instrument(skip(self, build), fields(platform = %build.platform, locale = %build.locale))]
    pub async fn run(&self, build: &ReleaseBuild, schema: SchemaVersion) -> BlobResult<SubmitReceipt> {
        let assembler = self.context.assembler();
        let platform = assembler.platforms().resolve(&build.platform)?;

        let coordinate = build.coordinate();
        let updates = assembler.graph().build_edges(
            &BuildTarget::Release(coordinate.clone()),
            &build.completes,
            &build.partials,
        )?;

        let target = BlobTarget::new(assembler.release_name(&coordinate), build.product.clone());
        let submission = LocaleSubmission {
            name: target.name.clone(),
            hash_function: build.hash_function.clone(),
            platform,
            // release documents carry their aliases from creation
            include_aliases: false,
            locale: build.locale.clone(),
            build_id: build.build_id.clone(),
            app_version: build.app_version.clone(),
            platform_version: build.ext_version.clone(),
            display_source: build.version.clone(),
            is_os_update: None,
            updates,
        };
        let body = assembler.locale_blob(schema, &submission)?;

        let outcome = self
            .context
            .merger()
            .merge_and_write(&target, body, MergeMode::CreateOrUpdate)
            .await?;

        info!(
            "Submitted {} {} to {} at data version {}",
            submission.platform.canonical, build.locale, target.name, outcome.data_version
        );
        Ok(SubmitReceipt::new(target, &outcome))
    }
}

/// Points routing rules at a release document
pub struct ReleasePusher {
    context: Arc<SubmitContext>,
}

impl ReleasePusher {
    pub fn new(context: Arc<SubmitContext>) -> Self {
        Self { context }
    }

    #[instrument(skip(self, coordinate), fields(product = %coordinate.product, version = %coordinate.version))]
    pub async fn run(&self, coordinate: &ReleaseCoordinate, rule_ids: &[u64]) -> BlobResult<PushReceipt> {
        let mapping = self.context.assembler().release_name(coordinate);

        for rule_id in rule_ids {
            self.context.store().update_rule(*rule_id, &mapping).await?;
            debug!("Rule {} now maps to {}", rule_id, mapping);
        }

        info!("Pushed {} to {} rule(s)", mapping, rule_ids.len());
        Ok(PushReceipt {
            mapping,
            rule_ids: rule_ids.to_vec(),
        })
    }
}
