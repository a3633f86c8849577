//! Update graph edges.
//!
//! A *complete* edge serves a full MAR and may be offered from any build
//! (`"*"`); a *partial* edge is a binary diff and is only valid from the one
//! build it was generated against.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    names::{nightly_blob_name, release_blob_name, NightlySuffix},
    urls::{complete_bouncer_product, complete_mar, partial_bouncer_product, partial_mar},
    BlobConfig, BlobError, BlobName, BlobResult, ChannelRules, NightlyCoordinate,
    ReleaseCoordinate, UrlConfig,
};

/// Catch-all source meaning "any previous build"
pub const ANY_BUILD: &str = "*";

/// Build an update is generated from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Predecessor {
    /// Previous nightly on the same branch
    BuildId(String),
    /// Previous release build
    Release { version: String, build_number: u32 },
}

/// The build whose blob the edges are written into
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildTarget {
    Nightly(NightlyCoordinate),
    Release(ReleaseCoordinate),
}

impl BuildTarget {
    pub fn name(&self, dummy: bool) -> BlobResult<BlobName> {
        match self {
            Self::Nightly(coordinate) => nightly_blob_name(coordinate, dummy),
            Self::Release(coordinate) => Ok(release_blob_name(coordinate, dummy)),
        }
    }

    /// Canonical blob name of `predecessor`, in the same family as this target
    pub fn predecessor_name(&self, predecessor: &Predecessor, dummy: bool) -> BlobResult<BlobName> {
        match (self, predecessor) {
            (Self::Nightly(coordinate), Predecessor::BuildId(build_id)) => nightly_blob_name(
                &coordinate.with_suffix(NightlySuffix::BuildId(build_id.clone())),
                dummy,
            ),
            (Self::Release(coordinate), Predecessor::Release { version, build_number }) => {
                Ok(release_blob_name(
                    &ReleaseCoordinate::new(coordinate.product.clone(), version.clone(), *build_number),
                    dummy,
                ))
            }
            (_, predecessor) => Err(BlobError::invalid(format!(
                "Predecessor {:?} does not belong to {}",
                predecessor,
                self.name(dummy)?
            ))),
        }
    }
}

/// Caller-supplied facts about a complete MAR
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompleteInfo {
    pub from: Option<Predecessor>,
    pub size: u64,
    pub hash: String,
    pub url: Option<String>,
}

/// Caller-supplied facts about a partial MAR
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialInfo {
    pub from: Option<Predecessor>,
    pub size: u64,
    pub hash: String,
    pub url: Option<String>,
}

/// One `completes`/`partials` entry of a locale
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEdge {
    pub from: String,
    pub filesize: u64,
    pub hash_value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
}

/// Edges of one locale of one build
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildUpdates {
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub completes: Vec<UpdateEdge>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub partials: Vec<UpdateEdge>,
}

/// A release this one ships partials from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialUpdate {
    pub previous_version: String,
    pub build_number: u32,
}

impl PartialUpdate {
    pub fn new<V: Into<String>>(previous_version: V, build_number: u32) -> Self {
        Self {
            previous_version: previous_version.into(),
            build_number,
        }
    }
}

/// `completes`/`partials` values keyed by source blob name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceMap {
    pub completes: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub partials: Option<BTreeMap<String, String>>,
}

/// Channel name (or `"*"`) → file URLs
pub type ChannelEdges = BTreeMap<String, SourceMap>;

/// Builds update edges for locales and channel fan-out for releases
#[derive(Debug, Clone)]
pub struct UpdateGraphBuilder {
    dummy: bool,
    channel_rules: ChannelRules,
}

impl UpdateGraphBuilder {
    pub fn new(config: &BlobConfig) -> Self {
        Self {
            dummy: config.dummy,
            channel_rules: config.channel_rules.clone(),
        }
    }

    pub fn channel_rules(&self) -> &ChannelRules {
        &self.channel_rules
    }

    /// Locale-level edges for `target`.
    ///
    /// Completes without a predecessor become `"*"`; partials must name one.
    pub fn build_edges(
        &self,
        target: &BuildTarget,
        completes: &[CompleteInfo],
        partials: &[PartialInfo],
    ) -> BlobResult<BuildUpdates> {
        let target_name = target.name(self.dummy)?;
        let mut updates = BuildUpdates::default();

        let mut seen = BTreeSet::new();
        for info in completes {
            let from = match &info.from {
                Some(predecessor) => target.predecessor_name(predecessor, self.dummy)?.into_string(),
                None => ANY_BUILD.to_string(),
            };
            claim_source(&mut seen, "completes", &from)?;
            updates.completes.push(UpdateEdge {
                from,
                filesize: info.size,
                hash_value: info.hash.clone(),
                file_url: info.url.clone(),
            });
        }

        let mut seen = BTreeSet::new();
        for info in partials {
            let predecessor = info.from.as_ref().ok_or_else(|| BlobError::MissingPredecessor {
                target: target_name.to_string(),
            })?;
            let from = target.predecessor_name(predecessor, self.dummy)?.into_string();
            claim_source(&mut seen, "partials", &from)?;
            updates.partials.push(UpdateEdge {
                from,
                filesize: info.size,
                hash_value: info.hash.clone(),
                file_url: info.url.clone(),
            });
        }

        debug!(
            "Built {} complete and {} partial edges for {}",
            updates.completes.len(),
            updates.partials.len(),
            target_name
        );

        Ok(updates)
    }

    /// Predecessor blob names of release partials, in input order
    pub fn release_sources<'a>(
        &self,
        coordinate: &ReleaseCoordinate,
        partials: &'a [PartialUpdate],
    ) -> BlobResult<Vec<(BlobName, &'a PartialUpdate)>> {
        let target = BuildTarget::Release(coordinate.clone());
        let mut seen = BTreeSet::new();
        partials
            .iter()
            .map(|partial| {
                let name = target.predecessor_name(
                    &Predecessor::Release {
                        version: partial.previous_version.clone(),
                        build_number: partial.build_number,
                    },
                    self.dummy,
                )?;
                claim_source(&mut seen, "partials", name.as_str())?;
                Ok((name, partial))
            })
            .collect()
    }

    /// Channel fan-out of a release's file URLs.
    ///
    /// Every channel served by the bouncer shares the `"*"` entry; test
    /// channels get their own entry pointing at the candidates directory.
    pub fn release_channels(
        &self,
        coordinate: &ReleaseCoordinate,
        channels: &[String],
        partials: &[PartialUpdate],
        urls: &UrlConfig,
    ) -> BlobResult<ChannelEdges> {
        let sources = self.release_sources(coordinate, partials)?;
        let product = coordinate.product.to_lowercase();

        let mut unique_channels: Vec<&str> = vec![ANY_BUILD];
        for channel in channels {
            if self.channel_rules.is_test_channel(channel) && !unique_channels.contains(&channel.as_str()) {
                unique_channels.push(channel.as_str());
            }
        }

        let mut edges = ChannelEdges::new();
        for channel in unique_channels {
            let staging = self.channel_rules.is_test_channel(channel);
            let mut entry = SourceMap::default();

            let complete_url = if staging {
                urls.staging_file_url(coordinate, "nightly", &complete_mar(coordinate))
            } else if product == "fennec" {
                urls.bouncer_url(&format!("{}-{}", product, coordinate.version))
            } else {
                urls.bouncer_url(&complete_bouncer_product(coordinate))
            };
            entry.completes.insert(ANY_BUILD.to_string(), complete_url);

            if !sources.is_empty() {
                let mut channel_partials = BTreeMap::new();
                for (from, partial) in &sources {
                    let url = if staging {
                        urls.staging_file_url(
                            coordinate,
                            "nightly",
                            &partial_mar(coordinate, &partial.previous_version),
                        )
                    } else {
                        urls.bouncer_url(&partial_bouncer_product(coordinate, &partial.previous_version))
                    };
                    channel_partials.insert(from.to_string(), url);
                }
                entry.partials = Some(channel_partials);
            }

            edges.insert(channel.to_string(), entry);
        }

        Ok(edges)
    }
}

fn claim_source(seen: &mut BTreeSet<String>, channel: &str, from: &str) -> BlobResult<()> {
    if seen.insert(from.to_string()) {
        Ok(())
    } else {
        Err(BlobError::DuplicateEdge {
            channel: channel.to_string(),
            from: from.to_string(),
        })
    }
}
