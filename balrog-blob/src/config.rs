use std::collections::BTreeSet;

use crate::ResolvedPlatform;

/// Configuration for blob assembly and writes
#[derive(Debug, Clone)]
pub struct BlobConfig {
    /// Suffix every generated name with `-dummy` (staging isolation)
    pub dummy: bool,

    /// Upper bound on full read-merge-write cycles when the data version
    /// keeps going stale under us
    pub max_write_attempts: u32,

    /// Channels that get their own file URLs instead of the bouncer catch-all
    pub channel_rules: ChannelRules,

    /// Build-type overrides for platforms sharing a build target
    pub build_type_rules: BuildTypeRules,
}

impl Default for BlobConfig {
    fn default() -> Self {
        Self {
            dummy: false,
            max_write_attempts: 5,
            channel_rules: ChannelRules::default(),
            build_type_rules: BuildTypeRules::default(),
        }
    }
}

impl BlobConfig {
    /// Create a new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Write to `-dummy` names
    pub fn with_dummy(mut self, dummy: bool) -> Self {
        self.dummy = dummy;
        self
    }

    /// Set the retry bound for conflicting writes (at least one attempt is always made)
    pub fn with_max_write_attempts(mut self, attempts: u32) -> Self {
        self.max_write_attempts = attempts.max(1);
        self
    }

    pub fn with_channel_rules(mut self, rules: ChannelRules) -> Self {
        self.channel_rules = rules;
        self
    }

    pub fn with_build_type_rules(mut self, rules: BuildTypeRules) -> Self {
        self.build_type_rules = rules;
        self
    }
}

/// Decides which update channels are served from the staging area
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelRules {
    exact: BTreeSet<String>,
    contains: Vec<String>,
}

impl Default for ChannelRules {
    fn default() -> Self {
        Self::new(["betatest", "esrtest"], ["localtest"])
    }
}

impl ChannelRules {
    pub fn new<E, C, S, T>(exact: E, contains: C) -> Self
    where
        E: IntoIterator<Item = S>,
        C: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        Self {
            exact: exact.into_iter().map(Into::into).collect(),
            contains: contains.into_iter().map(Into::into).collect(),
        }
    }

    /// True when `channel` needs its own staging URLs
    pub fn is_test_channel(&self, channel: &str) -> bool {
        self.exact.contains(channel) || self.contains.iter().any(|p| channel.contains(p.as_str()))
    }
}

/// Which part of a resolved platform a build-type rule matches on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformMatch {
    /// The build platform as the build system spells it
    Internal(String),
    /// The canonical update platform
    UpdatePlatform(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildTypeRule {
    pub matcher: PlatformMatch,
    pub prefix: String,
}

/// Two builds that report the same build target still need distinct blobs
/// (and rules); these rules prefix the build type to keep them apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildTypeRules {
    rules: Vec<BuildTypeRule>,
}

impl Default for BuildTypeRules {
    fn default() -> Self {
        Self {
            rules: vec![
                // JB and KK flame builds query with the same target
                BuildTypeRule {
                    matcher: PlatformMatch::UpdatePlatform("flame-kk".to_string()),
                    prefix: "kitkat".to_string(),
                },
                // api-9 and api-11 Android builds share Android_arm-eabi-gcc3
                BuildTypeRule {
                    matcher: PlatformMatch::Internal("android-api-9".to_string()),
                    prefix: "api-9".to_string(),
                },
            ],
        }
    }
}

impl BuildTypeRules {
    pub fn none() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn with_rule(mut self, matcher: PlatformMatch, prefix: impl Into<String>) -> Self {
        self.rules.push(BuildTypeRule {
            matcher,
            prefix: prefix.into(),
        });
        self
    }

    /// Build type to use in names for builds of `platform`
    pub fn build_type(&self, platform: &ResolvedPlatform, build_type: &str) -> String {
        let rule = self.rules.iter().find(|rule| match &rule.matcher {
            PlatformMatch::Internal(internal) => internal == &platform.internal,
            PlatformMatch::UpdatePlatform(update) => update == &platform.canonical,
        });

        match rule {
            Some(rule) => format!("{}-{}", rule.prefix, build_type),
            None => build_type.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PlatformTable;

    #[test]
    fn test_test_channels() {
        let rules = ChannelRules::default();
        assert!(rules.is_test_channel("betatest"));
        assert!(rules.is_test_channel("esrtest"));
        assert!(rules.is_test_channel("release-localtest"));
        assert!(rules.is_test_channel("beta-localtest-cdntest"));
        assert!(!rules.is_test_channel("release"));
        assert!(!rules.is_test_channel("beta-cdntest"));
    }

    #[test]
    fn test_build_type_overrides() {
        let table = PlatformTable::builtin();
        let rules = BuildTypeRules::default();

        let api9 = table.resolve("android-api-9").unwrap();
        assert_eq!(rules.build_type(&api9, "nightly"), "api-9-nightly");

        let flame_kk = table.resolve("flame-kk").unwrap();
        assert_eq!(rules.build_type(&flame_kk, "nightly"), "kitkat-nightly");

        let api11 = table.resolve("android-api-11").unwrap();
        assert_eq!(rules.build_type(&api11, "nightly"), "nightly");
    }

    #[test]
    fn test_max_write_attempts_floor() {
        let config = BlobConfig::new().with_max_write_attempts(0);
        assert_eq!(config.max_write_attempts, 1);
    }
}
