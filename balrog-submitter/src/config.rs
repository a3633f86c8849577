//! # Submitter configuration
//!
//! A plain string key/value store, layered however the embedding tool
//! likes. Keys are lower-case and dotted:
//!
//! ```rust
//! use balrog_submitter::SubmitterConfig;
//!
//! let mut config = SubmitterConfig::new();
//! config.set("dummy", "true");
//! config.set("max_write_attempts", "3");
//!
//! let blob = config.snapshot().blob_config().unwrap();
//! assert!(blob.dummy);
//! assert_eq!(blob.max_write_attempts, 3);
//! ```
//!
//! ## Environment overrides
//!
//! ```bash
//! export BALROG__MAX_WRITE_ATTEMPTS=8        # → max_write_attempts
//! export BALROG__CHANNELS__TEST_EXACT=beta   # → channels.test_exact
//! ```
//!
//! Recognised keys:
//!
//! | key                      | meaning                                        |
//! |--------------------------|------------------------------------------------|
//! | `dummy`                  | write `-dummy` blobs                           |
//! | `max_write_attempts`     | retry bound for conflicting writes             |
//! | `channels.test_exact`    | comma list of test channels                    |
//! | `channels.test_contains` | comma list of substrings marking test channels |
//! | `urls.staging_server`    | candidates host                                |
//! | `urls.bouncer_server`    | download redirector host                       |
//! | `urls.protocol`          | scheme for both                                |

use std::collections::HashMap;
use std::str::FromStr;

use balrog_blob::{BlobConfig, BlobError, BlobResult, ChannelRules, UrlConfig};

#[derive(Debug, Default)]
pub struct SubmitterConfig {
    values: HashMap<String, String>,
}

impl SubmitterConfig {
    /// Create an empty config store.
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    /// Set a configuration key to a string value.
    pub fn set<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(|s| s.as_str())
    }

    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Pull `PREFIX...` variables from the process environment.
    pub fn load_env(&mut self, prefix: &str) {
        self.load_vars(std::env::vars(), prefix);
    }

    /// Same as [`load_env`](Self::load_env) over an explicit variable list.
    pub fn load_vars<I>(&mut self, vars: I, prefix: &str)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            if let Some(stripped) = key.strip_prefix(prefix) {
                let normalized = stripped.to_lowercase().replace("__", "."); // BALROG__URLS__PROTOCOL → urls.protocol
                self.set(normalized, value);
            }
        }
    }

    pub fn snapshot(&self) -> SubmitterConfigSnapshot {
        SubmitterConfigSnapshot::new(self.values.clone())
    }
}

#[derive(Debug, Clone, Default)]
pub struct SubmitterConfigSnapshot {
    map: HashMap<String, String>,
}

impl SubmitterConfigSnapshot {
    pub(crate) fn new(map: HashMap<String, String>) -> Self {
        Self { map }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.map.get(key).map(|s| s.as_str())
    }

    /// Comma separated list, blanks dropped
    pub fn get_list(&self, key: &str) -> Option<Vec<String>> {
        self.get(key).map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect()
        })
    }

    /// Blob settings; keys that are set but unparsable are errors.
    pub fn blob_config(&self) -> BlobResult<BlobConfig> {
        let mut config = BlobConfig::default();

        if let Some(dummy) = self.parse::<bool>("dummy")? {
            config = config.with_dummy(dummy);
        }
        if let Some(attempts) = self.parse::<u32>("max_write_attempts")? {
            config = config.with_max_write_attempts(attempts);
        }

        let exact = self.get_list("channels.test_exact");
        let contains = self.get_list("channels.test_contains");
        if exact.is_some() || contains.is_some() {
            config = config.with_channel_rules(ChannelRules::new(
                exact.unwrap_or_default(),
                contains.unwrap_or_default(),
            ));
        }

        Ok(config)
    }

    /// URL settings, when both hosts are configured
    pub fn url_config(&self) -> Option<UrlConfig> {
        let staging = self.get("urls.staging_server")?;
        let bouncer = self.get("urls.bouncer_server")?;

        let urls = UrlConfig::new(staging, bouncer);
        Some(match self.get("urls.protocol") {
            Some(protocol) => urls.with_protocol(protocol),
            None => urls,
        })
    }

    fn parse<T: FromStr>(&self, key: &str) -> BlobResult<Option<T>> {
        match self.get(key) {
            None => Ok(None),
            Some(raw) => raw
                .parse::<T>()
                .map(Some)
                .map_err(|_| BlobError::invalid(format!("Config key {} has invalid value {:?}", key, raw))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_env_keys_are_normalized() {
        let mut config = SubmitterConfig::new();
        config.load_vars(
            vars(&[
                ("BALROG__MAX_WRITE_ATTEMPTS", "8"),
                ("BALROG__URLS__PROTOCOL", "https"),
                ("OTHER__DUMMY", "true"),
            ]),
            "BALROG__",
        );

        assert_eq!(config.get("max_write_attempts"), Some("8"));
        assert_eq!(config.get("urls.protocol"), Some("https"));
        assert!(!config.has("dummy"));
    }

    #[test]
    fn test_blob_config_defaults() {
        let blob = SubmitterConfig::new().snapshot().blob_config().unwrap();
        assert!(!blob.dummy);
        assert_eq!(blob.max_write_attempts, 5);
        assert!(blob.channel_rules.is_test_channel("release-localtest"));
    }

    #[test]
    fn test_blob_config_channel_override() {
        let mut config = SubmitterConfig::new();
        config.set("channels.test_exact", "beta, ,aurora");
        let blob = config.snapshot().blob_config().unwrap();

        assert!(blob.channel_rules.is_test_channel("aurora"));
        assert!(!blob.channel_rules.is_test_channel("release-localtest"));
    }

    #[test]
    fn test_invalid_value_is_reported() {
        let mut config = SubmitterConfig::new();
        config.set("max_write_attempts", "many");
        let result = config.snapshot().blob_config();
        assert!(matches!(result, Err(BlobError::Invalid { .. })));
    }

    #[test]
    fn test_url_config_needs_both_hosts() {
        let mut config = SubmitterConfig::new();
        config.set("urls.staging_server", "ftp.example.net");
        assert!(config.snapshot().url_config().is_none());

        config.set("urls.bouncer_server", "download.example.net");
        config.set("urls.protocol", "https");
        let urls = config.snapshot().url_config().unwrap();
        assert_eq!(urls.protocol, "https");
        assert_eq!(urls.bouncer_server, "download.example.net");
    }
}
