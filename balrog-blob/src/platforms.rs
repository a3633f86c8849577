//! Build platform → update platform resolution.
//!
//! Several build platforms may share one update platform (the Android API
//! splits all report `Android_arm-eabi-gcc3`), and one build platform may be
//! known to clients under several update platform names. The first name in a
//! row is the canonical one; the rest are stored as aliases pointing at it.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::{BlobError, BlobResult};

/// One row of the platform table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformSpec {
    pub internal: String,
    pub update_platforms: Vec<String>,
    pub bouncer: String,
    pub ftp: String,
}

impl PlatformSpec {
    pub fn new<I, B, F>(internal: I, update_platforms: &[&str], bouncer: B, ftp: F) -> Self
    where
        I: Into<String>,
        B: Into<String>,
        F: Into<String>,
    {
        Self {
            internal: internal.into(),
            update_platforms: update_platforms.iter().map(|p| p.to_string()).collect(),
            bouncer: bouncer.into(),
            ftp: ftp.into(),
        }
    }
}

/// A stored `platforms` entry of a blob
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PlatformEntry {
    Full {
        #[serde(rename = "OS_BOUNCER")]
        os_bouncer: String,
        #[serde(rename = "OS_FTP")]
        os_ftp: String,
    },
    Alias {
        alias: String,
    },
}

/// Result of resolving a build platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPlatform {
    pub internal: String,
    pub canonical: String,
    pub bouncer: String,
    pub ftp: String,
    pub aliases: Vec<String>,
}

impl ResolvedPlatform {
    /// Canonical entry first, then one alias entry per sibling.
    pub fn entries(&self) -> Vec<(String, PlatformEntry)> {
        let mut entries = Vec::with_capacity(self.aliases.len() + 1);
        entries.push((
            self.canonical.clone(),
            PlatformEntry::Full {
                os_bouncer: self.bouncer.clone(),
                os_ftp: self.ftp.clone(),
            },
        ));
        entries.extend(self.aliases.iter().map(|alias| {
            (
                alias.clone(),
                PlatformEntry::Alias {
                    alias: self.canonical.clone(),
                },
            )
        }));
        entries
    }
}

/// Immutable lookup table from build platforms to update metadata
#[derive(Debug, Clone)]
pub struct PlatformTable {
    rows: HashMap<String, PlatformSpec>,
}

impl PlatformTable {
    /// Build a table, rejecting rows that would produce multi-hop aliases.
    pub fn new<I>(rows: I) -> BlobResult<Self>
    where
        I: IntoIterator<Item = PlatformSpec>,
    {
        let mut table = HashMap::new();
        let mut canonical_keys: BTreeMap<String, String> = BTreeMap::new();
        let mut alias_targets: BTreeMap<String, String> = BTreeMap::new();

        for row in rows {
            let (canonical, aliases) = row.update_platforms.split_first().ok_or_else(|| {
                BlobError::invalid(format!("Platform {} has no update platforms", row.internal))
            })?;

            canonical_keys.insert(canonical.clone(), row.internal.clone());
            for alias in aliases {
                if alias == canonical {
                    return Err(BlobError::invalid(format!(
                        "Platform {} aliases {} to itself",
                        row.internal, alias
                    )));
                }
                if let Some(previous) = alias_targets.insert(alias.clone(), canonical.clone()) {
                    if &previous != canonical {
                        return Err(BlobError::invalid(format!(
                            "Alias {} points at both {} and {}",
                            alias, previous, canonical
                        )));
                    }
                }
            }

            if table.insert(row.internal.clone(), row.clone()).is_some() {
                return Err(BlobError::invalid(format!(
                    "Platform {} listed twice",
                    row.internal
                )));
            }
        }

        if let Some((alias, internal)) = alias_targets
            .keys()
            .find_map(|alias| canonical_keys.get(alias).map(|internal| (alias, internal)))
        {
            return Err(BlobError::invalid(format!(
                "{} is canonical for {} and an alias elsewhere",
                alias, internal
            )));
        }

        Ok(Self { rows: table })
    }

    /// Table covering the desktop, Android and B2G build platforms
    pub fn builtin() -> Self {
        let rows = vec![
            PlatformSpec::new("linux", &["Linux_x86-gcc3"], "linux", "linux-i686"),
            PlatformSpec::new("linux64", &["Linux_x86_64-gcc3"], "linux64", "linux-x86_64"),
            PlatformSpec::new(
                "macosx64",
                &[
                    "Darwin_x86_64-gcc3-u-i386-x86_64",
                    "Darwin_x86-gcc3-u-i386-x86_64",
                    "Darwin_x86-gcc3",
                    "Darwin_x86_64-gcc3",
                ],
                "osx",
                "mac",
            ),
            PlatformSpec::new(
                "win32",
                &["WINNT_x86-msvc", "WINNT_x86-msvc-x86", "WINNT_x86-msvc-x64"],
                "win",
                "win32",
            ),
            PlatformSpec::new(
                "win64",
                &["WINNT_x86_64-msvc", "WINNT_x86_64-msvc-x64"],
                "win64",
                "win64",
            ),
            PlatformSpec::new("android", &["Android_arm-eabi-gcc3"], "android", "android"),
            PlatformSpec::new("android-api-9", &["Android_arm-eabi-gcc3"], "android", "android-api-9"),
            PlatformSpec::new("android-api-11", &["Android_arm-eabi-gcc3"], "android", "android-api-11"),
            PlatformSpec::new("android-x86", &["Android_x86-gcc3"], "android-x86", "android-x86"),
            PlatformSpec::new("emulator", &["emulator"], "emulator", "emulator"),
            PlatformSpec::new("flame", &["flame"], "flame", "flame"),
            PlatformSpec::new("flame-kk", &["flame-kk"], "flame-kk", "flame-kk"),
        ];

        Self {
            rows: rows.into_iter().map(|row| (row.internal.clone(), row)).collect(),
        }
    }

    pub fn resolve(&self, internal: &str) -> BlobResult<ResolvedPlatform> {
        let row = self
            .rows
            .get(internal)
            .ok_or_else(|| BlobError::unknown_platform(internal))?;

        // `new` rejects empty rows and `builtin` has none
        let (canonical, aliases) = row
            .update_platforms
            .split_first()
            .ok_or_else(|| BlobError::unknown_platform(internal))?;

        Ok(ResolvedPlatform {
            internal: row.internal.clone(),
            canonical: canonical.clone(),
            bouncer: row.bouncer.clone(),
            ftp: row.ftp.clone(),
            aliases: aliases.to_vec(),
        })
    }
}

impl Default for PlatformTable {
    fn default() -> Self {
        Self::builtin()
    }
}
