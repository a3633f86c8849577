use serde::{Deserialize, Serialize};

/// Canonical key of one blob in the remote store
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlobName(String);

impl BlobName {
    /// Wrap an already-canonical name (e.g. one read back from a rule)
    pub fn from_string(name: String) -> Self {
        Self(name)
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for BlobName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for BlobName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Opaque data-version token handed out with every fetched document
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataVersion(pub u64);

impl DataVersion {
    pub fn initial() -> Self {
        Self(1)
    }

    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl std::fmt::Display for DataVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Store-side identity of a document: its name plus the product it belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobTarget {
    pub name: BlobName,
    pub product: String,
}

impl BlobTarget {
    pub fn new<P: Into<String>>(name: BlobName, product: P) -> Self {
        Self {
            name,
            product: product.into(),
        }
    }
}
