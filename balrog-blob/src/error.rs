use thiserror::Error;

/// Result type for blob operations
pub type BlobResult<T> = Result<T, BlobError>;

/// Errors that can occur while building or writing blobs
#[derive(Error, Debug)]
pub enum BlobError {
    #[error("Unknown platform: {platform}")]
    UnknownPlatform { platform: String },

    #[error("Partial update for {target} has no predecessor build")]
    MissingPredecessor { target: String },

    #[error("Duplicate update edge from {from} in {channel}")]
    DuplicateEdge { channel: String, from: String },

    #[error("Unsupported schema version: {version}")]
    UnsupportedSchemaVersion { version: u64 },

    #[error("Blob {name} has schema version {existing}, refusing to write version {requested}")]
    SchemaMismatch {
        name: String,
        existing: u64,
        requested: u64,
    },

    #[error("Data version conflict while writing {name}")]
    Conflict { name: String },

    #[error("Blob not found: {name}")]
    NotFound { name: String },

    #[error("Invalid request: {message}")]
    Invalid { message: String },

    #[error("Storage backend error: {source}")]
    Backend {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
}

impl BlobError {
    /// Create a backend error from any error type
    pub fn backend<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Backend {
            source: Box::new(error),
        }
    }

    /// Create an invalid request error
    pub fn invalid<S: Into<String>>(message: S) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found<S: Into<String>>(name: S) -> Self {
        Self::NotFound { name: name.into() }
    }

    /// Create a data version conflict error
    pub fn conflict<S: Into<String>>(name: S) -> Self {
        Self::Conflict { name: name.into() }
    }

    /// Create an unknown platform error
    pub fn unknown_platform<S: Into<String>>(platform: S) -> Self {
        Self::UnknownPlatform {
            platform: platform.into(),
        }
    }

    /// Only a stale data version is worth another read-merge-write cycle.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}
