//! Storage errors

/// Errors raised by backends and the JSON adapter
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The write would exceed the backend's byte quota
    #[error("storage quota exceeded writing {key}: {needed} bytes needed, limit {limit}")]
    QuotaExceeded {
        /// Key being written
        key: String,
        /// Total bytes after the write
        needed: usize,
        /// Configured limit
        limit: usize,
    },

    /// Backing file could not be read or written
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),

    /// Value could not be serialised
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Record failed the structural check and was not written
    #[error("invalid record structure for {key}")]
    Rejected {
        /// Key that was not written
        key: String,
    },
}

impl StoreError {
    /// Whether the failure came from the record rather than the backend
    #[inline]
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(self, StoreError::Rejected { .. })
    }
}

/// Result alias for storage operations
pub type Result<T> = std::result::Result<T, StoreError>;
