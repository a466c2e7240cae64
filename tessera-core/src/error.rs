//! Error types for Tessera
//!
//! Covers source acquisition, decode, and sampling misuse.

use thiserror::Error;

/// Primary error type for all Tessera operations
#[derive(Debug, Error)]
pub enum TesseraError {
    // ========== Load Errors ==========

    /// A source could not be fetched or decoded. Fatal to the load in progress.
    #[error("Resource unavailable: {resource}: {reason}")]
    ResourceUnavailable { resource: String, reason: String },

    // ========== Sampling Errors ==========

    /// Operation needs a loaded dataset
    #[error("Dataset not loaded")]
    NotLoaded,

    /// Batch size must be positive
    #[error("Invalid batch size: {batch_size}")]
    InvalidBatchSize { batch_size: usize },

    /// Example index outside the subset
    #[error("Index {index} out of range for subset of {len} examples")]
    IndexOutOfRange { index: usize, len: usize },

    // ========== Runtime Errors ==========

    /// Malformed configuration override
    #[error("Invalid configuration: {reason}")]
    Config { reason: String },

    /// Internal error
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl TesseraError {
    /// Shorthand for a [`TesseraError::ResourceUnavailable`]
    pub fn unavailable(resource: impl Into<String>, reason: impl ToString) -> Self {
        TesseraError::ResourceUnavailable {
            resource: resource.into(),
            reason: reason.to_string(),
        }
    }

    /// Returns true if retrying `load` from the unloaded state may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, TesseraError::ResourceUnavailable { .. })
    }

    /// Returns true if this error is a caller bug rather than an environment failure
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            TesseraError::NotLoaded
                | TesseraError::InvalidBatchSize { .. }
                | TesseraError::IndexOutOfRange { .. }
        )
    }
}

/// Result type alias for Tessera operations
pub type Result<T> = std::result::Result<T, TesseraError>;
