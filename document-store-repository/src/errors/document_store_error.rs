//! Document store error types.
//!
//! Conflicts and missing documents are not errors here: they are reported as
//! `OperationResult` tags. This type covers failures the caller cannot treat
//! as a normal outcome.

use thiserror::Error;

/// Unified errors from document store operations.
#[derive(Debug, Clone, Error)]
pub enum DocumentStoreError {
    /// Input rejected before any request was sent (empty field set, bad field name).
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Transport failure, timeout, unreachable store or unexpected status code.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// A successful response whose body did not have the expected shape.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// One or more items of a bulk submission failed.
    #[error("Bulk submission partially failed: {failed} of {total} items rejected")]
    PartialBulkFailure { failed: usize, total: usize },

    /// Batch size exceeds configured maximum.
    #[error("Batch size {provided} exceeds maximum {max}")]
    BatchSizeExceeded { provided: usize, max: usize },
}

impl DocumentStoreError {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    /// Create a store unavailable error.
    pub fn store_unavailable(msg: impl Into<String>) -> Self {
        Self::StoreUnavailable(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Create a partial bulk failure error.
    pub fn partial_bulk_failure(failed: usize, total: usize) -> Self {
        Self::PartialBulkFailure { failed, total }
    }

    /// Create a batch size exceeded error.
    pub fn batch_size_exceeded(provided: usize, max: usize) -> Self {
        Self::BatchSizeExceeded { provided, max }
    }

    /// Returns true if the failure came from reaching or talking to the store.
    ///
    /// Parse failures count as store failures: the caller cannot act on them
    /// any differently than on a transport error.
    pub fn is_store_unavailable(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_) | Self::ParseError(_))
    }
}

impl From<opensearch::Error> for DocumentStoreError {
    fn from(err: opensearch::Error) -> Self {
        Self::StoreUnavailable(err.to_string())
    }
}

impl From<serde_json::Error> for DocumentStoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::StoreUnavailable(format!("JSON error: {}", err))
    }
}
