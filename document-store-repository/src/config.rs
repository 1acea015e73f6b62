//! Configuration types for the DocumentStoreFacade.

/// Default maximum number of documents in one bulk submission.
pub const DEFAULT_MAX_BATCH_SIZE: usize = 1000;

/// Configuration for the DocumentStoreFacade.
///
/// Controls how large a bulk submission may be before it is rejected without
/// contacting the store.
#[derive(Debug, Clone)]
pub struct DocumentStoreFacadeConfig {
    /// Maximum number of documents allowed in a single bulk submission.
    ///
    /// `None` disables the limit. Defaults to 1000.
    pub max_batch_size: Option<usize>,
}

impl Default for DocumentStoreFacadeConfig {
    fn default() -> Self {
        Self {
            max_batch_size: Some(DEFAULT_MAX_BATCH_SIZE),
        }
    }
}

impl DocumentStoreFacadeConfig {
    /// Create a config with no batch size limit.
    pub fn unlimited() -> Self {
        Self {
            max_batch_size: None,
        }
    }

    /// Create a config with a custom batch size limit.
    pub fn with_max_batch_size(max_batch_size: usize) -> Self {
        Self {
            max_batch_size: Some(max_batch_size),
        }
    }
}
