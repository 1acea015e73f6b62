//! Settings read from the environment.

use std::env;
use std::time::Duration;

use document_store_repository::config::DEFAULT_MAX_BATCH_SIZE;
use document_store_repository::opensearch::{parse_refresh, IndexConfig, DEFAULT_INDEX_NAME};
use document_store_repository::DocumentStoreFacadeConfig;
use tracing::warn;

/// Default OpenSearch URL.
const DEFAULT_OPENSEARCH_URL: &str = "http://localhost:9200";

/// Default connection retry interval in seconds.
const DEFAULT_RETRY_INTERVAL_SECS: u64 = 15;

/// Connection mode for OpenSearch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionMode {
    /// Fail immediately if connection fails.
    FailFast,
    /// Retry connection at a fixed interval until successful.
    Retry,
}

impl ConnectionMode {
    /// Parse a connection mode.
    ///
    /// Valid values: "fail-fast" or "retry" (case-insensitive).
    /// Defaults to "retry" if not set or invalid.
    fn parse(value: Option<String>) -> Self {
        match value
            .unwrap_or_else(|| "retry".to_string())
            .to_lowercase()
            .as_str()
        {
            "fail-fast" | "failfast" | "fail_fast" => Self::FailFast,
            "retry" => Self::Retry,
            _ => {
                warn!("Invalid OPENSEARCH_CONNECTION_MODE, defaulting to 'retry'");
                Self::Retry
            }
        }
    }
}

/// Everything the demo needs to know about its environment.
#[derive(Debug, Clone)]
pub struct Settings {
    pub opensearch_url: String,
    pub index_config: IndexConfig,
    pub connection_mode: ConnectionMode,
    pub retry_interval: Duration,
    pub facade_config: DocumentStoreFacadeConfig,
}

impl Settings {
    /// Read settings from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `OPENSEARCH_URL`: OpenSearch server URL (default: http://localhost:9200)
    /// - `STUDENT_INDEX_NAME`: Target index (default: "students")
    /// - `OPENSEARCH_REFRESH`: Write refresh policy - "false", "true" or "wait_for" (default: false)
    /// - `OPENSEARCH_CONNECTION_MODE`: Connection mode - "fail-fast" or "retry" (default: retry)
    /// - `OPENSEARCH_RETRY_INTERVAL_SECS`: Retry interval in seconds (default: 15)
    /// - `MAX_BATCH_SIZE`: Maximum bulk submission size, 0 for unlimited (default: 1000)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read settings through `lookup`, which maps a variable name to its value.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let opensearch_url =
            lookup("OPENSEARCH_URL").unwrap_or_else(|| DEFAULT_OPENSEARCH_URL.to_string());
        let index_name =
            lookup("STUDENT_INDEX_NAME").unwrap_or_else(|| DEFAULT_INDEX_NAME.to_string());

        let mut index_config = IndexConfig::new(index_name);
        if let Some(value) = lookup("OPENSEARCH_REFRESH") {
            match parse_refresh(&value) {
                Some(refresh) => index_config = index_config.with_refresh(refresh),
                None => warn!(value = %value, "Invalid OPENSEARCH_REFRESH, defaulting to 'false'"),
            }
        }

        let retry_interval = lookup("OPENSEARCH_RETRY_INTERVAL_SECS")
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_RETRY_INTERVAL_SECS);

        let facade_config = match lookup("MAX_BATCH_SIZE").and_then(|s| s.parse::<usize>().ok()) {
            Some(0) => DocumentStoreFacadeConfig::unlimited(),
            Some(max) => DocumentStoreFacadeConfig::with_max_batch_size(max),
            None => DocumentStoreFacadeConfig::with_max_batch_size(DEFAULT_MAX_BATCH_SIZE),
        };

        Self {
            opensearch_url,
            index_config,
            connection_mode: ConnectionMode::parse(lookup("OPENSEARCH_CONNECTION_MODE")),
            retry_interval: Duration::from_secs(retry_interval),
            facade_config,
        }
    }
}
