//! # Document Store Repository
//!
//! This crate provides a narrow document-store facade over a search engine
//! index. It includes the error type, the `DocumentStoreClient` trait the
//! facade depends on, and a concrete implementation for OpenSearch.

pub mod config;
pub mod errors;
pub mod interfaces;
pub mod opensearch;
pub mod service;
pub mod types;
pub mod utils;

pub use config::DocumentStoreFacadeConfig;
pub use errors::DocumentStoreError;
pub use interfaces::{DocumentStoreClient, UpdateAction, WriteOutcome};
pub use opensearch::OpenSearchClient;
pub use service::DocumentStoreFacade;
pub use types::{BulkItemError, BulkItemResult, BulkResult, OperationResult};
pub use utils::{validate_field_name, validate_field_value, validate_fields};
