//! OpenSearch implementation of the document store client.
//!
//! This module provides a concrete implementation of `DocumentStoreClient`
//! using OpenSearch (or any Elasticsearch-compatible engine) as the backend.

mod client;
mod index_config;
mod responses;

pub use client::OpenSearchClient;
pub use index_config::{get_index_settings, parse_refresh, IndexConfig, DEFAULT_INDEX_NAME};
pub use responses::{
    build_match_any_query, is_missing_document, parse_bulk_response, parse_get_response,
    parse_search_hits, parse_write_response,
};
