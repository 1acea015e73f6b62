//! Interface definitions for the document store client.
//!
//! This module defines the narrow `DocumentStoreClient` trait the facade talks
//! to, so the search backend can be swapped or faked in tests.

mod document_store_client;

pub use document_store_client::{DocumentStoreClient, UpdateAction, WriteOutcome};
