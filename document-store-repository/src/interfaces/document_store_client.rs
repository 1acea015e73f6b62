//! Document store client trait definition.
//!
//! This module defines the narrow capability set the facade needs from a
//! search backend, allowing different implementations (OpenSearch,
//! Elasticsearch, in-memory fakes for tests).

use async_trait::async_trait;
use document_store_shared::{Document, Fields, SearchCriteria};

use crate::errors::DocumentStoreError;
use crate::types::BulkItemResult;

/// Outcome of a single-document write as reported by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// A new document was written under `id`.
    Created { id: String },
    /// An existing document was modified (or left as-is by a no-op update).
    Updated { id: String },
    /// The document was removed.
    Deleted { id: String },
    /// The target document does not exist.
    NotFound,
    /// The write collided with an existing id or a concurrent change.
    Conflict,
}

/// A partial modification applied by `update_document`.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateAction {
    /// A server-side script run against the stored source.
    Script { source: String, params: Fields },
    /// Fields merged into the stored source.
    Doc(Fields),
    /// `update` merged into the stored source if it exists, otherwise a new
    /// document created from `insert`.
    Upsert { insert: Fields, update: Fields },
}

/// Abstracts the search engine the facade talks to.
///
/// Implementations are injected into `DocumentStoreFacade`, which keeps the
/// facade testable against an in-memory fake. Implementations map the
/// engine's "not found" and "conflict" statuses onto [`WriteOutcome`] and
/// return `Err` only for transport or protocol failures.
#[async_trait]
pub trait DocumentStoreClient: Send + Sync {
    /// Run a match-any query and return the hits in engine order.
    async fn search(&self, criteria: &SearchCriteria) -> Result<Vec<Document>, DocumentStoreError>;

    /// Index a new document.
    ///
    /// With `id = None` the store assigns an id. With `Some(id)` the write is
    /// create-only: an existing document with that id yields
    /// `WriteOutcome::Conflict`.
    async fn index_document(
        &self,
        id: Option<&str>,
        fields: &Fields,
    ) -> Result<WriteOutcome, DocumentStoreError>;

    /// Fetch a document. `Ok(None)` means the store reported it absent.
    async fn get_document(&self, id: &str) -> Result<Option<Document>, DocumentStoreError>;

    /// Delete a document. A missing document yields `WriteOutcome::NotFound`.
    async fn delete_document(&self, id: &str) -> Result<WriteOutcome, DocumentStoreError>;

    /// Apply a partial update to a document.
    async fn update_document(
        &self,
        id: &str,
        action: &UpdateAction,
    ) -> Result<WriteOutcome, DocumentStoreError>;

    /// Index several new documents in one request.
    ///
    /// Returns one result per document, with `position` indexing into
    /// `documents`. Item failures are reported in the results; `Err` means the
    /// request as a whole failed.
    async fn bulk_index(
        &self,
        documents: &[Fields],
    ) -> Result<Vec<BulkItemResult>, DocumentStoreError>;
}
