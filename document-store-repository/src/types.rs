//! Result types for document store operations.

use document_store_shared::Document;

use crate::errors::DocumentStoreError;

/// Outcome of a single facade operation.
///
/// Every write returns exactly one of these tags. `Conflict` and `NotFound`
/// are ordinary outcomes, not errors: the caller decides what to do with them.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationResult {
    /// A new document was written.
    Created { id: String },
    /// The requested document exists.
    Found { document: Document },
    /// The referenced document does not exist.
    NotFound,
    /// The document is gone (whether or not it existed before).
    Deleted { id: String },
    /// An existing document was modified.
    Updated { id: String },
    /// The write collided with an existing identifier or a concurrent change.
    Conflict,
    /// Per-item outcomes of a bulk submission.
    Bulk(BulkResult),
}

impl OperationResult {
    /// The id of the affected document, if the outcome carries one.
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Created { id } | Self::Deleted { id } | Self::Updated { id } => Some(id),
            Self::Found { document } => Some(&document.id),
            Self::NotFound | Self::Conflict | Self::Bulk(_) => None,
        }
    }

    /// Returns the document of a `Found` outcome.
    pub fn into_document(self) -> Option<Document> {
        match self {
            Self::Found { document } => Some(document),
            _ => None,
        }
    }

    /// Short lowercase label, used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Created { .. } => "created",
            Self::Found { .. } => "found",
            Self::NotFound => "not_found",
            Self::Deleted { .. } => "deleted",
            Self::Updated { .. } => "updated",
            Self::Conflict => "conflict",
            Self::Bulk(_) => "bulk",
        }
    }
}

/// Why a single bulk item was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkItemError {
    /// Error type reported by the store (e.g. `mapper_parsing_exception`),
    /// or `validation` for items rejected before submission.
    pub kind: String,
    /// Human readable reason.
    pub reason: String,
}

impl BulkItemError {
    pub const VALIDATION: &'static str = "validation";

    pub fn new(kind: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            reason: reason.into(),
        }
    }

    /// An item rejected locally before the bulk request was sent.
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::new(Self::VALIDATION, reason)
    }
}

/// Result of a single item within a bulk submission.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkItemResult {
    /// Position of the item in the submitted sequence.
    pub position: usize,
    /// Id assigned by the store, when the item was written.
    pub id: Option<String>,
    /// `Ok(())` if the item was indexed.
    pub outcome: Result<(), BulkItemError>,
}

impl BulkItemResult {
    pub fn succeeded(position: usize, id: impl Into<String>) -> Self {
        Self {
            position,
            id: Some(id.into()),
            outcome: Ok(()),
        }
    }

    pub fn failed(position: usize, id: Option<String>, error: BulkItemError) -> Self {
        Self {
            position,
            id,
            outcome: Err(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Summary of a bulk submission.
///
/// A partial failure is not an error: `items` tells the caller which positions
/// failed and why. Use [`BulkResult::into_result`] to turn any failure into an
/// error instead.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BulkResult {
    /// Total number of items submitted.
    pub total: usize,
    /// Number of items indexed.
    pub succeeded: usize,
    /// Number of items rejected.
    pub failed: usize,
    /// One result per submitted item, in submission order.
    pub items: Vec<BulkItemResult>,
}

impl BulkResult {
    /// Build a summary from per-item results, sorting them by position.
    pub fn from_items(mut items: Vec<BulkItemResult>) -> Self {
        items.sort_by_key(|item| item.position);
        let succeeded = items.iter().filter(|item| item.is_success()).count();
        Self {
            total: items.len(),
            succeeded,
            failed: items.len() - succeeded,
            items,
        }
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    /// The rejected items.
    pub fn failures(&self) -> impl Iterator<Item = &BulkItemResult> {
        self.items.iter().filter(|item| !item.is_success())
    }

    /// Escalate any item failure into `PartialBulkFailure`.
    pub fn into_result(self) -> Result<Self, DocumentStoreError> {
        if self.has_failures() {
            return Err(DocumentStoreError::partial_bulk_failure(
                self.failed,
                self.total,
            ));
        }
        Ok(self)
    }
}
