//! Document store facade.
//!
//! This module provides the service application code uses to read and write
//! documents. It validates input, delegates to a `DocumentStoreClient` and
//! normalizes every outcome into an `OperationResult`.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use document_store_shared::{fields, Document, FieldValue, Fields, SearchCriteria};
use tracing::{debug, warn};

use crate::config::DocumentStoreFacadeConfig;
use crate::errors::DocumentStoreError;
use crate::interfaces::{DocumentStoreClient, UpdateAction, WriteOutcome};
use crate::types::{BulkItemError, BulkItemResult, BulkResult, OperationResult};
use crate::utils::{validate_field_name, validate_field_value, validate_fields};

/// Painless source assigning one field from script parameters.
pub const SET_FIELD_SCRIPT: &str = "ctx._source[params.field] = params.value";

/// The main service for interacting with the document store.
///
/// Holds no document state: the store is the only source of truth, and every
/// call is an independent round trip. The facade is `Send + Sync` and can be
/// shared across tasks.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use document_store_repository::opensearch::{IndexConfig, OpenSearchClient};
/// use document_store_repository::{DocumentStoreFacade, OperationResult};
/// use document_store_shared::Fields;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = OpenSearchClient::new("http://localhost:9200", IndexConfig::new("students"))?;
/// let facade = DocumentStoreFacade::new(Arc::new(client));
///
/// let mut fields = Fields::new();
/// fields.insert("name".to_string(), "Kim".into());
///
/// match facade.create(fields).await? {
///     OperationResult::Created { id } => println!("created {}", id),
///     other => println!("unexpected {:?}", other),
/// }
/// # Ok(())
/// # }
/// ```
pub struct DocumentStoreFacade {
    client: Arc<dyn DocumentStoreClient>,
    config: DocumentStoreFacadeConfig,
}

impl DocumentStoreFacade {
    /// Create a new facade with default configuration.
    ///
    /// The default configuration limits bulk submissions to 1000 documents.
    pub fn new(client: Arc<dyn DocumentStoreClient>) -> Self {
        Self {
            client,
            config: DocumentStoreFacadeConfig::default(),
        }
    }

    /// Create a new facade with custom configuration.
    pub fn with_config(
        client: Arc<dyn DocumentStoreClient>,
        config: DocumentStoreFacadeConfig,
    ) -> Self {
        Self { client, config }
    }

    /// Check if batch size exceeds the configured limit.
    fn validate_batch_size(&self, size: usize) -> Result<(), DocumentStoreError> {
        if let Some(max) = self.config.max_batch_size {
            if size > max {
                return Err(DocumentStoreError::batch_size_exceeded(size, max));
            }
        }
        Ok(())
    }

    fn validate_id(id: &str) -> Result<(), DocumentStoreError> {
        if id.trim().is_empty() {
            return Err(DocumentStoreError::validation("Document id is required"));
        }
        Ok(())
    }

    /// Search for documents matching any of the criteria pairs.
    ///
    /// At most `criteria.limit` hits are requested (20 unless set, never more
    /// than 100), so larger match sets are truncated. Hits whose source is
    /// identical to an earlier hit are then dropped from that page; the rest
    /// keep the store's order. Relevance order is not stable across calls.
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<Document>)` - Matching documents, empty when nothing matches
    ///   or when `criteria` has no pairs
    /// * `Err(DocumentStoreError::ValidationError)` - If a field name is invalid
    /// * `Err(DocumentStoreError)` - If the store cannot be reached
    pub async fn search(
        &self,
        criteria: &SearchCriteria,
    ) -> Result<Vec<Document>, DocumentStoreError> {
        if criteria.is_empty() {
            return Ok(Vec::new());
        }

        for term in &criteria.terms {
            validate_field_name(&term.field)?;
        }

        let hits = self.client.search(criteria).await?;
        let total = hits.len();

        let mut seen = HashSet::new();
        let mut documents = Vec::with_capacity(total);
        for hit in hits {
            let source = serde_json::to_string(&hit.fields)?;
            if seen.insert(source) {
                documents.push(hit);
            }
        }

        debug!(
            hits = total,
            distinct = documents.len(),
            "Search returned documents"
        );
        Ok(documents)
    }

    /// Create a document with a store-assigned id.
    ///
    /// # Returns
    ///
    /// * `Ok(OperationResult::Created)` - With the assigned id
    /// * `Ok(OperationResult::Conflict)` - If the store reports a conflict
    /// * `Err(DocumentStoreError::ValidationError)` - If `fields` is empty or a name is invalid
    /// * `Err(DocumentStoreError)` - If the store cannot be reached
    pub async fn create(&self, fields: Fields) -> Result<OperationResult, DocumentStoreError> {
        validate_fields(&fields)?;
        let outcome = self.client.index_document(None, &fields).await?;
        Self::create_result(outcome)
    }

    /// Create a document under a caller-supplied id.
    ///
    /// Never overwrites: if a document with `id` exists the result is
    /// `Conflict`, and the caller may retry with a new id or use `upsert`.
    pub async fn create_with_id(
        &self,
        id: &str,
        fields: Fields,
    ) -> Result<OperationResult, DocumentStoreError> {
        Self::validate_id(id)?;
        validate_fields(&fields)?;
        let outcome = self.client.index_document(Some(id), &fields).await?;
        Self::create_result(outcome)
    }

    fn create_result(outcome: WriteOutcome) -> Result<OperationResult, DocumentStoreError> {
        match outcome {
            WriteOutcome::Created { id } => Ok(OperationResult::Created { id }),
            WriteOutcome::Conflict => {
                warn!("Document create rejected: id already exists");
                Ok(OperationResult::Conflict)
            }
            other => Err(Self::unexpected_outcome("create", other)),
        }
    }

    /// Fetch a document by id.
    ///
    /// # Returns
    ///
    /// * `Ok(OperationResult::Found)` - If the document exists
    /// * `Ok(OperationResult::NotFound)` - If it does not
    /// * `Err(DocumentStoreError)` - If the store cannot be reached
    pub async fn fetch(&self, id: &str) -> Result<OperationResult, DocumentStoreError> {
        Self::validate_id(id)?;
        Ok(match self.client.get_document(id).await? {
            Some(document) => OperationResult::Found { document },
            None => OperationResult::NotFound,
        })
    }

    /// Delete a document by id.
    ///
    /// Idempotent: deleting a missing document also reports `Deleted`, since
    /// the end state is the same.
    pub async fn delete(&self, id: &str) -> Result<OperationResult, DocumentStoreError> {
        Self::validate_id(id)?;
        match self.client.delete_document(id).await? {
            WriteOutcome::Deleted { .. } => Ok(OperationResult::Deleted { id: id.to_string() }),
            WriteOutcome::NotFound => {
                debug!(doc_id = %id, "Delete of absent document");
                Ok(OperationResult::Deleted { id: id.to_string() })
            }
            WriteOutcome::Conflict => Ok(OperationResult::Conflict),
            other => Err(Self::unexpected_outcome("delete", other)),
        }
    }

    /// Rewrite one field with a server-side script.
    ///
    /// A missing document is reported as `NotFound` rather than ignored.
    pub async fn update_by_script(
        &self,
        id: &str,
        field: &str,
        new_value: impl Into<FieldValue>,
    ) -> Result<OperationResult, DocumentStoreError> {
        Self::validate_id(id)?;
        validate_field_name(field)?;
        let new_value = new_value.into();
        validate_field_value(field, &new_value)?;

        let mut params = Fields::new();
        params.insert("field".to_string(), FieldValue::Text(field.to_string()));
        params.insert("value".to_string(), new_value);

        let action = UpdateAction::Script {
            source: SET_FIELD_SCRIPT.to_string(),
            params,
        };
        let outcome = self.client.update_document(id, &action).await?;
        Self::update_result(id, outcome)
    }

    /// Merge `partial` into an existing document.
    ///
    /// Fields not named in `partial` keep their stored values.
    pub async fn update_by_document(
        &self,
        id: &str,
        partial: Fields,
    ) -> Result<OperationResult, DocumentStoreError> {
        Self::validate_id(id)?;
        validate_fields(&partial)?;

        let outcome = self
            .client
            .update_document(id, &UpdateAction::Doc(partial))
            .await?;
        Self::update_result(id, outcome)
    }

    /// Merge `update_fields` into the document if it exists, otherwise create
    /// it from `insert_fields`.
    ///
    /// Sent as a single request; the store runs exactly one branch.
    ///
    /// # Returns
    ///
    /// * `Ok(OperationResult::Created)` - If the insert branch ran
    /// * `Ok(OperationResult::Updated)` - If the update branch ran
    /// * `Ok(OperationResult::Conflict)` - On a concurrent modification
    pub async fn upsert(
        &self,
        id: &str,
        insert_fields: Fields,
        update_fields: Fields,
    ) -> Result<OperationResult, DocumentStoreError> {
        Self::validate_id(id)?;
        validate_fields(&insert_fields)?;
        validate_fields(&update_fields)?;

        let action = UpdateAction::Upsert {
            insert: insert_fields,
            update: update_fields,
        };
        let outcome = self.client.update_document(id, &action).await?;
        Self::update_result(id, outcome)
    }

    /// Upsert whose update branch stamps `createdAt` with the current time.
    pub async fn upsert_touch(
        &self,
        id: &str,
        insert_fields: Fields,
    ) -> Result<OperationResult, DocumentStoreError> {
        let mut update_fields = Fields::new();
        update_fields.insert(
            fields::CREATED_AT.to_string(),
            FieldValue::Timestamp(Utc::now()),
        );
        self.upsert(id, insert_fields, update_fields).await
    }

    fn update_result(
        id: &str,
        outcome: WriteOutcome,
    ) -> Result<OperationResult, DocumentStoreError> {
        match outcome {
            WriteOutcome::Updated { id } => Ok(OperationResult::Updated { id }),
            WriteOutcome::Created { id } => Ok(OperationResult::Created { id }),
            WriteOutcome::NotFound => {
                debug!(doc_id = %id, "Update target not found");
                Ok(OperationResult::NotFound)
            }
            WriteOutcome::Conflict => {
                warn!(doc_id = %id, "Update conflicted with a concurrent change");
                Ok(OperationResult::Conflict)
            }
            other => Err(Self::unexpected_outcome("update", other)),
        }
    }

    /// Create several documents in one request.
    ///
    /// Fieldsets that fail local validation are reported as failed items and
    /// not sent. A partial failure is returned as a normal `BulkResult`; call
    /// [`BulkResult::into_result`] to treat it as an error.
    ///
    /// # Returns
    ///
    /// * `Ok(OperationResult::Bulk)` - One item per fieldset, in input order
    /// * `Err(DocumentStoreError::BatchSizeExceeded)` - If the batch is too large
    /// * `Err(DocumentStoreError)` - If the request as a whole failed
    pub async fn bulk_create(
        &self,
        fieldsets: Vec<Fields>,
    ) -> Result<OperationResult, DocumentStoreError> {
        if fieldsets.is_empty() {
            return Ok(OperationResult::Bulk(BulkResult::default()));
        }

        self.validate_batch_size(fieldsets.len())?;

        let mut items = Vec::with_capacity(fieldsets.len());
        let mut positions = Vec::with_capacity(fieldsets.len());
        let mut valid = Vec::with_capacity(fieldsets.len());

        for (position, fields) in fieldsets.into_iter().enumerate() {
            match validate_fields(&fields) {
                Ok(()) => {
                    positions.push(position);
                    valid.push(fields);
                }
                Err(e) => {
                    items.push(BulkItemResult::failed(
                        position,
                        None,
                        BulkItemError::validation(e.to_string()),
                    ));
                }
            }
        }

        if !valid.is_empty() {
            let submitted = self.client.bulk_index(&valid).await?;
            // Client positions index into `valid`; map them back to the input.
            for mut item in submitted {
                let position = positions.get(item.position).copied().ok_or_else(|| {
                    DocumentStoreError::parse(format!(
                        "Bulk result position {} out of range",
                        item.position
                    ))
                })?;
                item.position = position;
                items.push(item);
            }
        }

        let result = BulkResult::from_items(items);
        if result.has_failures() {
            warn!(
                total = result.total,
                failed = result.failed,
                "Bulk create partially failed"
            );
        } else {
            debug!(total = result.total, "Bulk create completed");
        }
        Ok(OperationResult::Bulk(result))
    }

    fn unexpected_outcome(operation: &str, outcome: WriteOutcome) -> DocumentStoreError {
        DocumentStoreError::parse(format!(
            "Unexpected {} outcome from store: {:?}",
            operation, outcome
        ))
    }
}
