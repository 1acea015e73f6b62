//! OpenSearch client implementation.
//!
//! This module provides the concrete implementation of `DocumentStoreClient`
//! using the OpenSearch Rust crate.

use async_trait::async_trait;
use document_store_shared::{Document, Fields, SearchCriteria};
use opensearch::{
    http::request::JsonBody,
    http::response::Response,
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
    indices::{IndicesCreateParts, IndicesExistsParts},
    BulkParts, CreateParts, DeleteParts, GetParts, IndexParts, OpenSearch, SearchParts,
    UpdateParts,
};
use serde_json::{json, Value};
use tracing::{debug, error, info};
use url::Url;

use crate::errors::DocumentStoreError;
use crate::interfaces::{DocumentStoreClient, UpdateAction, WriteOutcome};
use crate::opensearch::index_config::{get_index_settings, IndexConfig};
use crate::opensearch::responses;
use crate::types::BulkItemResult;

/// OpenSearch client implementation.
///
/// Every operation targets the index named in its `IndexConfig`.
///
/// # Example
///
/// ```ignore
/// use document_store_repository::opensearch::{IndexConfig, OpenSearchClient};
///
/// let client = OpenSearchClient::new("http://localhost:9200", IndexConfig::new("students"))?;
/// client.ensure_index_exists().await?;
/// ```
pub struct OpenSearchClient {
    client: OpenSearch,
    index_config: IndexConfig,
}

impl OpenSearchClient {
    /// Create a new OpenSearch client for the specified URL.
    ///
    /// No request is sent; connectivity problems surface on the first call.
    ///
    /// # Arguments
    ///
    /// * `url` - The OpenSearch server URL (e.g., "http://localhost:9200")
    /// * `index_config` - The target index and write refresh policy
    pub fn new(url: &str, index_config: IndexConfig) -> Result<Self, DocumentStoreError> {
        let parsed_url =
            Url::parse(url).map_err(|e| DocumentStoreError::store_unavailable(e.to_string()))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let transport = TransportBuilder::new(conn_pool)
            .disable_proxy()
            .build()
            .map_err(|e| DocumentStoreError::store_unavailable(e.to_string()))?;

        let client = OpenSearch::new(transport);

        info!(
            url = %url,
            index = %index_config.index,
            refresh = ?index_config.refresh,
            "Created OpenSearch client"
        );

        Ok(Self {
            client,
            index_config,
        })
    }

    /// The index this client writes to and reads from.
    pub fn index(&self) -> &str {
        &self.index_config.index
    }

    /// Create the index with the student mapping if it does not exist yet.
    ///
    /// Losing a creation race to another process is not an error.
    pub async fn ensure_index_exists(&self) -> Result<(), DocumentStoreError> {
        let index = self.index_config.index.as_str();

        let response = self
            .client
            .indices()
            .exists(IndicesExistsParts::Index(&[index]))
            .send()
            .await?;

        match response.status_code().as_u16() {
            200 => {
                debug!(index = %index, "Index already exists");
                return Ok(());
            }
            404 => {}
            _ => return Err(Self::unexpected_response(response, "Index exists check").await),
        }

        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(index))
            .body(get_index_settings())
            .send()
            .await?;

        if response.status_code().is_success() {
            info!(index = %index, "Created index");
            return Ok(());
        }

        let status = response.status_code();
        let body = response.text().await.unwrap_or_default();
        if body.contains("resource_already_exists_exception") {
            debug!(index = %index, "Index was created concurrently");
            return Ok(());
        }

        error!(status = %status, body = %body, "Index creation failed");
        Err(DocumentStoreError::store_unavailable(format!(
            "Index creation failed with status {}: {}",
            status, body
        )))
    }

    /// Log an unexpected response and turn it into `StoreUnavailable`.
    async fn unexpected_response(response: Response, operation: &str) -> DocumentStoreError {
        let status = response.status_code();
        let error_body = response.text().await.unwrap_or_default();
        error!(
            operation = %operation,
            status = %status,
            body = %error_body,
            "Request failed"
        );
        DocumentStoreError::store_unavailable(format!(
            "{} failed with status {}: {}",
            operation, status, error_body
        ))
    }

    /// Map a write response onto a `WriteOutcome`.
    ///
    /// 409 is a conflict. 404 is `NotFound` only when the body says the
    /// document is missing; a missing index is a store failure. Every other
    /// non-2xx status is an error.
    async fn write_outcome(
        response: Response,
        operation: &str,
    ) -> Result<WriteOutcome, DocumentStoreError> {
        match response.status_code().as_u16() {
            404 => {
                let text = response.text().await.unwrap_or_default();
                let body: Value = serde_json::from_str(&text).unwrap_or(Value::Null);
                if responses::is_missing_document(&body) {
                    return Ok(WriteOutcome::NotFound);
                }
                error!(
                    operation = %operation,
                    status = 404,
                    body = %text,
                    "Request targeted a missing index or path"
                );
                Err(DocumentStoreError::store_unavailable(format!(
                    "{} failed with status 404: {}",
                    operation, text
                )))
            }
            409 => Ok(WriteOutcome::Conflict),
            status if (200..300).contains(&status) => {
                let body = response.json::<Value>().await?;
                responses::parse_write_response(&body)
            }
            _ => Err(Self::unexpected_response(response, operation).await),
        }
    }

    fn update_body(action: &UpdateAction) -> Value {
        match action {
            UpdateAction::Script { source, params } => json!({
                "script": {
                    "source": source,
                    "lang": "painless",
                    "params": params
                }
            }),
            UpdateAction::Doc(fields) => json!({ "doc": fields }),
            UpdateAction::Upsert { insert, update } => json!({
                "doc": update,
                "upsert": insert
            }),
        }
    }
}

#[async_trait]
impl DocumentStoreClient for OpenSearchClient {
    async fn search(&self, criteria: &SearchCriteria) -> Result<Vec<Document>, DocumentStoreError> {
        let query = responses::build_match_any_query(criteria);

        let response = self
            .client
            .search(SearchParts::Index(&[self.index()]))
            .body(query)
            .send()
            .await?;

        if !response.status_code().is_success() {
            return Err(Self::unexpected_response(response, "Search").await);
        }

        let body = response.json::<Value>().await?;
        let documents = responses::parse_search_hits(&body);
        debug!(hits = documents.len(), "Search completed");
        Ok(documents)
    }

    async fn index_document(
        &self,
        id: Option<&str>,
        fields: &Fields,
    ) -> Result<WriteOutcome, DocumentStoreError> {
        let response = match id {
            // Create-only so that an existing id is reported as a conflict
            // instead of being overwritten.
            Some(id) => {
                self.client
                    .create(CreateParts::IndexId(self.index(), id))
                    .body(fields)
                    .refresh(self.index_config.refresh)
                    .send()
                    .await?
            }
            None => {
                self.client
                    .index(IndexParts::Index(self.index()))
                    .body(fields)
                    .refresh(self.index_config.refresh)
                    .send()
                    .await?
            }
        };

        let outcome = Self::write_outcome(response, "Index").await?;
        debug!(outcome = ?outcome, "Document indexed");
        Ok(outcome)
    }

    async fn get_document(&self, id: &str) -> Result<Option<Document>, DocumentStoreError> {
        let response = self
            .client
            .get(GetParts::IndexId(self.index(), id))
            .send()
            .await?;

        let status = response.status_code();
        if !status.is_success() && status.as_u16() != 404 {
            return Err(Self::unexpected_response(response, "Get").await);
        }

        // A missing document comes back as 404 with `found: false`. A 404
        // without `found` is a missing index.
        let body = response.json::<Value>().await?;
        if status.as_u16() == 404 && body.get("found").is_none() {
            error!(operation = "Get", status = %status, body = %body, "Request failed");
            return Err(DocumentStoreError::store_unavailable(format!(
                "Get failed with status {}: {}",
                status, body
            )));
        }
        let document = responses::parse_get_response(&body)?;
        debug!(doc_id = %id, found = document.is_some(), "Document fetched");
        Ok(document)
    }

    async fn delete_document(&self, id: &str) -> Result<WriteOutcome, DocumentStoreError> {
        let response = self
            .client
            .delete(DeleteParts::IndexId(self.index(), id))
            .refresh(self.index_config.refresh)
            .send()
            .await?;

        let outcome = Self::write_outcome(response, "Delete").await?;
        debug!(doc_id = %id, outcome = ?outcome, "Document deleted");
        Ok(outcome)
    }

    async fn update_document(
        &self,
        id: &str,
        action: &UpdateAction,
    ) -> Result<WriteOutcome, DocumentStoreError> {
        let response = self
            .client
            .update(UpdateParts::IndexId(self.index(), id))
            .body(Self::update_body(action))
            .refresh(self.index_config.refresh)
            .send()
            .await?;

        let outcome = Self::write_outcome(response, "Update").await?;
        debug!(doc_id = %id, outcome = ?outcome, "Document updated");
        Ok(outcome)
    }

    async fn bulk_index(
        &self,
        documents: &[Fields],
    ) -> Result<Vec<BulkItemResult>, DocumentStoreError> {
        let mut body: Vec<JsonBody<Value>> = Vec::with_capacity(documents.len() * 2);
        for fields in documents {
            body.push(json!({ "index": {} }).into());
            body.push(serde_json::to_value(fields)?.into());
        }

        let response = self
            .client
            .bulk(BulkParts::Index(self.index()))
            .body(body)
            .refresh(self.index_config.refresh)
            .send()
            .await?;

        if !response.status_code().is_success() {
            return Err(Self::unexpected_response(response, "Bulk index").await);
        }

        let body = response.json::<Value>().await?;
        let items = responses::parse_bulk_response(&body, documents.len())?;
        debug!(
            total = items.len(),
            failed = items.iter().filter(|item| !item.is_success()).count(),
            "Bulk index completed"
        );
        Ok(items)
    }
}
