//! Request bodies and response parsing for the OpenSearch client.
//!
//! Kept free of I/O so the JSON shapes can be tested against captured
//! responses without a running cluster.

use document_store_shared::{Document, Fields, SearchCriteria};
use serde_json::{json, Map, Value};
use tracing::warn;

use crate::errors::DocumentStoreError;
use crate::interfaces::WriteOutcome;
use crate::types::{BulkItemError, BulkItemResult};

/// Build a bool query whose `should` clauses hold one `match` per pair.
///
/// With no `must` clause, a document matches when any `should` clause matches.
pub fn build_match_any_query(criteria: &SearchCriteria) -> Value {
    let should: Vec<Value> = criteria
        .terms
        .iter()
        .map(|term| {
            let mut clause = Map::new();
            clause.insert(term.field.clone(), Value::String(term.term.clone()));
            json!({ "match": clause })
        })
        .collect();

    json!({
        "size": criteria.limit,
        "query": {
            "bool": {
                "should": should,
                "minimum_should_match": 1
            }
        }
    })
}

fn parse_source(id: &str, source: &Value) -> Result<Document, DocumentStoreError> {
    let fields: Fields = serde_json::from_value(source.clone()).map_err(|e| {
        DocumentStoreError::parse(format!("Invalid _source for document {}: {}", id, e))
    })?;
    Ok(Document::new(id, fields))
}

fn required_str<'a>(body: &'a Value, key: &str) -> Result<&'a str, DocumentStoreError> {
    body.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| DocumentStoreError::parse(format!("Response is missing '{}'", key)))
}

/// Parse a get response. `found: false` yields `Ok(None)`.
pub fn parse_get_response(body: &Value) -> Result<Option<Document>, DocumentStoreError> {
    let found = body
        .get("found")
        .and_then(Value::as_bool)
        .ok_or_else(|| DocumentStoreError::parse("Get response is missing 'found'"))?;

    if !found {
        return Ok(None);
    }

    let id = required_str(body, "_id")?;
    let source = body
        .get("_source")
        .ok_or_else(|| DocumentStoreError::parse("Get response is missing '_source'"))?;
    parse_source(id, source).map(Some)
}

/// Parse the hits of a search response, in engine order.
///
/// A response without hits yields an empty vector. A hit without an id or
/// whose source holds values outside `FieldValue` (booleans, nulls, arrays,
/// objects written by another client of the index) is logged and skipped.
pub fn parse_search_hits(body: &Value) -> Vec<Document> {
    let Some(hits) = body.pointer("/hits/hits").and_then(Value::as_array) else {
        return Vec::new();
    };

    hits.iter()
        .enumerate()
        .filter_map(|(rank, hit)| {
            let parsed = required_str(hit, "_id").and_then(|id| {
                let source = hit.get("_source").unwrap_or(&Value::Null);
                parse_source(id, source)
            });
            match parsed {
                Ok(document) => Some(document),
                Err(e) => {
                    warn!(
                        rank = rank,
                        doc_id = hit.get("_id").and_then(serde_json::Value::as_str).unwrap_or("-"),
                        error = %e,
                        "Skipping unreadable search hit"
                    );
                    None
                }
            }
        })
        .collect()
}

/// Whether a 404 write response is about the document rather than the index.
///
/// Delete reports a missing document with `result: not_found`, update with a
/// `document_missing_exception`. Any other 404, such as
/// `index_not_found_exception`, is not a document outcome.
pub fn is_missing_document(body: &Value) -> bool {
    body.get("result").and_then(Value::as_str) == Some("not_found")
        || body.pointer("/error/type").and_then(Value::as_str)
            == Some("document_missing_exception")
}

/// Parse the body of a successful index, create, update or delete response.
pub fn parse_write_response(body: &Value) -> Result<WriteOutcome, DocumentStoreError> {
    let id = required_str(body, "_id")?.to_string();
    match required_str(body, "result")? {
        "created" => Ok(WriteOutcome::Created { id }),
        "updated" | "noop" => Ok(WriteOutcome::Updated { id }),
        "deleted" => Ok(WriteOutcome::Deleted { id }),
        "not_found" => Ok(WriteOutcome::NotFound),
        other => Err(DocumentStoreError::parse(format!(
            "Unknown write result '{}'",
            other
        ))),
    }
}

/// Parse a bulk response into one result per submitted document.
///
/// Each entry of `items` is an object keyed by the action name (`index`,
/// `create`, ...) whose value carries `_id`, `status` and, on failure, an
/// `error` object.
pub fn parse_bulk_response(
    body: &Value,
    expected: usize,
) -> Result<Vec<BulkItemResult>, DocumentStoreError> {
    let items = body
        .get("items")
        .and_then(Value::as_array)
        .ok_or_else(|| DocumentStoreError::parse("Bulk response is missing 'items'"))?;

    if items.len() != expected {
        return Err(DocumentStoreError::parse(format!(
            "Bulk response has {} items, expected {}",
            items.len(),
            expected
        )));
    }

    items
        .iter()
        .enumerate()
        .map(|(position, item)| {
            let action = item
                .as_object()
                .and_then(|obj| obj.values().next())
                .ok_or_else(|| {
                    DocumentStoreError::parse(format!("Bulk item {} is empty", position))
                })?;

            let id = action.get("_id").and_then(Value::as_str).map(str::to_string);
            let status = action.get("status").and_then(Value::as_u64).unwrap_or(0);

            match action.get("error") {
                None if (200..300).contains(&status) => {
                    let id = id.ok_or_else(|| {
                        DocumentStoreError::parse(format!("Bulk item {} is missing '_id'", position))
                    })?;
                    Ok(BulkItemResult::succeeded(position, id))
                }
                error => {
                    let kind = error
                        .and_then(|e| e.get("type"))
                        .and_then(Value::as_str)
                        .unwrap_or("unknown");
                    let reason = error
                        .and_then(|e| e.get("reason"))
                        .and_then(Value::as_str)
                        .map(str::to_string)
                        .unwrap_or_else(|| format!("status {}", status));
                    Ok(BulkItemResult::failed(
                        position,
                        id,
                        BulkItemError::new(kind, reason),
                    ))
                }
            }
        })
        .collect()
}
