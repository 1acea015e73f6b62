//! Integration tests for the document store facade.
//!
//! These tests run the real `DocumentStoreFacade` against an in-memory store
//! that follows the engine's semantics (create-only ids, partial merges,
//! single-branch upserts, per-item bulk failures, match-any search).

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use document_store_repository::{
    BulkItemError, BulkItemResult, DocumentStoreClient, DocumentStoreError, DocumentStoreFacade,
    OperationResult, UpdateAction, WriteOutcome,
};
use document_store_shared::{fields, Document, FieldValue, Fields, SearchCriteria};
use uuid::Uuid;

/// In-memory store with a fixed mapping: `age` and `score` must be integers.
struct InMemoryStore {
    documents: Mutex<Vec<(String, Fields)>>,
    unavailable: bool,
}

impl InMemoryStore {
    fn new() -> Self {
        Self {
            documents: Mutex::new(Vec::new()),
            unavailable: false,
        }
    }

    fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::new()
        }
    }

    fn check(&self) -> Result<(), DocumentStoreError> {
        if self.unavailable {
            return Err(DocumentStoreError::store_unavailable("connection refused"));
        }
        Ok(())
    }

    fn mapping_error(source: &Fields) -> Option<BulkItemError> {
        [fields::AGE, fields::SCORE].iter().find_map(|field| {
            match source.get(*field) {
                Some(FieldValue::Integer(_)) | None => None,
                Some(other) => Some(BulkItemError::new(
                    "mapper_parsing_exception",
                    format!("failed to parse field [{}] of type [integer]: {}", field, other),
                )),
            }
        })
    }

    fn matches(source: &Fields, field: &str, term: &str) -> bool {
        source
            .get(field)
            .and_then(FieldValue::as_text)
            .map(|text| {
                text.split_whitespace()
                    .any(|token| token.eq_ignore_ascii_case(term))
            })
            .unwrap_or(false)
    }

    fn insert(&self, id: String, source: Fields) {
        self.documents.lock().unwrap().push((id, source));
    }

    fn position(documents: &[(String, Fields)], id: &str) -> Option<usize> {
        documents.iter().position(|(doc_id, _)| doc_id == id)
    }
}

#[async_trait]
impl DocumentStoreClient for InMemoryStore {
    async fn search(&self, criteria: &SearchCriteria) -> Result<Vec<Document>, DocumentStoreError> {
        self.check()?;
        let documents = self.documents.lock().unwrap();
        Ok(documents
            .iter()
            .filter(|(_, source)| {
                criteria
                    .terms
                    .iter()
                    .any(|t| Self::matches(source, &t.field, &t.term))
            })
            .take(criteria.limit)
            .map(|(id, source)| Document::new(id.clone(), source.clone()))
            .collect())
    }

    async fn index_document(
        &self,
        id: Option<&str>,
        source: &Fields,
    ) -> Result<WriteOutcome, DocumentStoreError> {
        self.check()?;
        let mut documents = self.documents.lock().unwrap();
        let id = match id {
            Some(id) if Self::position(&documents, id).is_some() => {
                return Ok(WriteOutcome::Conflict)
            }
            Some(id) => id.to_string(),
            None => Uuid::new_v4().to_string(),
        };
        documents.push((id.clone(), source.clone()));
        Ok(WriteOutcome::Created { id })
    }

    async fn get_document(&self, id: &str) -> Result<Option<Document>, DocumentStoreError> {
        self.check()?;
        let documents = self.documents.lock().unwrap();
        Ok(Self::position(&documents, id)
            .map(|i| Document::new(id, documents[i].1.clone())))
    }

    async fn delete_document(&self, id: &str) -> Result<WriteOutcome, DocumentStoreError> {
        self.check()?;
        let mut documents = self.documents.lock().unwrap();
        match Self::position(&documents, id) {
            Some(i) => {
                documents.remove(i);
                Ok(WriteOutcome::Deleted { id: id.to_string() })
            }
            None => Ok(WriteOutcome::NotFound),
        }
    }

    async fn update_document(
        &self,
        id: &str,
        action: &UpdateAction,
    ) -> Result<WriteOutcome, DocumentStoreError> {
        self.check()?;
        let mut documents = self.documents.lock().unwrap();
        let position = Self::position(&documents, id);

        match (action, position) {
            (UpdateAction::Script { params, .. }, Some(i)) => {
                let field = params
                    .get("field")
                    .and_then(FieldValue::as_text)
                    .ok_or_else(|| DocumentStoreError::store_unavailable("script error"))?
                    .to_string();
                let value = params
                    .get("value")
                    .cloned()
                    .ok_or_else(|| DocumentStoreError::store_unavailable("script error"))?;
                documents[i].1.insert(field, value);
                Ok(WriteOutcome::Updated { id: id.to_string() })
            }
            (UpdateAction::Doc(partial), Some(i))
            | (UpdateAction::Upsert { update: partial, .. }, Some(i)) => {
                documents[i].1.extend(partial.clone());
                Ok(WriteOutcome::Updated { id: id.to_string() })
            }
            (UpdateAction::Upsert { insert, .. }, None) => {
                documents.push((id.to_string(), insert.clone()));
                Ok(WriteOutcome::Created { id: id.to_string() })
            }
            (_, None) => Ok(WriteOutcome::NotFound),
        }
    }

    async fn bulk_index(
        &self,
        sources: &[Fields],
    ) -> Result<Vec<BulkItemResult>, DocumentStoreError> {
        self.check()?;
        Ok(sources
            .iter()
            .enumerate()
            .map(|(position, source)| match Self::mapping_error(source) {
                Some(error) => BulkItemResult::failed(position, None, error),
                None => {
                    let id = Uuid::new_v4().to_string();
                    self.insert(id.clone(), source.clone());
                    BulkItemResult::succeeded(position, id)
                }
            })
            .collect())
    }
}

fn student(name: &str, age: i64, score: i64, class: &str) -> Fields {
    let mut source = Fields::new();
    source.insert(fields::NAME.to_string(), name.into());
    source.insert(fields::AGE.to_string(), age.into());
    source.insert(fields::SCORE.to_string(), score.into());
    source.insert(fields::CLASS.to_string(), class.into());
    source
}

fn named(name: &str) -> Fields {
    let mut source = Fields::new();
    source.insert(fields::NAME.to_string(), name.into());
    source
}

fn facade() -> (Arc<InMemoryStore>, DocumentStoreFacade) {
    let store = Arc::new(InMemoryStore::new());
    (store.clone(), DocumentStoreFacade::new(store))
}

fn created_id(result: OperationResult) -> String {
    match result {
        OperationResult::Created { id } => id,
        other => panic!("expected Created, got {:?}", other),
    }
}

#[tokio::test]
async fn test_create_then_fetch_round_trips_fields() {
    let (_, facade) = facade();
    let source = student("Kim", 21, 100, "B");

    let id = created_id(facade.create(source.clone()).await.unwrap());
    let document = facade.fetch(&id).await.unwrap().into_document().unwrap();

    assert_eq!(document.id, id);
    assert_eq!(document.fields, source);
}

#[tokio::test]
async fn test_create_rejects_non_finite_score_before_storing() {
    let (store, facade) = facade();
    let mut source = named("Kim");
    source.insert(fields::SCORE.to_string(), f64::NAN.into());

    let result = facade.create(source).await;

    assert!(matches!(result, Err(DocumentStoreError::ValidationError(_))));
    assert!(store.documents.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_create_with_existing_id_reports_conflict() {
    let (_, facade) = facade();

    facade
        .create_with_id("student-1", named("Kim"))
        .await
        .unwrap();
    let second = facade
        .create_with_id("student-1", named("Lee"))
        .await
        .unwrap();

    assert_eq!(second, OperationResult::Conflict);
    let stored = facade.fetch("student-1").await.unwrap().into_document().unwrap();
    assert_eq!(stored.fields, named("Kim"));
}

#[tokio::test]
async fn test_fetch_missing_reports_not_found() {
    let (_, facade) = facade();
    assert_eq!(
        facade.fetch("does-not-exist").await.unwrap(),
        OperationResult::NotFound
    );
}

#[tokio::test]
async fn test_delete_twice_reports_deleted_both_times() {
    let (_, facade) = facade();
    let id = created_id(facade.create(named("Kim")).await.unwrap());

    let expected = OperationResult::Deleted { id: id.clone() };
    assert_eq!(facade.delete(&id).await.unwrap(), expected);
    assert_eq!(facade.delete(&id).await.unwrap(), expected);
    assert_eq!(facade.fetch(&id).await.unwrap(), OperationResult::NotFound);
}

#[tokio::test]
async fn test_upsert_on_missing_id_inserts() {
    let (_, facade) = facade();
    let insert = named("Kim");
    let update = student("ignored", 1, 1, "Z");

    let result = facade.upsert("new-id", insert.clone(), update).await.unwrap();
    assert_eq!(
        result,
        OperationResult::Created {
            id: "new-id".to_string()
        }
    );

    let stored = facade.fetch("new-id").await.unwrap().into_document().unwrap();
    assert_eq!(stored.fields, insert);
}

#[tokio::test]
async fn test_upsert_on_existing_id_merges_update() {
    let (_, facade) = facade();
    facade
        .create_with_id("s1", student("Kim", 21, 100, "B"))
        .await
        .unwrap();

    let mut update = Fields::new();
    update.insert(fields::SCORE.to_string(), 80.into());
    let result = facade
        .upsert("s1", named("ignored"), update)
        .await
        .unwrap();
    assert_eq!(
        result,
        OperationResult::Updated {
            id: "s1".to_string()
        }
    );

    let stored = facade.fetch("s1").await.unwrap().into_document().unwrap();
    assert_eq!(stored.fields, student("Kim", 21, 80, "B"));
}

#[tokio::test]
async fn test_upsert_touch_stamps_existing_document() {
    let (_, facade) = facade();
    facade.create_with_id("s1", named("Kim")).await.unwrap();

    facade.upsert_touch("s1", named("ignored")).await.unwrap();

    let stored = facade.fetch("s1").await.unwrap().into_document().unwrap();
    assert_eq!(stored.get(fields::NAME), Some(&FieldValue::from("Kim")));
    assert!(matches!(
        stored.get(fields::CREATED_AT),
        Some(FieldValue::Timestamp(_))
    ));
}

#[tokio::test]
async fn test_update_by_document_changes_only_named_fields() {
    let (_, facade) = facade();
    let id = created_id(facade.create(student("Kim", 21, 100, "B")).await.unwrap());

    let result = facade.update_by_document(&id, named("X")).await.unwrap();
    assert_eq!(result, OperationResult::Updated { id: id.clone() });

    let stored = facade.fetch(&id).await.unwrap().into_document().unwrap();
    assert_eq!(stored.fields, student("X", 21, 100, "B"));
}

#[tokio::test]
async fn test_update_by_document_missing_reports_not_found() {
    let (_, facade) = facade();
    let result = facade.update_by_document("ghost", named("X")).await.unwrap();
    assert_eq!(result, OperationResult::NotFound);
}

#[tokio::test]
async fn test_update_by_script_rewrites_one_field() {
    let (_, facade) = facade();
    let id = created_id(facade.create(student("Kim", 21, 100, "B")).await.unwrap());

    let result = facade
        .update_by_script(&id, fields::CLASS, "A")
        .await
        .unwrap();
    assert_eq!(result, OperationResult::Updated { id: id.clone() });

    let stored = facade.fetch(&id).await.unwrap().into_document().unwrap();
    assert_eq!(stored.fields, student("Kim", 21, 100, "A"));
}

#[tokio::test]
async fn test_update_by_script_missing_reports_not_found() {
    let (store, facade) = facade();
    let result = facade
        .update_by_script("ghost", fields::NAME, "X")
        .await
        .unwrap();

    assert_eq!(result, OperationResult::NotFound);
    assert!(store.documents.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_bulk_create_reports_per_item_outcomes() {
    let (_, facade) = facade();

    let mut malformed = named("b");
    malformed.insert(fields::AGE.to_string(), "twenty".into());

    let result = facade
        .bulk_create(vec![named("a"), malformed, named("c")])
        .await
        .unwrap();
    let OperationResult::Bulk(bulk) = result else {
        panic!("expected bulk result");
    };

    assert_eq!(bulk.total, 3);
    assert_eq!(bulk.succeeded, 2);
    assert_eq!(bulk.failed, 1);
    assert!(bulk.items[0].is_success());
    assert!(bulk.items[2].is_success());

    let failure = bulk.items[1].outcome.as_ref().unwrap_err();
    assert_eq!(failure.kind, "mapper_parsing_exception");
    assert!(failure.reason.contains("[age]"));

    // Successful items are readable under the ids they were given.
    for item in [&bulk.items[0], &bulk.items[2]] {
        let id = item.id.as_deref().unwrap();
        assert!(matches!(
            facade.fetch(id).await.unwrap(),
            OperationResult::Found { .. }
        ));
    }

    assert!(matches!(
        bulk.into_result(),
        Err(DocumentStoreError::PartialBulkFailure { failed: 1, total: 3 })
    ));
}

#[tokio::test]
async fn test_bulk_create_rejects_empty_fieldset_locally() {
    let (store, facade) = facade();

    let result = facade
        .bulk_create(vec![Fields::new(), named("b")])
        .await
        .unwrap();
    let OperationResult::Bulk(bulk) = result else {
        panic!("expected bulk result");
    };

    let failure = bulk.items[0].outcome.as_ref().unwrap_err();
    assert_eq!(failure.kind, BulkItemError::VALIDATION);
    assert!(bulk.items[1].is_success());
    assert_eq!(store.documents.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_search_matches_any_term_without_duplicates() {
    let (_, facade) = facade();
    facade.create(named("A")).await.unwrap();
    facade.create(named("B")).await.unwrap();
    facade.create(named("A")).await.unwrap();
    facade.create(named("C")).await.unwrap();

    let documents = facade
        .search(&SearchCriteria::any_of(fields::NAME, ["A", "B"]))
        .await
        .unwrap();

    let mut names: Vec<String> = documents
        .iter()
        .filter_map(|d| d.get(fields::NAME).map(FieldValue::to_string))
        .collect();
    names.sort();
    assert_eq!(names, vec!["A".to_string(), "B".to_string()]);
}

#[tokio::test]
async fn test_search_without_matches_is_empty() {
    let (_, facade) = facade();
    facade.create(named("A")).await.unwrap();

    let documents = facade
        .search(&SearchCriteria::any_of(fields::NAME, ["Nobody"]))
        .await
        .unwrap();
    assert!(documents.is_empty());
}

#[tokio::test]
async fn test_unavailable_store_surfaces_error() {
    let facade = DocumentStoreFacade::new(Arc::new(InMemoryStore::unavailable()));

    let results = vec![
        facade.create(named("A")).await.err(),
        facade.fetch("x").await.err(),
        facade.delete("x").await.err(),
        facade.update_by_document("x", named("A")).await.err(),
        facade.upsert("x", named("A"), named("B")).await.err(),
        facade.bulk_create(vec![named("A")]).await.err(),
        facade
            .search(&SearchCriteria::any_of(fields::NAME, ["A"]))
            .await
            .err(),
    ];

    for error in results {
        let error = error.expect("operation should fail");
        assert!(error.is_store_unavailable(), "unexpected error {:?}", error);
    }
}

#[tokio::test]
async fn test_concurrent_creates_with_same_id_yield_one_conflict() {
    let (_, facade) = facade();
    let facade = Arc::new(facade);

    let handles: Vec<_> = (0..2)
        .map(|i| {
            let facade = facade.clone();
            tokio::spawn(async move {
                facade
                    .create_with_id("shared", named(&format!("writer-{}", i)))
                    .await
                    .unwrap()
            })
        })
        .collect();

    let mut outcomes = HashMap::new();
    for handle in handles {
        *outcomes.entry(handle.await.unwrap().kind()).or_insert(0) += 1;
    }
    assert_eq!(outcomes.get("created"), Some(&1));
    assert_eq!(outcomes.get("conflict"), Some(&1));
}
