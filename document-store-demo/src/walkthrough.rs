//! The demo sequence of facade calls.
//!
//! Mirrors what the student service exposes: search two names, create a
//! student, read it back, rename it by script and by partial document, stamp
//! it through an upsert, bulk-create three more students and delete the first.

use document_store_repository::{BulkResult, DocumentStoreFacade, OperationResult};
use document_store_shared::{fields, Document, Fields, SearchCriteria};
use tracing::info;

use crate::DemoError;

/// Names searched for in the first step.
pub const SEARCH_NAMES: [&str; 2] = ["student1", "student22"];

/// Names submitted by the bulk step.
pub const BULK_NAMES: [&str; 3] = ["bulk1", "bulk2", "bulk3"];

/// What each step of the walkthrough returned.
#[derive(Debug, Clone, PartialEq)]
pub struct WalkthroughReport {
    pub search_results: Vec<Document>,
    pub created_id: String,
    pub fetched: Document,
    pub script_update: OperationResult,
    pub document_update: OperationResult,
    pub upsert: OperationResult,
    pub bulk: BulkResult,
    pub deleted: OperationResult,
}

/// Runs the demo sequence against a facade.
pub struct Walkthrough {
    facade: DocumentStoreFacade,
}

/// The student created by the walkthrough.
pub fn sample_student() -> Fields {
    let mut source = Fields::new();
    source.insert(fields::NAME.to_string(), "minji".into());
    source.insert(fields::AGE.to_string(), 21.into());
    source.insert(fields::SCORE.to_string(), 100.into());
    source.insert(fields::CLASS.to_string(), "B".into());
    source
}

fn named(name: &str) -> Fields {
    let mut source = Fields::new();
    source.insert(fields::NAME.to_string(), name.into());
    source
}

fn log_step(step: &str, result: &OperationResult) {
    info!(
        step = %step,
        outcome = result.kind(),
        doc_id = result.id().unwrap_or("-"),
        "Step completed"
    );
}

impl Walkthrough {
    pub fn new(facade: DocumentStoreFacade) -> Self {
        Self { facade }
    }

    /// Run every step in order, stopping at the first store error.
    pub async fn run(&self) -> Result<WalkthroughReport, DemoError> {
        let criteria = SearchCriteria::any_of(fields::NAME, SEARCH_NAMES);
        let search_results = self.facade.search(&criteria).await?;
        info!(
            step = "search",
            hits = search_results.len(),
            "Step completed"
        );

        let created = self.facade.create(sample_student()).await?;
        log_step("create", &created);
        let created_id = match created {
            OperationResult::Created { id } => id,
            other => return Err(DemoError::unexpected("create", other)),
        };

        let fetched = match self.facade.fetch(&created_id).await? {
            OperationResult::Found { document } => document,
            other => return Err(DemoError::unexpected("fetch", other)),
        };
        info!(step = "fetch", doc_id = %fetched.id, fields = fetched.fields.len(), "Step completed");

        let script_update = self
            .facade
            .update_by_script(&created_id, fields::NAME, "jisoo")
            .await?;
        log_step("update_by_script", &script_update);

        let document_update = self
            .facade
            .update_by_document(&created_id, named("sora"))
            .await?;
        log_step("update_by_document", &document_update);

        let upsert = self
            .facade
            .upsert_touch(&created_id, named("upserted"))
            .await?;
        log_step("upsert", &upsert);

        let bulk = match self
            .facade
            .bulk_create(BULK_NAMES.iter().map(|name| named(name)).collect())
            .await?
        {
            OperationResult::Bulk(bulk) => bulk,
            other => return Err(DemoError::unexpected("bulk_create", other)),
        };
        info!(
            step = "bulk_create",
            total = bulk.total,
            succeeded = bulk.succeeded,
            failed = bulk.failed,
            "Step completed"
        );
        for failure in bulk.failures() {
            if let Err(error) = &failure.outcome {
                info!(
                    position = failure.position,
                    kind = %error.kind,
                    reason = %error.reason,
                    "Bulk item rejected"
                );
            }
        }

        let deleted = self.facade.delete(&created_id).await?;
        log_step("delete", &deleted);

        Ok(WalkthroughReport {
            search_results,
            created_id,
            fetched,
            script_update,
            document_update,
            upsert,
            bulk,
            deleted,
        })
    }
}
