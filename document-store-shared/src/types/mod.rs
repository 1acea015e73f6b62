//! Core data structures shared by the document store crates.
//! Re-exports `Document`, `FieldValue` and `SearchCriteria`.

pub mod document;
pub mod search_criteria;

pub use document::{Document, FieldValue, Fields};
pub use search_criteria::{SearchCriteria, SearchTerm};
