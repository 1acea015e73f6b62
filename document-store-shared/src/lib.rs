//! # Document Store Shared
//!
//! This crate defines the data structures shared across the document store
//! facade: documents and their field values, and the criteria used to search
//! the index. It performs no I/O.

pub mod fields;
pub mod types;

pub use types::document::{Document, FieldValue, Fields};
pub use types::search_criteria::{SearchCriteria, SearchTerm};
