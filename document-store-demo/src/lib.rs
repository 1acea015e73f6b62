//! # Document Store Demo
//!
//! Exercises every operation of the document store facade against a student
//! index: search, create, fetch, script update, partial update, upsert, bulk
//! create and delete. Each outcome is logged.
//!
//! ## Modules
//!
//! - [`config`]: Configuration and dependency initialization
//! - [`walkthrough`]: The sequence of facade calls and its report

pub mod config;
pub mod walkthrough;

pub use config::{Dependencies, Settings};
pub use walkthrough::{Walkthrough, WalkthroughReport};

use document_store_repository::DocumentStoreError;
use thiserror::Error;

/// Errors that can occur during demo initialization or execution.
#[derive(Error, Debug)]
pub enum DemoError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Document store error.
    #[error("Store error: {0}")]
    StoreError(#[from] DocumentStoreError),

    /// A facade call returned an outcome the walkthrough cannot continue from.
    #[error("Unexpected outcome during {step}: {outcome}")]
    UnexpectedOutcome { step: &'static str, outcome: String },
}

impl DemoError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Create an unexpected outcome error.
    pub fn unexpected(step: &'static str, outcome: impl std::fmt::Debug) -> Self {
        Self::UnexpectedOutcome {
            step,
            outcome: format!("{:?}", outcome),
        }
    }
}
