//! Search criteria for the document store.
//!
//! Criteria are a set of `(field, term)` pairs combined with match-any
//! semantics: a document matches when any single pair matches.

use serde::{Deserialize, Serialize};

/// Default number of hits requested from the store.
pub const DEFAULT_LIMIT: usize = 20;

/// Upper bound on the number of hits a single search may request.
pub const MAX_LIMIT: usize = 100;

/// A single `(field, term)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchTerm {
    pub field: String,
    pub term: String,
}

/// Match-any search criteria.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchCriteria {
    /// The pairs to match; a document matches if any pair matches.
    pub terms: Vec<SearchTerm>,

    /// Maximum number of hits to return.
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

impl Default for SearchCriteria {
    fn default() -> Self {
        Self {
            terms: Vec::new(),
            limit: DEFAULT_LIMIT,
        }
    }
}

impl SearchCriteria {
    /// Create empty criteria.
    pub fn new() -> Self {
        Self::default()
    }

    /// Criteria matching any of the given terms on a single field.
    ///
    /// # Example
    ///
    /// ```
    /// use document_store_shared::SearchCriteria;
    ///
    /// let criteria = SearchCriteria::any_of("name", ["Kim", "Lee"]);
    /// assert_eq!(criteria.terms.len(), 2);
    /// ```
    pub fn any_of<I, T>(field: &str, terms: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        terms
            .into_iter()
            .fold(Self::new(), |criteria, term| criteria.or(field, term))
    }

    /// Add a `(field, term)` pair.
    pub fn or(mut self, field: impl Into<String>, term: impl Into<String>) -> Self {
        self.terms.push(SearchTerm {
            field: field.into(),
            term: term.into(),
        });
        self
    }

    /// Set the maximum number of hits, capped at `MAX_LIMIT`.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.min(MAX_LIMIT);
        self
    }

    /// Returns true if no pairs were given.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}
