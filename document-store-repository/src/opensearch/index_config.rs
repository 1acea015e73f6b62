//! OpenSearch index configuration and mappings.
//!
//! This module defines the target index, the refresh policy applied to writes,
//! and the mapping used when the student index has to be created.

use document_store_shared::fields;
use opensearch::params::Refresh;
use serde_json::{json, Value};

/// Default name of the student index.
pub const DEFAULT_INDEX_NAME: &str = "students";

/// Configuration for the target index.
#[derive(Debug, Clone)]
pub struct IndexConfig {
    /// The index every operation targets.
    pub index: String,
    /// Refresh policy passed with every write request.
    pub refresh: Refresh,
}

impl IndexConfig {
    /// Create a new index configuration with refresh disabled.
    ///
    /// # Arguments
    ///
    /// * `index` - The index name
    pub fn new(index: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            refresh: Refresh::False,
        }
    }

    /// Set the refresh policy for writes.
    pub fn with_refresh(mut self, refresh: Refresh) -> Self {
        self.refresh = refresh;
        self
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self::new(DEFAULT_INDEX_NAME)
    }
}

/// Parse a refresh policy name.
///
/// Accepts `true`, `false` and `wait_for` (case-insensitive, `-` allowed in
/// place of `_`). Returns `None` for anything else.
pub fn parse_refresh(value: &str) -> Option<Refresh> {
    match value.trim().to_lowercase().replace('-', "_").as_str() {
        "true" => Some(Refresh::True),
        "false" => Some(Refresh::False),
        "wait_for" | "waitfor" => Some(Refresh::WaitFor),
        _ => None,
    }
}

/// Get the index settings and mappings for the student index.
///
/// - `name`: analyzed text for match queries, with a `raw` keyword sub-field
/// - `age`, `score`: integers
/// - `class`: keyword
/// - `createdAt`: date
pub fn get_index_settings() -> Value {
    json!({
        "settings": {
            "number_of_shards": 1,
            "number_of_replicas": 1
        },
        "mappings": {
            "properties": {
                (fields::NAME): {
                    "type": "text",
                    "fields": {
                        "raw": {
                            "type": "keyword"
                        }
                    }
                },
                (fields::AGE): {
                    "type": "integer"
                },
                (fields::SCORE): {
                    "type": "integer"
                },
                (fields::CLASS): {
                    "type": "keyword"
                },
                (fields::CREATED_AT): {
                    "type": "date"
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_settings_structure() {
        let settings = get_index_settings();

        assert!(settings["settings"]["number_of_shards"].is_number());
        assert!(settings["settings"]["number_of_replicas"].is_number());

        let properties = &settings["mappings"]["properties"];
        for field in fields::ALL {
            assert!(properties[field].is_object(), "missing mapping for {}", field);
        }
        assert_eq!(properties["name"]["type"], "text");
        assert_eq!(properties["name"]["fields"]["raw"]["type"], "keyword");
        assert_eq!(properties["createdAt"]["type"], "date");
    }

    #[test]
    fn test_default_index_name() {
        let config = IndexConfig::default();
        assert_eq!(config.index, "students");
        assert_eq!(config.refresh, Refresh::False);
    }

    #[test]
    fn test_parse_refresh() {
        assert_eq!(parse_refresh("true"), Some(Refresh::True));
        assert_eq!(parse_refresh("FALSE"), Some(Refresh::False));
        assert_eq!(parse_refresh("wait_for"), Some(Refresh::WaitFor));
        assert_eq!(parse_refresh("wait-for"), Some(Refresh::WaitFor));
        assert_eq!(parse_refresh("sometimes"), None);
    }
}
