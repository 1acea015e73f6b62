//! Validation helpers shared by the facade and the OpenSearch client.

use document_store_shared::{FieldValue, Fields};

use crate::errors::DocumentStoreError;

/// Validate a single field name.
///
/// Field names must be non-empty and contain only alphanumeric characters and
/// underscores, so they can be placed in queries and script parameters as-is.
///
/// # Example
///
/// ```
/// use document_store_repository::validate_field_name;
///
/// assert!(validate_field_name("createdAt").is_ok());
/// assert!(validate_field_name("created-at").is_err());
/// ```
pub fn validate_field_name(field: &str) -> Result<(), DocumentStoreError> {
    if field.is_empty() {
        return Err(DocumentStoreError::validation("Field names cannot be empty"));
    }

    if !field.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return Err(DocumentStoreError::validation(format!(
            "Field name '{}' contains invalid characters. Only alphanumeric characters and underscores are allowed",
            field
        )));
    }

    Ok(())
}

/// Validate a single field value.
///
/// NaN and infinite floats have no JSON representation; they would be stored
/// as `null` and the document could no longer be read back.
pub fn validate_field_value(field: &str, value: &FieldValue) -> Result<(), DocumentStoreError> {
    match value {
        FieldValue::Float(number) if !number.is_finite() => {
            Err(DocumentStoreError::validation(format!(
                "Field '{}' holds a non-finite number ({})",
                field, number
            )))
        }
        _ => Ok(()),
    }
}

/// Validate a document source: at least one field, every name and value valid.
pub fn validate_fields(fields: &Fields) -> Result<(), DocumentStoreError> {
    if fields.is_empty() {
        return Err(DocumentStoreError::validation(
            "At least one field must be provided",
        ));
    }

    fields.iter().try_for_each(|(field, value)| {
        validate_field_name(field)?;
        validate_field_value(field, value)
    })
}
