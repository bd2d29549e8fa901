//! Row types, query filters and typed document conversion

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use sqlx::FromRow;

use super::DbError;

/// Database representation of a stored document
#[derive(Debug, Clone, FromRow)]
pub struct DocumentRow {
    pub body: Value,
}

/// Predicate for `DocumentStore::query`
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentFilter {
    All,
    /// Field is present and not null
    HasField(String),
    /// Field's text value equals the given string
    FieldEquals(String, String),
    /// Field's text value is one of the given strings
    FieldIn(String, Vec<String>),
}

impl DocumentFilter {
    pub fn has_field(field: &str) -> Self {
        DocumentFilter::HasField(field.to_string())
    }

    pub fn field_equals(field: &str, value: &str) -> Self {
        DocumentFilter::FieldEquals(field.to_string(), value.to_string())
    }

    pub fn field_in(field: &str, values: Vec<String>) -> Self {
        DocumentFilter::FieldIn(field.to_string(), values)
    }

    /// Evaluate the filter against a document
    ///
    /// Text comparison mirrors PostgreSQL's `->>`: strings compare by content,
    /// other scalars by their JSON rendering.
    pub fn matches(&self, document: &Value) -> bool {
        match self {
            DocumentFilter::All => true,
            DocumentFilter::HasField(field) => {
                document.get(field).is_some_and(|value| !value.is_null())
            }
            DocumentFilter::FieldEquals(field, expected) => {
                field_text(document, field).is_some_and(|text| &text == expected)
            }
            DocumentFilter::FieldIn(field, expected) => {
                field_text(document, field).is_some_and(|text| expected.contains(&text))
            }
        }
    }
}

fn field_text(document: &Value, field: &str) -> Option<String> {
    match document.get(field)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Id of a document, which must be a non-empty string
pub fn document_id(document: &Value) -> Result<&str, DbError> {
    document
        .get("id")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| DbError::Serialization("document has no string id".to_string()))
}

/// Convert a record into a storable document
pub fn to_document<T: Serialize>(record: &T) -> Result<Value, DbError> {
    let value =
        serde_json::to_value(record).map_err(|e| DbError::Serialization(e.to_string()))?;
    document_id(&value)?;
    Ok(value)
}

/// Convert a stored document back into a record
pub fn from_document<T: DeserializeOwned>(document: Value) -> Result<T, DbError> {
    serde_json::from_value(document).map_err(|e| DbError::Serialization(e.to_string()))
}
