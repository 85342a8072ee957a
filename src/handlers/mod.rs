pub mod delete;
pub mod get;
pub mod health;
pub mod invoke;
pub mod list;
pub mod save;
pub mod update;

pub use delete::delete_by_identifier;
pub use get::read_by_identifier;
pub use health::health_handler;
pub use invoke::{csr_collection_handler, csr_item_handler, invoke_handler, unmatched_handler};
pub use list::list_all;
pub use save::create;
pub use update::update_attribute;

use serde_json::Value as JsonValue;

use crate::error::ApiError;
use crate::store::{ID_FIELD, Record, key_of};

/// Parses a request body that must be a JSON object
pub(crate) fn parse_record(body: Option<&str>) -> Result<Record, ApiError> {
    let body = body
        .filter(|b| !b.trim().is_empty())
        .ok_or_else(|| ApiError::InvalidBody("body is empty".to_string()))?;

    match serde_json::from_str::<JsonValue>(body)? {
        JsonValue::Object(record) => Ok(record),
        _ => Err(ApiError::InvalidBody("expected a JSON object".to_string())),
    }
}

/// Store key of the record's `id` field
pub(crate) fn record_identifier(record: &Record) -> Result<String, ApiError> {
    let value = record.get(ID_FIELD).ok_or(ApiError::MissingIdentifier)?;
    key_of(value).ok_or_else(|| {
        ApiError::InvalidIdentifier(format!(
            "expected a non-empty string or a number, got {}",
            value
        ))
    })
}

/// Identifier taken from a query or path parameter
pub(crate) fn require_identifier(id: Option<&str>) -> Result<String, ApiError> {
    match id {
        None => Err(ApiError::MissingIdentifier),
        Some("") => Err(ApiError::InvalidIdentifier("identifier is empty".to_string())),
        Some(id) => Ok(id.to_string()),
    }
}
