use axum::http::StatusCode;
use serde_json::Value as JsonValue;

use super::{parse_record, record_identifier};
use crate::error::ApiError;
use crate::models::{Operation, Outcome, UpdateResponse};
use crate::proxy::ProxyResponse;
use crate::state::Invocation;
use crate::store::ID_FIELD;

/// Partial update: sets `updateKey` to `updateValue` on the record `id`
///
/// The attribute name is passed to the store as data; it is checked here
/// against the identifier field and the configured allow-list.
pub async fn update_attribute(
    inv: &Invocation<'_>,
    body: Option<&str>,
) -> Result<ProxyResponse, ApiError> {
    let request = parse_record(body)?;
    let id = record_identifier(&request)?;
    let identifier = request.get(ID_FIELD).ok_or(ApiError::MissingIdentifier)?;

    let attribute = match request.get("updateKey") {
        Some(JsonValue::String(key)) if !key.is_empty() => key.as_str(),
        Some(_) => {
            return Err(ApiError::InvalidUpdate(
                "'updateKey' must be a non-empty string".to_string(),
            ));
        }
        None => return Err(ApiError::InvalidUpdate("missing 'updateKey'".to_string())),
    };

    if attribute == ID_FIELD {
        return Err(ApiError::InvalidUpdate(
            "the identifier field cannot be updated".to_string(),
        ));
    }

    if let Some(allowed) = &inv.config().updatable_fields {
        if !allowed.contains(attribute) {
            return Err(ApiError::InvalidUpdate(format!(
                "'{}' is not an updatable field",
                attribute
            )));
        }
    }

    let value = request
        .get("updateValue")
        .ok_or_else(|| ApiError::InvalidUpdate("missing 'updateValue'".to_string()))?;

    let updated = inv
        .call(inv.store().update_attribute(&id, identifier, attribute, value))
        .await?;

    tracing::info!("Updated '{}' on record with id: {}", attribute, id);
    Ok(ProxyResponse::json(
        StatusCode::OK,
        &UpdateResponse {
            operation: Operation::Update,
            message: Outcome::Success,
            updated_attributes: updated,
        },
    ))
}
