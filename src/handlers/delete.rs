use axum::http::StatusCode;

use super::require_identifier;
use crate::error::ApiError;
use crate::models::{DeleteResponse, Operation, Outcome};
use crate::proxy::ProxyResponse;
use crate::state::Invocation;

/// Delete by identifier, answering with the pre-delete image
///
/// Deleting an identifier with no record succeeds with a null `Item`.
pub async fn delete_by_identifier(
    inv: &Invocation<'_>,
    id: Option<&str>,
) -> Result<ProxyResponse, ApiError> {
    let id = require_identifier(id)?;

    let old = inv.call(inv.store().delete(&id)).await?;

    tracing::info!(
        "Deleted record with id: {} (existed: {})",
        id,
        old.is_some()
    );
    Ok(ProxyResponse::json(
        StatusCode::OK,
        &DeleteResponse {
            operation: Operation::Delete,
            message: Outcome::Success,
            item: old,
        },
    ))
}
