use axum::http::StatusCode;

use super::require_identifier;
use crate::error::ApiError;
use crate::proxy::ProxyResponse;
use crate::state::Invocation;

/// Point lookup shared by every identifier-addressed GET shape
///
/// Answers 200 with the raw record, or `RecordNotFound` when nothing is
/// stored under the identifier.
pub async fn read_by_identifier(
    inv: &Invocation<'_>,
    id: Option<&str>,
) -> Result<ProxyResponse, ApiError> {
    let id = require_identifier(id)?;

    match inv.call(inv.store().get(&id)).await? {
        Some(record) => {
            tracing::info!("Successfully retrieved record with id: {}", id);
            Ok(ProxyResponse::json(StatusCode::OK, &record))
        }
        None => {
            tracing::info!("Record not found with id: {}", id);
            Err(ApiError::RecordNotFound(id))
        }
    }
}
