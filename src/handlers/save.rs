use axum::http::StatusCode;

use super::{parse_record, record_identifier};
use crate::error::ApiError;
use crate::models::{Operation, Outcome, SaveResponse};
use crate::proxy::ProxyResponse;
use crate::state::Invocation;

/// Create: unconditional upsert of the submitted record
///
/// The response echoes the submitted record, not a re-read from the store.
pub async fn create(inv: &Invocation<'_>, body: Option<&str>) -> Result<ProxyResponse, ApiError> {
    let record = parse_record(body)?;
    let id = record_identifier(&record)?;

    inv.call(inv.store().put(&id, &record)).await?;

    tracing::info!("Successfully stored record with id: {}", id);
    Ok(ProxyResponse::json(
        StatusCode::OK,
        &SaveResponse {
            operation: Operation::Save,
            message: Outcome::Success,
            item: record,
        },
    ))
}
