use axum::http::StatusCode;

use crate::error::ApiError;
use crate::models::ListResponse;
use crate::proxy::ProxyResponse;
use crate::state::Invocation;

/// List-all: walks the store's scan pages until no continuation token remains
///
/// Pages are requested one after another. The walk stops early when the
/// configured item cap is reached (the response then carries
/// `truncated: true`) or when the invocation deadline passes (an error,
/// never a partial list).
pub async fn list_all(inv: &Invocation<'_>) -> Result<ProxyResponse, ApiError> {
    let page_size = inv.config().scan_page_size;
    let max_items = inv.config().scan_max_items;

    let mut items = Vec::new();
    let mut token: Option<String> = None;
    let mut pages = 0usize;

    let truncated = loop {
        if inv.expired() {
            tracing::warn!("Scan abandoned after {} pages: deadline exceeded", pages);
            return Err(ApiError::DeadlineExceeded);
        }

        let limit = page_size.min(max_items - items.len());
        let page = inv.call(inv.store().scan(token.as_deref(), limit)).await?;
        pages += 1;
        items.extend(page.items);

        if items.len() > max_items {
            items.truncate(max_items);
            break true;
        }

        match page.next {
            None => break false,
            Some(_) if items.len() >= max_items => break true,
            Some(next) => token = Some(next),
        }
    };

    tracing::info!(
        "Listed {} records in {} pages (truncated: {})",
        items.len(),
        pages,
        truncated
    );

    Ok(ProxyResponse::json(
        StatusCode::OK,
        &ListResponse {
            csr: items,
            truncated,
        },
    ))
}
