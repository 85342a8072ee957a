use axum::{
    Json, Router,
    routing::{any, get, post},
};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::api_doc::ApiDoc;
use crate::handlers::{
    csr_collection_handler, csr_item_handler, health_handler, invoke_handler, unmatched_handler,
};
use crate::routes;
use crate::state::AppState;

/// Create the application router with all routes and middleware.
///
/// `/csr` routes accept every method; the dispatcher decides what is
/// supported, so an unsupported method gets the same 404 as an unknown path.
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route(routes::HEALTH, get(health_handler))
        .route(routes::OPENAPI, get(|| async { Json(ApiDoc::openapi()) }))
        .route(routes::INVOKE, post(invoke_handler))
        .route(routes::CSR, any(csr_collection_handler))
        .route(routes::CSR_TICKET, any(csr_item_handler))
        .fallback(unmatched_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
