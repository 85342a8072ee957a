//! Route table and dispatcher.
//!
//! Every inbound event, whatever surface it came through, is matched here
//! on `(method, resource shape)` and handed to exactly one operation. The
//! dispatcher always produces a response: operation errors are rendered
//! into the failure envelope of the operation that raised them.

use axum::http::StatusCode;
use tracing::Instrument;
use uuid::Uuid;

use crate::error::ApiError;
use crate::handlers;
use crate::models::Operation;
use crate::proxy::{ProxyRequest, ProxyResponse};
use crate::routes;
use crate::state::AppState;

/// What a matched route does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// `GET /csr`: read by the `id` query parameter, or list-all without one
    ReadOrList,
    /// GET on an identifier-addressed shape, naming its path parameter
    ReadByPath(&'static str),
    Create,
    Update,
    Delete,
}

impl Route {
    fn operation(self, request: &ProxyRequest) -> Operation {
        match self {
            Route::ReadOrList if request.query_param("id").is_none() => Operation::List,
            Route::ReadOrList | Route::ReadByPath(_) => Operation::Get,
            Route::Create => Operation::Save,
            Route::Update => Operation::Update,
            Route::Delete => Operation::Delete,
        }
    }
}

/// Exact match of method and resource shape against the route table
pub fn match_route(method: &str, resource_path: &str) -> Option<Route> {
    match (method, resource_path) {
        ("GET", routes::CSR) => Some(Route::ReadOrList),
        ("GET", routes::CSR_TICKET) => Some(Route::ReadByPath("ticketID")),
        ("GET", routes::CSR_REP) => Some(Route::ReadByPath("repID")),
        ("GET", routes::CSR_CUSTOMER) => Some(Route::ReadByPath("customerID")),
        ("POST", routes::CSR) => Some(Route::Create),
        ("PATCH", routes::CSR) => Some(Route::Update),
        ("DELETE", routes::CSR) => Some(Route::Delete),
        _ => None,
    }
}

/// Handles one proxy event
pub async fn dispatch(state: &AppState, request: ProxyRequest) -> ProxyResponse {
    let request_id = request
        .request_context
        .request_id
        .clone()
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    let span = tracing::info_span!(
        "invocation",
        method = %request.http_method,
        resource = %request.resource_path(),
        request_id = %request_id,
    );

    handle(state, &request).instrument(span).await
}

async fn handle(state: &AppState, request: &ProxyRequest) -> ProxyResponse {
    tracing::info!("Request event method: {}", request.http_method);
    if let Ok(payload) = serde_json::to_string_pretty(request) {
        tracing::debug!("Request event:\n{}", payload);
    }

    let resource_path = request.resource_path();
    let Some(route) = match_route(&request.http_method, resource_path) else {
        return unmatched(request);
    };

    let operation = route.operation(request);
    run(state, route, request)
        .await
        .unwrap_or_else(|err| err.into_proxy_response(operation))
}

/// Answers a request whose input could not be turned into a complete event
///
/// Routing still decides first: an unmatched route is a 404 whatever its input.
pub fn reject(request: &ProxyRequest, err: ApiError) -> ProxyResponse {
    match match_route(&request.http_method, request.resource_path()) {
        Some(route) => err.into_proxy_response(route.operation(request)),
        None => unmatched(request),
    }
}

fn unmatched(request: &ProxyRequest) -> ProxyResponse {
    let resource_path = request.resource_path();
    tracing::info!("No route for {} {}", request.http_method, resource_path);
    ProxyResponse::json(StatusCode::NOT_FOUND, &resource_path)
}

async fn run(
    state: &AppState,
    route: Route,
    request: &ProxyRequest,
) -> Result<ProxyResponse, ApiError> {
    if request.is_base64_encoded && request.body.is_some() {
        return Err(ApiError::EncodedBody);
    }

    let inv = state.invocation();
    let body = request.body.as_deref();

    match route {
        Route::ReadOrList => match request.query_param("id") {
            Some(id) => handlers::read_by_identifier(&inv, Some(id)).await,
            None => handlers::list_all(&inv).await,
        },
        Route::ReadByPath(param) => {
            handlers::read_by_identifier(&inv, request.path_param(param)).await
        }
        Route::Create => handlers::create(&inv, body).await,
        Route::Update => handlers::update_attribute(&inv, body).await,
        Route::Delete => handlers::delete_by_identifier(&inv, request.query_param("id")).await,
    }
}
