use utoipa::OpenApi;

use crate::handlers;
use crate::models::{
    DeleteResponse, FailureResponse, HealthResponse, InvalidEventResponse, ListResponse,
    NotFoundResponse, Operation, Outcome, SaveResponse, UnhealthyResponse, UpdateResponse,
};
use crate::proxy::{ProxyRequest, ProxyResponse, RequestContext};

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "csr-record-proxy API",
        version = "1.0.0",
        description = "Single-table CRUD proxy for CSR records (tickets, reps, customers)"
    ),
    paths(
        handlers::health::health_handler,
        handlers::invoke::invoke_handler,
        handlers::invoke::csr_item_handler
    ),
    components(
        schemas(
            ProxyRequest,
            RequestContext,
            ProxyResponse,
            Operation,
            Outcome,
            SaveResponse,
            UpdateResponse,
            DeleteResponse,
            ListResponse,
            NotFoundResponse,
            FailureResponse,
            InvalidEventResponse,
            HealthResponse,
            UnhealthyResponse
        )
    ),
    tags(
        (name = "health", description = "Health check operations"),
        (name = "function", description = "Proxy event invocation"),
        (name = "csr", description = "CSR record operations")
    )
)]
pub struct ApiDoc;
