//! HTTP entry points.
//!
//! `POST /invoke` takes a proxy event as-is. The native `/csr` routes build
//! the same event from a real HTTP request, so both surfaces share one
//! dispatcher and return identical responses.

use std::collections::HashMap;

use axum::{
    Json,
    body::Bytes,
    extract::{
        Path, Query, State,
        rejection::{PathRejection, QueryRejection},
    },
    http::{Method, StatusCode, Uri},
};

use crate::dispatch::{dispatch, reject};
use crate::error::ApiError;
use crate::models::{FailureResponse, InvalidEventResponse, NotFoundResponse, Outcome};
use crate::proxy::{ProxyRequest, ProxyResponse, RequestContext};
use crate::routes;
use crate::state::AppState;

type QueryParams = Result<Query<HashMap<String, String>>, QueryRejection>;

/// Alias so `utoipa::path` does not infer a request body schema for `Bytes`.
type RawBody = Bytes;

/// POST /invoke handler - Run one proxy event through the dispatcher
///
/// The payload is parsed as JSON whatever its content type.
#[utoipa::path(
    post,
    path = "/invoke",
    request_body = ProxyRequest,
    responses(
        (status = 200, description = "Proxy response for the event", body = ProxyResponse),
        (status = 400, description = "Payload is not a proxy event", body = InvalidEventResponse)
    ),
    tag = "function"
)]
pub async fn invoke_handler(
    State(state): State<AppState>,
    payload: Bytes,
) -> Result<Json<ProxyResponse>, ProxyResponse> {
    let event: ProxyRequest = serde_json::from_slice(&payload).map_err(|e| {
        tracing::warn!("Rejected invoke payload: {}", e);
        ProxyResponse::json(
            StatusCode::BAD_REQUEST,
            &InvalidEventResponse {
                message: Outcome::Failure,
                error: format!("Invalid proxy event: {}", e),
            },
        )
    })?;

    Ok(Json(dispatch(&state, event).await))
}

/// Any method on /csr
pub async fn csr_collection_handler(
    State(state): State<AppState>,
    method: Method,
    query: QueryParams,
    body: Bytes,
) -> ProxyResponse {
    let mut request = native_request(method, routes::CSR, routes::CSR);
    match attach_input(&mut request, query, body) {
        Ok(()) => dispatch(&state, request).await,
        Err(err) => reject(&request, err),
    }
}

/// GET /csr/{ticketID} handler - Read one record by path identifier
#[utoipa::path(
    get,
    path = "/csr/{ticketID}",
    params(
        ("ticketID" = String, Path, description = "Record identifier (ticket, rep or customer)")
    ),
    responses(
        (status = 200, description = "Record found", body = serde_json::Value),
        (status = 400, description = "Identifier cannot be decoded", body = FailureResponse),
        (status = 404, description = "No record with this identifier", body = NotFoundResponse),
        (status = 500, description = "Store error", body = FailureResponse),
        (status = 504, description = "Store did not answer in time", body = FailureResponse)
    ),
    tag = "csr"
)]
pub async fn csr_item_handler(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    ticket_id: Result<Path<String>, PathRejection>,
    body: RawBody,
) -> ProxyResponse {
    let mut request = native_request(method, routes::CSR_TICKET, uri.path());
    let Path(ticket_id) = match ticket_id {
        Ok(path) => path,
        Err(rejection) => {
            return reject(&request, ApiError::InvalidParameters(rejection.body_text()));
        }
    };
    request.path_parameters = Some(HashMap::from([("ticketID".to_string(), ticket_id)]));

    match attach_input(&mut request, Ok(Query(HashMap::new())), body) {
        Ok(()) => dispatch(&state, request).await,
        Err(err) => reject(&request, err),
    }
}

/// Any request no other route claims; dispatches as an unmatched resource
pub async fn unmatched_handler(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    query: QueryParams,
    body: Bytes,
) -> ProxyResponse {
    let mut request = native_request(method, uri.path(), uri.path());
    match attach_input(&mut request, query, body) {
        Ok(()) => dispatch(&state, request).await,
        Err(err) => reject(&request, err),
    }
}

fn native_request(method: Method, resource: &str, path: &str) -> ProxyRequest {
    ProxyRequest {
        http_method: method.as_str().to_string(),
        resource: Some(resource.to_string()),
        path: Some(path.to_string()),
        path_parameters: None,
        query_string_parameters: None,
        body: None,
        is_base64_encoded: false,
        request_context: RequestContext {
            resource_path: Some(resource.to_string()),
            request_id: None,
        },
    }
}

/// Copies the query string and body into the event; the body must be UTF-8
fn attach_input(
    request: &mut ProxyRequest,
    query: QueryParams,
    body: Bytes,
) -> Result<(), ApiError> {
    let Query(query) = query.map_err(|e| ApiError::InvalidParameters(e.body_text()))?;
    request.query_string_parameters = (!query.is_empty()).then_some(query);

    let body = String::from_utf8(body.to_vec())
        .map_err(|e| ApiError::InvalidBody(format!("body is not valid UTF-8: {}", e)))?;
    request.body = (!body.is_empty()).then_some(body);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::create_app;
    use crate::models::{DeleteResponse, FailureResponse, ListResponse, Operation, SaveResponse};
    use crate::testing::{FailingStore, memory_state, state_with};
    use axum::{body::Body, http::Request, http::StatusCode};
    use serde_json::json;
    use std::sync::Arc;
    use tower::ServiceExt;

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_invoke_endpoint_runs_event() {
        let app = create_app(memory_state());

        let event = json!({
            "httpMethod": "POST",
            "requestContext": {"resourcePath": "/csr"},
            "body": "{\"id\":\"t-1\",\"status\":\"open\"}"
        });

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/invoke")
                    .header("content-type", "application/json")
                    .body(Body::from(event.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let envelope: ProxyResponse =
            serde_json::from_value(body_json(response).await).unwrap();
        assert_eq!(envelope.status_code, 200);
        assert_eq!(envelope.headers["Content-Type"], "application/json");
        let saved: SaveResponse = serde_json::from_str(&envelope.body).unwrap();
        assert_eq!(saved.item["status"], json!("open"));
    }

    #[tokio::test]
    async fn test_invoke_unmatched_event() {
        let app = create_app(memory_state());

        let event = json!({"httpMethod": "PUT", "requestContext": {"resourcePath": "/csr"}});

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/invoke")
                    .header("content-type", "application/json")
                    .body(Body::from(event.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let envelope = body_json(response).await;
        assert_eq!(envelope["statusCode"], json!(404));
        assert_eq!(envelope["body"], json!("\"/csr\""));
    }

    #[tokio::test]
    async fn test_native_crud_flow() {
        let app = create_app(memory_state());

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/csr")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"id":"t-9","customer":"acme"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "application/json"
        );

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/csr/t-9")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({"id": "t-9", "customer": "acme"})
        );

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("PATCH")
                    .uri("/csr")
                    .body(Body::from(
                        r#"{"id":"t-9","updateKey":"customer","updateValue":"globex"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/csr")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let listed: ListResponse = serde_json::from_value(body_json(response).await).unwrap();
        assert_eq!(listed.csr.len(), 1);
        assert_eq!(listed.csr[0]["customer"], json!("globex"));

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/csr?id=t-9")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let deleted: DeleteResponse = serde_json::from_value(body_json(response).await).unwrap();
        assert_eq!(deleted.item.unwrap()["customer"], json!("globex"));

        let response = app
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/csr?id=t-9")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_native_unsupported_method_is_not_found() {
        let app = create_app(memory_state());

        let response = app
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/csr")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"\"/csr\"");
    }

    #[tokio::test]
    async fn test_native_unknown_path_is_not_found() {
        let app = create_app(memory_state());

        let response = app
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/tickets/1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await, json!("/tickets/1"));
    }

    #[tokio::test]
    async fn test_native_store_failure() {
        let app = create_app(state_with(Arc::new(FailingStore)));

        let response = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/csr?id=t-1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let failure: FailureResponse = serde_json::from_value(body_json(response).await).unwrap();
        assert!(failure.error.contains("injected failure"));
    }

    #[tokio::test]
    async fn test_native_body_must_be_utf8() {
        let app = create_app(memory_state());

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/csr")
                    .body(Body::from(vec![0xff, 0xfe, b'{']))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "application/json"
        );
        let failure: FailureResponse = serde_json::from_value(body_json(response).await).unwrap();
        assert_eq!(failure.operation, Operation::Save);
        assert_eq!(failure.message, Outcome::Failure);
        assert!(failure.error.contains("UTF-8"));
    }

    #[tokio::test]
    async fn test_native_undecodable_identifier() {
        let app = create_app(memory_state());

        let response = app
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/csr/%FF")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "application/json"
        );
        let failure: FailureResponse = serde_json::from_value(body_json(response).await).unwrap();
        assert_eq!(failure.operation, Operation::Get);
    }

    #[tokio::test]
    async fn test_invoke_ignores_content_type() {
        let app = create_app(memory_state());

        let event = json!({"httpMethod": "GET", "requestContext": {"resourcePath": "/csr"}});

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/invoke")
                    .body(Body::from(event.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let envelope = body_json(response).await;
        assert_eq!(envelope["statusCode"], json!(200));
        assert_eq!(envelope["body"], json!("{\"csr\":[]}"));
    }

    #[tokio::test]
    async fn test_invoke_rejects_non_event_payload() {
        let app = create_app(memory_state());

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/invoke")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"path": "/csr"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "application/json"
        );
        let body = body_json(response).await;
        assert_eq!(body["Message"], json!("FAILURE"));
        assert!(body["Error"].as_str().unwrap().contains("httpMethod"));
    }
}
