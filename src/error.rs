use axum::http::StatusCode;

use crate::models::{FailureResponse, NotFoundResponse, Operation, Outcome};
use crate::proxy::ProxyResponse;
use crate::store::StoreError;

/// Error type for record operations
///
/// Every variant maps to exactly one status code and is rendered into the
/// operation's failure envelope, so a failed operation still produces a
/// well-formed response.
#[derive(Debug)]
pub enum ApiError {
    /// Request body missing, not JSON, or not a JSON object
    InvalidBody(String),
    /// Event body flagged as base64-encoded
    EncodedBody,
    /// No identifier supplied
    MissingIdentifier,
    /// Identifier supplied but not a usable key
    InvalidIdentifier(String),
    /// Query string or path could not be decoded
    InvalidParameters(String),
    /// Bad `updateKey` / `updateValue`
    InvalidUpdate(String),
    /// No record stored under the identifier
    RecordNotFound(String),
    /// Store operation failed
    Store(StoreError),
    /// The invocation deadline passed before the store answered
    DeadlineExceeded,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidBody(_)
            | ApiError::EncodedBody
            | ApiError::MissingIdentifier
            | ApiError::InvalidIdentifier(_)
            | ApiError::InvalidParameters(_)
            | ApiError::InvalidUpdate(_) => StatusCode::BAD_REQUEST,
            ApiError::RecordNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::DeadlineExceeded => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    pub fn message(&self) -> String {
        match self {
            ApiError::InvalidBody(msg) => format!("Invalid request body: {}", msg),
            ApiError::EncodedBody => "Base64-encoded request bodies are not supported".to_string(),
            ApiError::MissingIdentifier => "Missing record identifier 'id'".to_string(),
            ApiError::InvalidIdentifier(msg) => format!("Invalid record identifier: {}", msg),
            ApiError::InvalidParameters(msg) => format!("Invalid request parameters: {}", msg),
            ApiError::InvalidUpdate(msg) => format!("Invalid update: {}", msg),
            ApiError::RecordNotFound(id) => format!("Record not found: {}", id),
            ApiError::Store(err) => format!("Store error: {}", err),
            ApiError::DeadlineExceeded => "Request deadline exceeded".to_string(),
        }
    }

    /// Renders the error as the response for `operation`.
    pub fn into_proxy_response(self, operation: Operation) -> ProxyResponse {
        let status = self.status();
        match self {
            ApiError::RecordNotFound(id) => ProxyResponse::json(
                status,
                &NotFoundResponse {
                    operation,
                    message: Outcome::NotFound,
                    id,
                },
            ),
            other => {
                if status.is_server_error() {
                    tracing::error!("{:?} failed: {}", operation, other.message());
                } else {
                    tracing::warn!("{:?} rejected: {}", operation, other.message());
                }
                ProxyResponse::json(
                    status,
                    &FailureResponse {
                        operation,
                        message: Outcome::Failure,
                        error: other.message(),
                    },
                )
            }
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Store(err)
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::InvalidBody(err.to_string())
    }
}
