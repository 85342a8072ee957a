use serde::{Deserialize, Serialize};

use crate::store::Record;

/// Operation name echoed in response envelopes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Operation {
    Get,
    List,
    Save,
    Update,
    Delete,
}

/// Outcome marker carried in the `Message` field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    Success,
    Failure,
    NotFound,
}

/// Body for a successful create
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "PascalCase")]
pub struct SaveResponse {
    pub operation: Operation,
    pub message: Outcome,
    /// The submitted record, as received
    #[schema(value_type = Object)]
    pub item: Record,
}

/// Body for a successful partial update
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateResponse {
    pub operation: Operation,
    pub message: Outcome,
    /// Updated attributes after the write
    #[schema(value_type = Object)]
    pub updated_attributes: Record,
}

/// Body for a delete; `Item` is null when nothing was stored under the identifier
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "PascalCase")]
pub struct DeleteResponse {
    pub operation: Operation,
    pub message: Outcome,
    #[schema(value_type = Option<Object>)]
    pub item: Option<Record>,
}

/// Body for list-all
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ListResponse {
    #[schema(value_type = Vec<Object>)]
    pub csr: Vec<Record>,
    /// Present and true when the item cap cut the scan short
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub truncated: bool,
}

/// Body for a read of an identifier with no record
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "PascalCase")]
pub struct NotFoundResponse {
    pub operation: Operation,
    pub message: Outcome,
    pub id: String,
}

/// Body for any failed operation
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "PascalCase")]
pub struct FailureResponse {
    pub operation: Operation,
    pub message: Outcome,
    pub error: String,
}

/// Body for an `/invoke` payload that is not a proxy event
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "PascalCase")]
pub struct InvalidEventResponse {
    pub message: Outcome,
    pub error: String,
}

/// Response type for health check endpoint
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

/// Response type for unhealthy status
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct UnhealthyResponse {
    pub status: String,
    pub error: String,
}
