//! Proxy event and response envelopes.
//!
//! These follow the API Gateway REST proxy integration format: the request
//! arrives as an event describing method, matched resource, parameters and
//! raw body, and the function answers with a status code, headers and a
//! JSON-encoded body string.

use std::collections::HashMap;

use axum::{
    http::{HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

/// Inbound proxy event
#[derive(Debug, Clone, Default, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProxyRequest {
    pub http_method: String,
    /// Matched resource template, e.g. `/csr/{ticketID}`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    /// Concrete request path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default)]
    pub path_parameters: Option<HashMap<String, String>>,
    #[serde(default)]
    pub query_string_parameters: Option<HashMap<String, String>>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub is_base64_encoded: bool,
    #[serde(default)]
    pub request_context: RequestContext,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RequestContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl ProxyRequest {
    /// The resource path used for routing.
    ///
    /// Prefers `requestContext.resourcePath`, then `resource`, then the raw `path`.
    pub fn resource_path(&self) -> &str {
        self.request_context
            .resource_path
            .as_deref()
            .or(self.resource.as_deref())
            .or(self.path.as_deref())
            .unwrap_or_default()
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query_string_parameters
            .as_ref()
            .and_then(|params| params.get(name))
            .map(String::as_str)
    }

    /// The path parameter `name`, or the only path parameter when there is exactly one.
    pub fn path_param(&self, name: &str) -> Option<&str> {
        let params = self.path_parameters.as_ref()?;
        if let Some(value) = params.get(name) {
            return Some(value.as_str());
        }
        if params.len() == 1 {
            return params.values().next().map(String::as_str);
        }
        None
    }
}

/// Outbound proxy response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProxyResponse {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    /// JSON-encoded body
    pub body: String,
}

impl ProxyResponse {
    /// Builds a JSON response; a body that fails to serialize becomes a 500.
    pub fn json<T: Serialize>(status: StatusCode, body: &T) -> Self {
        match serde_json::to_string(body) {
            Ok(body) => Self::with_body(status, body),
            Err(e) => {
                tracing::error!("Failed to serialize response body: {}", e);
                Self::with_body(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    r#"{"Message":"FAILURE","Error":"response serialization failed"}"#.to_string(),
                )
            }
        }
    }

    fn with_body(status: StatusCode, body: String) -> Self {
        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        Self {
            status_code: status.as_u16(),
            headers,
            body,
        }
    }

    /// Parses the body back into JSON.
    #[cfg(test)]
    pub fn body_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::from_str(&self.body)
    }
}

impl IntoResponse for ProxyResponse {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = (status, self.body).into_response();
        let headers = response.headers_mut();
        for (name, value) in &self.headers {
            if let (Ok(name), Ok(value)) = (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                headers.insert(name, value);
            }
        }
        response
    }
}
