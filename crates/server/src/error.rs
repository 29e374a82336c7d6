//! API error types.

use axum::http::header::{ALLOW, CONTENT_TYPE};
use axum::http::{HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// JSON body written for client-visible failures.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("This endpoint only supports {allowed} requests")]
    MethodNotAllowed { allowed: Method },

    #[error("Service unavailable")]
    ServiceUnavailable,

    #[error("not found")]
    NotFound,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::NotFound => StatusCode::NOT_FOUND,
        }
    }

    /// The JSON envelope for this error. Not-found responses have none.
    pub fn envelope(&self) -> Option<ErrorResponse> {
        match self {
            ApiError::NotFound => None,
            other => Some(ErrorResponse::new(other.to_string())),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let Some(body) = self.envelope() else {
            return status.into_response();
        };

        let mut response = envelope_response(status, &body);
        if let ApiError::MethodNotAllowed { allowed } = &self
            && let Ok(value) = HeaderValue::from_str(allowed.as_str())
        {
            response.headers_mut().insert(ALLOW, value);
        }
        response
    }
}

fn envelope_response(status: StatusCode, body: &ErrorResponse) -> Response {
    tracing::warn!(
        error_response = ?body,
        status_code = status.as_u16(),
        "Returning error response"
    );

    // A struct with one string field always serializes.
    let bytes = serde_json::to_vec(body)
        .unwrap_or_else(|e| panic!("could not serialize error response {body:?}: {e}"));

    (
        status,
        [(CONTENT_TYPE, HeaderValue::from_static("application/json"))],
        bytes,
    )
        .into_response()
}

/// Result type for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;
