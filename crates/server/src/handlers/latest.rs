//! Latest version descriptor endpoint.

use crate::error::{ApiError, ApiResult};
use crate::guard::require_method;
use crate::handlers::common::user_agent;
use crate::metrics::{DESCRIPTOR_FETCH_FAILURES, LATEST_DESCRIPTORS_SERVED};
use crate::state::AppState;
use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, HeaderValue, Method};
use axum::response::{IntoResponse, Response};

/// GET /v1/latest
///
/// Serves the stored descriptor byte-for-byte with the content type it was
/// stored with.
pub async fn get_latest(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
) -> ApiResult<Response> {
    require_method(Method::GET, &method)?;

    let descriptor = match state.descriptors.get_latest_version_descriptor().await {
        Ok(descriptor) => descriptor,
        Err(e) => {
            DESCRIPTOR_FETCH_FAILURES.inc();
            tracing::error!(error = %e, "Getting latest version descriptor failed");
            return Err(ApiError::ServiceUnavailable);
        }
    };

    let content_type = match HeaderValue::from_str(&descriptor.content_type) {
        Ok(value) => value,
        Err(e) => {
            DESCRIPTOR_FETCH_FAILURES.inc();
            tracing::error!(
                error = %e,
                content_type = %descriptor.content_type,
                "Latest version descriptor has an unusable content type"
            );
            return Err(ApiError::ServiceUnavailable);
        }
    };

    state
        .events
        .post_latest_version_check(user_agent(&headers))
        .await;
    LATEST_DESCRIPTORS_SERVED.inc();

    Ok(([(CONTENT_TYPE, content_type)], descriptor.content).into_response())
}
