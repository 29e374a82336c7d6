//! Service endpoints that are not part of the versioned API.

use crate::error::ApiResult;
use crate::guard::require_method;
use axum::http::{Method, StatusCode};

/// GET / - Liveness check used by load balancers.
pub async fn home(method: Method) -> ApiResult<StatusCode> {
    require_method(Method::GET, &method)?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /ping
pub async fn ping() -> &'static str {
    "pong"
}
