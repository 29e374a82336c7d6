//! Shared handler helpers.

use axum::http::HeaderMap;
use axum::http::header::USER_AGENT;

/// The request's `User-Agent`, or an empty string when absent or not valid UTF-8.
pub fn user_agent(headers: &HeaderMap) -> &str {
    headers
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}
