//! Release file download redirects.

use crate::error::{ApiError, ApiResult};
use crate::guard::require_method;
use crate::handlers::common::user_agent;
use crate::metrics::FILE_REDIRECTS;
use crate::state::AppState;
use axum::extract::State;
use axum::http::header::{CACHE_CONTROL, LOCATION};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use percent_encoding::percent_decode_str;
use updates_core::ArtifactReference;

const NO_STORE: &str = "no-store, max-age=0";

/// GET /v1/files/{version}/batect-{version}.jar
///
/// Redirects to the release asset. The path is matched after percent-decoding.
/// Any other path under `/v1/files/`, including one whose two versions
/// differ, is a plain 404.
pub async fn get_file(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> ApiResult<Response> {
    require_method(Method::GET, &method)?;

    let path = percent_decode_str(uri.path()).decode_utf8().map_err(|e| {
        tracing::debug!(path = uri.path(), error = %e, "Path is not valid UTF-8 once decoded");
        ApiError::NotFound
    })?;

    let artifact = ArtifactReference::from_path(&path).map_err(|e| {
        tracing::debug!(path = %path, reason = %e, "Path does not name a release file");
        ApiError::NotFound
    })?;

    let location = artifact.download_url(&state.config.downloads.release_base_url);
    let location = HeaderValue::from_str(&location).map_err(|e| {
        tracing::error!(error = %e, location = %location, "Download URL is not a valid header value");
        ApiError::ServiceUnavailable
    })?;

    state
        .events
        .post_file_download(user_agent(&headers), artifact.version(), artifact.file_name())
        .await;
    FILE_REDIRECTS.inc();

    Ok((
        StatusCode::FOUND,
        [
            (LOCATION, location),
            (CACHE_CONTROL, HeaderValue::from_static(NO_STORE)),
        ],
    )
        .into_response())
}
