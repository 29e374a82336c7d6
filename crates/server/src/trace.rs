//! Request trace ids.

use axum::extract::Request;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use tracing::Instrument;
use uuid::Uuid;

/// Longer client-supplied ids are truncated.
const MAX_TRACE_ID_LEN: usize = 128;

/// Header set by Google Cloud load balancers: `TRACE_ID/SPAN_ID;o=OPTIONS`.
pub const CLOUD_TRACE_CONTEXT_HEADER: &str = "x-cloud-trace-context";

/// Header carrying a caller-chosen trace id; echoed on every response.
pub const TRACE_ID_HEADER: &str = "x-trace-id";

/// Trace ID for request correlation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TraceId(pub String);

impl TraceId {
    /// Generate a new random trace ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create a trace ID from a client-provided value.
    ///
    /// The value is truncated to `MAX_TRACE_ID_LEN` characters and anything
    /// outside printable ASCII is removed. An empty result gets a fresh id.
    pub fn from_client(value: &str) -> Self {
        let sanitized: String = value
            .chars()
            .take(MAX_TRACE_ID_LEN)
            .filter(|c| c.is_ascii_graphic() || *c == ' ')
            .collect();

        if sanitized.trim().is_empty() {
            Self::new()
        } else {
            Self(sanitized)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TraceId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TraceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Take the trace id from the cloud trace context, then `X-Trace-Id`, else generate one.
fn extract_or_generate_trace_id(req: &Request) -> TraceId {
    let header = |name: &str| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
    };

    if let Some(context) = header(CLOUD_TRACE_CONTEXT_HEADER) {
        let trace = context.split('/').next().unwrap_or(context);
        if !trace.is_empty() {
            return TraceId::from_client(trace);
        }
    }

    header(TRACE_ID_HEADER)
        .map(TraceId::from_client)
        .unwrap_or_else(TraceId::new)
}

/// Record a trace id on the request span and echo it on the response.
pub async fn trace_id_middleware(req: Request, next: Next) -> Response {
    let trace_id = extract_or_generate_trace_id(&req);
    let span = tracing::info_span!(
        "request",
        trace_id = %trace_id,
        method = %req.method(),
        path = %req.uri().path(),
    );

    let mut response = next.run(req).instrument(span).await;

    if let Ok(value) = HeaderValue::from_str(trace_id.as_str()) {
        response.headers_mut().insert(TRACE_ID_HEADER, value);
    }
    response
}
