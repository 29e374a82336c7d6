//! Server test utilities.

use super::descriptors::StaticDescriptorStore;
use super::events::RecordingEventSink;
use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode};
use bytes::Bytes;
use std::sync::Arc;
use tower::ServiceExt;
use updates_core::config::AppConfig;
use updates_events::EventSink;
use updates_server::{AppState, create_router};
use updates_storage::VersionDescriptorStore;

/// Descriptor body used by default.
#[allow(dead_code)]
pub const DESCRIPTOR_JSON: &[u8] = br#"{"version":"0.67.0","url":"https://github.com/batect/batect/releases/tag/0.67.0"}"#;

/// A router wired to in-memory fakes.
/// Note: #[allow(dead_code)] because each test file compiles common/ separately.
#[allow(dead_code)]
pub struct TestServer {
    pub router: axum::Router,
    pub events: Arc<RecordingEventSink>,
}

/// What came back from the router.
#[allow(dead_code)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

#[allow(dead_code)]
impl TestResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn text(&self) -> &str {
        std::str::from_utf8(&self.body).expect("response body is not UTF-8")
    }
}

#[allow(dead_code)]
impl TestServer {
    /// Serve `DESCRIPTOR_JSON` as `application/json` with default config.
    pub fn new() -> Self {
        Self::with_descriptors(Arc::new(StaticDescriptorStore::new(
            DESCRIPTOR_JSON,
            "application/json",
        )))
    }

    pub fn with_descriptors(descriptors: Arc<dyn VersionDescriptorStore>) -> Self {
        Self::with_config(descriptors, |_| {})
    }

    /// Create a test server with custom config modifications.
    pub fn with_config<F>(descriptors: Arc<dyn VersionDescriptorStore>, modifier: F) -> Self
    where
        F: FnOnce(&mut AppConfig),
    {
        let events = Arc::new(RecordingEventSink::default());
        let router = build_router(descriptors, events.clone(), modifier);
        Self { router, events }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.request(Method::GET, uri, None).await
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        user_agent: Option<&str>,
    ) -> TestResponse {
        send(&self.router, method, uri, user_agent).await
    }
}

/// Build a router around any event sink.
#[allow(dead_code)]
pub fn build_router<F>(
    descriptors: Arc<dyn VersionDescriptorStore>,
    events: Arc<dyn EventSink>,
    modifier: F,
) -> axum::Router
where
    F: FnOnce(&mut AppConfig),
{
    let mut config = AppConfig::default();
    modifier(&mut config);
    create_router(AppState::new(config, descriptors, events))
}

/// Send one request through `router`.
#[allow(dead_code)]
pub async fn send(
    router: &axum::Router,
    method: Method,
    uri: &str,
    user_agent: Option<&str>,
) -> TestResponse {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user_agent) = user_agent {
        builder = builder.header("User-Agent", user_agent);
    }

    let response = router
        .clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    TestResponse {
        status,
        headers,
        body,
    }
}
