//! Integration tests for the latest version descriptor endpoint.

mod common;

use axum::http::{Method, StatusCode};
use common::{
    DESCRIPTOR_JSON, FailingDescriptorStore, RecordedEvent, StaticDescriptorStore, TestServer,
};
use std::sync::Arc;

#[tokio::test]
async fn serves_descriptor_verbatim_with_declared_content_type() {
    let server = TestServer::new();

    let response = server
        .request(Method::GET, "/v1/latest", Some("MyCoolThing/1.2.3"))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.header("content-type"), Some("application/json"));
    assert_eq!(response.body.as_ref(), DESCRIPTOR_JSON);
    assert_eq!(
        server.events.events(),
        vec![RecordedEvent::LatestVersionCheck {
            user_agent: "MyCoolThing/1.2.3".to_string()
        }]
    );
}

#[tokio::test]
async fn content_type_is_passed_through_not_inferred() {
    let store = Arc::new(StaticDescriptorStore::new(
        b"{\"version\":\"1.0.0\"}",
        "text/plain; charset=utf-8",
    ));
    let server = TestServer::with_descriptors(store);

    let response = server.get("/v1/latest").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.header("content-type"),
        Some("text/plain; charset=utf-8")
    );
    assert_eq!(response.text(), "{\"version\":\"1.0.0\"}");
}

#[tokio::test]
async fn every_request_fetches_the_descriptor() {
    let store = Arc::new(StaticDescriptorStore::new(DESCRIPTOR_JSON, "application/json"));
    let server = TestServer::with_descriptors(store.clone());

    server.get("/v1/latest").await;
    server.get("/v1/latest").await;

    assert_eq!(store.fetches(), 2);
    assert_eq!(server.events.events().len(), 2);
}

#[tokio::test]
async fn missing_user_agent_is_recorded_as_empty() {
    let server = TestServer::new();

    server.get("/v1/latest").await;

    assert_eq!(
        server.events.events(),
        vec![RecordedEvent::LatestVersionCheck {
            user_agent: String::new()
        }]
    );
}

#[tokio::test]
async fn store_failure_returns_service_unavailable_without_event() {
    let server = TestServer::with_descriptors(Arc::new(FailingDescriptorStore::default()));

    let response = server.get("/v1/latest").await;

    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.header("content-type"), Some("application/json"));
    assert_eq!(response.text(), r#"{"message":"Service unavailable"}"#);
    assert!(server.events.is_empty());
}

#[tokio::test]
async fn unusable_content_type_returns_service_unavailable() {
    let store = Arc::new(StaticDescriptorStore::new(
        DESCRIPTOR_JSON,
        "application/json\r\nX-Injected: yes",
    ));
    let server = TestServer::with_descriptors(store);

    let response = server.get("/v1/latest").await;

    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.text(), r#"{"message":"Service unavailable"}"#);
    assert!(response.headers.get("x-injected").is_none());
    assert!(server.events.is_empty());
}

#[tokio::test]
async fn other_methods_are_rejected_before_the_store_is_read() {
    let store = Arc::new(FailingDescriptorStore::default());
    let server = TestServer::with_descriptors(store.clone());

    for method in [Method::POST, Method::PUT, Method::DELETE, Method::PATCH] {
        let response = server.request(method.clone(), "/v1/latest", None).await;

        assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED, "{method}");
        assert_eq!(response.header("allow"), Some("GET"));
        assert_eq!(response.header("content-type"), Some("application/json"));
        assert_eq!(
            response.text(),
            r#"{"message":"This endpoint only supports GET requests"}"#
        );
    }

    assert_eq!(store.fetches(), 0);
    assert!(server.events.is_empty());
}
