//! Prometheus metrics for the update gateway.
//!
//! The `/metrics` endpoint is unauthenticated. The counters carry no user
//! agents or versions, only aggregate request and event counts.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use prometheus::{self, Encoder, IntCounter, Registry, TextEncoder};
use std::sync::{LazyLock, Once};

/// Global Prometheus registry for all metrics.
pub static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

pub static LATEST_DESCRIPTORS_SERVED: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "updates_latest_descriptors_served_total",
        "Total number of latest version descriptors served",
    )
    .expect("metric creation failed")
});

pub static DESCRIPTOR_FETCH_FAILURES: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "updates_descriptor_fetch_failures_total",
        "Total number of failed latest version descriptor fetches",
    )
    .expect("metric creation failed")
});

pub static FILE_REDIRECTS: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "updates_file_redirects_total",
        "Total number of release file download redirects",
    )
    .expect("metric creation failed")
});

/// Guard to ensure metrics are only registered once.
static REGISTER_ONCE: Once = Once::new();

/// Register all metrics with the global registry.
///
/// Idempotent, so integration tests can build as many routers as they like.
pub fn register_metrics() {
    REGISTER_ONCE.call_once(|| {
        REGISTRY
            .register(Box::new(LATEST_DESCRIPTORS_SERVED.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(DESCRIPTOR_FETCH_FAILURES.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(FILE_REDIRECTS.clone()))
            .expect("metric registration failed");

        for collector in updates_events::metrics::collectors() {
            REGISTRY
                .register(collector)
                .expect("metric registration failed");
        }
    });
}

/// GET /metrics - Prometheus metrics endpoint.
pub async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();

    let mut buffer = Vec::new();
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(()) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            buffer,
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            [("content-type", "text/plain; charset=utf-8")],
            format!("Failed to encode metrics: {e}").into_bytes(),
        ),
    }
}
