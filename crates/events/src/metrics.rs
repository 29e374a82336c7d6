//! Event recording counters.
//!
//! The counters are created here and registered by whoever owns the
//! Prometheus registry.

use prometheus::{IntCounterVec, Opts};
use std::sync::LazyLock;

pub static EVENTS_WRITTEN: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "updates_events_written_total",
            "Telemetry events stored, by event type",
        ),
        &["event_type"],
    )
    .expect("metric creation failed")
});

pub static EVENTS_DUPLICATE: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "updates_events_duplicate_total",
            "Telemetry events skipped because their key already existed, by event type",
        ),
        &["event_type"],
    )
    .expect("metric creation failed")
});

pub static EVENTS_FAILED: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "updates_events_failed_total",
            "Telemetry events that could not be stored, by event type",
        ),
        &["event_type"],
    )
    .expect("metric creation failed")
});

pub static EVENTS_DROPPED: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "updates_events_dropped_total",
            "Telemetry events discarded before reaching the writer, by event type",
        ),
        &["event_type"],
    )
    .expect("metric creation failed")
});

/// All event counters, for registration.
pub fn collectors() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(EVENTS_WRITTEN.clone()),
        Box::new(EVENTS_DUPLICATE.clone()),
        Box::new(EVENTS_FAILED.clone()),
        Box::new(EVENTS_DROPPED.clone()),
    ]
}
