//! Background event dispatch.
//!
//! Handlers build the event (so its timestamp is the request time) and push it
//! onto a bounded queue; a single worker task drains the queue into the store.
//! When the queue is full the event is dropped and counted rather than making
//! the request wait.

use crate::metrics::EVENTS_DROPPED;
use crate::sink::EventSink;
use crate::source::EventSources;
use crate::writer::EventWriter;
use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use updates_core::TelemetryEvent;

/// Enqueues events for an [`EventWorker`].
#[derive(Clone)]
pub struct QueuedEventSink {
    tx: mpsc::Sender<TelemetryEvent>,
    sources: EventSources,
}

impl QueuedEventSink {
    /// Start a worker writing through `writer` and return the sink feeding it.
    ///
    /// Must be called within a Tokio runtime. `capacity` is clamped to at least 1.
    pub fn spawn(
        writer: EventWriter,
        sources: EventSources,
        capacity: usize,
    ) -> (Self, EventWorkerHandle) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let worker = EventWorker { rx, writer };
        let join = tokio::spawn(worker.run(shutdown_rx));

        (
            Self { tx, sources },
            EventWorkerHandle {
                shutdown: shutdown_tx,
                join,
            },
        )
    }

    fn enqueue(&self, event: TelemetryEvent) {
        let event_type = event.kind().as_str();
        match self.tx.try_send(event) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                EVENTS_DROPPED.with_label_values(&[event_type]).inc();
                tracing::warn!(event_type, "Telemetry event queue full, dropping event");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                EVENTS_DROPPED.with_label_values(&[event_type]).inc();
                tracing::warn!(event_type, "Telemetry event worker stopped, dropping event");
            }
        }
    }
}

#[async_trait]
impl EventSink for QueuedEventSink {
    async fn post_latest_version_check(&self, user_agent: &str) {
        self.enqueue(self.sources.latest_version_check(user_agent));
    }

    async fn post_file_download(&self, user_agent: &str, version: &str, file_name: &str) {
        self.enqueue(self.sources.file_download(user_agent, version, file_name));
    }
}

/// Drains the event queue into the store.
pub struct EventWorker {
    rx: mpsc::Receiver<TelemetryEvent>,
    writer: EventWriter,
}

impl EventWorker {
    async fn run(mut self, mut shutdown: oneshot::Receiver<()>) {
        loop {
            tokio::select! {
                biased;
                received = self.rx.recv() => match received {
                    Some(event) => self.writer.record(&event).await,
                    None => break,
                },
                _ = &mut shutdown => {
                    self.drain().await;
                    break;
                }
            }
        }
        tracing::debug!("Telemetry event worker stopped");
    }

    /// Stop accepting events and write whatever is already queued.
    async fn drain(&mut self) {
        self.rx.close();
        let mut drained = 0usize;
        while let Some(event) = self.rx.recv().await {
            self.writer.record(&event).await;
            drained += 1;
        }
        if drained > 0 {
            tracing::info!(drained, "Wrote queued telemetry events before shutdown");
        }
    }
}

/// Controls a running [`EventWorker`].
///
/// Dropping the handle without calling [`shutdown`](Self::shutdown) also stops
/// the worker once the queue has been drained, but nothing waits for it.
pub struct EventWorkerHandle {
    shutdown: oneshot::Sender<()>,
    join: JoinHandle<()>,
}

impl EventWorkerHandle {
    /// Stop the worker after every queued event has been written.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(());
        if let Err(e) = self.join.await {
            tracing::error!(error = %e, "Telemetry event worker panicked");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use time::macros::datetime;
    use updates_storage::{MemoryBackend, ObjectStore};
    use uuid::Uuid;

    #[tokio::test]
    async fn shutdown_writes_queued_events() {
        let store = Arc::new(MemoryBackend::new());
        let (sink, handle) = QueuedEventSink::spawn(
            EventWriter::new(store.clone()),
            EventSources::system(),
            16,
        );

        for _ in 0..5 {
            sink.post_latest_version_check("agent").await;
        }
        sink.post_file_download("agent", "1.2.3", "batect-1.2.3.jar")
            .await;
        handle.shutdown().await;

        let keys = store.keys().await;
        assert_eq!(keys.len(), 6);
        assert_eq!(
            keys.iter().filter(|k| k.starts_with("v1/latest/")).count(),
            5
        );
        assert_eq!(
            keys.iter().filter(|k| k.starts_with("v1/files/")).count(),
            1
        );
    }

    #[tokio::test]
    async fn events_after_shutdown_are_dropped() {
        let store = Arc::new(MemoryBackend::new());
        let (sink, handle) =
            QueuedEventSink::spawn(EventWriter::new(store.clone()), EventSources::system(), 4);

        handle.shutdown().await;
        sink.post_latest_version_check("agent").await;

        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn event_time_is_taken_when_posted() {
        let store = Arc::new(MemoryBackend::new());
        let id = Uuid::parse_str("11112222-3333-4444-5555-666677778888").unwrap();
        let (sink, handle) = QueuedEventSink::spawn(
            EventWriter::new(store.clone()),
            EventSources::fixed(datetime!(2021-03-01 09:54:40 UTC), id),
            4,
        );

        sink.post_latest_version_check("agent").await;
        handle.shutdown().await;

        assert!(
            store
                .exists("v1/latest/2021/03/01/11112222-3333-4444-5555-666677778888.json")
                .await
                .unwrap()
        );
    }
}
