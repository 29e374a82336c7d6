//! Persists events to an object store.

use crate::error::{EventError, EventResult};
use crate::metrics::{EVENTS_DUPLICATE, EVENTS_FAILED, EVENTS_WRITTEN};
use async_compression::tokio::write::GzipEncoder;
use bytes::Bytes;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tracing::instrument;
use updates_core::TelemetryEvent;
use updates_storage::{ObjectStore, PutOptions};

const EVENT_CONTENT_TYPE: &str = "application/json";
const EVENT_CONTENT_ENCODING: &str = "gzip";

/// Result of a successful write.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The event was stored under its key.
    Created,
    /// An object already existed under the key and was left untouched.
    AlreadyExists,
}

/// Writes each event once, gzip-compressed, under its storage key.
#[derive(Clone)]
pub struct EventWriter {
    store: Arc<dyn ObjectStore>,
}

impl EventWriter {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// Store `event` unless an object already exists under its key.
    #[instrument(skip_all, fields(event_type = event.kind().as_str(), event_id = %event.event_id()))]
    pub async fn write(&self, event: &TelemetryEvent) -> EventResult<WriteOutcome> {
        let body = gzip(&event.to_json()?)
            .await
            .map_err(EventError::Compression)?;

        let options = PutOptions::default()
            .with_content_type(EVENT_CONTENT_TYPE)
            .with_content_encoding(EVENT_CONTENT_ENCODING);

        let created = self
            .store
            .put_if_not_exists(&event.storage_key(), Bytes::from(body), &options)
            .await?;

        Ok(if created {
            WriteOutcome::Created
        } else {
            WriteOutcome::AlreadyExists
        })
    }

    /// Write `event`, logging and counting the outcome instead of returning it.
    pub async fn record(&self, event: &TelemetryEvent) {
        let event_type = event.kind().as_str();
        match self.write(event).await {
            Ok(WriteOutcome::Created) => {
                EVENTS_WRITTEN.with_label_values(&[event_type]).inc();
                tracing::debug!(
                    event_type,
                    key = %event.storage_key(),
                    "Telemetry event stored"
                );
            }
            Ok(WriteOutcome::AlreadyExists) => {
                EVENTS_DUPLICATE.with_label_values(&[event_type]).inc();
                tracing::debug!(
                    event_type,
                    key = %event.storage_key(),
                    "Telemetry event key already taken, keeping existing object"
                );
            }
            Err(e) => {
                EVENTS_FAILED.with_label_values(&[event_type]).inc();
                tracing::error!(
                    event_type,
                    event_id = %event.event_id(),
                    error = %e,
                    "Failed to store telemetry event"
                );
            }
        }
    }
}

async fn gzip(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = GzipEncoder::new(Vec::new());
    encoder.write_all(data).await?;
    encoder.shutdown().await?;
    Ok(encoder.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_compression::tokio::bufread::GzipDecoder;
    use time::macros::datetime;
    use tokio::io::AsyncReadExt;
    use updates_storage::MemoryBackend;
    use uuid::Uuid;

    async fn gunzip(data: &[u8]) -> Vec<u8> {
        let mut decoder = GzipDecoder::new(data);
        let mut out = Vec::new();
        decoder.read_to_end(&mut out).await.unwrap();
        out
    }

    fn sample_event(user_agent: &str) -> TelemetryEvent {
        TelemetryEvent::latest_version_check(
            Uuid::parse_str("11112222-3333-4444-5555-666677778888").unwrap(),
            datetime!(2021-03-01 09:54:40.123456789 UTC),
            user_agent,
        )
    }

    #[tokio::test]
    async fn stores_gzipped_json_under_event_key() {
        let store = Arc::new(MemoryBackend::new());
        let writer = EventWriter::new(store.clone());
        let event = sample_event("MyCoolThing/1.2.3");

        assert_eq!(writer.write(&event).await.unwrap(), WriteOutcome::Created);

        let object = store
            .get_object("v1/latest/2021/03/01/11112222-3333-4444-5555-666677778888.json")
            .await
            .unwrap();
        assert_eq!(object.meta.content_type.as_deref(), Some("application/json"));
        assert_eq!(object.meta.content_encoding.as_deref(), Some("gzip"));
        assert_eq!(gunzip(&object.data).await, event.to_json().unwrap());
    }

    #[tokio::test]
    async fn second_write_with_same_key_keeps_first_object() {
        let store = Arc::new(MemoryBackend::new());
        let writer = EventWriter::new(store.clone());
        let first = sample_event("first");
        let second = sample_event("second");

        assert_eq!(writer.write(&first).await.unwrap(), WriteOutcome::Created);
        assert_eq!(
            writer.write(&second).await.unwrap(),
            WriteOutcome::AlreadyExists
        );

        let stored = store.get(&first.storage_key()).await.unwrap();
        assert_eq!(gunzip(&stored).await, first.to_json().unwrap());
    }
}
