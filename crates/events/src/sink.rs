//! The event sink seam used by request handlers.

use crate::source::EventSources;
use crate::writer::EventWriter;
use async_trait::async_trait;

/// Records telemetry about served requests.
///
/// Implementations never report failure to the caller; a response must not
/// depend on whether its event was stored.
#[async_trait]
pub trait EventSink: Send + Sync + 'static {
    /// A client fetched the latest version descriptor.
    async fn post_latest_version_check(&self, user_agent: &str);

    /// A client was redirected to `file_name` of release `version`.
    async fn post_file_download(&self, user_agent: &str, version: &str, file_name: &str);
}

/// Writes each event before returning.
#[derive(Clone)]
pub struct StoreEventSink {
    writer: EventWriter,
    sources: EventSources,
}

impl StoreEventSink {
    pub fn new(writer: EventWriter, sources: EventSources) -> Self {
        Self { writer, sources }
    }
}

#[async_trait]
impl EventSink for StoreEventSink {
    async fn post_latest_version_check(&self, user_agent: &str) {
        let event = self.sources.latest_version_check(user_agent);
        self.writer.record(&event).await;
    }

    async fn post_file_download(&self, user_agent: &str, version: &str, file_name: &str) {
        let event = self.sources.file_download(user_agent, version, file_name);
        self.writer.record(&event).await;
    }
}
