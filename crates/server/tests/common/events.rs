//! Event sink fake.

use async_trait::async_trait;
use std::sync::Mutex;
use updates_events::EventSink;

/// An event as the handler posted it.
#[allow(dead_code)]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecordedEvent {
    LatestVersionCheck {
        user_agent: String,
    },
    FileDownload {
        user_agent: String,
        version: String,
        file_name: String,
    },
}

/// Keeps every posted event in memory.
#[derive(Default)]
pub struct RecordingEventSink {
    events: Mutex<Vec<RecordedEvent>>,
}

#[allow(dead_code)]
impl RecordingEventSink {
    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().unwrap().is_empty()
    }
}

#[async_trait]
impl EventSink for RecordingEventSink {
    async fn post_latest_version_check(&self, user_agent: &str) {
        self.events
            .lock()
            .unwrap()
            .push(RecordedEvent::LatestVersionCheck {
                user_agent: user_agent.to_string(),
            });
    }

    async fn post_file_download(&self, user_agent: &str, version: &str, file_name: &str) {
        self.events.lock().unwrap().push(RecordedEvent::FileDownload {
            user_agent: user_agent.to_string(),
            version: version.to_string(),
            file_name: file_name.to_string(),
        });
    }
}
