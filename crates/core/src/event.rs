//! Telemetry events and their storage layout.
//!
//! Events are stored one object per event under
//! `<prefix>/<YYYY>/<MM>/<DD>/<event_id>.json`, partitioned by event type and
//! by the UTC calendar day of the event timestamp.

use serde::Serialize;
use time::{OffsetDateTime, UtcOffset};
use uuid::Uuid;

/// Event type discriminator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A client asked for the latest version descriptor.
    LatestVersionCheck,
    /// A client was redirected to a release artifact.
    FileDownload,
}

impl EventKind {
    /// Storage key prefix for this event type.
    pub fn key_prefix(self) -> &'static str {
        match self {
            Self::LatestVersionCheck => "v1/latest",
            Self::FileDownload => "v1/files",
        }
    }

    /// Stable name used in logs and metric labels.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LatestVersionCheck => "latest_version_check",
            Self::FileDownload => "file_download",
        }
    }
}

/// Recorded when the latest version descriptor is served.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestVersionCheckEvent {
    pub event_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub user_agent: String,
}

/// Recorded when a client is redirected to a release artifact.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDownloadEvent {
    pub event_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub user_agent: String,
    pub version: String,
    pub file_name: String,
}

/// A telemetry event, write-once once persisted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TelemetryEvent {
    LatestVersionCheck(LatestVersionCheckEvent),
    FileDownload(FileDownloadEvent),
}

impl TelemetryEvent {
    /// Build a latest-version-check event. The timestamp is normalised to UTC.
    pub fn latest_version_check(
        event_id: Uuid,
        timestamp: OffsetDateTime,
        user_agent: impl Into<String>,
    ) -> Self {
        Self::LatestVersionCheck(LatestVersionCheckEvent {
            event_id,
            timestamp: timestamp.to_offset(UtcOffset::UTC),
            user_agent: user_agent.into(),
        })
    }

    /// Build a file-download event. The timestamp is normalised to UTC.
    pub fn file_download(
        event_id: Uuid,
        timestamp: OffsetDateTime,
        user_agent: impl Into<String>,
        version: impl Into<String>,
        file_name: impl Into<String>,
    ) -> Self {
        Self::FileDownload(FileDownloadEvent {
            event_id,
            timestamp: timestamp.to_offset(UtcOffset::UTC),
            user_agent: user_agent.into(),
            version: version.into(),
            file_name: file_name.into(),
        })
    }

    pub fn kind(&self) -> EventKind {
        match self {
            Self::LatestVersionCheck(_) => EventKind::LatestVersionCheck,
            Self::FileDownload(_) => EventKind::FileDownload,
        }
    }

    pub fn event_id(&self) -> Uuid {
        match self {
            Self::LatestVersionCheck(event) => event.event_id,
            Self::FileDownload(event) => event.event_id,
        }
    }

    pub fn timestamp(&self) -> OffsetDateTime {
        match self {
            Self::LatestVersionCheck(event) => event.timestamp,
            Self::FileDownload(event) => event.timestamp,
        }
    }

    /// Deterministic storage key for this event.
    pub fn storage_key(&self) -> String {
        let timestamp = self.timestamp().to_offset(UtcOffset::UTC);
        format!(
            "{}/{}/{:02}/{:02}/{}.json",
            self.kind().key_prefix(),
            timestamp.year(),
            u8::from(timestamp.month()),
            timestamp.day(),
            self.event_id().hyphenated()
        )
    }

    /// Uncompressed JSON payload.
    pub fn to_json(&self) -> crate::Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}
