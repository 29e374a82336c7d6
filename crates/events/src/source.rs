//! Time and identifier sources for new events.

use std::sync::Arc;
use time::OffsetDateTime;
use updates_core::TelemetryEvent;
use uuid::Uuid;

/// Supplies event timestamps.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> OffsetDateTime;
}

/// Supplies event identifiers.
pub trait IdSource: Send + Sync + 'static {
    fn next_id(&self) -> Uuid;
}

/// Wall clock, in UTC.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

/// Random version 4 UUIDs.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomIdSource;

impl IdSource for RandomIdSource {
    fn next_id(&self) -> Uuid {
        Uuid::new_v4()
    }
}

/// Always returns the same instant.
#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub OffsetDateTime);

impl Clock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        self.0
    }
}

/// Always returns the same identifier.
#[derive(Clone, Copy, Debug)]
pub struct FixedIdSource(pub Uuid);

impl IdSource for FixedIdSource {
    fn next_id(&self) -> Uuid {
        self.0
    }
}

/// Builds events stamped with a fresh id and the current time.
#[derive(Clone)]
pub struct EventSources {
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdSource>,
}

impl EventSources {
    pub fn new(clock: Arc<dyn Clock>, ids: Arc<dyn IdSource>) -> Self {
        Self { clock, ids }
    }

    /// Wall clock and random ids.
    pub fn system() -> Self {
        Self::new(Arc::new(SystemClock), Arc::new(RandomIdSource))
    }

    /// Fixed time and id, for reproducible keys.
    pub fn fixed(now: OffsetDateTime, id: Uuid) -> Self {
        Self::new(Arc::new(FixedClock(now)), Arc::new(FixedIdSource(id)))
    }

    pub fn latest_version_check(&self, user_agent: &str) -> TelemetryEvent {
        TelemetryEvent::latest_version_check(self.ids.next_id(), self.clock.now(), user_agent)
    }

    pub fn file_download(&self, user_agent: &str, version: &str, file_name: &str) -> TelemetryEvent {
        TelemetryEvent::file_download(
            self.ids.next_id(),
            self.clock.now(),
            user_agent,
            version,
            file_name,
        )
    }
}

impl Default for EventSources {
    fn default() -> Self {
        Self::system()
    }
}
