//! Telemetry event recording.
//!
//! Handlers report what happened through an [`EventSink`]. Sinks build the
//! event (fresh id, current time), gzip its JSON payload and store it with a
//! conditional create. Recording never fails the caller: problems are logged
//! and counted, then dropped.
//!
//! - [`StoreEventSink`] writes before returning.
//! - [`QueuedEventSink`] hands events to a background [`EventWorker`].

pub mod error;
pub mod metrics;
pub mod queue;
pub mod sink;
pub mod source;
pub mod writer;

pub use error::{EventError, EventResult};
pub use queue::{EventWorker, EventWorkerHandle, QueuedEventSink};
pub use sink::{EventSink, StoreEventSink};
pub use source::{Clock, EventSources, FixedClock, FixedIdSource, IdSource, RandomIdSource, SystemClock};
pub use writer::{EventWriter, WriteOutcome};
