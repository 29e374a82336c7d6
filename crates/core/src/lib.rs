//! Core domain types for the update gateway.
//!
//! This crate defines the data model shared by the other crates:
//! - Configuration for the server, descriptor store and event sink
//! - Versioned artifact addressing (`/v1/files/{version}/batect-{version}.jar`)
//! - The latest-version descriptor value
//! - Telemetry events and their storage layout

pub mod artifact;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod event;

pub use artifact::{ArtifactPathError, ArtifactReference};
pub use descriptor::VersionDescriptor;
pub use error::{Error, Result};
pub use event::{EventKind, FileDownloadEvent, LatestVersionCheckEvent, TelemetryEvent};

/// Content type reported for objects that do not declare one.
pub const UNDECLARED_CONTENT_TYPE: &str = "application/octet-stream";
