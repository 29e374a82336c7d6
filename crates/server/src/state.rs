//! Application state shared across handlers.

use std::sync::Arc;
use updates_core::config::AppConfig;
use updates_events::EventSink;
use updates_storage::VersionDescriptorStore;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Source of the latest version descriptor.
    pub descriptors: Arc<dyn VersionDescriptorStore>,
    /// Telemetry for served requests.
    pub events: Arc<dyn EventSink>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        descriptors: Arc<dyn VersionDescriptorStore>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            descriptors,
            events,
        }
    }
}
