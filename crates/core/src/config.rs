//! Configuration types shared across crates.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Complete application configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP listener and service identity.
    #[serde(default)]
    pub server: ServerConfig,
    /// Where the latest version descriptor lives.
    #[serde(default)]
    pub descriptor: DescriptorConfig,
    /// Where telemetry events are recorded.
    #[serde(default)]
    pub events: EventsConfig,
    /// Artifact redirect target.
    #[serde(default)]
    pub downloads: DownloadsConfig,
}

impl AppConfig {
    /// Validate the whole configuration, returning the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        self.server.validate()?;
        self.descriptor
            .validate()
            .map_err(|e| format!("descriptor: {e}"))?;
        self.events.validate().map_err(|e| format!("events: {e}"))?;
        self.downloads.validate()
    }
}

/// Server configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Enable the /metrics endpoint for Prometheus scraping (default: true).
    #[serde(default = "default_metrics_enabled")]
    pub metrics_enabled: bool,
    /// Log output format.
    #[serde(default)]
    pub log_format: LogFormat,
    /// Service name reported in the startup log.
    #[serde(default = "default_service_name")]
    pub service_name: String,
    /// Service revision reported in the startup log.
    #[serde(default = "default_service_version")]
    pub service_version: String,
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_metrics_enabled() -> bool {
    true
}

fn default_service_name() -> String {
    "updates".to_string()
}

fn default_service_version() -> String {
    "local".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            metrics_enabled: default_metrics_enabled(),
            log_format: LogFormat::default(),
            service_name: default_service_name(),
            service_version: default_service_version(),
        }
    }
}

impl ServerConfig {
    /// Listen on all interfaces at `port`, the convention for container platforms
    /// that pass the port through the `PORT` environment variable.
    pub fn listen_on_port(&mut self, port: u16) {
        self.bind = format!("0.0.0.0:{port}");
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.bind.trim().is_empty() {
            return Err("server.bind must not be empty".to_string());
        }
        Ok(())
    }
}

/// Log output format.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line, for log ingestion.
    Json,
}

/// Latest version descriptor location.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DescriptorConfig {
    /// Backend holding the descriptor object.
    #[serde(default = "default_descriptor_storage")]
    pub storage: StorageConfig,
    /// Object key of the descriptor.
    #[serde(default = "default_descriptor_key")]
    pub key: String,
}

fn default_descriptor_storage() -> StorageConfig {
    StorageConfig::Filesystem {
        path: PathBuf::from("./data/public"),
    }
}

fn default_descriptor_key() -> String {
    "v1/latest.json".to_string()
}

impl Default for DescriptorConfig {
    fn default() -> Self {
        Self {
            storage: default_descriptor_storage(),
            key: default_descriptor_key(),
        }
    }
}

impl DescriptorConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.key.is_empty() || self.key.starts_with('/') {
            return Err(format!(
                "key must be a non-empty relative object key, got {:?}",
                self.key
            ));
        }
        self.storage.validate()
    }
}

/// Telemetry event sink configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EventsConfig {
    /// Backend events are written to.
    #[serde(default = "default_events_storage")]
    pub storage: StorageConfig,
    /// How event writes are dispatched.
    #[serde(default)]
    pub dispatch: EventDispatch,
    /// Maximum number of events waiting for the background writer.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

fn default_events_storage() -> StorageConfig {
    StorageConfig::Filesystem {
        path: PathBuf::from("./data/events"),
    }
}

fn default_queue_capacity() -> usize {
    1024
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            storage: default_events_storage(),
            dispatch: EventDispatch::default(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

impl EventsConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.dispatch == EventDispatch::Background && self.queue_capacity == 0 {
            return Err("queue_capacity must be at least 1".to_string());
        }
        self.storage.validate()
    }
}

/// Event write dispatch mode.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EventDispatch {
    /// Hand events to a background writer and return immediately.
    #[default]
    Background,
    /// Write events before the handler returns.
    Inline,
}

/// Artifact download redirect configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DownloadsConfig {
    /// Release repository URL; artifacts live under `{url}/releases/download/`.
    #[serde(default = "default_release_base_url")]
    pub release_base_url: String,
}

fn default_release_base_url() -> String {
    "https://github.com/batect/batect".to_string()
}

impl Default for DownloadsConfig {
    fn default() -> Self {
        Self {
            release_base_url: default_release_base_url(),
        }
    }
}

impl DownloadsConfig {
    pub fn validate(&self) -> Result<(), String> {
        let url = &self.release_base_url;
        let lower = url.to_ascii_lowercase();
        if !(lower.starts_with("https://") || lower.starts_with("http://")) {
            return Err(format!(
                "downloads.release_base_url must be an absolute http(s) URL, got {url:?}"
            ));
        }
        if url.ends_with('/') {
            return Err(format!(
                "downloads.release_base_url must not end with '/', got {url:?}"
            ));
        }
        if !url.bytes().all(|b| b.is_ascii_graphic()) {
            return Err(format!(
                "downloads.release_base_url must only contain visible ASCII characters, got {url:?}"
            ));
        }
        Ok(())
    }
}

/// Storage backend configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StorageConfig {
    /// Local filesystem storage.
    Filesystem {
        /// Root directory for storage.
        path: PathBuf,
    },
    /// S3-compatible storage.
    S3 {
        /// Bucket name.
        bucket: String,
        /// Optional endpoint URL (for MinIO, etc.).
        endpoint: Option<String>,
        /// AWS region.
        region: Option<String>,
        /// Optional key prefix.
        prefix: Option<String>,
        /// AWS access key ID. Falls back to the ambient AWS credential chain if not set.
        access_key_id: Option<String>,
        /// AWS secret access key. Falls back to the ambient AWS credential chain if not set.
        secret_access_key: Option<String>,
        /// Force path-style URLs (`endpoint/bucket/key` instead of `bucket.endpoint/key`).
        /// Required for MinIO and some S3-compatible services.
        #[serde(default)]
        force_path_style: bool,
    },
    /// Process-local memory. Contents are lost on restart.
    Memory,
}

impl StorageConfig {
    pub fn validate(&self) -> Result<(), String> {
        match self {
            StorageConfig::S3 {
                bucket,
                access_key_id,
                secret_access_key,
                ..
            } => {
                if bucket.is_empty() {
                    return Err("s3 config requires a bucket name".to_string());
                }
                match (access_key_id.as_ref(), secret_access_key.as_ref()) {
                    (Some(_), Some(_)) | (None, None) => Ok(()),
                    _ => Err(
                        "s3 config requires both access_key_id and secret_access_key when either is set"
                            .to_string(),
                    ),
                }
            }
            StorageConfig::Filesystem { path } => {
                if path.as_os_str().is_empty() {
                    return Err("filesystem config requires a path".to_string());
                }
                Ok(())
            }
            StorageConfig::Memory => Ok(()),
        }
    }
}
