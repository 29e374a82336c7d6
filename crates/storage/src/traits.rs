//! Storage trait definitions.

use crate::error::StorageResult;
use async_trait::async_trait;
use bytes::Bytes;

/// Object store abstraction.
///
/// Keys are `/`-separated relative paths such as `v1/latest.json`.
#[async_trait]
pub trait ObjectStore: Send + Sync + 'static {
    /// Check if an object exists.
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Get an object's metadata without fetching content.
    async fn head(&self, key: &str) -> StorageResult<ObjectMeta>;

    /// Get an object's content.
    async fn get(&self, key: &str) -> StorageResult<Bytes>;

    /// Get an object's content together with its metadata.
    async fn get_object(&self, key: &str) -> StorageResult<StoredObject>;

    /// Put an object atomically, replacing any existing object.
    async fn put(&self, key: &str, data: Bytes, options: &PutOptions) -> StorageResult<()>;

    /// Put an object only if no object exists under `key`.
    ///
    /// Returns `Ok(false)` without touching the existing object when the key is
    /// taken. The check and the write are a single atomic step on every backend.
    async fn put_if_not_exists(
        &self,
        key: &str,
        data: Bytes,
        options: &PutOptions,
    ) -> StorageResult<bool>;

    /// Get the name of this storage backend.
    ///
    /// Returns a static string identifier for the backend type (e.g., "s3", "filesystem").
    /// Used for metrics and logging.
    fn backend_name(&self) -> &'static str;

    /// Verify storage backend connectivity.
    ///
    /// Called during server startup so a misconfigured backend fails fast
    /// instead of on the first request. Must not write to the store.
    async fn health_check(&self) -> StorageResult<()> {
        Ok(())
    }
}

/// Metadata attached to an object when it is written.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PutOptions {
    /// MIME type reported when the object is read back.
    pub content_type: Option<String>,
    /// Content encoding of the stored bytes (e.g. `gzip`).
    pub content_encoding: Option<String>,
}

impl PutOptions {
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn with_content_encoding(mut self, content_encoding: impl Into<String>) -> Self {
        self.content_encoding = Some(content_encoding.into());
        self
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.content_type.is_none() && self.content_encoding.is_none()
    }
}

/// Metadata about a stored object.
#[derive(Clone, Debug, Default)]
pub struct ObjectMeta {
    /// Object size in bytes.
    pub size: u64,
    /// Last modification time (if available).
    pub last_modified: Option<time::OffsetDateTime>,
    /// Content type (if declared when the object was written).
    pub content_type: Option<String>,
    /// Content encoding (if declared when the object was written).
    pub content_encoding: Option<String>,
}

/// An object's content and metadata, read together.
#[derive(Clone, Debug)]
pub struct StoredObject {
    pub data: Bytes,
    pub meta: ObjectMeta,
}
