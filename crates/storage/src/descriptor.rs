//! Latest-version descriptor lookup.

use crate::error::StorageError;
use crate::traits::ObjectStore;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::instrument;
use updates_core::{UNDECLARED_CONTENT_TYPE, VersionDescriptor};

/// Why the descriptor could not be read.
#[derive(Debug, Error)]
pub enum DescriptorError {
    #[error("latest version descriptor not found at {0}")]
    NotFound(String),

    #[error("latest version descriptor unavailable: {0}")]
    Unavailable(#[source] StorageError),
}

/// Source of the current latest-version descriptor.
#[async_trait]
pub trait VersionDescriptorStore: Send + Sync + 'static {
    /// Fetch the descriptor as it currently exists in the backing store.
    ///
    /// Every call reads through; nothing is cached.
    async fn get_latest_version_descriptor(&self) -> Result<VersionDescriptor, DescriptorError>;
}

/// Reads the descriptor from a single object in an [`ObjectStore`].
pub struct ObjectStoreDescriptorStore {
    store: Arc<dyn ObjectStore>,
    key: String,
}

impl ObjectStoreDescriptorStore {
    pub fn new(store: Arc<dyn ObjectStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }
}

#[async_trait]
impl VersionDescriptorStore for ObjectStoreDescriptorStore {
    #[instrument(skip(self))]
    async fn get_latest_version_descriptor(&self) -> Result<VersionDescriptor, DescriptorError> {
        let object = self.store.get_object(&self.key).await.map_err(|e| match e {
            StorageError::NotFound(key) => DescriptorError::NotFound(key),
            other => DescriptorError::Unavailable(other),
        })?;

        let content_type = object
            .meta
            .content_type
            .unwrap_or_else(|| UNDECLARED_CONTENT_TYPE.to_string());

        Ok(VersionDescriptor::new(object.data, content_type))
    }
}
