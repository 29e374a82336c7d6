//! Object storage abstraction and backends for the update gateway.
//!
//! This crate provides:
//! - An [`ObjectStore`] trait with atomic conditional create
//! - Backends: local filesystem, S3-compatible and in-memory
//! - The latest-version descriptor store built on top of an object store

pub mod backends;
pub mod descriptor;
pub mod error;
pub mod traits;

pub use backends::{filesystem::FilesystemBackend, memory::MemoryBackend, s3::S3Backend};
pub use descriptor::{DescriptorError, ObjectStoreDescriptorStore, VersionDescriptorStore};
pub use error::{StorageError, StorageResult};
pub use traits::{ObjectMeta, ObjectStore, PutOptions, StoredObject};

use std::sync::Arc;
use updates_core::config::StorageConfig;

/// Create an object store from configuration.
pub async fn from_config(config: &StorageConfig) -> StorageResult<Arc<dyn ObjectStore>> {
    config.validate().map_err(StorageError::Config)?;

    match config {
        StorageConfig::Filesystem { path } => {
            let backend = FilesystemBackend::new(path).await?;
            Ok(Arc::new(backend))
        }
        StorageConfig::S3 {
            bucket,
            endpoint,
            region,
            prefix,
            access_key_id,
            secret_access_key,
            force_path_style,
        } => {
            let backend = S3Backend::new(
                bucket,
                endpoint.clone(),
                region.clone(),
                prefix.clone(),
                access_key_id.clone(),
                secret_access_key.clone(),
                *force_path_style,
            )
            .await?;
            Ok(Arc::new(backend))
        }
        StorageConfig::Memory => Ok(Arc::new(MemoryBackend::new())),
    }
}
