//! Descriptor store fakes.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use updates_core::VersionDescriptor;
use updates_storage::{DescriptorError, StorageError, VersionDescriptorStore};

/// Always returns the same descriptor and counts fetches.
#[allow(dead_code)]
pub struct StaticDescriptorStore {
    descriptor: VersionDescriptor,
    fetches: AtomicUsize,
}

#[allow(dead_code)]
impl StaticDescriptorStore {
    pub fn new(content: &'static [u8], content_type: &str) -> Self {
        Self {
            descriptor: VersionDescriptor::new(content, content_type),
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VersionDescriptorStore for StaticDescriptorStore {
    async fn get_latest_version_descriptor(&self) -> Result<VersionDescriptor, DescriptorError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.descriptor.clone())
    }
}

/// Always fails, the way an unreachable backend would.
#[allow(dead_code)]
#[derive(Default)]
pub struct FailingDescriptorStore {
    fetches: AtomicUsize,
}

#[allow(dead_code)]
impl FailingDescriptorStore {
    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VersionDescriptorStore for FailingDescriptorStore {
    async fn get_latest_version_descriptor(&self) -> Result<VersionDescriptor, DescriptorError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Err(DescriptorError::Unavailable(StorageError::Config(
            "backend unreachable".to_string(),
        )))
    }
}
