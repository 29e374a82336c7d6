//! Event recording errors.

use thiserror::Error;
use updates_storage::StorageError;

#[derive(Debug, Error)]
pub enum EventError {
    #[error("failed to serialize event: {0}")]
    Serialization(#[from] updates_core::Error),

    #[error("failed to compress event: {0}")]
    Compression(#[source] std::io::Error),

    #[error("failed to store event: {0}")]
    Storage(#[from] StorageError),
}

pub type EventResult<T> = std::result::Result<T, EventError>;
