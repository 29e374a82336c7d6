//! Latest-version descriptor.

use bytes::Bytes;

/// The current "latest release" document, exactly as held by the backing store.
///
/// The content is opaque to the gateway. `content_type` is whatever the backing
/// object declares; it is never derived from the bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VersionDescriptor {
    /// Raw descriptor bytes.
    pub content: Bytes,
    /// Content type declared by the backing object.
    pub content_type: String,
}

impl VersionDescriptor {
    /// Create a descriptor from raw content and its declared type.
    pub fn new(content: impl Into<Bytes>, content_type: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            content_type: content_type.into(),
        }
    }
}
