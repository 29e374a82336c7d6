use bytes::Bytes;
use std::sync::Arc;
use tempfile::TempDir;
use updates_storage::{FilesystemBackend, MemoryBackend, ObjectStore, PutOptions};

/// Options the event writer attaches to stored events.
#[allow(dead_code)]
pub fn gzip_options() -> PutOptions {
    PutOptions::default()
        .with_content_type("application/json")
        .with_content_encoding("gzip")
}

/// A small JSON body tagged with `label`.
#[allow(dead_code)]
pub fn json_object(label: &str) -> Bytes {
    Bytes::from(format!("{{\"label\":\"{label}\"}}"))
}

/// Every backend that runs without external services, with the temp dir
/// backing the filesystem store kept alive alongside it.
#[allow(dead_code)]
pub async fn all_backends() -> (Vec<Arc<dyn ObjectStore>>, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let filesystem = FilesystemBackend::new(dir.path().join("store"))
        .await
        .unwrap();

    let backends: Vec<Arc<dyn ObjectStore>> =
        vec![Arc::new(filesystem), Arc::new(MemoryBackend::new())];
    (backends, dir)
}
