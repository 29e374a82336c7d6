//! Local filesystem storage backend.
//!
//! Objects live at `<root>/<key>`. Declared content type and encoding are kept
//! in a JSON sidecar at `<root>/.meta/<key>.json`, so keys may not contain
//! components starting with `.`.

use crate::error::{StorageError, StorageResult};
use crate::traits::{ObjectMeta, ObjectStore, PutOptions, StoredObject};
use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::instrument;
use uuid::Uuid;

const META_DIR: &str = ".meta";

/// Sidecar metadata record.
#[derive(Debug, Default, Serialize, Deserialize)]
struct SidecarMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    content_encoding: Option<String>,
}

impl From<&PutOptions> for SidecarMeta {
    fn from(options: &PutOptions) -> Self {
        Self {
            content_type: options.content_type.clone(),
            content_encoding: options.content_encoding.clone(),
        }
    }
}

/// Local filesystem object store.
pub struct FilesystemBackend {
    root: PathBuf,
}

impl FilesystemBackend {
    /// Create a new filesystem backend.
    pub async fn new(root: impl AsRef<Path>) -> StorageResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    /// Resolve the data and sidecar paths for a key, with path traversal protection.
    ///
    /// Canonicalization touches the filesystem, so it runs on the blocking pool.
    async fn key_paths(&self, key: &str) -> StorageResult<(PathBuf, PathBuf)> {
        validate_key(key)?;

        let root = self.root.clone();
        let key = key.to_string();
        tokio::task::spawn_blocking(move || {
            let data = root.join(&key);
            let meta = root.join(META_DIR).join(format!("{key}.json"));
            ensure_within_root(&root, &data, &key)?;
            ensure_within_root(&root, &meta, &key)?;
            Ok((data, meta))
        })
        .await
        .map_err(|e| StorageError::Io(std::io::Error::other(format!("spawn_blocking failed: {e}"))))?
    }

    /// Ensure parent directory exists.
    async fn ensure_parent(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Write `data` to a uniquely named, fsynced temp file next to `path`.
    async fn write_temp(&self, path: &Path, data: &[u8]) -> StorageResult<PathBuf> {
        self.ensure_parent(path).await?;

        let temp_name = format!(".tmp.{}", Uuid::new_v4());
        let temp_path = path.with_file_name(
            path.file_name()
                .map(|n| format!("{}{}", n.to_string_lossy(), temp_name))
                .unwrap_or_else(|| temp_name.clone()),
        );

        let mut file = fs::File::create(&temp_path).await?;
        if let Err(e) = async {
            file.write_all(data).await?;
            file.sync_all().await
        }
        .await
        {
            drop(file);
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        Ok(temp_path)
    }

    /// Atomically replace `path` with `data`.
    async fn replace(&self, path: &Path, data: &[u8]) -> StorageResult<()> {
        let temp_path = self.write_temp(path, data).await?;
        if let Err(e) = fs::rename(&temp_path, path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }
        Ok(())
    }

    async fn write_sidecar(
        &self,
        meta_path: &Path,
        key: &str,
        options: &PutOptions,
    ) -> StorageResult<()> {
        if options.is_empty() {
            return match fs::remove_file(meta_path).await {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
                Err(e) => Err(e.into()),
            };
        }

        let encoded = serde_json::to_vec(&SidecarMeta::from(options)).map_err(|e| {
            StorageError::InvalidMetadata {
                key: key.to_string(),
                reason: e.to_string(),
            }
        })?;
        self.replace(meta_path, &encoded).await
    }

    async fn read_sidecar(&self, meta_path: &Path, key: &str) -> StorageResult<SidecarMeta> {
        match fs::read(meta_path).await {
            Ok(raw) => serde_json::from_slice(&raw).map_err(|e| StorageError::InvalidMetadata {
                key: key.to_string(),
                reason: e.to_string(),
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(SidecarMeta::default()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Reject keys that could escape the root or collide with internal files.
fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty() || key.starts_with('/') || key.starts_with('\\') || key.contains("..") {
        return Err(StorageError::InvalidKey(format!(
            "path traversal not allowed: {key}"
        )));
    }

    for component in Path::new(key).components() {
        match component {
            Component::Normal(part) if !part.to_string_lossy().starts_with('.') => {}
            _ => {
                return Err(StorageError::InvalidKey(format!(
                    "contains unsafe path component: {key}"
                )));
            }
        }
    }

    Ok(())
}

/// Verify that `path`, or its nearest existing ancestor, resolves inside `root`.
///
/// Catches symlinks inside the root that point elsewhere, including symlinked
/// directories above paths that do not exist yet.
fn ensure_within_root(root: &Path, path: &Path, key: &str) -> StorageResult<()> {
    let root_canonical = root.canonicalize().map_err(|e| {
        StorageError::Io(std::io::Error::new(
            e.kind(),
            format!("failed to canonicalize root: {e}"),
        ))
    })?;

    let mut candidate = Some(path);
    while let Some(current) = candidate {
        match std::fs::symlink_metadata(current) {
            Ok(meta) => {
                let canonical = current.canonicalize().map_err(|e| {
                    if meta.file_type().is_symlink() {
                        StorageError::InvalidKey(format!(
                            "symlink target missing or invalid: {key}"
                        ))
                    } else {
                        StorageError::Io(std::io::Error::new(
                            e.kind(),
                            format!("failed to canonicalize path: {e}"),
                        ))
                    }
                })?;

                if !canonical.starts_with(&root_canonical) {
                    return Err(StorageError::InvalidKey(format!(
                        "resolved path escapes storage root: {key}"
                    )));
                }
                return Ok(());
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                candidate = current.parent();
            }
            Err(err) => {
                return Err(StorageError::Io(std::io::Error::new(
                    err.kind(),
                    format!("failed to stat path: {err}"),
                )));
            }
        }
    }

    Ok(())
}

fn map_not_found(key: &str) -> impl FnOnce(std::io::Error) -> StorageError + '_ {
    move |e| {
        if e.kind() == ErrorKind::NotFound {
            StorageError::NotFound(key.to_string())
        } else {
            StorageError::Io(e)
        }
    }
}

#[async_trait]
impl ObjectStore for FilesystemBackend {
    #[instrument(skip(self), fields(backend = "filesystem"))]
    async fn exists(&self, key: &str) -> StorageResult<bool> {
        let (path, _) = self.key_paths(key).await?;
        fs::try_exists(&path).await.map_err(StorageError::Io)
    }

    #[instrument(skip(self), fields(backend = "filesystem"))]
    async fn head(&self, key: &str) -> StorageResult<ObjectMeta> {
        let (path, meta_path) = self.key_paths(key).await?;
        let metadata = fs::metadata(&path).await.map_err(map_not_found(key))?;
        let sidecar = self.read_sidecar(&meta_path, key).await?;

        Ok(ObjectMeta {
            size: metadata.len(),
            last_modified: metadata.modified().ok().map(|t| t.into()),
            content_type: sidecar.content_type,
            content_encoding: sidecar.content_encoding,
        })
    }

    #[instrument(skip(self), fields(backend = "filesystem"))]
    async fn get(&self, key: &str) -> StorageResult<Bytes> {
        let (path, _) = self.key_paths(key).await?;
        let data = fs::read(&path).await.map_err(map_not_found(key))?;
        Ok(Bytes::from(data))
    }

    #[instrument(skip(self), fields(backend = "filesystem"))]
    async fn get_object(&self, key: &str) -> StorageResult<StoredObject> {
        let (path, meta_path) = self.key_paths(key).await?;
        let data = fs::read(&path).await.map_err(map_not_found(key))?;
        let modified = fs::metadata(&path)
            .await
            .ok()
            .and_then(|m| m.modified().ok());
        let sidecar = self.read_sidecar(&meta_path, key).await?;

        Ok(StoredObject {
            meta: ObjectMeta {
                size: data.len() as u64,
                last_modified: modified.map(|t| t.into()),
                content_type: sidecar.content_type,
                content_encoding: sidecar.content_encoding,
            },
            data: Bytes::from(data),
        })
    }

    #[instrument(skip(self, data, options), fields(backend = "filesystem", size = data.len()))]
    async fn put(&self, key: &str, data: Bytes, options: &PutOptions) -> StorageResult<()> {
        let (path, meta_path) = self.key_paths(key).await?;
        self.write_sidecar(&meta_path, key, options).await?;
        self.replace(&path, &data).await
    }

    #[instrument(skip(self, data, options), fields(backend = "filesystem", size = data.len()))]
    async fn put_if_not_exists(
        &self,
        key: &str,
        data: Bytes,
        options: &PutOptions,
    ) -> StorageResult<bool> {
        let (path, meta_path) = self.key_paths(key).await?;

        // Linking a complete temp file into place either publishes the whole
        // object or fails with AlreadyExists; readers never see partial content.
        let temp_path = self.write_temp(&path, &data).await?;
        let linked = fs::hard_link(&temp_path, &path).await;
        let _ = fs::remove_file(&temp_path).await;

        match linked {
            Ok(()) => {
                if let Err(e) = self.write_sidecar(&meta_path, key, options).await {
                    // Unpublish so a retry can create the object with its metadata.
                    let _ = fs::remove_file(&path).await;
                    return Err(e);
                }
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn backend_name(&self) -> &'static str {
        "filesystem"
    }

    #[instrument(skip(self), fields(backend = "filesystem"))]
    async fn health_check(&self) -> StorageResult<()> {
        let metadata = fs::metadata(&self.root).await.map_err(|e| {
            StorageError::Io(std::io::Error::new(
                e.kind(),
                format!("storage root not accessible: {}", e),
            ))
        })?;

        if !metadata.is_dir() {
            return Err(StorageError::Io(std::io::Error::new(
                ErrorKind::NotADirectory,
                format!("storage root is not a directory: {:?}", self.root),
            )));
        }

        Ok(())
    }
}
