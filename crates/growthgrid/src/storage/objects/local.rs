//! Filesystem object store.
//!
//! Objects live under `{root}/objects/{key}` and their media types under
//! `{root}/meta/{key}`. Writes go to a temp file first and are renamed into
//! place, so a concurrent reader never sees a partial object.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use uuid::Uuid;

use growthgrid_core::storage::{is_safe_object_key, ObjectStore, ObjectStoreError, StoredObject};

use super::DEFAULT_CONTENT_TYPE;

/// Object store rooted at a local directory.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    /// Creates a store rooted at `root`. Directories are created lazily.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, key: &str) -> Result<PathBuf, ObjectStoreError> {
        self.resolve("objects", key)
    }

    fn meta_path(&self, key: &str) -> Result<PathBuf, ObjectStoreError> {
        self.resolve("meta", key)
    }

    fn resolve(&self, area: &str, key: &str) -> Result<PathBuf, ObjectStoreError> {
        if !is_safe_object_key(key) {
            return Err(ObjectStoreError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(area).join(key))
    }
}

fn io_error(err: std::io::Error) -> ObjectStoreError {
    match err.kind() {
        ErrorKind::PermissionDenied | ErrorKind::ReadOnlyFilesystem | ErrorKind::StorageFull => {
            ObjectStoreError::Unavailable(err.to_string())
        }
        _ => ObjectStoreError::Io(err.to_string()),
    }
}

/// Atomic write: write to temp file, then rename.
async fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let tmp_path = path.with_extension(format!("tmp.{}", Uuid::new_v4().simple()));
    tokio::fs::write(&tmp_path, bytes).await?;
    if let Err(e) = tokio::fs::rename(&tmp_path, path).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(e);
    }
    Ok(())
}

async fn remove_if_exists(path: &Path) -> std::io::Result<()> {
    match tokio::fs::remove_file(path).await {
        Err(e) if e.kind() != ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), ObjectStoreError> {
        let object_path = self.object_path(key)?;
        let meta_path = self.meta_path(key)?;

        write_atomic(&meta_path, content_type.as_bytes())
            .await
            .map_err(io_error)?;
        write_atomic(&object_path, &bytes).await.map_err(io_error)?;

        tracing::debug!(%key, size = bytes.len(), "Stored object");
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<StoredObject>, ObjectStoreError> {
        let object_path = self.object_path(key)?;
        let meta_path = self.meta_path(key)?;

        let bytes = match tokio::fs::read(&object_path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error(e)),
        };
        let content_type = match tokio::fs::read_to_string(&meta_path).await {
            Ok(content_type) => content_type,
            Err(e) if e.kind() == ErrorKind::NotFound => DEFAULT_CONTENT_TYPE.to_string(),
            Err(e) => return Err(io_error(e)),
        };

        Ok(Some(StoredObject {
            bytes,
            content_type,
        }))
    }

    async fn delete(&self, key: &str) -> Result<(), ObjectStoreError> {
        remove_if_exists(&self.object_path(key)?)
            .await
            .map_err(io_error)?;
        remove_if_exists(&self.meta_path(key)?)
            .await
            .map_err(io_error)?;

        tracing::debug!(%key, "Deleted object");
        Ok(())
    }

    async fn ping(&self) -> Result<(), ObjectStoreError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| ObjectStoreError::Unavailable(e.to_string()))?;
        let probe = self.root.join(format!(".probe-{}", Uuid::new_v4().simple()));
        tokio::fs::write(&probe, b"ok")
            .await
            .map_err(|e| ObjectStoreError::Unavailable(e.to_string()))?;
        remove_if_exists(&probe)
            .await
            .map_err(|e| ObjectStoreError::Unavailable(e.to_string()))
    }
}
