//! Object storage for uploaded files.

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur while talking to an object store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ObjectStoreError {
    #[error("Invalid object key: {0}")]
    InvalidKey(String),
    #[error("Object store unavailable: {0}")]
    Unavailable(String),
    #[error("Object store I/O failed: {0}")]
    Io(String),
}

/// A stored object together with its media type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Flat key/value blob storage.
///
/// Keys are slash-separated relative paths such as
/// `entries/{entry_id}/{prefix}_{file_name}`.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Writes an object, replacing any existing object with the same key.
    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), ObjectStoreError>;

    /// Reads an object, returning `None` if it does not exist.
    async fn get(&self, key: &str) -> Result<Option<StoredObject>, ObjectStoreError>;

    /// Deletes an object. Deleting a missing object succeeds.
    async fn delete(&self, key: &str) -> Result<(), ObjectStoreError>;

    /// Verifies the store is reachable and writable.
    async fn ping(&self) -> Result<(), ObjectStoreError>;
}

/// Returns true when `key` is a relative path that cannot escape the store root.
pub fn is_safe_object_key(key: &str) -> bool {
    !key.is_empty()
        && !key.starts_with('/')
        && !key.contains('\\')
        && key
            .split('/')
            .all(|segment| !segment.is_empty() && segment != "." && segment != "..")
}
