//! In-memory object store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use growthgrid_core::storage::{is_safe_object_key, ObjectStore, ObjectStoreError, StoredObject};

/// Object store that keeps every object in a HashMap.
#[derive(Debug, Clone, Default)]
pub struct MemoryObjectStore {
    objects: Arc<RwLock<HashMap<String, StoredObject>>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored objects.
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }
}

fn check_key(key: &str) -> Result<(), ObjectStoreError> {
    if is_safe_object_key(key) {
        Ok(())
    } else {
        Err(ObjectStoreError::InvalidKey(key.to_string()))
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), ObjectStoreError> {
        check_key(key)?;
        let object = StoredObject {
            bytes,
            content_type: content_type.to_string(),
        };
        self.objects.write().await.insert(key.to_string(), object);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<StoredObject>, ObjectStoreError> {
        check_key(key)?;
        Ok(self.objects.read().await.get(key).cloned())
    }

    async fn delete(&self, key: &str) -> Result<(), ObjectStoreError> {
        check_key(key)?;
        self.objects.write().await.remove(key);
        Ok(())
    }

    async fn ping(&self) -> Result<(), ObjectStoreError> {
        Ok(())
    }
}
