//! In-process object store.

use super::{ListedObject, ObjectStore, ObjectStoreError};
use async_trait::async_trait;
use std::sync::Mutex;

/// Objects held in memory. Listings come back in insertion order, not sorted.
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    objects: Mutex<Vec<StoredObject>>,
}

#[derive(Debug, Clone)]
struct StoredObject {
    bucket: String,
    key: String,
    body: Vec<u8>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<StoredObject>>, ObjectStoreError> {
        self.objects
            .lock()
            .map_err(|e| ObjectStoreError::backend(format!("object store lock poisoned: {}", e)))
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<ListedObject>, ObjectStoreError> {
        Ok(self
            .lock()?
            .iter()
            .filter(|o| o.bucket == bucket && o.key.starts_with(prefix))
            .map(|o| ListedObject::keyed(o.key.clone()))
            .collect())
    }

    async fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>, ObjectStoreError> {
        self.lock()?
            .iter()
            .find(|o| o.bucket == bucket && o.key == key)
            .map(|o| o.body.clone())
            .ok_or_else(|| ObjectStoreError::NotFound {
                key: key.to_string(),
            })
    }

    async fn put(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<(), ObjectStoreError> {
        let mut objects = self.lock()?;
        match objects.iter_mut().find(|o| o.bucket == bucket && o.key == key) {
            Some(existing) => existing.body = body,
            None => objects.push(StoredObject {
                bucket: bucket.to_string(),
                key: key.to_string(),
                body,
            }),
        }
        Ok(())
    }
}
