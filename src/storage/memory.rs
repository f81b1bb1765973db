//! In-memory object store.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error_handling::StorageError;

use super::ObjectStore;

/// [`ObjectStore`] backed by a sorted map.
///
/// Used to run the aggregators against local data and in tests.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    objects: Mutex<BTreeMap<String, Vec<u8>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, key: impl Into<String>, body: impl Into<Vec<u8>>) {
        if let Ok(mut objects) = self.objects.lock() {
            objects.insert(key.into(), body.into());
        }
    }

    fn lock_error(key: &str) -> StorageError {
        StorageError::Transport {
            key: key.to_string(),
            message: "object map lock poisoned".to_string(),
        }
    }
}

#[async_trait]
impl ObjectStore for InMemoryStore {
    async fn list_objects(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let objects = self.objects.lock().map_err(|_| Self::lock_error(prefix))?;
        Ok(objects
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect())
    }

    async fn get_object(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let objects = self.objects.lock().map_err(|_| Self::lock_error(key))?;
        objects.get(key).cloned().ok_or_else(|| StorageError::Status {
            key: key.to_string(),
            status: 404,
        })
    }
}
