//! In-memory artifact store for tests.
//!
//! Objects live in a map keyed by storage key. [`MemoryArtifactStore::fetch`]
//! resolves a public URL back to its object, which lets tests follow the
//! URL a print request returned.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use super::{ArtifactStore, public_object_url};
use crate::error::StorageError;

/// Base URL used when none is given.
pub const DEFAULT_MEMORY_BASE_URL: &str = "https://artifacts.test";

/// A stored object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Map-backed [`ArtifactStore`].
#[derive(Debug)]
pub struct MemoryArtifactStore {
    base_url: String,
    objects: Mutex<HashMap<String, StoredObject>>,
    failure: Option<String>,
}

impl MemoryArtifactStore {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_MEMORY_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            objects: Mutex::new(HashMap::new()),
            failure: None,
        }
    }

    /// Store that rejects every write with `reason`.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            failure: Some(reason.into()),
            ..Self::new()
        }
    }

    fn objects(&self) -> MutexGuard<'_, HashMap<String, StoredObject>> {
        self.objects.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Object stored under `key`.
    pub fn get(&self, key: &str) -> Option<StoredObject> {
        self.objects().get(key).cloned()
    }

    /// Object whose public URL is `url`.
    pub fn fetch(&self, url: &str) -> Option<StoredObject> {
        self.objects()
            .iter()
            .find(|(key, _)| public_object_url(&self.base_url, key) == url)
            .map(|(_, object)| object.clone())
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects().keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.objects().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects().is_empty()
    }
}

impl Default for MemoryArtifactStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ArtifactStore for MemoryArtifactStore {
    async fn put_object(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        if let Some(reason) = &self.failure {
            return Err(StorageError::Write {
                key: key.to_string(),
                reason: reason.clone(),
            });
        }

        self.objects().insert(
            key.to_string(),
            StoredObject {
                bytes,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        public_object_url(&self.base_url, key)
    }
}
