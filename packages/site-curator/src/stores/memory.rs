//! In-memory cache for testing and development.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::CacheResult;
use crate::traits::store::ResponseCache;

/// In-memory response cache.
///
/// Data is lost when the cache is dropped.
#[derive(Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<(String, String), String>>,
}

impl MemoryCache {
    /// Create a new empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries in a namespace.
    pub fn count(&self, namespace: &str) -> usize {
        self.entries
            .read()
            .map(|entries| entries.keys().filter(|(ns, _)| ns == namespace).count())
            .unwrap_or(0)
    }

    /// Clear all entries.
    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.write() {
            entries.clear();
        }
    }
}

#[async_trait]
impl ResponseCache for MemoryCache {
    async fn get(&self, namespace: &str, key: &str) -> CacheResult<Option<String>> {
        Ok(self.entries.read().ok().and_then(|entries| {
            entries
                .get(&(namespace.to_string(), key.to_string()))
                .cloned()
        }))
    }

    async fn put(&self, namespace: &str, key: &str, value: &str) -> CacheResult<()> {
        if let Ok(mut entries) = self.entries.write() {
            entries.insert((namespace.to_string(), key.to_string()), value.to_string());
        }
        Ok(())
    }
}
