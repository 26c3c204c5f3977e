//! Memory Store Module
//!
//! Process-local key-value store with TTL expiration. Expired entries are
//! hidden on read and swept by the background cleanup task.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::store::{CacheEntry, KeyValueStore, StoreResult};

// == Memory Store ==
/// In-memory store shared behind an `Arc` by every request.
#[derive(Debug, Default)]
pub struct MemoryStore {
    /// Key-value storage
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl MemoryStore {
    // == Constructor ==
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // == Cleanup Expired ==
    /// Removes all expired entries from the store.
    ///
    /// Returns the number of entries removed.
    pub async fn cleanup_expired(&self) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired());
        before - entries.len()
    }

    // == Remaining TTL ==
    /// Remaining lifetime of `key` in milliseconds, `None` when absent or expired.
    pub async fn ttl_remaining_ms(&self, key: &str) -> Option<u64> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(CacheEntry::ttl_remaining_ms)
    }

    // == Length ==
    /// Returns the number of stored entries, including not-yet-swept expired ones.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    // == Is Empty ==
    /// Returns true if the store holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                None => return Ok(None),
                Some(entry) if !entry.is_expired() => return Ok(Some(entry.value.clone())),
                Some(_) => {}
            }
        }

        // Expired: drop it now rather than waiting for the sweep
        let mut entries = self.entries.write().await;
        if entries.get(key).is_some_and(CacheEntry::is_expired) {
            entries.remove(key);
        }
        Ok(None)
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_seconds: u64) -> StoreResult<()> {
        if ttl_seconds == 0 {
            return Err(StoreError::InvalidTtl(ttl_seconds));
        }

        let entry = CacheEntry::new(value.to_string(), ttl_seconds);
        self.entries.write().await.insert(key.to_string(), entry);
        Ok(())
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn close(&self) -> StoreResult<()> {
        self.entries.write().await.clear();
        Ok(())
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_store_new() {
        let store = MemoryStore::new();
        assert_eq!(store.len().await, 0);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_store_set_and_get() {
        let store = MemoryStore::new();

        store.set_ex("42", "value1", 10).await.unwrap();

        assert_eq!(store.get("42").await.unwrap(), Some("value1".to_string()));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_store_get_nonexistent() {
        let store = MemoryStore::new();
        assert_eq!(store.get("nonexistent").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_store_overwrite_restarts_ttl() {
        let store = MemoryStore::new();

        store.set_ex("k", "old", 1).await.unwrap();
        store.set_ex("k", "new", 60).await.unwrap();

        assert_eq!(store.get("k").await.unwrap(), Some("new".to_string()));
        assert!(store.ttl_remaining_ms("k").await.unwrap() > 1_000);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_store_ttl_expiration() {
        let store = MemoryStore::new();

        store.set_ex("k", "v", 1).await.unwrap();
        assert!(store.get("k").await.unwrap().is_some());

        tokio::time::sleep(Duration::from_millis(1100)).await;

        assert_eq!(store.get("k").await.unwrap(), None);
        assert!(store.is_empty().await, "expired entry is dropped on read");
    }

    #[tokio::test]
    async fn test_store_rejects_zero_ttl() {
        let store = MemoryStore::new();

        let result = store.set_ex("k", "v", 0).await;
        assert_eq!(result, Err(StoreError::InvalidTtl(0)));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_store_cleanup_expired() {
        let store = MemoryStore::new();

        store.set_ex("short", "v", 1).await.unwrap();
        store.set_ex("long", "v", 10).await.unwrap();

        tokio::time::sleep(Duration::from_millis(1100)).await;

        assert_eq!(store.cleanup_expired().await, 1);
        assert_eq!(store.len().await, 1);
        assert!(store.get("long").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_store_close_drops_entries() {
        let store = MemoryStore::new();
        store.set_ex("k", "v", 10).await.unwrap();

        store.close().await.unwrap();

        assert!(store.is_empty().await);
    }
}
