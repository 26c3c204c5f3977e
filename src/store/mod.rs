//! Store Module
//!
//! The key-value store consumed by the gateway, reached through the
//! [`KeyValueStore`] trait. Entry lifetime belongs to the store: an entry is
//! written with an expiration and disappears on its own once it elapses.

mod entry;
mod memory;
mod redis_store;

use async_trait::async_trait;

use crate::error::StoreError;

// Re-export public types
pub use entry::{current_timestamp_ms, CacheEntry};
pub use memory::MemoryStore;
pub use redis_store::RedisStore;

/// Convenience Result type for store adapters.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

// == Key-Value Store Trait ==
/// Asynchronous string key-value store with per-entry expiration.
///
/// Implementations are shared across every in-flight request, so they take
/// `&self` and do their own synchronization.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Short name used in logs and the health endpoint.
    fn name(&self) -> &'static str;

    /// Returns the stored value, or `None` when the key is absent or expired.
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Stores `value` under `key`, expiring after `ttl_seconds`.
    ///
    /// Overwrites any existing value and restarts its expiration.
    async fn set_ex(&self, key: &str, value: &str, ttl_seconds: u64) -> StoreResult<()>;

    /// Round-trips to the store to confirm it is reachable.
    async fn ping(&self) -> StoreResult<()>;

    /// Releases the underlying connection. Called once on shutdown.
    async fn close(&self) -> StoreResult<()> {
        Ok(())
    }
}
