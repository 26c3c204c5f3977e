//! Redis Store Module
//!
//! Adapter over a Redis server. A single multiplexed [`ConnectionManager`]
//! is established before serving traffic and cloned per command; it
//! reconnects on its own after a dropped connection.

use std::sync::Mutex;

use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands, Client};
use tracing::{debug, info};

use crate::error::StoreError;
use crate::store::{KeyValueStore, StoreResult};

// == Redis Store ==
/// Redis-backed store sharing one long-lived connection.
pub struct RedisStore {
    /// Connection target, kept for diagnostics
    address: String,
    /// Multiplexed connection shared by every request, `None` once closed
    manager: Mutex<Option<ConnectionManager>>,
}

impl RedisStore {
    // == Connect ==
    /// Opens the connection to `address` (e.g. `redis://127.0.0.1:6379`).
    ///
    /// Fails when the URL is invalid or the server cannot be reached, so the
    /// caller can refuse to start serving.
    pub async fn connect(address: &str) -> StoreResult<Self> {
        let client = Self::client(address)?;
        let manager = ConnectionManager::new(client).await?;

        info!(address, "Connected to Redis");

        Ok(Self {
            address: address.to_string(),
            manager: Mutex::new(Some(manager)),
        })
    }

    /// Parses the connection URL without touching the network.
    fn client(address: &str) -> StoreResult<Client> {
        Client::open(address).map_err(|e| {
            StoreError::Connection(format!("invalid store address '{}': {}", address, e))
        })
    }

    /// Handle for one command; fails after [`KeyValueStore::close`].
    fn connection(&self) -> StoreResult<ConnectionManager> {
        self.manager
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
            .ok_or_else(|| StoreError::Connection("store connection closed".to_string()))
    }

    /// Returns the connection target.
    pub fn address(&self) -> &str {
        &self.address
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    fn name(&self) -> &'static str {
        "redis"
    }

    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let mut conn = self.connection()?;
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_seconds: u64) -> StoreResult<()> {
        if ttl_seconds == 0 {
            return Err(StoreError::InvalidTtl(ttl_seconds));
        }

        let mut conn = self.connection()?;
        let _: () = conn.set_ex(key, value, ttl_seconds).await?;
        Ok(())
    }

    async fn ping(&self) -> StoreResult<()> {
        let mut conn = self.connection()?;
        let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        if pong == "PONG" {
            Ok(())
        } else {
            Err(StoreError::Protocol(format!("unexpected PING reply '{}'", pong)))
        }
    }

    /// Drops the shared manager. The socket closes once commands already in
    /// flight finish with their clones; later commands fail with
    /// [`StoreError::Connection`].
    async fn close(&self) -> StoreResult<()> {
        let released = self
            .manager
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        if released.is_some() {
            debug!(address = %self.address, "Released Redis connection");
        }
        Ok(())
    }
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStore")
            .field("address", &self.address)
            .finish()
    }
}
