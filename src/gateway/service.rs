//! Cache Gateway
//!
//! Cache-aside coordination: read the store, short-circuit on a hit, and on
//! a miss fetch from the origin and write the record back with a TTL.

use std::sync::Arc;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, error, warn};

use crate::config::{Config, ReadFailurePolicy};
use crate::error::{GatewayError, OriginError, Result};
use crate::gateway::{GatewayStats, SingleFlight, StatsSnapshot};
use crate::origin::Origin;
use crate::store::KeyValueStore;

/// Expiration used when none is configured
pub const DEFAULT_TTL_SECONDS: u64 = 10;

// == Lookup Outcome ==
/// Where a lookup's record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOutcome {
    /// Served from a live cache entry
    Hit,
    /// Fetched from the origin after a miss
    Miss,
    /// Fetched from the origin because the cache read failed
    Bypass,
}

impl CacheOutcome {
    /// Value for the `x-cache` response header.
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheOutcome::Hit => "HIT",
            CacheOutcome::Miss => "MISS",
            CacheOutcome::Bypass => "BYPASS",
        }
    }
}

/// A successful lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct Lookup<R> {
    pub record: R,
    pub outcome: CacheOutcome,
}

// == Gateway Options ==
/// Tunables for [`CacheGateway`].
#[derive(Debug, Clone)]
pub struct GatewayOptions {
    /// Expiration written with every entry, in seconds (must be > 0)
    pub ttl_seconds: u64,
    /// Behaviour when the cache read fails
    pub read_failure_policy: ReadFailurePolicy,
    /// Budget for one origin fetch, `None` waits indefinitely
    pub origin_timeout: Option<Duration>,
    /// Coalesce concurrent misses for the same key
    pub single_flight: bool,
}

impl Default for GatewayOptions {
    fn default() -> Self {
        Self {
            ttl_seconds: DEFAULT_TTL_SECONDS,
            read_failure_policy: ReadFailurePolicy::FailFast,
            origin_timeout: None,
            single_flight: false,
        }
    }
}

impl From<&Config> for GatewayOptions {
    fn from(config: &Config) -> Self {
        Self {
            ttl_seconds: config.ttl_seconds,
            read_failure_policy: config.read_failure_policy,
            origin_timeout: config.origin_timeout(),
            single_flight: config.single_flight,
        }
    }
}

// == Cache Gateway ==
/// Read-through gateway in front of an [`Origin`].
///
/// The store handle is injected and shared; the gateway itself holds no
/// per-key state unless single-flight is enabled.
pub struct CacheGateway<R> {
    store: Arc<dyn KeyValueStore>,
    origin: Arc<dyn Origin<Record = R>>,
    ttl_seconds: u64,
    read_failure_policy: ReadFailurePolicy,
    origin_timeout: Option<Duration>,
    flights: Option<SingleFlight<R>>,
    stats: GatewayStats,
}

impl<R> CacheGateway<R>
where
    R: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    // == Constructor ==
    /// Creates a gateway over `store` and `origin`.
    ///
    /// A zero TTL is replaced by [`DEFAULT_TTL_SECONDS`] since stores reject it.
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        origin: Arc<dyn Origin<Record = R>>,
        options: GatewayOptions,
    ) -> Self {
        let ttl_seconds = if options.ttl_seconds == 0 {
            warn!(
                default = DEFAULT_TTL_SECONDS,
                "Cache TTL of 0 seconds is invalid, using default"
            );
            DEFAULT_TTL_SECONDS
        } else {
            options.ttl_seconds
        };

        Self {
            store,
            origin,
            ttl_seconds,
            read_failure_policy: options.read_failure_policy,
            origin_timeout: options.origin_timeout,
            flights: options.single_flight.then(SingleFlight::new),
            stats: GatewayStats::new(),
        }
    }

    // == Lookup ==
    /// Resolves `key` through the cache, falling back to the origin on a miss.
    ///
    /// Per call: one cache read, at most one origin fetch and at most one
    /// cache write. Write failures never fail the lookup.
    pub async fn lookup(&self, key: &str) -> Result<Lookup<R>> {
        match self.store.get(key).await {
            Ok(Some(raw)) => match self.decode(key, &raw) {
                Ok(record) => {
                    self.stats.record_hit();
                    debug!(key, "Cache hit");
                    return Ok(Lookup {
                        record,
                        outcome: CacheOutcome::Hit,
                    });
                }
                Err(err) => {
                    self.stats.record_malformed_entry();
                    warn!(error = %err, "Ignoring unreadable cache entry");
                }
            },
            Ok(None) => debug!(key, "Cache miss"),
            Err(err) => {
                self.stats.record_read_failure();
                match self.read_failure_policy {
                    ReadFailurePolicy::FailFast => {
                        error!(key, store = self.store.name(), error = %err, "Cache read failed");
                        return Err(err.into());
                    }
                    ReadFailurePolicy::FallThrough => {
                        warn!(
                            key,
                            store = self.store.name(),
                            error = %err,
                            "Cache read failed, serving from origin"
                        );
                        let record = self.fill(key).await?;
                        return Ok(Lookup {
                            record,
                            outcome: CacheOutcome::Bypass,
                        });
                    }
                }
            }
        }

        self.stats.record_miss();
        let record = self.fill(key).await?;
        Ok(Lookup {
            record,
            outcome: CacheOutcome::Miss,
        })
    }

    /// Miss path, coalesced per key when single-flight is on.
    async fn fill(&self, key: &str) -> Result<R> {
        match &self.flights {
            Some(flights) => flights.run(key, || self.fetch_and_populate(key)).await,
            None => self.fetch_and_populate(key).await,
        }
    }

    async fn fetch_and_populate(&self, key: &str) -> Result<R> {
        let record = self.fetch_origin(key).await?;
        self.populate(key, &record).await;
        Ok(record)
    }

    async fn fetch_origin(&self, key: &str) -> Result<R> {
        self.stats.record_origin_fetch();

        let fetched = match self.origin_timeout {
            Some(budget) => tokio::time::timeout(budget, self.origin.fetch(key))
                .await
                .unwrap_or(Err(OriginError::TimedOut(budget))),
            None => self.origin.fetch(key).await,
        };

        fetched.map_err(|err| {
            self.stats.record_origin_failure();
            error!(key, origin = self.origin.name(), error = %err, "Origin fetch failed");
            GatewayError::from(err)
        })
    }

    // == Write-back ==
    /// Stores `record` under `key` with the configured TTL.
    ///
    /// Failures are logged and counted, never returned: the caller already
    /// holds the fresh record.
    async fn populate(&self, key: &str, record: &R) {
        let payload = match serde_json::to_string(record) {
            Ok(payload) => payload,
            Err(err) => {
                self.stats.record_write_failure();
                warn!(key, error = %err, "Could not serialize record for cache");
                return;
            }
        };

        match self.store.set_ex(key, &payload, self.ttl_seconds).await {
            Ok(()) => debug!(key, ttl_seconds = self.ttl_seconds, "Cached origin record"),
            Err(err) => {
                self.stats.record_write_failure();
                warn!(key, store = self.store.name(), error = %err, "Cache write failed");
            }
        }
    }

    fn decode(&self, key: &str, raw: &str) -> Result<R> {
        serde_json::from_str(raw).map_err(|err| GatewayError::MalformedCacheEntry {
            key: key.to_string(),
            reason: err.to_string(),
        })
    }

    // == Accessors ==
    /// Shared store handle.
    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    /// Expiration written with every entry.
    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }

    /// Current lookup counters.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }
}
