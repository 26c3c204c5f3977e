//! Configuration Module
//!
//! Handles loading and managing gateway configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Which key-value store backs the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// Remote Redis server at `store_address`
    Redis,
    /// Process-local TTL map, for local runs without a Redis server
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "redis" => Ok(StoreBackend::Redis),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(format!("unknown store backend '{}'", other)),
        }
    }
}

/// What a lookup does when the cache read itself fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadFailurePolicy {
    /// Answer with a server error and leave the origin alone
    #[default]
    FailFast,
    /// Serve straight from the origin while the cache is down
    FallThrough,
}

impl FromStr for ReadFailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fail_fast" | "fail-fast" => Ok(ReadFailurePolicy::FailFast),
            "fall_through" | "fall-through" => Ok(ReadFailurePolicy::FallThrough),
            other => Err(format!("unknown read failure policy '{}'", other)),
        }
    }
}

/// Gateway configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Expiration written with every cache entry, in seconds
    pub ttl_seconds: u64,
    /// Connection target for the Redis backend
    pub store_address: String,
    /// Store implementation to use
    pub store_backend: StoreBackend,
    /// Behaviour on cache read failure
    pub read_failure_policy: ReadFailurePolicy,
    /// Coalesce concurrent misses for the same key
    pub single_flight: bool,
    /// Simulated origin latency in milliseconds
    pub origin_latency_ms: u64,
    /// Origin fetch budget in milliseconds, 0 disables the timeout
    pub origin_timeout_ms: u64,
    /// Memory backend sweep interval in seconds
    pub cleanup_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CACHE_TTL_SECONDS` - Cache entry expiration, must be > 0 (default: 10)
    /// - `STORE_ADDRESS` - Redis URL (default: redis://127.0.0.1:6379)
    /// - `STORE_BACKEND` - `redis` or `memory` (default: redis)
    /// - `CACHE_READ_FAILURE_POLICY` - `fail_fast` or `fall_through` (default: fail_fast)
    /// - `SINGLE_FLIGHT` - `true` to coalesce concurrent misses (default: false)
    /// - `ORIGIN_LATENCY_MS` - Simulated origin delay (default: 1000)
    /// - `ORIGIN_TIMEOUT_MS` - Origin fetch budget, 0 = none (default: 5000)
    /// - `CLEANUP_INTERVAL` - Memory backend sweep frequency in seconds (default: 1)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            ttl_seconds: parse_var("CACHE_TTL_SECONDS")
                .filter(|ttl: &u64| *ttl > 0)
                .unwrap_or(defaults.ttl_seconds),
            store_address: env::var("STORE_ADDRESS").unwrap_or(defaults.store_address),
            store_backend: parse_var("STORE_BACKEND").unwrap_or(defaults.store_backend),
            read_failure_policy: parse_var("CACHE_READ_FAILURE_POLICY")
                .unwrap_or(defaults.read_failure_policy),
            single_flight: parse_var("SINGLE_FLIGHT").unwrap_or(defaults.single_flight),
            origin_latency_ms: parse_var("ORIGIN_LATENCY_MS")
                .unwrap_or(defaults.origin_latency_ms),
            origin_timeout_ms: parse_var("ORIGIN_TIMEOUT_MS")
                .unwrap_or(defaults.origin_timeout_ms),
            cleanup_interval: parse_var("CLEANUP_INTERVAL")
                .filter(|secs: &u64| *secs > 0)
                .unwrap_or(defaults.cleanup_interval),
        }
    }

    /// Origin fetch budget, `None` when disabled.
    pub fn origin_timeout(&self) -> Option<Duration> {
        (self.origin_timeout_ms > 0).then(|| Duration::from_millis(self.origin_timeout_ms))
    }

    /// Simulated origin latency.
    pub fn origin_latency(&self) -> Duration {
        Duration::from_millis(self.origin_latency_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            ttl_seconds: 10,
            store_address: "redis://127.0.0.1:6379".to_string(),
            store_backend: StoreBackend::Redis,
            read_failure_policy: ReadFailurePolicy::FailFast,
            single_flight: false,
            origin_latency_ms: 1000,
            origin_timeout_ms: 5000,
            cleanup_interval: 1,
        }
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}
