//! Response DTOs for the auxiliary endpoints
//!
//! Defines the structure of the `/stats` and `/health` bodies.

use serde::Serialize;

use crate::gateway::StatsSnapshot;

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Lookups answered from the cache
    pub hits: u64,
    /// Lookups that went to the origin, including malformed entries
    pub misses: u64,
    /// Stored values that failed to deserialize
    pub malformed_entries: u64,
    /// Origin fetches actually issued
    pub origin_fetches: u64,
    /// Origin fetches that failed or timed out
    pub origin_failures: u64,
    /// Cache reads that failed
    pub read_failures: u64,
    /// Cache writes that failed after a successful fetch
    pub write_failures: u64,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
    /// Expiration written with every entry
    pub ttl_seconds: u64,
}

impl StatsResponse {
    /// Creates a new StatsResponse from a gateway statistics snapshot
    pub fn new(stats: StatsSnapshot, ttl_seconds: u64) -> Self {
        Self {
            hits: stats.hits,
            misses: stats.misses,
            malformed_entries: stats.malformed_entries,
            origin_fetches: stats.origin_fetches,
            origin_failures: stats.origin_failures,
            read_failures: stats.read_failures,
            write_failures: stats.write_failures,
            hit_rate: stats.hit_rate(),
            ttl_seconds,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// "healthy" when the store answers, "degraded" otherwise
    pub status: String,
    /// Store backend name
    pub store: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a healthy HealthResponse with current timestamp
    pub fn healthy(store: impl Into<String>) -> Self {
        Self {
            status: "healthy".to_string(),
            store: store.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Creates a degraded HealthResponse; the cause is logged, not returned
    pub fn degraded(store: impl Into<String>) -> Self {
        Self {
            status: "degraded".to_string(),
            store: store.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Returns true when the store answered the probe
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_response_hit_rate() {
        let snapshot = StatsSnapshot {
            hits: 80,
            misses: 20,
            ..StatsSnapshot::default()
        };
        let resp = StatsResponse::new(snapshot, 10);
        assert!((resp.hit_rate - 0.8).abs() < 0.001);
        assert_eq!(resp.ttl_seconds, 10);
    }

    #[test]
    fn test_stats_response_zero_requests() {
        let resp = StatsResponse::new(StatsSnapshot::default(), 10);
        assert_eq!(resp.hit_rate, 0.0);
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy("memory");
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }

    #[test]
    fn test_degraded_health_response() {
        let resp = HealthResponse::degraded("redis");
        assert!(!resp.is_healthy());
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("degraded"));
        assert!(json.contains("redis"));
    }
}
