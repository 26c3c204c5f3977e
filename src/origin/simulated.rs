//! Simulated Database Module
//!
//! Fixed-latency stand-in for a real database lookup.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::error::OriginError;
use crate::models::UserRecord;
use crate::origin::Origin;

/// Default simulated lookup latency
pub const DEFAULT_LATENCY: Duration = Duration::from_millis(1000);

// == Simulated Database ==
/// Resolves every id to `{ id, name: "User <id>" }` after a constant delay.
#[derive(Debug, Clone)]
pub struct SimulatedDatabase {
    latency: Duration,
}

impl SimulatedDatabase {
    /// Creates a database that answers after `latency`.
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }

    /// Returns the configured latency.
    pub fn latency(&self) -> Duration {
        self.latency
    }
}

impl Default for SimulatedDatabase {
    fn default() -> Self {
        Self::new(DEFAULT_LATENCY)
    }
}

#[async_trait]
impl Origin for SimulatedDatabase {
    type Record = UserRecord;

    fn name(&self) -> &'static str {
        "simulated-database"
    }

    async fn fetch(&self, id: &str) -> Result<UserRecord, OriginError> {
        debug!(id, latency_ms = self.latency.as_millis() as u64, "Querying database");
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        Ok(UserRecord::new(id, format!("User {}", id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn test_fetch_derives_record_from_id() {
        let db = SimulatedDatabase::new(Duration::ZERO);

        let user = db.fetch("42").await.unwrap();
        assert_eq!(user, UserRecord::new("42", "User 42"));
    }

    #[tokio::test]
    async fn test_fetch_passes_odd_ids_through() {
        let db = SimulatedDatabase::new(Duration::ZERO);

        let user = db.fetch("a b%2F").await.unwrap();
        assert_eq!(user.id, "a b%2F");
        assert_eq!(user.name, "User a b%2F");
    }

    #[tokio::test]
    async fn test_fetch_waits_for_latency() {
        let db = SimulatedDatabase::new(Duration::from_millis(100));

        let started = Instant::now();
        db.fetch("1").await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(100));
    }

    #[test]
    fn test_default_latency_is_one_second() {
        assert_eq!(SimulatedDatabase::default().latency(), Duration::from_secs(1));
    }
}
