//! Single-Flight Module
//!
//! Per-key registry of pending work. Concurrent callers for the same key
//! share the result of one execution instead of each running it.

use std::future::Future;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::OnceCell;

use crate::error::Result;

type Flight<T> = Arc<OnceCell<Result<T>>>;

// == Single Flight ==
/// Coalesces concurrent executions keyed by string.
///
/// The first caller for a key runs its future; callers arriving while it is
/// pending wait and receive a clone of the same result. Once the flight
/// lands the key is released, so later callers start a fresh execution.
#[derive(Debug)]
pub struct SingleFlight<T> {
    flights: DashMap<String, Flight<T>>,
}

impl<T> Default for SingleFlight<T> {
    fn default() -> Self {
        Self {
            flights: DashMap::new(),
        }
    }
}

impl<T: Clone> SingleFlight<T> {
    pub fn new() -> Self {
        Self::default()
    }

    // == Run ==
    /// Runs `work` for `key` unless a flight for `key` is already pending.
    pub async fn run<F, Fut>(&self, key: &str, work: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let flight = self
            .flights
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone();

        // Releases the key on completion and on cancellation alike
        let guard = FlightGuard {
            flights: &self.flights,
            key,
            flight,
        };

        let result = guard.flight.get_or_init(work).await.clone();
        result
    }

    /// Number of keys with a pending flight.
    pub fn in_flight(&self) -> usize {
        self.flights.len()
    }
}

/// Removes its flight from the registry when dropped.
struct FlightGuard<'a, T> {
    flights: &'a DashMap<String, Flight<T>>,
    key: &'a str,
    flight: Flight<T>,
}

impl<T> Drop for FlightGuard<'_, T> {
    fn drop(&mut self) {
        // Only release our own flight; a newer one may already sit under the key
        self.flights
            .remove_if(self.key, |_, current| Arc::ptr_eq(current, &self.flight));
    }
}
