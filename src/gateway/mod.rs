//! Gateway Module
//!
//! Cache-aside lookups: the gateway, not the store, populates the cache
//! on a miss.

mod service;
mod single_flight;
mod stats;


// Re-export public types
pub use service::{CacheGateway, CacheOutcome, GatewayOptions, Lookup, DEFAULT_TTL_SECONDS};
pub use single_flight::SingleFlight;
pub use stats::{GatewayStats, StatsSnapshot};
