//! Origin Module
//!
//! The authoritative, slow data source behind the cache. Origins know
//! nothing about caching; the gateway decides what gets stored.

mod simulated;

use async_trait::async_trait;

use crate::error::OriginError;

pub use simulated::SimulatedDatabase;

// == Origin Trait ==
/// Resolves an identifier to a record from the source of truth.
#[async_trait]
pub trait Origin: Send + Sync {
    /// Record type produced by this origin.
    type Record: Send;

    /// Short name used in logs.
    fn name(&self) -> &'static str {
        "origin"
    }

    /// Fetches the record for `id`.
    async fn fetch(&self, id: &str) -> Result<Self::Record, OriginError>;
}
