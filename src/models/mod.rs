//! Domain records and response models
//!
//! This module defines the record served by the gateway and the DTOs
//! used for the auxiliary HTTP endpoints.

pub mod responses;
pub mod user;

// Re-export commonly used types
pub use responses::{HealthResponse, StatsResponse};
pub use user::UserRecord;
