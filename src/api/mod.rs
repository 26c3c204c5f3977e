//! API Module
//!
//! HTTP handlers and routing for the gateway.
//!
//! # Endpoints
//! - `GET /user/:id` - Cache-aside user lookup
//! - `GET /stats` - Gateway statistics
//! - `GET /health` - Store health probe

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
