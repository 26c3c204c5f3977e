//! Cache Aside - A read-through HTTP gateway
//!
//! Serves per-key lookups from a key-value cache, falling back to a slow
//! origin on a miss and writing the result back with an expiration.

pub mod api;
pub mod config;
pub mod error;
pub mod gateway;
pub mod models;
pub mod origin;
pub mod store;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use gateway::{CacheGateway, GatewayOptions};
pub use tasks::spawn_cleanup_task;
