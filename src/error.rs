//! Error types for the gateway
//!
//! Store and origin failures are modelled separately and folded into
//! [`GatewayError`], which is the only error that reaches the HTTP layer.

use std::time::Duration;

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

// == Store Error Enum ==
/// Failures reported by a key-value store adapter.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Store unreachable, connection dropped or timed out
    #[error("store connection failed: {0}")]
    Connection(String),

    /// Store answered with something the adapter could not interpret
    #[error("store protocol error: {0}")]
    Protocol(String),

    /// Expiration must be a positive number of seconds
    #[error("invalid ttl: {0} seconds")]
    InvalidTtl(u64),
}

impl From<redis::RedisError> for StoreError {
    fn from(err: redis::RedisError) -> Self {
        if err.is_io_error()
            || err.is_connection_dropped()
            || err.is_connection_refusal()
            || err.is_timeout()
        {
            StoreError::Connection(err.to_string())
        } else {
            StoreError::Protocol(err.to_string())
        }
    }
}

// == Origin Error Enum ==
/// Failures reported by the origin data source.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OriginError {
    /// The origin rejected or could not serve the request
    #[error("origin unavailable: {0}")]
    Unavailable(String),

    /// The origin did not answer within the configured budget
    #[error("origin timed out after {0:?}")]
    TimedOut(Duration),
}

// == Gateway Error Enum ==
/// Unified error type for a cache-aside lookup.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// Cache store unreachable or protocol failure on read
    #[error("cache unavailable: {0}")]
    CacheUnavailable(String),

    /// Origin fetch rejected or timed out
    #[error("origin failure: {0}")]
    OriginFailure(String),

    /// Stored value does not deserialize into the record shape
    #[error("malformed cache entry for key '{key}': {reason}")]
    MalformedCacheEntry { key: String, reason: String },
}

impl From<StoreError> for GatewayError {
    fn from(err: StoreError) -> Self {
        GatewayError::CacheUnavailable(err.to_string())
    }
}

impl From<OriginError> for GatewayError {
    fn from(err: OriginError) -> Self {
        GatewayError::OriginFailure(err.to_string())
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let message = match &self {
            GatewayError::CacheUnavailable(_) => "Cache store error",
            GatewayError::OriginFailure(_) => "Error fetching data",
            GatewayError::MalformedCacheEntry { .. } => "Corrupt cache entry",
        };

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            message,
        )
            .into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for gateway operations.
pub type Result<T> = std::result::Result<T, GatewayError>;
