//! API Handlers
//!
//! HTTP request handlers for each gateway endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderName, StatusCode},
    response::IntoResponse,
    Json,
};
use tracing::warn;

use crate::error::Result;
use crate::gateway::CacheGateway;
use crate::models::{HealthResponse, StatsResponse, UserRecord};

/// Response header reporting HIT, MISS or BYPASS
pub const X_CACHE: HeaderName = HeaderName::from_static("x-cache");

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Cache-aside gateway over the shared store handle
    pub gateway: Arc<CacheGateway<UserRecord>>,
}

impl AppState {
    /// Creates a new AppState around the given gateway.
    pub fn new(gateway: CacheGateway<UserRecord>) -> Self {
        Self {
            gateway: Arc::new(gateway),
        }
    }
}

/// Handler for GET /user/:id
///
/// The id is used verbatim as the cache key. Any cache or origin failure
/// becomes a plain-text 500.
pub async fn user_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let lookup = state.gateway.lookup(&id).await?;

    Ok((
        [(X_CACHE, lookup.outcome.as_str())],
        Json(lookup.record),
    ))
}

/// Handler for GET /stats
///
/// Returns current gateway statistics.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::new(
        state.gateway.stats(),
        state.gateway.ttl_seconds(),
    ))
}

/// Handler for GET /health
///
/// Pings the store; 503 when it does not answer. The store error is
/// logged only, since it can carry the store address.
pub async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let store = state.gateway.store();

    match store.ping().await {
        Ok(()) => (StatusCode::OK, Json(HealthResponse::healthy(store.name()))),
        Err(err) => {
            warn!(store = store.name(), error = %err, "Store health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse::degraded(store.name())),
            )
        }
    }
}
