//! Cache Aside - A read-through HTTP gateway
//!
//! Serves `GET /user/:id` from a key-value cache in front of a slow origin.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cache_aside::api::{create_router, AppState};
use cache_aside::config::{Config, StoreBackend};
use cache_aside::gateway::{CacheGateway, GatewayOptions};
use cache_aside::origin::SimulatedDatabase;
use cache_aside::store::{KeyValueStore, MemoryStore, RedisStore};
use cache_aside::tasks::spawn_cleanup_task;

/// Main entry point for the gateway.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Connect to the cache store (refuse to start if unreachable)
/// 4. Build the gateway over the store and the simulated database
/// 5. Start HTTP server on configured port
/// 6. On SIGINT/SIGTERM, drain and close the store connection
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cache_aside=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting cache-aside gateway");

    let config = Config::from_env();
    info!(
        "Configuration loaded: port={}, ttl={}s, backend={:?}, store={}, read_failure_policy={:?}, single_flight={}",
        config.server_port,
        config.ttl_seconds,
        config.store_backend,
        config.store_address,
        config.read_failure_policy,
        config.single_flight
    );

    let (store, cleanup_handle) = open_store(&config).await?;

    let result = serve(&config, store.clone(), cleanup_handle).await;

    // Release the connection whether or not the server exited cleanly
    if let Err(err) = store.close().await {
        warn!(error = %err, "Failed to close cache store");
    } else {
        info!(store = store.name(), "Cache store closed");
    }

    result
}

/// Connects the configured store backend.
async fn open_store(
    config: &Config,
) -> anyhow::Result<(Arc<dyn KeyValueStore>, Option<JoinHandle<()>>)> {
    match config.store_backend {
        StoreBackend::Redis => {
            let store = RedisStore::connect(&config.store_address)
                .await
                .inspect_err(|err| {
                    error!(address = %config.store_address, error = %err, "Redis connection failed")
                })
                .with_context(|| format!("connecting to {}", config.store_address))?;
            info!(address = store.address(), "Using Redis store");
            let store: Arc<dyn KeyValueStore> = Arc::new(store);
            Ok((store, None))
        }
        StoreBackend::Memory => {
            let store = Arc::new(MemoryStore::new());
            let cleanup = spawn_cleanup_task(store.clone(), config.cleanup_interval);
            info!("Using in-memory store");
            let store: Arc<dyn KeyValueStore> = store;
            Ok((store, Some(cleanup)))
        }
    }
}

async fn serve(
    config: &Config,
    store: Arc<dyn KeyValueStore>,
    cleanup_handle: Option<JoinHandle<()>>,
) -> anyhow::Result<()> {
    let origin = Arc::new(SimulatedDatabase::new(config.origin_latency()));
    let gateway = CacheGateway::new(store, origin, GatewayOptions::from(config));
    let app = create_router(AppState::new(gateway));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cleanup_handle))
        .await
        .context("serving HTTP")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the memory store sweep if one is running.
async fn shutdown_signal(cleanup_handle: Option<JoinHandle<()>>) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!(error = %err, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                error!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    if let Some(handle) = cleanup_handle {
        handle.abort();
        warn!("Cleanup task aborted");
    }
}
