//! Item Cache - CRUD item service with a cache-aside layer
//!
//! # Startup Sequence
//! 1. Initialize tracing subscriber for logging
//! 2. Load configuration from environment variables
//! 3. Build the Postgres pool and ensure the schema exists
//! 4. Build the Redis cache gateway (connects on first use)
//! 5. Start HTTP server on configured port
//! 6. On SIGINT/SIGTERM stop accepting requests, then close the pool and
//!    the cache connection. Exit status is non-zero if either close fails.

use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use item_cache::api::create_router;
use item_cache::cache::{CacheGateway, RedisCache};
use item_cache::store::{ItemStore, PgItemStore};
use item_cache::{AppState, Config};

#[tokio::main]
async fn main() -> ExitCode {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "item_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run().await {
        Ok(()) => {
            info!("Server shutdown complete");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = ?err, "Server exited with error");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<()> {
    info!("Starting Item Cache Server");

    let config = Config::from_env();
    info!(
        "Configuration loaded: port={}, db={}@{}:{}/{}, redis={}:{}",
        config.server_port,
        config.db_user,
        config.db_host,
        config.db_port,
        config.db_name,
        config.redis_host,
        config.redis_port
    );

    let pg = PgItemStore::connect_lazy(&config.database_settings());
    if let Err(err) = pg.init_schema().await {
        // Requests will surface store errors as 500 until the database is reachable
        error!(error = %err, "Database initialization error");
    }
    let store: Arc<dyn ItemStore> = Arc::new(pg);

    let cache: Arc<dyn CacheGateway> = Arc::new(
        RedisCache::new(config.redis_settings()).context("invalid redis configuration")?,
    );
    info!("Cache gateway initialized");

    let app = create_router(AppState::from_gateways(store.clone(), cache.clone()));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    close_resources(store.as_ref(), cache.as_ref()).await
}

/// Closes both gateways, attempting each even if the other fails.
async fn close_resources(store: &dyn ItemStore, cache: &dyn CacheGateway) -> anyhow::Result<()> {
    let store_closed = store.close().await;
    if let Err(err) = &store_closed {
        error!(error = %err, "Error closing database pool");
    }

    let cache_closed = cache.close().await;
    if let Err(err) = &cache_closed {
        error!(error = %err, "Error closing cache connection");
    }

    store_closed.context("closing database pool")?;
    cache_closed.context("closing cache connection")?;
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!(error = %err, "Failed to install Ctrl+C handler");
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
                warn!(error = %err, "Failed to install SIGTERM handler");
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
}
