//! Workeasy gateway library.
//!
//! HTTP API for the shift-scheduling app. Row storage, auth and database
//! functions live in the hosted BaaS; the gateway negotiates the locale,
//! verifies sessions, checks store roles and forwards the rest.

pub mod audit;
pub mod clients;
pub mod config;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod pagination;
pub mod resources;
pub mod routes;
pub mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;

use common::{AppError, AppResult};

use crate::clients::{BaasClient, HttpBackend};
use crate::config::GatewayConfig;
use crate::middleware::Cache;
use crate::routes::create_router;
use crate::state::AppState;

/// Build the shared state from configuration.
pub async fn build_state(config: GatewayConfig) -> AppResult<AppState> {
    let backend = HttpBackend::new(&config.baas)?;
    let baas = BaasClient::new(Arc::new(backend));

    let cache = match config.cache.url.as_deref() {
        Some(url) => {
            let cache = Cache::connect(url, config.cache.membership_ttl_seconds)
                .await
                .map_err(|e| AppError::internal(format!("Failed to connect to Redis: {}", e)))?;
            info!("Redis cache connected");
            Some(Arc::new(cache))
        }
        None => {
            info!("REDIS_URL not set; membership cache and rate limiting disabled");
            None
        }
    };

    Ok(AppState::new(baas, cache, config))
}

/// Run the HTTP server until ctrl-c.
pub async fn run_server(config: GatewayConfig) -> AppResult<()> {
    let addr = config.server_addr();
    let state = build_state(config).await?;
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind to {}: {}", addr, e)))?;
    info!("Gateway listening on http://{}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    info!("Shutdown signal received");
}
