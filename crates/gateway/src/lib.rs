//! Directory Gateway Library
//!
//! HTTP REST API in front of the JSON user store.

pub mod config;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use std::net::SocketAddr;

use axum::{extract::Request, ServiceExt};
use tracing::info;

use user_store_lib::Store;

use crate::config::GatewayConfig;
use crate::routes::create_app;
use crate::state::AppState;

/// Open the store and serve HTTP until interrupted.
pub async fn run(config: GatewayConfig) -> Result<(), Box<dyn std::error::Error>> {
    let store = Store::open(&config.store).await?;

    let addr: SocketAddr = config.service.bind_addr().parse()?;
    let state = AppState::new(store.user(), config);
    let app = create_app(state);

    info!("Directory listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    store.save().await?;
    info!(path = %store.path().display(), "user store flushed, shutting down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
