//! Stock Ledger Service - HTTP API for the inventory movement ledger
//!
//! This is the main entry point for the stock-ledger service.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stock_ledger_service::{create_router, AppState, RestPlatform, ServiceConfig};
use stock_ledger_store::RocksStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,stock_ledger=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Stock Ledger Service");

    // Load configuration from environment
    let config = ServiceConfig::from_env();

    tracing::info!(
        listen_addr = %config.listen_addr,
        data_dir = %config.data_dir,
        platform_base_url = %config.platform_base_url,
        admin_key_configured = %config.admin_api_key.is_some(),
        hook_secret_configured = %config.hook_secret.is_some(),
        "Service configuration loaded"
    );

    // Initialize RocksDB store
    tracing::info!(path = %config.data_dir, "Opening RocksDB store");
    let store = Arc::new(RocksStore::open(&config.data_dir)?);

    // Platform API client
    let platform = Arc::new(RestPlatform::new(
        &config.platform_base_url,
        config.platform_api_key.clone(),
    ));

    // Build app state
    let state = AppState::new(store, platform, config.clone());

    // Create the router
    let app = create_router(state);
    tracing::info!("Router configured with all API endpoints");

    // Start HTTP server
    tracing::info!(listen_addr = %config.listen_addr, "Starting HTTP server");
    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
