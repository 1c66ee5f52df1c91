//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{events, health, movements, purge, rebuild, reservations, sales};
use crate::state::AppState;

/// Maximum concurrent requests for general API endpoints.
const API_MAX_CONCURRENT_REQUESTS: usize = 50;

/// Maximum concurrent rebuild control requests. Stepping is driven by an
/// external scheduler and is cheap to queue, so the limit is tight.
const REBUILD_MAX_CONCURRENT_REQUESTS: usize = 4;

/// Create the service router with all routes and middleware.
///
/// # Routes
///
/// ## Public
/// - `GET /health` - Health check
///
/// ## Ledger reads
/// - `GET /v1/movements` - Ledger rows with backward QOH reconstruction
/// - `GET /v1/sales/daily` - Zero-filled daily sales series
/// - `GET /v1/reservations` - Live reserved units per product
/// - `GET /v1/events` - Raw event log, newest first
///
/// ## Rebuild control (admin key)
/// - `POST /v1/rebuild/start` - Start a rebuild, replacing any job
/// - `POST /v1/rebuild/step` - Advance the rebuild by one batch
/// - `POST /v1/rebuild/abort` - Abort, keeping partial writes
/// - `GET /v1/rebuild/status` - Current job record
///
/// ## Destructive (admin key)
/// - `POST /v1/purge` - Delete everything the service stores
///
/// ## Hooks (signature verification)
/// - `POST /webhooks/platform` - Stock events from the host platform
pub fn create_router(state: AppState) -> Router {
    // Extract config values before moving state
    let cors_origins = state.config.cors_origins.clone();
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout_seconds = state.config.request_timeout_seconds;

    // Build CORS layer
    let cors = build_cors_layer(&cors_origins);

    let state = Arc::new(state);

    let rebuild_routes = Router::new()
        .route("/start", post(rebuild::start_rebuild))
        .route("/step", post(rebuild::step_rebuild))
        .route("/abort", post(rebuild::abort_rebuild))
        .route("/status", get(rebuild::rebuild_status))
        .layer(ConcurrencyLimitLayer::new(REBUILD_MAX_CONCURRENT_REQUESTS));

    let api_routes = Router::new()
        .route("/movements", get(movements::list_movements))
        .route("/sales/daily", get(sales::daily_series))
        .route("/reservations", get(reservations::list_reservations))
        .route("/events", get(events::list_events))
        .route("/purge", post(purge::purge))
        .nest("/rebuild", rebuild_routes)
        .layer(ConcurrencyLimitLayer::new(API_MAX_CONCURRENT_REQUESTS));

    Router::new()
        // Health (public, no rate limit)
        .route("/health", get(health::health))
        // API v1 routes (rate limited)
        .nest("/v1", api_routes)
        // Hooks (no rate limit - delivery is controlled by the platform)
        .route("/webhooks/platform", post(events::platform_hook))
        // Global middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(
            request_timeout_seconds,
        )))
        .with_state(state)
}

/// Build the CORS layer from configured origins.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
