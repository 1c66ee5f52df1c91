//! Stock Ledger HTTP API Service.
//!
//! This crate provides the HTTP API for the stock ledger, including:
//!
//! - Stock event intake from the host platform's hooks
//! - Movement listings with backward QOH reconstruction
//! - Daily sales series and live reservation aggregation
//! - Externally-stepped ledger rebuilds from order history
//!
//! # Authentication
//!
//! Destructive endpoints (rebuild control, purge) require the configured
//! admin API key; platform hooks are verified against a shared HMAC
//! secret when one is configured. Read endpoints are open.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Allow some pedantic lints that are noisy for Axum handler functions
#![allow(clippy::missing_errors_doc)] // Axum handlers all return Result
#![allow(clippy::unused_async)] // Handlers need async for consistency

pub mod auth;
pub mod config;
pub mod crypto;
pub mod error;
pub mod handlers;
pub mod platform;
pub mod rebuild;
pub mod recorder;
pub mod reservations;
pub mod routes;
pub mod state;

pub use config::ServiceConfig;
pub use error::ApiError;
pub use platform::{CommercePlatform, PlatformError, RestPlatform};
pub use routes::create_router;
pub use state::AppState;
