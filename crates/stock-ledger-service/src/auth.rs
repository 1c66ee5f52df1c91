//! Authentication extractors.
//!
//! Destructive endpoints (rebuild control, purge) require the
//! `X-Admin-Key` header to match the configured admin API key. When no
//! admin key is configured those endpoints reject every request.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::ApiError;
use crate::state::AppState;

/// Admin authentication via API key.
#[derive(Debug, Clone)]
pub struct AdminAuth {
    /// Admin identifier (for audit logging).
    pub admin_id: String,
}

impl FromRequestParts<Arc<AppState>> for AdminAuth {
    type Rejection = ApiError;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut Parts,
        state: &'life1 Arc<AppState>,
    ) -> ::core::pin::Pin<
        Box<
            dyn ::core::future::Future<Output = Result<Self, Self::Rejection>>
                + ::core::marker::Send
                + 'async_trait,
        >,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            // Check for X-Admin-Key header
            let admin_key = parts
                .headers
                .get("x-admin-key")
                .and_then(|v| v.to_str().ok())
                .ok_or(ApiError::Unauthorized)?;

            // Validate against configured admin API key
            let expected_key = state
                .config
                .admin_api_key
                .as_ref()
                .ok_or(ApiError::Unauthorized)?;

            if admin_key != expected_key {
                return Err(ApiError::Unauthorized);
            }

            // Extract admin identifier from header if provided
            let admin_id = parts
                .headers
                .get("x-admin-id")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("admin")
                .to_string();

            tracing::info!(admin_id = %admin_id, "Admin authenticated");

            Ok(AdminAuth { admin_id })
        })
    }
}
