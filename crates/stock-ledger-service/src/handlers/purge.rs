//! Purge handler.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use stock_ledger_store::Store;

use crate::auth::AdminAuth;
use crate::error::ApiError;
use crate::state::AppState;

/// Acknowledgement for a completed purge.
#[derive(Debug, Serialize)]
pub struct PurgeResponse {
    /// Whether the purge completed.
    pub purged: bool,
}

/// Irreversibly delete the ledger, event log, snapshot cache, and any
/// rebuild job record. There is no undo; the ledger is re-derived by a
/// subsequent rebuild.
pub async fn purge(
    State(state): State<Arc<AppState>>,
    auth: AdminAuth,
) -> Result<Json<PurgeResponse>, ApiError> {
    tracing::warn!(admin_id = %auth.admin_id, "purging all ledger data");
    state.store.purge()?;
    Ok(Json(PurgeResponse { purged: true }))
}
