//! Rebuild control handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use stock_ledger_core::{RebuildJob, RebuildScope};
use stock_ledger_store::Store;

use crate::auth::AdminAuth;
use crate::error::ApiError;
use crate::rebuild;
use crate::state::AppState;

/// Hard ceiling on per-step batch size, whatever the request asks for.
const MAX_BATCH_SIZE: usize = 500;

/// Request body for starting a rebuild.
#[derive(Debug, Deserialize)]
pub struct StartRebuildRequest {
    /// What to rebuild.
    #[serde(flatten)]
    pub scope: RebuildScope,

    /// Orders examined per step; defaults to the configured batch size.
    pub batch_size: Option<usize>,
}

/// Start a rebuild, replacing any existing job.
pub async fn start_rebuild(
    State(state): State<Arc<AppState>>,
    auth: AdminAuth,
    Json(body): Json<StartRebuildRequest>,
) -> Result<Json<RebuildJob>, ApiError> {
    tracing::info!(admin_id = %auth.admin_id, scope = ?body.scope, "rebuild requested");

    let batch_size = body
        .batch_size
        .unwrap_or(state.config.rebuild_batch_size)
        .clamp(1, MAX_BATCH_SIZE);

    let job = rebuild::start(
        state.store.as_ref(),
        state.platform.as_ref(),
        body.scope,
        batch_size,
    )
    .await?;

    Ok(Json(job))
}

/// Advance the rebuild by one batch.
pub async fn step_rebuild(
    State(state): State<Arc<AppState>>,
    _auth: AdminAuth,
) -> Result<Json<RebuildJob>, ApiError> {
    rebuild::step(state.store.as_ref(), state.platform.as_ref())
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("no rebuild job".into()))
}

/// Abort a running rebuild, keeping partial writes.
pub async fn abort_rebuild(
    State(state): State<Arc<AppState>>,
    auth: AdminAuth,
) -> Result<Json<RebuildJob>, ApiError> {
    tracing::info!(admin_id = %auth.admin_id, "rebuild abort requested");

    rebuild::abort(state.store.as_ref())?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("no rebuild job".into()))
}

/// Get the current rebuild job, finished or not.
pub async fn rebuild_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<RebuildJob>, ApiError> {
    state
        .store
        .get_job()?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("no rebuild job".into()))
}
