//! Movement listing and reconciliation handler.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use stock_ledger_core::{reconcile, ProductId, ReconciledMovement, SalesSummary};
use stock_ledger_store::Store;

use crate::error::ApiError;
use crate::state::AppState;

/// Rows returned when the request does not say.
const DEFAULT_LIMIT: usize = 250;

/// Hard ceiling on rows per listing.
const MAX_LIMIT: usize = 1000;

/// Query parameters for the movements listing.
#[derive(Debug, Deserialize)]
pub struct MovementsQuery {
    /// The product to list.
    pub product_id: ProductId,

    /// Maximum rows to return.
    pub limit: Option<usize>,
}

/// Movements listing with reconstructed quantities and rolling sums.
#[derive(Debug, Serialize)]
pub struct MovementsResponse {
    /// The product listed.
    pub product_id: ProductId,

    /// The quantity-on-hand the reconstruction anchored on.
    pub current_qoh: i64,

    /// Where `current_qoh` came from: "live", "cache", or "untracked".
    pub qoh_source: &'static str,

    /// Ledger rows, newest first, annotated with reconstruction output.
    pub movements: Vec<ReconciledMovement>,

    /// Rolling sale sums over the returned rows.
    pub summary: SalesSummary,
}

/// List a product's ledger rows with backward QOH reconstruction.
pub async fn list_movements(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MovementsQuery>,
) -> Result<Json<MovementsResponse>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

    let movements = state
        .store
        .movements_for_product(query.product_id, limit, None)?;

    let (current_qoh, qoh_source) = anchor_qoh(&state, query.product_id).await?;

    let summary = SalesSummary::compute(&movements, Utc::now());
    let reconciled = reconcile(&movements, current_qoh);

    Ok(Json(MovementsResponse {
        product_id: query.product_id,
        current_qoh,
        qoh_source,
        movements: reconciled,
        summary,
    }))
}

/// Resolve the quantity-on-hand to anchor the reconstruction on: the
/// platform's live counter, falling back to the snapshot cache when the
/// platform does not track stock for the product or cannot be reached.
async fn anchor_qoh(
    state: &AppState,
    product_id: ProductId,
) -> Result<(i64, &'static str), ApiError> {
    match state.platform.current_stock(product_id).await {
        Ok(Some(qoh)) => Ok((qoh, "live")),
        Ok(None) => match state.store.get_stock_snapshot(product_id)? {
            Some(snapshot) => Ok((snapshot.qoh, "cache")),
            None => Ok((0, "untracked")),
        },
        Err(e) => {
            tracing::warn!(product_id = %product_id, error = %e, "live stock lookup failed");
            match state.store.get_stock_snapshot(product_id)? {
                Some(snapshot) => Ok((snapshot.qoh, "cache")),
                None => Err(e.into()),
            }
        }
    }
}
