//! Live reservation handler.

use std::collections::{BTreeMap, HashSet};
use std::str::FromStr;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use stock_ledger_core::ProductId;

use crate::error::ApiError;
use crate::reservations;
use crate::state::AppState;

/// Query parameters for the reservations listing.
#[derive(Debug, Deserialize)]
pub struct ReservationsQuery {
    /// Comma-separated product ids to restrict to; omitted means every
    /// product with an open reservation.
    pub product_ids: Option<String>,
}

/// Units currently committed to open orders, per product.
#[derive(Debug, Serialize)]
pub struct ReservationsResponse {
    /// Reserved units per product. Products without open reservations
    /// are absent.
    pub reservations: BTreeMap<ProductId, i64>,
}

/// Aggregate live reservations by scanning open orders on the platform.
pub async fn list_reservations(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ReservationsQuery>,
) -> Result<Json<ReservationsResponse>, ApiError> {
    let restrict = query
        .product_ids
        .as_deref()
        .map(parse_product_ids)
        .transpose()?;

    let reservations = reservations::reserved_units(
        state.platform.as_ref(),
        restrict.as_ref(),
        state.config.reservation_scan_cap,
    )
    .await?;

    Ok(Json(ReservationsResponse { reservations }))
}

fn parse_product_ids(raw: &str) -> Result<HashSet<ProductId>, ApiError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            ProductId::from_str(s)
                .map_err(|_| ApiError::BadRequest(format!("invalid product id: {s}")))
        })
        .collect()
}
