//! Daily sales series handler.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use chrono::{DateTime, Duration, Local, Utc};
use serde::Deserialize;

use stock_ledger_core::{daily_sales, DailySales, MovementKind, ProductId};
use stock_ledger_store::Store;

use crate::error::ApiError;
use crate::state::AppState;

/// Window length when the request does not say.
const DEFAULT_DAYS: usize = 30;

/// Longest series the endpoint will build.
const MAX_DAYS: usize = 365;

/// Rows fetched from the ledger to bucket into the series. Bounded so a
/// very busy product cannot make the request unbounded.
const MAX_SERIES_ROWS: usize = 10_000;

/// Query parameters for the daily sales series.
#[derive(Debug, Deserialize)]
pub struct SalesQuery {
    /// The product to aggregate.
    pub product_id: ProductId,

    /// Number of trailing calendar days, ending today.
    pub days: Option<usize>,
}

/// Zero-filled daily units-sold series for one product.
///
/// Days are calendar days in the server's local timezone, matching what
/// the storefront's reporting shows.
pub async fn daily_series(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SalesQuery>,
) -> Result<Json<DailySales>, ApiError> {
    let days = query.days.unwrap_or(DEFAULT_DAYS);
    if days == 0 || days > MAX_DAYS {
        return Err(ApiError::BadRequest(format!(
            "days must be between 1 and {MAX_DAYS}"
        )));
    }

    let window_days = i64::try_from(days).unwrap_or(i64::MAX);
    let since: DateTime<Utc> = Utc::now() - Duration::days(window_days);

    let movements =
        state
            .store
            .movements_for_product(query.product_id, MAX_SERIES_ROWS, Some(since))?;

    let entries: Vec<_> = movements
        .iter()
        .filter(|m| m.kind == MovementKind::Sale)
        .map(|m| (m.created_at.with_timezone(&Local).date_naive(), m.units()))
        .collect();

    let today = Local::now().date_naive();
    let series = daily_sales(&entries, days, today)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    Ok(Json(series))
}
