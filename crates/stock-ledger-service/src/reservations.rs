//! Live reservation aggregation.
//!
//! Reservations are not part of the ledger. They are computed on demand
//! by scanning open orders on the platform, because a pending order can
//! flip to paid or cancelled at any time and a cached value would lie.
//!
//! The scan is capped; catalogs with more open orders than the cap get
//! silently truncated totals, trading completeness for a bounded
//! request cost.

use std::collections::{BTreeMap, HashSet};

use stock_ledger_core::{aggregate_lines, OrderFilter, OrderId, ProductId};

use crate::error::ApiError;
use crate::platform::CommercePlatform;

/// Orders fetched per platform page while scanning.
const SCAN_PAGE: usize = 200;

/// Sum units committed to open orders, per product.
///
/// When `restrict` is given, only those products are totalled; products
/// with no open reservations are absent from the result either way.
///
/// # Errors
///
/// Fails when the platform cannot list open orders. A failure fetching a
/// single listed order is logged and skipped.
pub async fn reserved_units(
    platform: &dyn CommercePlatform,
    restrict: Option<&HashSet<ProductId>>,
    scan_cap: usize,
) -> Result<BTreeMap<ProductId, i64>, ApiError> {
    let filter = OrderFilter::reserved();
    let mut totals: BTreeMap<ProductId, i64> = BTreeMap::new();
    let mut cursor = OrderId::new(0);
    let mut scanned = 0usize;

    loop {
        let page = SCAN_PAGE.min(scan_cap.saturating_sub(scanned));
        if page == 0 {
            tracing::debug!(scan_cap, "reservation scan cap reached");
            break;
        }

        let ids = platform.list_orders(&filter, cursor, page).await?;
        if ids.is_empty() {
            break;
        }

        for id in &ids {
            if *id > cursor {
                cursor = *id;
            }
            scanned += 1;

            match platform.order(*id).await {
                Ok(Some(order)) => {
                    for (product, units) in aggregate_lines(&order.line_items) {
                        if restrict.is_some_and(|wanted| !wanted.contains(&product)) {
                            continue;
                        }
                        #[allow(clippy::cast_possible_wrap)]
                        {
                            *totals.entry(product).or_default() += units as i64;
                        }
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(order_id = %id, error = %e, "skipping open order in scan");
                }
            }
        }

        if ids.len() < page {
            break;
        }
    }

    Ok(totals)
}
