//! Rebuild orchestration.
//!
//! A rebuild destructively re-derives ledger rows from the authoritative
//! order history on the platform. It is advanced by repeated external
//! step calls rather than a background task, so an interrupted rebuild
//! resumes from its persisted cursor on the next call.

use chrono::{Duration, Utc};

use stock_ledger_core::{movements_from_order, OrderType, RebuildJob, RebuildScope, RebuildStatus};
use stock_ledger_core::SOURCE_REBUILD;
use stock_ledger_store::Store;

use crate::error::ApiError;
use crate::platform::CommercePlatform;

/// Start a rebuild, clearing the scope's slice of the ledger and
/// replacing any prior job record.
///
/// # Errors
///
/// Fails when the ledger cannot be cleared or the platform cannot be
/// asked for the candidate count.
pub async fn start(
    store: &dyn Store,
    platform: &dyn CommercePlatform,
    scope: RebuildScope,
    batch_size: usize,
) -> Result<RebuildJob, ApiError> {
    let now = Utc::now();

    let window_start = match scope {
        RebuildScope::All => None,
        RebuildScope::Product { window_days, .. } => {
            Some(now - Duration::days(i64::from(window_days)))
        }
    };

    // Clear exactly the slice this rebuild re-derives. For a full rebuild
    // that is the whole ledger; for a product rebuild only that product's
    // rows inside the window.
    match scope {
        RebuildScope::All => store.truncate_movements()?,
        RebuildScope::Product { product_id, .. } => {
            if let Some(since) = window_start {
                let removed = store.clear_product_window(product_id, since)?;
                tracing::info!(product_id = %product_id, removed, "cleared product window");
            }
        }
    }

    let job = RebuildJob::new(scope, 0, batch_size, window_start, now);
    let total = platform.count_orders(&job.filter()).await?;
    let job = RebuildJob { total, ..job };

    store.put_job(&job)?;
    tracing::info!(total = job.total, batch_size = job.batch_size, "rebuild started");
    Ok(job)
}

/// Advance the rebuild by one batch. Returns `None` when no job record
/// exists; a job that is no longer running is returned untouched.
///
/// A failure fetching or replaying a single order is counted on the job
/// and skipped; the batch keeps going. Failures listing the batch itself
/// propagate and leave the cursor where it was.
///
/// # Errors
///
/// Fails when the job record cannot be read or written, or when the
/// platform cannot list the next batch of order ids.
pub async fn step(
    store: &dyn Store,
    platform: &dyn CommercePlatform,
) -> Result<Option<RebuildJob>, ApiError> {
    let Some(mut job) = store.get_job()? else {
        return Ok(None);
    };
    if !job.is_running() {
        return Ok(Some(job));
    }

    let ids = platform
        .list_orders(&job.filter(), job.cursor, job.batch_size)
        .await?;

    if ids.is_empty() {
        job.status = RebuildStatus::Done;
        store.put_job(&job)?;
        tracing::info!(processed = job.processed, failures = job.failures, "rebuild done");
        return Ok(Some(job));
    }

    let scoped = job.scoped_product();

    for id in &ids {
        if *id > job.cursor {
            job.cursor = *id;
        }

        match platform.order(*id).await {
            Ok(Some(order)) => {
                // Refund sub-orders share the order table but their effect
                // already shows up as the parent's refunded status.
                if order.order_type != OrderType::Order {
                    continue;
                }
                for movement in movements_from_order(&order, SOURCE_REBUILD) {
                    if scoped.is_some_and(|p| p != movement.product_id) {
                        continue;
                    }
                    if let Err(e) = store.insert_movement(&movement) {
                        tracing::warn!(order_id = %id, error = %e, "failed to insert rebuilt row");
                        job.failures += 1;
                    }
                }
            }
            Ok(None) => {
                tracing::debug!(order_id = %id, "order listed but not found, skipping");
            }
            Err(e) => {
                tracing::warn!(order_id = %id, error = %e, "failed to replay order, skipping");
                job.failures += 1;
            }
        }
    }

    job.processed += ids.len() as u64;
    if job.processed >= job.total {
        job.status = RebuildStatus::Done;
        tracing::info!(processed = job.processed, failures = job.failures, "rebuild done");
    }

    store.put_job(&job)?;
    Ok(Some(job))
}

/// Abort a running rebuild, retaining partial writes. Returns `None`
/// when no job record exists; a finished job is returned untouched.
///
/// # Errors
///
/// Fails when the job record cannot be read or written.
pub fn abort(store: &dyn Store) -> Result<Option<RebuildJob>, ApiError> {
    let Some(mut job) = store.get_job()? else {
        return Ok(None);
    };

    if job.is_running() {
        job.status = RebuildStatus::Aborted;
        store.put_job(&job)?;
        tracing::info!(processed = job.processed, "rebuild aborted");
    }

    Ok(Some(job))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tempfile::TempDir;

    use stock_ledger_core::{
        OrderFilter, OrderId, OrderLine, OrderRecord, OrderStatus, ProductId,
    };
    use stock_ledger_store::RocksStore;

    use crate::platform::PlatformError;

    /// In-memory platform over a fixed order list, with optional ids that
    /// fail on fetch.
    struct FixedPlatform {
        orders: Vec<OrderRecord>,
        failing: Vec<OrderId>,
        fetches: Mutex<u64>,
    }

    impl FixedPlatform {
        fn new(orders: Vec<OrderRecord>) -> Self {
            Self {
                orders,
                failing: Vec::new(),
                fetches: Mutex::new(0),
            }
        }

        fn matches(filter: &OrderFilter, order: &OrderRecord) -> bool {
            order.order_type == filter.order_type
                && filter
                    .statuses
                    .as_ref()
                    .map_or(true, |s| s.contains(&order.status))
                && filter
                    .created_after
                    .map_or(true, |t| order.created_at >= t)
        }
    }

    #[async_trait]
    impl CommercePlatform for FixedPlatform {
        async fn order(&self, id: OrderId) -> Result<Option<OrderRecord>, PlatformError> {
            *self.fetches.lock().unwrap() += 1;
            if self.failing.contains(&id) {
                return Err(PlatformError::Api {
                    status: 500,
                    message: "boom".into(),
                });
            }
            Ok(self.orders.iter().find(|o| o.id == id).cloned())
        }

        async fn list_orders(
            &self,
            filter: &OrderFilter,
            after: OrderId,
            limit: usize,
        ) -> Result<Vec<OrderId>, PlatformError> {
            let mut ids: Vec<OrderId> = self
                .orders
                .iter()
                .filter(|o| o.id > after && Self::matches(filter, o))
                .map(|o| o.id)
                .collect();
            ids.sort_unstable();
            ids.truncate(limit);
            Ok(ids)
        }

        async fn count_orders(&self, filter: &OrderFilter) -> Result<u64, PlatformError> {
            Ok(self
                .orders
                .iter()
                .filter(|o| Self::matches(filter, o))
                .count() as u64)
        }

        async fn current_stock(&self, _: ProductId) -> Result<Option<i64>, PlatformError> {
            Ok(None)
        }
    }

    fn order(id: u64, status: OrderStatus, product: u64, qty: u64) -> OrderRecord {
        OrderRecord {
            id: OrderId::new(id),
            status,
            order_type: OrderType::Order,
            created_at: Utc::now() - Duration::days(1),
            line_items: vec![OrderLine {
                product_id: ProductId::new(product),
                quantity: qty,
                is_variation: false,
                parent_id: None,
            }],
            customer_label: None,
        }
    }

    fn store() -> (RocksStore, TempDir) {
        let dir = TempDir::new().unwrap();
        (RocksStore::open(dir.path()).unwrap(), dir)
    }

    #[tokio::test]
    async fn full_rebuild_counts_skipped_orders_and_finishes() {
        let (store, _dir) = store();
        let platform = FixedPlatform::new(vec![
            order(501, OrderStatus::Completed, 10, 2),
            order(502, OrderStatus::Pending, 10, 1),
            order(503, OrderStatus::Processing, 10, 4),
        ]);

        let job = start(&store, &platform, RebuildScope::All, 50).await.unwrap();
        assert_eq!(job.total, 3);

        let job = step(&store, &platform).await.unwrap().unwrap();
        assert_eq!(job.processed, 3);
        assert_eq!(job.status, RebuildStatus::Done);
        assert_eq!(job.failures, 0);

        // The pending order produced no row.
        let rows = store
            .movements_for_product(ProductId::new(10), 10, None)
            .unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[tokio::test]
    async fn cursor_advances_monotonically_across_steps() {
        let (store, _dir) = store();
        let platform = FixedPlatform::new(vec![
            order(501, OrderStatus::Completed, 10, 1),
            order(502, OrderStatus::Completed, 10, 1),
            order(503, OrderStatus::Completed, 10, 1),
        ]);

        start(&store, &platform, RebuildScope::All, 1).await.unwrap();

        let mut last_cursor = OrderId::new(0);
        loop {
            let job = step(&store, &platform).await.unwrap().unwrap();
            assert!(job.cursor >= last_cursor);
            last_cursor = job.cursor;
            if !job.is_running() {
                assert_eq!(job.processed, 3);
                break;
            }
        }
    }

    #[tokio::test]
    async fn bad_order_is_counted_not_fatal() {
        let (store, _dir) = store();
        let mut platform = FixedPlatform::new(vec![
            order(501, OrderStatus::Completed, 10, 2),
            order(502, OrderStatus::Completed, 10, 3),
        ]);
        platform.failing.push(OrderId::new(501));

        start(&store, &platform, RebuildScope::All, 50).await.unwrap();
        let job = step(&store, &platform).await.unwrap().unwrap();

        assert_eq!(job.status, RebuildStatus::Done);
        assert_eq!(job.failures, 1);
        let rows = store
            .movements_for_product(ProductId::new(10), 10, None)
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].quantity, -3);
    }

    #[tokio::test]
    async fn product_rebuild_keeps_other_products_untouched() {
        let (store, _dir) = store();

        // A pre-existing row for another product must survive.
        let keeper = stock_ledger_core::Movement::sale(
            ProductId::new(99),
            1,
            Some(OrderId::new(1)),
            None,
            "hook",
            Utc::now() - Duration::days(2),
        );
        store.insert_movement(&keeper).unwrap();

        let platform = FixedPlatform::new(vec![order(501, OrderStatus::Completed, 10, 2)]);
        let scope = RebuildScope::Product {
            product_id: ProductId::new(10),
            window_days: 90,
        };
        start(&store, &platform, scope, 50).await.unwrap();
        let job = step(&store, &platform).await.unwrap().unwrap();
        assert_eq!(job.status, RebuildStatus::Done);

        assert_eq!(
            store
                .movements_for_product(ProductId::new(99), 10, None)
                .unwrap()
                .len(),
            1
        );
        assert_eq!(
            store
                .movements_for_product(ProductId::new(10), 10, None)
                .unwrap()
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn step_without_job_is_none() {
        let (store, _dir) = store();
        let platform = FixedPlatform::new(vec![]);
        assert!(step(&store, &platform).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn abort_stops_future_steps() {
        let (store, _dir) = store();
        let platform = FixedPlatform::new(vec![
            order(501, OrderStatus::Completed, 10, 1),
            order(502, OrderStatus::Completed, 10, 1),
        ]);

        start(&store, &platform, RebuildScope::All, 1).await.unwrap();
        step(&store, &platform).await.unwrap();

        let job = abort(&store).unwrap().unwrap();
        assert_eq!(job.status, RebuildStatus::Aborted);

        // The aborted job is returned verbatim, no further progress.
        let job = step(&store, &platform).await.unwrap().unwrap();
        assert_eq!(job.status, RebuildStatus::Aborted);
        assert_eq!(job.processed, 1);
    }

    #[tokio::test]
    async fn done_job_cannot_revert_to_aborted() {
        let (store, _dir) = store();
        let platform = FixedPlatform::new(vec![order(501, OrderStatus::Completed, 10, 1)]);

        start(&store, &platform, RebuildScope::All, 50).await.unwrap();
        let job = step(&store, &platform).await.unwrap().unwrap();
        assert_eq!(job.status, RebuildStatus::Done);

        let job = abort(&store).unwrap().unwrap();
        assert_eq!(job.status, RebuildStatus::Done);
    }
}
