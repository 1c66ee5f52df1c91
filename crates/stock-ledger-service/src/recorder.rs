//! Event recorder: the live dual-write path.
//!
//! Every accepted hook payload is appended verbatim to the raw event log
//! and simultaneously normalized into ledger rows. Recording never fails
//! the caller: a storage error on any write is logged and swallowed so
//! the hook response to the platform stays cheap and unconditional.

use chrono::Utc;

use stock_ledger_core::{movements_from_event, EventPayload, StockEvent};
use stock_ledger_store::{StockSnapshot, Store};

/// Record one raw event: append it to the log, derive its ledger rows,
/// and refresh the stock snapshot cache on absolute stock sets.
///
/// Returns the persisted event so the caller can acknowledge it.
pub fn record(store: &dyn Store, payload: EventPayload) -> StockEvent {
    let event = StockEvent::new(payload, Utc::now());

    if let Err(e) = store.append_event(&event) {
        tracing::warn!(event_id = %event.id, error = %e, "failed to append raw event");
    }

    for movement in movements_from_event(&event) {
        if let Err(e) = store.insert_movement(&movement) {
            tracing::warn!(
                event_id = %event.id,
                product_id = %movement.product_id,
                error = %e,
                "failed to insert ledger row for event"
            );
        }
    }

    if let EventPayload::StockSet {
        product_id,
        quantity,
        ..
    } = &event.payload
    {
        let snapshot = StockSnapshot {
            product_id: *product_id,
            qoh: *quantity,
            updated_at: event.recorded_at,
        };
        if let Err(e) = store.put_stock_snapshot(&snapshot) {
            tracing::warn!(product_id = %product_id, error = %e, "failed to cache stock snapshot");
        }
    }

    event
}
