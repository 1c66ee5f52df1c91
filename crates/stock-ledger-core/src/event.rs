//! Raw stock events.
//!
//! The host platform reports stock-affecting actions as they happen; the
//! recorder appends them to an append-only log. Payloads are a closed
//! tagged union so downstream classification is exhaustive instead of
//! probing loosely-typed data.
//!
//! One customer action yields exactly one event regardless of how many
//! line items it touches, which is what makes log-based replay line up
//! with order-based replay.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{EventId, OrderId, ProductId};
use crate::movement::{Movement, SOURCE_HOOK};
use crate::order::OrderRecord;

/// One line item carried on an order-scoped event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLine {
    /// The affected product (already rolled up to the parent for
    /// variations; the hook resolves parentage before reporting).
    pub product_id: ProductId,

    /// Absolute units affected.
    pub quantity: u64,

    /// SKU at the time of the event, for the log reader.
    pub sku: Option<String>,
}

/// The payload of a raw stock event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventPayload {
    /// The stock quantity of a product was set to an absolute value.
    StockSet {
        /// The affected product.
        product_id: ProductId,
        /// The resulting on-hand quantity.
        quantity: i64,
        /// Tag identifying who or what set the stock.
        source: String,
    },

    /// An order reduced stock (stock committed to a sale).
    OrderReduced {
        /// The order that reduced stock.
        order_id: OrderId,
        /// Display label for the customer, if available.
        customer_label: Option<String>,
        /// When the reduction happened on the platform (advisory,
        /// host-supplied).
        occurred_at: DateTime<Utc>,
        /// Per-product deltas, one entry per affected product.
        lines: Vec<EventLine>,
    },

    /// An order restored stock (refund or cancellation).
    OrderRestored {
        /// The order that restored stock.
        order_id: OrderId,
        /// Display label for the customer, if available.
        customer_label: Option<String>,
        /// When the restore happened on the platform.
        occurred_at: DateTime<Utc>,
        /// Per-product deltas, one entry per affected product.
        lines: Vec<EventLine>,
    },
}

/// A raw event as persisted in the append-only log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockEvent {
    /// Event identifier (insertion-ordered).
    pub id: EventId,

    /// When the recorder received the event.
    pub recorded_at: DateTime<Utc>,

    /// What happened.
    pub payload: EventPayload,
}

impl StockEvent {
    /// Wrap a payload into a new event stamped with `recorded_at`.
    #[must_use]
    pub fn new(payload: EventPayload, recorded_at: DateTime<Utc>) -> Self {
        Self {
            id: EventId::generate(),
            recorded_at,
            payload,
        }
    }

    /// Build an `OrderReduced` payload from a platform order record.
    ///
    /// This mirrors what the host hook reports when it reduces stock for
    /// the order, and exists mainly so tests can assert the dual-write and
    /// rebuild paths stay equivalent.
    #[must_use]
    pub fn order_reduced_payload(order: &OrderRecord) -> EventPayload {
        EventPayload::OrderReduced {
            order_id: order.id,
            customer_label: order.customer_label.clone(),
            occurred_at: order.created_at,
            lines: crate::order::aggregate_lines(&order.line_items)
                .into_iter()
                .map(|(product_id, quantity)| EventLine {
                    product_id,
                    quantity,
                    sku: None,
                })
                .collect(),
        }
    }
}

/// Derive the normalized ledger rows for one raw event.
///
/// This is the live dual-write path. It must produce rows equivalent to
/// [`crate::order::movements_from_order`] for the same logical order:
/// same kind, product, quantity, and order id, with `source = "hook"`.
#[must_use]
pub fn movements_from_event(event: &StockEvent) -> Vec<Movement> {
    match &event.payload {
        EventPayload::StockSet {
            product_id,
            quantity,
            source,
        } => vec![Movement::set_stock(
            *product_id,
            *quantity,
            source.clone(),
            event.recorded_at,
        )],

        EventPayload::OrderReduced {
            order_id,
            customer_label,
            occurred_at,
            lines,
        } => lines
            .iter()
            .filter(|l| l.quantity > 0)
            .map(|l| {
                Movement::sale(
                    l.product_id,
                    l.quantity,
                    Some(*order_id),
                    customer_label.clone(),
                    SOURCE_HOOK,
                    *occurred_at,
                )
            })
            .collect(),

        EventPayload::OrderRestored {
            order_id,
            customer_label,
            occurred_at,
            lines,
        } => lines
            .iter()
            .filter(|l| l.quantity > 0)
            .map(|l| {
                Movement::restore(
                    l.product_id,
                    l.quantity,
                    Some(*order_id),
                    customer_label.clone(),
                    SOURCE_HOOK,
                    *occurred_at,
                )
            })
            .collect(),
    }
}
