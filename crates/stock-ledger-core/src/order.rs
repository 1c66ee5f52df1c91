//! The abstract order contract consumed from the host commerce platform,
//! and the classification rules that turn whole orders into ledger rows.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{OrderId, ProductId};
use crate::movement::{Movement, MovementKind};

/// Order statuses the host platform reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderStatus {
    /// Placed, payment not yet received.
    Pending,
    /// Paid, awaiting fulfillment.
    Processing,
    /// Awaiting manual review or payment confirmation.
    OnHold,
    /// Paid and fulfilled.
    Completed,
    /// Cancelled before fulfillment.
    Cancelled,
    /// Fully refunded after payment.
    Refunded,
    /// Payment failed.
    Failed,
    /// Created in the admin but never submitted.
    Draft,
}

/// Statuses the platform considers paid. Orders in these states count as
/// sales.
pub const PAID_STATUSES: &[OrderStatus] = &[OrderStatus::Processing, OrderStatus::Completed];

/// Statuses considered "reserved but not yet fulfilled": stock is committed
/// to these orders even though the ledger does not model them.
pub const RESERVED_STATUSES: &[OrderStatus] = &[
    OrderStatus::Pending,
    OrderStatus::Processing,
    OrderStatus::OnHold,
];

impl OrderStatus {
    /// Get the status as a string tag.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::OnHold => "on-hold",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Refunded => "refunded",
            Self::Failed => "failed",
            Self::Draft => "draft",
        }
    }

    /// Whether the platform considers an order in this status paid.
    #[must_use]
    pub fn is_paid(&self) -> bool {
        PAID_STATUSES.contains(self)
    }

    /// Whether an order in this status holds a live stock reservation.
    #[must_use]
    pub fn is_reserved(&self) -> bool {
        RESERVED_STATUSES.contains(self)
    }
}

/// Record type of an order row on the host platform.
///
/// Refund sub-orders share the order table but are not primary records and
/// are excluded from replay; their effect already shows up as the parent
/// order's `Refunded` status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    /// A primary customer order.
    Order,
    /// A refund sub-order.
    Refund,
}

impl OrderType {
    /// Get the record type as a string tag.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Order => "order",
            Self::Refund => "refund",
        }
    }
}

/// One line item on an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    /// The purchased product (possibly a variation).
    pub product_id: ProductId,

    /// Units purchased on this line.
    pub quantity: u64,

    /// Whether `product_id` refers to a variation of a parent product.
    pub is_variation: bool,

    /// The parent product when `is_variation` is set.
    pub parent_id: Option<ProductId>,
}

/// An order as reported by the host platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    /// Host-assigned order id.
    pub id: OrderId,

    /// Current status.
    pub status: OrderStatus,

    /// Record type.
    pub order_type: OrderType,

    /// When the order was created on the platform.
    pub created_at: DateTime<Utc>,

    /// Line items.
    pub line_items: Vec<OrderLine>,

    /// Display label for the customer, if available.
    pub customer_label: Option<String>,
}

/// Filter for listing and counting orders on the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderFilter {
    /// Restrict to these statuses; `None` means any status.
    pub statuses: Option<Vec<OrderStatus>>,

    /// Restrict to this record type.
    pub order_type: OrderType,

    /// Restrict to orders created at or after this instant.
    pub created_after: Option<DateTime<Utc>>,
}

impl OrderFilter {
    /// Filter for primary orders in an optional time window, any status.
    #[must_use]
    pub const fn primary_since(created_after: Option<DateTime<Utc>>) -> Self {
        Self {
            statuses: None,
            order_type: OrderType::Order,
            created_after,
        }
    }

    /// Filter for orders currently holding stock reservations.
    #[must_use]
    pub fn reserved() -> Self {
        Self {
            statuses: Some(RESERVED_STATUSES.to_vec()),
            order_type: OrderType::Order,
            created_after: None,
        }
    }
}

/// Classify a whole order into at most one movement kind.
///
/// Precedence: refunded or cancelled beats paid, and anything else is
/// skipped entirely (no row emitted, nothing retained for the order).
#[must_use]
pub fn classify(status: OrderStatus) -> Option<MovementKind> {
    match status {
        OrderStatus::Refunded | OrderStatus::Cancelled => Some(MovementKind::Restore),
        s if s.is_paid() => Some(MovementKind::Sale),
        _ => None,
    }
}

/// Sum line-item quantities per product, rolling variations up to their
/// parent product. Lines flagged as variations without a parent id are
/// counted under their own id rather than dropped.
#[must_use]
pub fn aggregate_lines(lines: &[OrderLine]) -> BTreeMap<ProductId, u64> {
    let mut totals: BTreeMap<ProductId, u64> = BTreeMap::new();
    for line in lines {
        let product = match (line.is_variation, line.parent_id) {
            (true, Some(parent)) => parent,
            _ => line.product_id,
        };
        *totals.entry(product).or_default() += line.quantity;
    }
    totals
}

/// Derive the ledger rows for one order: exactly one row per affected
/// product, or none when the order's status does not classify.
///
/// `created_at` on every row is the order's own creation time so rebuilt
/// rows and live-logged rows are indistinguishable downstream.
#[must_use]
pub fn movements_from_order(order: &OrderRecord, source: &str) -> Vec<Movement> {
    let Some(kind) = classify(order.status) else {
        return Vec::new();
    };

    aggregate_lines(&order.line_items)
        .into_iter()
        .filter(|(_, units)| *units > 0)
        .map(|(product_id, units)| match kind {
            MovementKind::Sale => Movement::sale(
                product_id,
                units,
                Some(order.id),
                order.customer_label.clone(),
                source,
                order.created_at,
            ),
            _ => Movement::restore(
                product_id,
                units,
                Some(order.id),
                order.customer_label.clone(),
                source,
                order.created_at,
            ),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::movement::SOURCE_REBUILD;

    fn line(product: u64, qty: u64) -> OrderLine {
        OrderLine {
            product_id: ProductId::new(product),
            quantity: qty,
            is_variation: false,
            parent_id: None,
        }
    }

    fn variation(product: u64, parent: u64, qty: u64) -> OrderLine {
        OrderLine {
            product_id: ProductId::new(product),
            quantity: qty,
            is_variation: true,
            parent_id: Some(ProductId::new(parent)),
        }
    }

    fn order(id: u64, status: OrderStatus, lines: Vec<OrderLine>) -> OrderRecord {
        OrderRecord {
            id: OrderId::new(id),
            status,
            order_type: OrderType::Order,
            created_at: "2025-02-10T09:30:00Z".parse().unwrap(),
            line_items: lines,
            customer_label: Some("Grace H.".into()),
        }
    }

    #[test]
    fn classification_covers_every_status() {
        use OrderStatus::{
            Cancelled, Completed, Draft, Failed, OnHold, Pending, Processing, Refunded,
        };

        assert_eq!(classify(Refunded), Some(MovementKind::Restore));
        assert_eq!(classify(Cancelled), Some(MovementKind::Restore));
        assert_eq!(classify(Processing), Some(MovementKind::Sale));
        assert_eq!(classify(Completed), Some(MovementKind::Sale));
        assert_eq!(classify(Pending), None);
        assert_eq!(classify(OnHold), None);
        assert_eq!(classify(Failed), None);
        assert_eq!(classify(Draft), None);
    }

    #[test]
    fn variations_roll_up_to_parent() {
        let totals = aggregate_lines(&[
            line(10, 2),
            variation(101, 10, 1),
            variation(102, 10, 3),
            line(20, 5),
        ]);
        assert_eq!(totals.get(&ProductId::new(10)), Some(&6));
        assert_eq!(totals.get(&ProductId::new(20)), Some(&5));
        assert_eq!(totals.len(), 2);
    }

    #[test]
    fn orphan_variation_counts_under_own_id() {
        let mut l = variation(101, 10, 2);
        l.parent_id = None;
        let totals = aggregate_lines(&[l]);
        assert_eq!(totals.get(&ProductId::new(101)), Some(&2));
    }

    #[test]
    fn paid_order_yields_one_sale_per_product() {
        let o = order(
            501,
            OrderStatus::Completed,
            vec![line(10, 2), variation(101, 10, 1), line(20, 4)],
        );
        let mut rows = movements_from_order(&o, SOURCE_REBUILD);
        rows.sort_by_key(|m| m.product_id);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].product_id, ProductId::new(10));
        assert_eq!(rows[0].quantity, -3);
        assert_eq!(rows[1].quantity, -4);
        for row in &rows {
            assert_eq!(row.kind, MovementKind::Sale);
            assert_eq!(row.order_id, Some(OrderId::new(501)));
            assert_eq!(row.created_at, o.created_at);
            assert_eq!(row.source, SOURCE_REBUILD);
            row.validate().unwrap();
        }
    }

    #[test]
    fn refunded_order_yields_restores() {
        let o = order(502, OrderStatus::Refunded, vec![line(10, 2)]);
        let rows = movements_from_order(&o, SOURCE_REBUILD);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].kind, MovementKind::Restore);
        assert_eq!(rows[0].quantity, 2);
    }

    #[test]
    fn pending_order_yields_nothing() {
        let o = order(503, OrderStatus::Pending, vec![line(10, 2)]);
        assert!(movements_from_order(&o, SOURCE_REBUILD).is_empty());
    }

    #[test]
    fn zero_quantity_lines_are_dropped() {
        let o = order(504, OrderStatus::Completed, vec![line(10, 0)]);
        assert!(movements_from_order(&o, SOURCE_REBUILD).is_empty());
    }

    #[test]
    fn status_serde_uses_kebab_case() {
        let json = serde_json::to_string(&OrderStatus::OnHold).unwrap();
        assert_eq!(json, "\"on-hold\"");
    }
}
