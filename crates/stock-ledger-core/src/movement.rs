//! Normalized ledger rows.
//!
//! A [`Movement`] is one discrete stock-affecting change (or checkpoint)
//! for one product. Rows are produced either live by the event recorder or
//! in bulk by the rebuild orchestrator; both paths must emit equivalent
//! rows for the same logical event.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, Result};
use crate::ids::{MovementId, OrderId, ProductId};

/// Source tag for rows written by the bulk rebuild path.
pub const SOURCE_REBUILD: &str = "rebuild";

/// Source tag for rows written live by the event recorder.
pub const SOURCE_HOOK: &str = "hook";

/// The kind of a ledger row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    /// Stock left the shelf for a paid order. Quantity is negative.
    Sale,

    /// Stock came back from a refunded or cancelled order. Quantity is
    /// non-negative.
    Restore,

    /// An absolute stock checkpoint (manual set). Quantity is zero and
    /// `qoh_after` carries the snapshot.
    SetStock,
}

impl MovementKind {
    /// Get the kind as a string tag.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Sale => "sale",
            Self::Restore => "restore",
            Self::SetStock => "set_stock",
        }
    }
}

/// One normalized ledger row.
///
/// No uniqueness constraint is enforced across rows: replaying the same
/// order twice produces duplicate rows. Corrections happen only via
/// truncate-and-rebuild, never by updating rows in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movement {
    /// Row identifier (time-ordered).
    pub id: MovementId,

    /// The product this row affects (variations rolled up to the parent).
    pub product_id: ProductId,

    /// The order that caused the row, if any. `SetStock` rows have none.
    pub order_id: Option<OrderId>,

    /// What happened.
    pub kind: MovementKind,

    /// Signed quantity delta. Negative only for `Sale`.
    pub quantity: i64,

    /// Absolute quantity-on-hand snapshot, set only for `SetStock` rows.
    pub qoh_after: Option<i64>,

    /// Free-form customer label from the originating order, if any.
    pub customer_label: Option<String>,

    /// Tag identifying the producer (`"rebuild"` or `"hook"`).
    pub source: String,

    /// When the underlying change happened. For rebuilt rows this is the
    /// order's own creation time, not the time of the rebuild, so rebuilt
    /// and live-logged data reconcile and chart identically.
    pub created_at: DateTime<Utc>,
}

impl Movement {
    /// Create a sale row. `units` is the absolute quantity sold.
    #[must_use]
    pub fn sale(
        product_id: ProductId,
        units: u64,
        order_id: Option<OrderId>,
        customer_label: Option<String>,
        source: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: MovementId::generate(),
            product_id,
            order_id,
            kind: MovementKind::Sale,
            quantity: -i64::try_from(units).unwrap_or(i64::MAX),
            qoh_after: None,
            customer_label,
            source: source.into(),
            created_at,
        }
    }

    /// Create a restore row. `units` is the absolute quantity restored.
    #[must_use]
    pub fn restore(
        product_id: ProductId,
        units: u64,
        order_id: Option<OrderId>,
        customer_label: Option<String>,
        source: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: MovementId::generate(),
            product_id,
            order_id,
            kind: MovementKind::Restore,
            quantity: i64::try_from(units).unwrap_or(i64::MAX),
            qoh_after: None,
            customer_label,
            source: source.into(),
            created_at,
        }
    }

    /// Create a stock-set checkpoint row.
    #[must_use]
    pub fn set_stock(
        product_id: ProductId,
        qoh_after: i64,
        source: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: MovementId::generate(),
            product_id,
            order_id: None,
            kind: MovementKind::SetStock,
            quantity: 0,
            qoh_after: Some(qoh_after),
            customer_label: None,
            source: source.into(),
            created_at,
        }
    }

    /// Check the quantity sign convention for this row's kind.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidQuantity`] when the sign does not match
    /// the kind, or [`LedgerError::MissingSnapshot`] for a `SetStock` row
    /// without `qoh_after`.
    pub fn validate(&self) -> Result<()> {
        let valid = match self.kind {
            MovementKind::Sale => self.quantity < 0,
            MovementKind::Restore => self.quantity >= 0,
            MovementKind::SetStock => self.quantity == 0,
        };

        if !valid {
            return Err(LedgerError::InvalidQuantity {
                kind: self.kind.as_str(),
                quantity: self.quantity,
            });
        }

        if self.kind == MovementKind::SetStock && self.qoh_after.is_none() {
            return Err(LedgerError::MissingSnapshot);
        }

        Ok(())
    }

    /// Absolute units moved (0 for `SetStock` rows).
    #[must_use]
    pub const fn units(&self) -> i64 {
        self.quantity.abs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts() -> DateTime<Utc> {
        "2025-03-01T12:00:00Z".parse().unwrap()
    }

    #[test]
    fn sale_is_negative() {
        let m = Movement::sale(
            ProductId::new(7),
            3,
            Some(OrderId::new(501)),
            Some("Ada L.".into()),
            SOURCE_HOOK,
            ts(),
        );
        assert_eq!(m.quantity, -3);
        assert_eq!(m.kind, MovementKind::Sale);
        assert_eq!(m.units(), 3);
        m.validate().unwrap();
    }

    #[test]
    fn restore_is_non_negative() {
        let m = Movement::restore(ProductId::new(7), 2, None, None, SOURCE_REBUILD, ts());
        assert_eq!(m.quantity, 2);
        m.validate().unwrap();
    }

    #[test]
    fn set_stock_carries_snapshot() {
        let m = Movement::set_stock(ProductId::new(7), 35, "admin", ts());
        assert_eq!(m.quantity, 0);
        assert_eq!(m.qoh_after, Some(35));
        assert!(m.order_id.is_none());
        m.validate().unwrap();
    }

    #[test]
    fn validate_rejects_positive_sale() {
        let mut m = Movement::sale(ProductId::new(7), 3, None, None, SOURCE_HOOK, ts());
        m.quantity = 3;
        assert!(matches!(
            m.validate(),
            Err(LedgerError::InvalidQuantity { kind: "sale", .. })
        ));
    }

    #[test]
    fn validate_rejects_set_stock_without_snapshot() {
        let mut m = Movement::set_stock(ProductId::new(7), 35, "admin", ts());
        m.qoh_after = None;
        assert_eq!(m.validate(), Err(LedgerError::MissingSnapshot));
    }

    #[test]
    fn movement_serde_roundtrip() {
        let m = Movement::sale(
            ProductId::new(9),
            1,
            Some(OrderId::new(12)),
            None,
            SOURCE_REBUILD,
            ts(),
        );
        let json = serde_json::to_string(&m).unwrap();
        let parsed: Movement = serde_json::from_str(&json).unwrap();
        assert_eq!(m, parsed);
    }
}
