//! Backward QOH reconstruction.
//!
//! Given a product's ledger rows newest-first and the platform's live
//! stock counter, compute the implied on-hand quantity after each row by
//! walking backward in time, undoing each row's effect as we go. The
//! discrepancy between a reconstructed value and the live counter is the
//! drift; persistent non-zero drift means an event was missed, duplicated,
//! or happened outside the ledger's knowledge, and is surfaced to
//! operators rather than silently corrected.

use serde::Serialize;

use crate::movement::{Movement, MovementKind};

/// A ledger row annotated with its reconstructed on-hand quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconciledMovement {
    /// The underlying ledger row.
    #[serde(flatten)]
    pub movement: Movement,

    /// The on-hand quantity implied right after this row took effect.
    pub computed_qoh_after: i64,

    /// `computed_qoh_after` minus the live counter.
    pub drift: i64,
}

/// Reconstruct historical on-hand quantities for one product.
///
/// `movements` must be ordered newest-first; `authoritative_qoh` is the
/// platform's live counter for the product right now.
///
/// Walking newest to oldest: a `SetStock` checkpoint resets the rolling
/// value to its snapshot (overriding any accumulated drift); every row is
/// then annotated with the rolling value, and the row's own effect is
/// undone before moving to the next (older) row. Undoing a sale's negative
/// quantity increases the rolling value, i.e. stock was higher before the
/// sale.
#[must_use]
pub fn reconcile(movements: &[Movement], authoritative_qoh: i64) -> Vec<ReconciledMovement> {
    let mut rolling = authoritative_qoh;
    let mut out = Vec::with_capacity(movements.len());

    for movement in movements {
        if movement.kind == MovementKind::SetStock {
            if let Some(snapshot) = movement.qoh_after {
                rolling = snapshot;
            }
        }

        out.push(ReconciledMovement {
            movement: movement.clone(),
            computed_qoh_after: rolling,
            drift: rolling - authoritative_qoh,
        });

        rolling -= movement.quantity;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{OrderId, ProductId};
    use crate::movement::SOURCE_REBUILD;
    use chrono::{DateTime, Duration, Utc};

    fn ts(minutes_ago: i64) -> DateTime<Utc> {
        "2025-03-01T12:00:00Z".parse::<DateTime<Utc>>().unwrap() - Duration::minutes(minutes_ago)
    }

    fn sale(order: u64, units: u64, minutes_ago: i64) -> Movement {
        Movement::sale(
            ProductId::new(1),
            units,
            Some(OrderId::new(order)),
            None,
            SOURCE_REBUILD,
            ts(minutes_ago),
        )
    }

    /// The worked scenario: stock 40, ledger (newest first)
    /// Sale -2, Sale -1, SetStock 35, Sale -3.
    #[test]
    fn backward_walk_with_checkpoint_reset() {
        let rows = vec![
            sale(501, 2, 0),
            sale(499, 1, 10),
            Movement::set_stock(ProductId::new(1), 35, "admin", ts(20)),
            sale(480, 3, 30),
        ];

        let reconciled = reconcile(&rows, 40);

        let computed: Vec<i64> = reconciled.iter().map(|r| r.computed_qoh_after).collect();
        let drift: Vec<i64> = reconciled.iter().map(|r| r.drift).collect();
        assert_eq!(computed, vec![40, 42, 35, 35]);
        assert_eq!(drift, vec![0, 2, -5, -5]);
    }

    /// With no missed events the newest row reconstructs to exactly the
    /// live counter.
    #[test]
    fn reconciliation_identity_on_clean_ledger() {
        let rows = vec![sale(501, 2, 0), sale(500, 5, 10)];
        let reconciled = reconcile(&rows, 13);
        assert_eq!(reconciled[0].computed_qoh_after, 13);
        assert_eq!(reconciled[0].drift, 0);
        assert_eq!(reconciled[1].computed_qoh_after, 15);
    }

    #[test]
    fn restore_rows_decrease_rolling_backward() {
        let rows = vec![Movement::restore(
            ProductId::new(1),
            4,
            Some(OrderId::new(700)),
            None,
            SOURCE_REBUILD,
            ts(0),
        )];
        let reconciled = reconcile(&rows, 10);
        // After the restore the stock was 10; before it, 6 (not observable
        // here, but the row itself reconstructs to the live value).
        assert_eq!(reconciled[0].computed_qoh_after, 10);
    }

    #[test]
    fn empty_ledger_reconciles_to_nothing() {
        assert!(reconcile(&[], 40).is_empty());
    }
}
