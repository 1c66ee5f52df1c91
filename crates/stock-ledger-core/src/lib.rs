//! Core types and algorithms for the stock-ledger inventory subsystem.
//!
//! This crate provides the foundational types used throughout the platform:
//!
//! - **Identifiers**: `ProductId`, `OrderId`, `MovementId`, `EventId`
//! - **Ledger**: `Movement`, `MovementKind`
//! - **Raw events**: `StockEvent`, `EventPayload`
//! - **Order contract**: `OrderRecord`, `OrderStatus`, `OrderFilter`
//! - **Rebuild**: `RebuildJob`, `RebuildScope`, `RebuildStatus`
//! - **Derived views**: backward QOH reconstruction, daily sales series
//!
//! # Quantity sign convention
//!
//! A `Movement` quantity is **negative for sales, non-negative for
//! restores, and zero for stock-set checkpoints** (which instead carry an
//! absolute snapshot in `qoh_after`). Quantities are `i64` throughout; the
//! host platform owns the authoritative stock counter.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod event;
pub mod ids;
pub mod movement;
pub mod order;
pub mod rebuild;
pub mod reconcile;
pub mod series;

pub use error::{LedgerError, Result};
pub use event::{movements_from_event, EventLine, EventPayload, StockEvent};
pub use ids::{EventId, IdError, MovementId, OrderId, ProductId};
pub use movement::{Movement, MovementKind, SOURCE_HOOK, SOURCE_REBUILD};
pub use order::{
    aggregate_lines, classify, movements_from_order, OrderFilter, OrderLine, OrderRecord,
    OrderStatus, OrderType, PAID_STATUSES, RESERVED_STATUSES,
};
pub use rebuild::{RebuildJob, RebuildScope, RebuildStatus};
pub use reconcile::{reconcile, ReconciledMovement};
pub use series::{daily_sales, DailySales, SalesSummary};
