//! `RocksDB` storage layer for the stock ledger.
//!
//! This crate provides persistent storage for the movement ledger, the raw
//! event log, the rebuild job record, and the per-product stock snapshot
//! cache, using `RocksDB` with column families for efficient indexing.
//!
//! # Architecture
//!
//! The storage uses the following column families:
//!
//! - `movements`: Normalized ledger rows, keyed by `movement_id` (ULID)
//! - `movements_by_product`: Index for listing rows per product in time
//!   order, keyed by `product_id || created_at_millis || movement_id`
//! - `events`: Append-only raw stock events, keyed by `event_id`
//! - `rebuild_job`: The single rebuild job record
//! - `stock_snapshots`: Last-known stock per product
//!
//! # Degradation
//!
//! The ledger is provisioned lazily by the host's own migration path, so
//! read operations tolerate an absent column family by returning empty
//! results, and write operations skip silently; neither fails the caller.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod keys;
pub mod rocks;
pub mod schema;

pub use error::{Result, StoreError};
pub use rocks::RocksStore;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stock_ledger_core::{Movement, ProductId, RebuildJob, StockEvent};

/// Last-known stock level for a product, cached when the recorder sees a
/// stock-set event. Used as a fallback when the platform does not track
/// stock for the product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockSnapshot {
    /// The product.
    pub product_id: ProductId,

    /// The last quantity-on-hand the recorder observed.
    pub qoh: i64,

    /// When the snapshot was taken.
    pub updated_at: DateTime<Utc>,
}

/// The storage trait defining all database operations.
///
/// This trait abstracts the storage layer, allowing for different
/// implementations (e.g., `RocksDB`, in-memory for testing).
pub trait Store: Send + Sync {
    // =========================================================================
    // Movement Ledger Operations
    // =========================================================================

    /// Insert one ledger row, maintaining the per-product index.
    ///
    /// There is no update or delete-by-id operation: corrections happen
    /// only via truncate-and-rebuild.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidMovement` when the row violates the
    /// quantity sign convention, or an error if the database operation
    /// fails.
    fn insert_movement(&self, movement: &Movement) -> Result<()>;

    /// List rows for a product, ordered newest first, optionally bounded
    /// to rows created at or after `since`.
    ///
    /// Returns an empty list when the ledger is not provisioned yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn movements_for_product(
        &self,
        product_id: ProductId,
        limit: usize,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<Movement>>;

    /// Delete every row for one product created at or after `since`,
    /// returning the number of rows removed. Used by single-product
    /// rebuild to clear exactly the window it re-derives.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn clear_product_window(&self, product_id: ProductId, since: DateTime<Utc>) -> Result<u64>;

    /// Delete every ledger row.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn truncate_movements(&self) -> Result<()>;

    // =========================================================================
    // Raw Event Log Operations
    // =========================================================================

    /// Append one raw event to the log.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn append_event(&self, event: &StockEvent) -> Result<()>;

    /// List the most recent raw events, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn recent_events(&self, limit: usize) -> Result<Vec<StockEvent>>;

    // =========================================================================
    // Rebuild Job Operations
    // =========================================================================

    /// Write the rebuild job record, replacing any existing one.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_job(&self, job: &RebuildJob) -> Result<()>;

    /// Get the rebuild job record, if one exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_job(&self) -> Result<Option<RebuildJob>>;

    /// Remove the rebuild job record.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn clear_job(&self) -> Result<()>;

    // =========================================================================
    // Stock Snapshot Operations
    // =========================================================================

    /// Record the last-known stock level for a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_stock_snapshot(&self, snapshot: &StockSnapshot) -> Result<()>;

    /// Get the last-known stock level for a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_stock_snapshot(&self, product_id: ProductId) -> Result<Option<StockSnapshot>>;

    // =========================================================================
    // Compound Operations
    // =========================================================================

    /// Irreversibly purge the ledger, the event log, the snapshot cache,
    /// and the rebuild job record.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn purge(&self) -> Result<()>;
}
