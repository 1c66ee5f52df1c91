//! Database schema definitions and column families.
//!
//! This module defines the column families used in `RocksDB` storage.

/// Column family names for the `RocksDB` database.
pub mod cf {
    /// Normalized ledger rows, keyed by `movement_id` (ULID).
    pub const MOVEMENTS: &str = "movements";

    /// Index: movements by product, keyed by
    /// `product_id || created_at_millis || movement_id`.
    /// Value is empty (index only).
    pub const MOVEMENTS_BY_PRODUCT: &str = "movements_by_product";

    /// Raw stock events (append-only log), keyed by `event_id` (ULID).
    pub const EVENTS: &str = "events";

    /// The single rebuild job record, keyed by a fixed key.
    pub const REBUILD_JOB: &str = "rebuild_job";

    /// Per-product last-known-stock cache, keyed by `product_id`.
    pub const STOCK_SNAPSHOTS: &str = "stock_snapshots";
}

/// Returns all column family names for database initialization.
#[must_use]
pub fn all_column_families() -> Vec<&'static str> {
    vec![
        cf::MOVEMENTS,
        cf::MOVEMENTS_BY_PRODUCT,
        cf::EVENTS,
        cf::REBUILD_JOB,
        cf::STOCK_SNAPSHOTS,
    ]
}
