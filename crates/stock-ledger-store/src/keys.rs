//! Key encoding utilities for `RocksDB`.
//!
//! This module provides functions for encoding and decoding keys used in
//! column families. Timestamps are encoded as big-endian millisecond
//! counts so lexicographic key order matches chronological order.

use chrono::{DateTime, Utc};

use stock_ledger_core::{MovementId, ProductId};

/// Fixed key under which the single rebuild job record lives.
pub const JOB_KEY: &[u8] = b"job";

/// Encode a timestamp as 8 big-endian bytes of non-negative milliseconds.
#[must_use]
pub fn timestamp_millis(at: DateTime<Utc>) -> [u8; 8] {
    u64::try_from(at.timestamp_millis())
        .unwrap_or(0)
        .to_be_bytes()
}

/// Create a movement key from a movement ID.
#[must_use]
pub fn movement_key(movement_id: &MovementId) -> Vec<u8> {
    movement_id.to_bytes().to_vec()
}

/// Create a product-movement index key.
///
/// Format: `product_id (8 bytes BE) || created_at_millis (8 bytes BE) ||
/// movement_id (16 bytes)`
///
/// A forward prefix scan over one product therefore yields rows oldest
/// first; callers reverse for newest-first listings.
#[must_use]
pub fn product_movement_key(
    product_id: ProductId,
    created_at: DateTime<Utc>,
    movement_id: &MovementId,
) -> Vec<u8> {
    let mut key = Vec::with_capacity(32);
    key.extend_from_slice(&product_id.to_be_bytes());
    key.extend_from_slice(&timestamp_millis(created_at));
    key.extend_from_slice(&movement_id.to_bytes());
    key
}

/// Create a prefix for iterating all movements of a product.
#[must_use]
pub fn product_prefix(product_id: ProductId) -> Vec<u8> {
    product_id.to_be_bytes().to_vec()
}

/// Create the lower bound key for a product's movements at or after
/// `since`.
#[must_use]
pub fn product_window_start(product_id: ProductId, since: DateTime<Utc>) -> Vec<u8> {
    let mut key = Vec::with_capacity(16);
    key.extend_from_slice(&product_id.to_be_bytes());
    key.extend_from_slice(&timestamp_millis(since));
    key
}

/// Extract the movement ID from a product-movement index key.
///
/// # Panics
///
/// Panics if the key is not at least 32 bytes.
#[must_use]
pub fn extract_movement_id_from_product_key(key: &[u8]) -> MovementId {
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&key[16..32]);
    MovementId::from_bytes(bytes).expect("valid ULID bytes")
}

/// Create an event key from an event ID.
#[must_use]
pub fn event_key(event_id: &stock_ledger_core::EventId) -> Vec<u8> {
    event_id.to_bytes().to_vec()
}

/// Create a stock snapshot key from a product ID.
#[must_use]
pub fn snapshot_key(product_id: ProductId) -> Vec<u8> {
    product_id.to_be_bytes().to_vec()
}
