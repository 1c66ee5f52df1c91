//! Error types for stock-ledger storage.

use stock_ledger_core::LedgerError;

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database operation failed.
    #[error("database error: {0}")]
    Database(String),

    /// Serialization/deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A movement violated the ledger's invariants and was rejected.
    #[error("invalid movement: {0}")]
    InvalidMovement(#[from] LedgerError),
}
