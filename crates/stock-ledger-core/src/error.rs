//! Error types for the stock ledger core.

use crate::ids::IdError;

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Errors that can occur in ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// A movement violates the quantity sign convention for its kind.
    #[error("invalid movement quantity {quantity} for kind {kind}")]
    InvalidQuantity {
        /// The movement kind as a string tag.
        kind: &'static str,
        /// The offending quantity.
        quantity: i64,
    },

    /// A stock-set checkpoint is missing its absolute snapshot.
    #[error("set-stock movement without qoh_after")]
    MissingSnapshot,

    /// Invalid identifier.
    #[error("invalid identifier: {0}")]
    InvalidId(#[from] IdError),

    /// A requested series length is out of the supported range.
    #[error("invalid series length: {0} days")]
    InvalidSeriesLength(usize),
}
