//! Client abstraction over the host commerce platform's admin API.
//!
//! The ledger never owns order or product data; it consumes them from the
//! platform through this trait. The production implementation is
//! [`RestPlatform`]; tests substitute their own.

use async_trait::async_trait;

use stock_ledger_core::{OrderFilter, OrderId, OrderRecord, ProductId};

pub mod rest;

pub use rest::RestPlatform;

/// Errors from the platform client.
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    /// HTTP transport failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The platform returned a non-success status.
    #[error("platform API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message from the response body, or the raw body.
        message: String,
    },

    /// The platform returned a body this client cannot parse.
    #[error("invalid platform response: {0}")]
    InvalidResponse(String),
}

/// Result type for platform operations.
pub type Result<T> = std::result::Result<T, PlatformError>;

/// Read-only view of the host platform's order and product data.
#[async_trait]
pub trait CommercePlatform: Send + Sync {
    /// Fetch one order. Returns `None` when the order does not exist.
    async fn order(&self, id: OrderId) -> Result<Option<OrderRecord>>;

    /// List order ids matching `filter` with id strictly greater than
    /// `after`, ascending, at most `limit` entries.
    ///
    /// The ascending-id contract is what makes the rebuild cursor
    /// resumable; implementations must honor it.
    async fn list_orders(
        &self,
        filter: &OrderFilter,
        after: OrderId,
        limit: usize,
    ) -> Result<Vec<OrderId>>;

    /// Count orders matching `filter`.
    async fn count_orders(&self, filter: &OrderFilter) -> Result<u64>;

    /// Fetch the live quantity-on-hand for a product. Returns `None` when
    /// the platform does not track stock for it.
    async fn current_stock(&self, product_id: ProductId) -> Result<Option<i64>>;
}
