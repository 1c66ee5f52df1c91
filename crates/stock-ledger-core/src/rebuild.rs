//! Rebuild job state.
//!
//! A rebuild destructively re-derives ledger rows from the authoritative
//! order history. The job record is advanced by repeated externally-driven
//! "step" calls, so it must carry everything a step needs to resume:
//! scope, cursor, and batch size.
//!
//! One job record exists at a time. Starting a new rebuild overwrites any
//! prior job, including one still marked running; there is no locking or
//! claim token, which is accepted for a low-concurrency admin tool.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{OrderId, ProductId};
use crate::order::OrderFilter;

/// What a rebuild covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum RebuildScope {
    /// The whole catalog, all time. The ledger is truncated before the
    /// first batch.
    All,

    /// One product over a trailing window of days. Only that product's
    /// rows inside the window are cleared and re-derived.
    Product {
        /// The product to rebuild.
        product_id: ProductId,
        /// Trailing window length in days.
        window_days: u32,
    },
}

/// Lifecycle of a rebuild job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RebuildStatus {
    /// Accepting step calls.
    Running,
    /// All candidate orders processed.
    Done,
    /// Explicitly aborted; partial writes are retained.
    Aborted,
}

/// The persisted state of a rebuild.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RebuildJob {
    /// What this rebuild covers.
    pub scope: RebuildScope,

    /// Estimated number of candidate orders at start time. Orders created
    /// after the estimate are still processed but not counted here.
    pub total: u64,

    /// Orders examined so far, including skipped ones.
    pub processed: u64,

    /// Last order id examined; the next step fetches ids above this.
    pub cursor: OrderId,

    /// Maximum orders examined per step.
    pub batch_size: usize,

    /// Lower bound of the rebuild window, when the scope has one.
    pub window_start: Option<DateTime<Utc>>,

    /// Current lifecycle state.
    pub status: RebuildStatus,

    /// When the job was started.
    pub started_at: DateTime<Utc>,

    /// Per-order replay failures swallowed so far. A bad order never
    /// aborts a batch; it is only counted.
    pub failures: u64,
}

impl RebuildJob {
    /// Create a fresh running job.
    #[must_use]
    pub fn new(
        scope: RebuildScope,
        total: u64,
        batch_size: usize,
        window_start: Option<DateTime<Utc>>,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            scope,
            total,
            processed: 0,
            cursor: OrderId::new(0),
            batch_size,
            window_start,
            status: RebuildStatus::Running,
            started_at,
            failures: 0,
        }
    }

    /// Whether the job still accepts steps.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.status == RebuildStatus::Running
    }

    /// The platform filter for this job's scope: primary orders inside the
    /// window, statuses unfiltered (classification happens per order, and
    /// skipped orders still count toward progress).
    #[must_use]
    pub const fn filter(&self) -> OrderFilter {
        OrderFilter::primary_since(self.window_start)
    }

    /// The product this job is restricted to, if any.
    #[must_use]
    pub const fn scoped_product(&self) -> Option<ProductId> {
        match self.scope {
            RebuildScope::All => None,
            RebuildScope::Product { product_id, .. } => Some(product_id),
        }
    }
}
