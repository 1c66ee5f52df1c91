//! Sales time-series aggregation and rolling summary sums.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;

use crate::error::{LedgerError, Result};
use crate::movement::{Movement, MovementKind};

/// A fixed-length, zero-filled daily sales series.
///
/// `labels` and `values` always have the same length: one entry per
/// calendar day, earliest to latest, with days without sales present as
/// zero so consumers can plot a gap-free series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailySales {
    /// Calendar days, earliest to latest.
    pub labels: Vec<NaiveDate>,

    /// Units sold per day (absolute values).
    pub values: Vec<i64>,
}

/// Bucket per-day sale quantities into a zero-filled series of exactly
/// `days` entries ending at `today`.
///
/// `entries` are `(calendar day, units sold)` pairs; the caller decides
/// the timezone mapping from movement timestamps to calendar days.
/// Entries outside the window are ignored.
///
/// # Errors
///
/// Returns [`LedgerError::InvalidSeriesLength`] when `days` is zero.
pub fn daily_sales(entries: &[(NaiveDate, i64)], days: usize, today: NaiveDate) -> Result<DailySales> {
    if days == 0 {
        return Err(LedgerError::InvalidSeriesLength(days));
    }

    let window_days = i64::try_from(days).map_err(|_| LedgerError::InvalidSeriesLength(days))?;
    let start = today - Duration::days(window_days - 1);

    let mut labels = Vec::with_capacity(days);
    let mut values = vec![0i64; days];
    for offset in 0..window_days {
        labels.push(start + Duration::days(offset));
    }

    for (day, units) in entries {
        let offset = (*day - start).num_days();
        if offset < 0 || offset >= window_days {
            continue;
        }
        #[allow(clippy::cast_sign_loss)]
        let idx = offset as usize;
        values[idx] += units.abs();
    }

    Ok(DailySales { labels, values })
}

/// Aggregate sales totals attached to a movements listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SalesSummary {
    /// Units sold across every row in the listing.
    pub total_sales: i64,

    /// Units sold in the trailing 7 days.
    pub last_7_days: i64,

    /// Units sold in the trailing 30 days.
    pub last_30_days: i64,

    /// Units sold in the trailing 90 days.
    pub last_90_days: i64,
}

impl SalesSummary {
    /// Compute rolling sums over `Sale` rows relative to `now`. Restore
    /// and checkpoint rows never contribute.
    #[must_use]
    pub fn compute(movements: &[Movement], now: DateTime<Utc>) -> Self {
        let mut summary = Self {
            total_sales: 0,
            last_7_days: 0,
            last_30_days: 0,
            last_90_days: 0,
        };

        for movement in movements {
            if movement.kind != MovementKind::Sale {
                continue;
            }
            let units = movement.units();
            let age = now - movement.created_at;

            summary.total_sales += units;
            if age <= Duration::days(7) {
                summary.last_7_days += units;
            }
            if age <= Duration::days(30) {
                summary.last_30_days += units;
            }
            if age <= Duration::days(90) {
                summary.last_90_days += units;
            }
        }

        summary
    }
}
