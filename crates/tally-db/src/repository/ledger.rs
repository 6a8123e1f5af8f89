//! # Ledger Repository
//!
//! Read side of the append-only accounting log.
//!
//! ## Append-Only Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  The ledger has exactly two operations:                             │
//! │                                                                     │
//! │  append  - settlement-internal, inside the settlement transaction   │
//! │            (see settlement.rs; there is no public append)           │
//! │  query   - THIS REPOSITORY: range reads + per-type sums             │
//! │                                                                     │
//! │  No updates. No deletes. A cancelled order is netted out by a       │
//! │  separate negative-amount posting of the same type, so summing      │
//! │  SALE entries directly yields net revenue after cancellations.      │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use tally_core::{LedgerEntry, LedgerEntryType, Money};

/// Repository for ledger reads.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    pool: SqlitePool,
}

const LEDGER_COLUMNS: &str = "id, entry_type, order_id, invoice_no, amount_cents, \
     customer_id, payment_type, meta, created_at";

/// Per-type sums over a queried range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerTotals {
    pub sale_cents: i64,
    pub tax_cents: i64,
    pub cogs_cents: i64,
    pub adjustment_cents: i64,
}

impl LedgerTotals {
    /// Accumulates one entry into the totals.
    fn add(&mut self, entry: &LedgerEntry) {
        match entry.entry_type {
            LedgerEntryType::Sale => self.sale_cents += entry.amount_cents,
            LedgerEntryType::Tax => self.tax_cents += entry.amount_cents,
            LedgerEntryType::Cogs => self.cogs_cents += entry.amount_cents,
            LedgerEntryType::Adjustment => self.adjustment_cents += entry.amount_cents,
        }
    }

    /// Returns the sum for a given entry type.
    pub fn for_type(&self, entry_type: LedgerEntryType) -> Money {
        let cents = match entry_type {
            LedgerEntryType::Sale => self.sale_cents,
            LedgerEntryType::Tax => self.tax_cents,
            LedgerEntryType::Cogs => self.cogs_cents,
            LedgerEntryType::Adjustment => self.adjustment_cents,
        };
        Money::from_cents(cents)
    }
}

/// Result of a ledger range query: the matching entries in chronological
/// order plus their per-type sums.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerReport {
    pub entries: Vec<LedgerEntry>,
    pub totals: LedgerTotals,
}

impl LedgerRepository {
    /// Creates a new LedgerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        LedgerRepository { pool }
    }

    /// Queries ledger entries in a date range (both bounds inclusive,
    /// either side open-ended), oldest first, with per-type totals.
    ///
    /// Callers expanding a bare calendar date should widen `to` to the
    /// end of that day before calling.
    pub async fn query(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> DbResult<LedgerReport> {
        // Open bounds collapse to the full range; RFC 3339 text order
        // matches chronological order for UTC timestamps.
        let entries = sqlx::query_as::<_, LedgerEntry>(&format!(
            "SELECT {LEDGER_COLUMNS} FROM ledger_entries \
             WHERE (?1 IS NULL OR created_at >= ?1) \
               AND (?2 IS NULL OR created_at <= ?2) \
             ORDER BY created_at, id"
        ))
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        let mut totals = LedgerTotals::default();
        for entry in &entries {
            totals.add(entry);
        }

        debug!(count = entries.len(), "Ledger query returned entries");
        Ok(LedgerReport { entries, totals })
    }

    /// Gets every posting tagged with an order, oldest first. Used for
    /// auditing an invoice (originals plus any reversals).
    pub async fn entries_for_order(&self, order_id: &str) -> DbResult<Vec<LedgerEntry>> {
        let entries = sqlx::query_as::<_, LedgerEntry>(&format!(
            "SELECT {LEDGER_COLUMNS} FROM ledger_entries \
             WHERE order_id = ?1 ORDER BY created_at, id"
        ))
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Counts all ledger entries (for diagnostics and tests).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM ledger_entries")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
