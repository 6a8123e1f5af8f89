//! # Settlement Engine
//!
//! The single write path for orders, stock and the ledger.
//!
//! ## Settlement Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        place_order(draft)                               │
//! │                                                                         │
//! │  DraftOrder::validate()          pure checks, no storage touched        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BEGIN TRANSACTION                                                      │
//! │       ├── resolve each catalog line (product lookup, price, cost)       │
//! │       ├── INSERT order header + line items (snapshot pattern)           │
//! │       ├── UPDATE products SET stock = stock - qty                       │
//! │       │        WHERE id = ? AND stock >= qty      ◄── guarded, no       │
//! │       │        (0 rows affected → InsufficientStock)   oversell race    │
//! │       ├── INSERT ledger: SALE(total), TAX(tax), COGS(cost basis)        │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  Any error before COMMIT rolls everything back: an order either         │
//! │  exists fully settled or leaves no trace at all.                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `cancel_order` and `adjust_inventory` follow the same contract: one
//! transaction each, guarded status/stock updates, ledger appended inside
//! the same transaction.
//!
//! ## Pricing Policy
//! Catalog lines are re-priced from the current catalog price at
//! settlement time; the caller-sent price is advisory only. A draft with
//! `manual_pricing = true` (a capability the caller grants explicitly,
//! e.g. for discounting) keeps the caller-sent prices instead. Lines
//! without a `product_id` are manual entries and always use the sent
//! price, never touch stock and carry no cost basis.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::{SqliteConnection, SqlitePool};
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use tally_core::{
    AdjustmentMeta, CoreError, DraftLine, DraftOrder, LedgerEntryType, Money, OrderStatus,
    OrderTotals, PaymentType, Product,
};

// =============================================================================
// Errors
// =============================================================================

/// Errors surfaced by settlement operations.
///
/// Merges business rule violations (client input problems) with storage
/// failures so callers match on one type.
#[derive(Debug, Error)]
pub enum SettlementError {
    /// Business rule violation (empty cart, insufficient stock, ...).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Storage failure (connection, constraint, transaction).
    #[error(transparent)]
    Db(#[from] DbError),
}

/// Result type for settlement operations.
pub type SettlementResult<T> = Result<T, SettlementError>;

// =============================================================================
// Engine
// =============================================================================

/// Receipt returned by a successful `place_order`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacedOrder {
    pub order_id: String,
    pub invoice_no: String,
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub total_cents: i64,
}

/// A catalog line after price/cost resolution, ready to persist.
struct ResolvedLine {
    product_id: Option<String>,
    name: String,
    quantity: i64,
    unit_price_cents: i64,
}

/// The settlement engine. Owns all stock-mutating operations so they
/// share one transactional contract.
#[derive(Debug, Clone)]
pub struct SettlementEngine {
    pool: SqlitePool,
}

impl SettlementEngine {
    /// Creates a new SettlementEngine.
    pub fn new(pool: SqlitePool) -> Self {
        SettlementEngine { pool }
    }

    /// Settles a draft order atomically.
    ///
    /// ## What This Does
    /// 1. Validates the draft (pure, before any storage mutation)
    /// 2. Resolves catalog lines: product must exist and be active,
    ///    stock must cover the quantity, price per the pricing policy
    /// 3. Computes totals (tax rounds half-up on the subtotal)
    /// 4. Inserts the order (status PAID) with snapshot line items
    /// 5. Decrements stock with a guarded update per catalog line
    /// 6. Appends SALE, TAX and COGS ledger entries
    ///
    /// All in one transaction. On any failure nothing persists.
    pub async fn place_order(&self, draft: &DraftOrder) -> SettlementResult<PlacedOrder> {
        draft.validate()?;

        let mut tx = self.pool.begin().await.map_err(DbError::from)?;

        // Resolve lines against the catalog inside the transaction so
        // the prices, costs and stock checks all see one snapshot.
        let mut resolved: Vec<ResolvedLine> = Vec::with_capacity(draft.lines.len());
        let mut cogs = Money::zero();

        for line in &draft.lines {
            match &line.product_id {
                Some(product_id) => {
                    let product = fetch_product(&mut tx, product_id)
                        .await?
                        .filter(|p| p.is_active)
                        .ok_or_else(|| CoreError::ProductNotFound(line.name.clone()))?;

                    if !product.has_stock(line.quantity) {
                        return Err(CoreError::InsufficientStock {
                            name: product.name,
                            available: product.stock,
                            requested: line.quantity,
                        }
                        .into());
                    }

                    let unit_price_cents = if draft.manual_pricing {
                        line.unit_price_cents
                    } else {
                        product.price_cents
                    };

                    cogs = cogs + product.cost().multiply_quantity(line.quantity);

                    resolved.push(ResolvedLine {
                        product_id: Some(product.id),
                        name: product.name,
                        quantity: line.quantity,
                        unit_price_cents,
                    });
                }
                None => {
                    // Manual line: sent price stands, no stock, no cost basis.
                    resolved.push(ResolvedLine {
                        product_id: None,
                        name: line.name.clone(),
                        quantity: line.quantity,
                        unit_price_cents: line.unit_price_cents,
                    });
                }
            }
        }

        let priced: Vec<DraftLine> = resolved
            .iter()
            .map(|line| DraftLine {
                product_id: line.product_id.clone(),
                name: line.name.clone(),
                quantity: line.quantity,
                unit_price_cents: line.unit_price_cents,
            })
            .collect();
        let totals = OrderTotals::compute(&priced, draft.tax_rate);

        let order_id = Uuid::new_v4().to_string();
        let invoice_no = generate_invoice_no();
        let now = Utc::now();

        debug!(invoice_no = %invoice_no, total_cents = totals.total_cents, "Settling order");

        sqlx::query(
            "INSERT INTO orders (id, invoice_no, status, payment_type, tax_rate_bps, \
             subtotal_cents, tax_cents, total_cents, customer_id, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)",
        )
        .bind(&order_id)
        .bind(&invoice_no)
        .bind(OrderStatus::Paid)
        .bind(draft.payment_type)
        .bind(draft.tax_rate.bps())
        .bind(totals.subtotal_cents)
        .bind(totals.tax_cents)
        .bind(totals.total_cents)
        .bind(&draft.customer_id)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(DbError::from)?;

        for line in &resolved {
            let line_total = Money::from_cents(line.unit_price_cents)
                .multiply_quantity(line.quantity)
                .cents();

            sqlx::query(
                "INSERT INTO order_items (id, order_id, product_id, name, quantity, \
                 unit_price_cents, line_total_cents, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&order_id)
            .bind(&line.product_id)
            .bind(&line.name)
            .bind(line.quantity)
            .bind(line.unit_price_cents)
            .bind(line_total)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(DbError::from)?;
        }

        // Guarded decrement. The pre-check above already rejected short
        // stock against this transaction's snapshot; the WHERE clause
        // closes the race against concurrent settlements.
        for line in &resolved {
            let Some(product_id) = &line.product_id else {
                continue;
            };

            let result = sqlx::query(
                "UPDATE products SET stock = stock - ?2, updated_at = ?3 \
                 WHERE id = ?1 AND stock >= ?2",
            )
            .bind(product_id)
            .bind(line.quantity)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(DbError::from)?;

            if result.rows_affected() == 0 {
                let available: i64 = sqlx::query_scalar("SELECT stock FROM products WHERE id = ?1")
                    .bind(product_id)
                    .fetch_optional(&mut *tx)
                    .await
                    .map_err(DbError::from)?
                    .unwrap_or(0);

                return Err(CoreError::InsufficientStock {
                    name: line.name.clone(),
                    available,
                    requested: line.quantity,
                }
                .into());
            }
        }

        let postings = [
            (LedgerEntryType::Sale, totals.total_cents),
            (LedgerEntryType::Tax, totals.tax_cents),
            (LedgerEntryType::Cogs, cogs.cents()),
        ];
        for (entry_type, amount_cents) in postings {
            append_ledger_entry(
                &mut tx,
                entry_type,
                Some(&order_id),
                Some(&invoice_no),
                amount_cents,
                draft.customer_id.as_deref(),
                draft.payment_type,
                None,
            )
            .await?;
        }

        tx.commit().await.map_err(DbError::from)?;

        info!(
            invoice_no = %invoice_no,
            total_cents = totals.total_cents,
            lines = resolved.len(),
            "Order settled"
        );

        Ok(PlacedOrder {
            order_id,
            invoice_no,
            subtotal_cents: totals.subtotal_cents,
            tax_cents: totals.tax_cents,
            total_cents: totals.total_cents,
        })
    }

    /// Cancels a settled order atomically.
    ///
    /// ## What This Does
    /// 1. Flips status to CANCELLED with a guarded update
    ///    (already CANCELLED → `AlreadyCancelled`, never re-applied)
    /// 2. Restores stock additively for every catalog line
    /// 3. Appends reversing SALE, TAX and COGS entries with the negated
    ///    absolute amounts
    ///
    /// The COGS reversal is recomputed from CURRENT catalog costs, same
    /// basis a new sale would use; a product deleted since the sale
    /// contributes zero.
    pub async fn cancel_order(&self, invoice_no: &str) -> SettlementResult<OrderStatus> {
        let mut tx = self.pool.begin().await.map_err(DbError::from)?;

        let order = sqlx::query_as::<_, tally_core::Order>(
            "SELECT id, invoice_no, status, payment_type, tax_rate_bps, subtotal_cents, \
             tax_cents, total_cents, customer_id, created_at, updated_at \
             FROM orders WHERE invoice_no = ?1",
        )
        .bind(invoice_no)
        .fetch_optional(&mut *tx)
        .await
        .map_err(DbError::from)?
        .ok_or_else(|| CoreError::OrderNotFound(invoice_no.to_string()))?;

        let now = Utc::now();

        // Guarded transition: the WHERE clause makes a doubled cancel a
        // no-op at the storage level even under concurrent requests.
        let result = sqlx::query(
            "UPDATE orders SET status = ?2, updated_at = ?3 \
             WHERE id = ?1 AND status != ?2",
        )
        .bind(&order.id)
        .bind(OrderStatus::Cancelled)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            return Err(CoreError::AlreadyCancelled(invoice_no.to_string()).into());
        }

        let items = sqlx::query_as::<_, tally_core::LineItem>(
            "SELECT id, order_id, product_id, name, quantity, unit_price_cents, \
             line_total_cents, created_at \
             FROM order_items WHERE order_id = ?1 ORDER BY created_at, id",
        )
        .bind(&order.id)
        .fetch_all(&mut *tx)
        .await
        .map_err(DbError::from)?;

        let mut cogs = Money::zero();
        for item in &items {
            let Some(product_id) = &item.product_id else {
                continue;
            };

            // Additive restore; a since-deleted product simply no-ops.
            sqlx::query(
                "UPDATE products SET stock = stock + ?2, updated_at = ?3 WHERE id = ?1",
            )
            .bind(product_id)
            .bind(item.quantity)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(DbError::from)?;

            let cost_cents: i64 = sqlx::query_scalar("SELECT cost_cents FROM products WHERE id = ?1")
                .bind(product_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(DbError::from)?
                .unwrap_or(0);

            cogs = cogs + Money::from_cents(cost_cents).multiply_quantity(item.quantity);
        }

        let reversals = [
            (LedgerEntryType::Sale, -order.total_cents.abs()),
            (LedgerEntryType::Tax, -order.tax_cents.abs()),
            (LedgerEntryType::Cogs, -cogs.cents().abs()),
        ];
        for (entry_type, amount_cents) in reversals {
            append_ledger_entry(
                &mut tx,
                entry_type,
                Some(&order.id),
                Some(&order.invoice_no),
                amount_cents,
                order.customer_id.as_deref(),
                order.payment_type,
                None,
            )
            .await?;
        }

        tx.commit().await.map_err(DbError::from)?;

        info!(invoice_no = %invoice_no, "Order cancelled, stock restored, ledger reversed");

        Ok(OrderStatus::Cancelled)
    }

    /// Applies a manual stock adjustment atomically.
    ///
    /// Negative deltas are allowed to push stock below zero (shrinkage
    /// can exceed the recorded count). An ADJUSTMENT ledger entry with a
    /// zero amount records the audit trail; the delta and reason live in
    /// its metadata.
    ///
    /// Returns the new stock level.
    pub async fn adjust_inventory(
        &self,
        product_id: &str,
        delta: i64,
        reason: &str,
    ) -> SettlementResult<i64> {
        if delta == 0 {
            return Err(CoreError::InvalidAdjustment {
                reason: "delta must be non-zero".to_string(),
            }
            .into());
        }

        let reason = if reason.trim().is_empty() {
            "manual"
        } else {
            reason.trim()
        };

        let mut tx = self.pool.begin().await.map_err(DbError::from)?;

        let product = fetch_product(&mut tx, product_id)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;

        let new_stock = product.stock + delta;
        if new_stock < 0 {
            warn!(
                product = %product.name,
                new_stock,
                "Adjustment pushed stock below zero"
            );
        }

        let now = Utc::now();
        sqlx::query("UPDATE products SET stock = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(&product.id)
            .bind(new_stock)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(DbError::from)?;

        let meta = AdjustmentMeta {
            product_id: product.id.clone(),
            name: product.name.clone(),
            delta,
            reason: reason.to_string(),
        };

        append_ledger_entry(
            &mut tx,
            LedgerEntryType::Adjustment,
            None,
            None,
            0,
            None,
            PaymentType::Cash,
            Some(&meta.to_json()),
        )
        .await?;

        tx.commit().await.map_err(DbError::from)?;

        info!(
            product = %product.name,
            delta,
            new_stock,
            reason,
            "Inventory adjusted"
        );

        Ok(new_stock)
    }
}

// =============================================================================
// Transaction Helpers
// =============================================================================

/// Fetches a product by id on the transaction's connection.
async fn fetch_product(tx: &mut SqliteConnection, id: &str) -> DbResult<Option<Product>> {
    let product = sqlx::query_as::<_, Product>(
        "SELECT id, sku, barcode, name, category, price_cents, cost_cents, stock, \
         is_active, created_at, updated_at \
         FROM products WHERE id = ?1",
    )
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?;

    Ok(product)
}

/// Appends one ledger entry on the transaction's connection.
#[allow(clippy::too_many_arguments)]
async fn append_ledger_entry(
    tx: &mut SqliteConnection,
    entry_type: LedgerEntryType,
    order_id: Option<&str>,
    invoice_no: Option<&str>,
    amount_cents: i64,
    customer_id: Option<&str>,
    payment_type: PaymentType,
    meta: Option<&str>,
) -> DbResult<()> {
    sqlx::query(
        "INSERT INTO ledger_entries (id, entry_type, order_id, invoice_no, amount_cents, \
         customer_id, payment_type, meta, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
    )
    .bind(Uuid::new_v4().to_string())
    .bind(entry_type)
    .bind(order_id)
    .bind(invoice_no)
    .bind(amount_cents)
    .bind(customer_id)
    .bind(payment_type)
    .bind(meta)
    .bind(Utc::now())
    .execute(&mut *tx)
    .await?;

    Ok(())
}

/// Generates an invoice number: `INV-<unix millis>-<seq>`.
///
/// The millisecond timestamp alone can collide for back-to-back sales on
/// one terminal, so a sub-millisecond sequence suffix keeps the UNIQUE
/// constraint honest.
fn generate_invoice_no() -> String {
    let now = Utc::now();
    let seq = now.timestamp_subsec_micros() % 10_000;
    format!("INV-{}-{:04}", now.timestamp_millis(), seq)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::product::generate_product_id;
    use tally_core::TaxRate;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn seed_product(db: &Database, name: &str, price: i64, cost: i64, stock: i64) -> String {
        let id = generate_product_id();
        let now = Utc::now();
        let product = Product {
            id: id.clone(),
            sku: None,
            barcode: None,
            name: name.to_string(),
            category: "General".to_string(),
            price_cents: price,
            cost_cents: cost,
            stock,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        db.products().insert(&product).await.unwrap();
        id
    }

    fn catalog_line(product_id: &str, name: &str, qty: i64, price: i64) -> DraftLine {
        DraftLine {
            product_id: Some(product_id.to_string()),
            name: name.to_string(),
            quantity: qty,
            unit_price_cents: price,
        }
    }

    #[tokio::test]
    async fn test_place_order_totals_and_stock() {
        let db = test_db().await;
        let pid = seed_product(&db, "Coca-Cola 330ml", 100, 60, 10).await;

        let draft = DraftOrder::new(
            PaymentType::Cash,
            TaxRate::from_bps(1800),
            vec![catalog_line(&pid, "Coca-Cola 330ml", 2, 100)],
        );
        let placed = db.settlement().place_order(&draft).await.unwrap();

        assert_eq!(placed.subtotal_cents, 200);
        assert_eq!(placed.tax_cents, 36);
        assert_eq!(placed.total_cents, 236);
        assert!(placed.invoice_no.starts_with("INV-"));

        let product = db.products().get_by_id(&pid).await.unwrap().unwrap();
        assert_eq!(product.stock, 8);

        let detail = db
            .orders()
            .get_detail(&placed.invoice_no)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(detail.order.status, OrderStatus::Paid);
        assert_eq!(detail.items.len(), 1);
        assert_eq!(detail.items[0].line_total_cents, 200);
    }

    #[tokio::test]
    async fn test_place_order_ledger_postings() {
        let db = test_db().await;
        let pid = seed_product(&db, "Coca-Cola 330ml", 100, 60, 10).await;

        let draft = DraftOrder::new(
            PaymentType::Card,
            TaxRate::from_bps(1800),
            vec![catalog_line(&pid, "Coca-Cola 330ml", 2, 100)],
        );
        let placed = db.settlement().place_order(&draft).await.unwrap();

        let entries = db
            .ledger()
            .entries_for_order(&placed.order_id)
            .await
            .unwrap();
        assert_eq!(entries.len(), 3);

        let report = db.ledger().query(None, None).await.unwrap();
        assert_eq!(report.totals.sale_cents, 236);
        assert_eq!(report.totals.tax_cents, 36);
        assert_eq!(report.totals.cogs_cents, 120);

        for entry in &entries {
            assert_eq!(entry.invoice_no.as_deref(), Some(placed.invoice_no.as_str()));
            assert_eq!(entry.payment_type, PaymentType::Card);
        }
    }

    #[tokio::test]
    async fn test_insufficient_stock_leaves_no_trace() {
        let db = test_db().await;
        let pid = seed_product(&db, "Coca-Cola 330ml", 100, 60, 1).await;

        let draft = DraftOrder::new(
            PaymentType::Cash,
            TaxRate::from_bps(1800),
            vec![catalog_line(&pid, "Coca-Cola 330ml", 2, 100)],
        );
        let err = db.settlement().place_order(&draft).await.unwrap_err();
        assert!(matches!(
            err,
            SettlementError::Core(CoreError::InsufficientStock {
                available: 1,
                requested: 2,
                ..
            })
        ));

        // Nothing persisted: no order, stock untouched, ledger empty.
        assert!(db.orders().list().await.unwrap().is_empty());
        let product = db.products().get_by_id(&pid).await.unwrap().unwrap();
        assert_eq!(product.stock, 1);
        assert_eq!(db.ledger().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unknown_product_rejected() {
        let db = test_db().await;

        let draft = DraftOrder::new(
            PaymentType::Cash,
            TaxRate::zero(),
            vec![catalog_line("no-such-id", "Ghost Item", 1, 100)],
        );
        let err = db.settlement().place_order(&draft).await.unwrap_err();
        assert!(matches!(
            err,
            SettlementError::Core(CoreError::ProductNotFound(name)) if name == "Ghost Item"
        ));
    }

    #[tokio::test]
    async fn test_inactive_product_rejected() {
        let db = test_db().await;
        let pid = seed_product(&db, "Old Stock", 100, 50, 5).await;
        db.products().soft_delete(&pid).await.unwrap();

        let draft = DraftOrder::new(
            PaymentType::Cash,
            TaxRate::zero(),
            vec![catalog_line(&pid, "Old Stock", 1, 100)],
        );
        let err = db.settlement().place_order(&draft).await.unwrap_err();
        assert!(matches!(
            err,
            SettlementError::Core(CoreError::ProductNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_cart_rejected() {
        let db = test_db().await;
        let draft = DraftOrder::new(PaymentType::Cash, TaxRate::zero(), vec![]);
        let err = db.settlement().place_order(&draft).await.unwrap_err();
        assert!(matches!(err, SettlementError::Core(CoreError::EmptyCart)));
    }

    #[tokio::test]
    async fn test_catalog_repricing_overrides_sent_price() {
        let db = test_db().await;
        let pid = seed_product(&db, "Chips", 250, 150, 10).await;

        // Caller sends a stale/bogus price of 1 cent.
        let draft = DraftOrder::new(
            PaymentType::Cash,
            TaxRate::zero(),
            vec![catalog_line(&pid, "Chips", 1, 1)],
        );
        let placed = db.settlement().place_order(&draft).await.unwrap();
        assert_eq!(placed.subtotal_cents, 250);
    }

    #[tokio::test]
    async fn test_manual_pricing_honors_sent_price() {
        let db = test_db().await;
        let pid = seed_product(&db, "Chips", 250, 150, 10).await;

        let mut draft = DraftOrder::new(
            PaymentType::Cash,
            TaxRate::zero(),
            vec![catalog_line(&pid, "Chips", 1, 200)],
        );
        draft.manual_pricing = true;

        let placed = db.settlement().place_order(&draft).await.unwrap();
        assert_eq!(placed.subtotal_cents, 200);
    }

    #[tokio::test]
    async fn test_manual_line_never_touches_stock() {
        let db = test_db().await;
        let pid = seed_product(&db, "Coca-Cola 330ml", 100, 60, 10).await;

        let draft = DraftOrder::new(
            PaymentType::Cash,
            TaxRate::zero(),
            vec![
                catalog_line(&pid, "Coca-Cola 330ml", 1, 100),
                DraftLine {
                    product_id: None,
                    name: "Gift Wrap".to_string(),
                    quantity: 1,
                    unit_price_cents: 500,
                },
            ],
        );
        let placed = db.settlement().place_order(&draft).await.unwrap();
        assert_eq!(placed.subtotal_cents, 600);

        let product = db.products().get_by_id(&pid).await.unwrap().unwrap();
        assert_eq!(product.stock, 9);

        // Manual line carries no cost basis.
        let report = db.ledger().query(None, None).await.unwrap();
        assert_eq!(report.totals.cogs_cents, 60);
    }

    #[tokio::test]
    async fn test_cancel_restores_stock_and_reverses_ledger() {
        let db = test_db().await;
        let pid = seed_product(&db, "Coca-Cola 330ml", 100, 60, 10).await;

        let draft = DraftOrder::new(
            PaymentType::Cash,
            TaxRate::from_bps(1800),
            vec![catalog_line(&pid, "Coca-Cola 330ml", 2, 100)],
        );
        let placed = db.settlement().place_order(&draft).await.unwrap();

        let status = db
            .settlement()
            .cancel_order(&placed.invoice_no)
            .await
            .unwrap();
        assert_eq!(status, OrderStatus::Cancelled);

        let product = db.products().get_by_id(&pid).await.unwrap().unwrap();
        assert_eq!(product.stock, 10);

        let order = db
            .orders()
            .get_by_invoice(&placed.invoice_no)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(order.status, OrderStatus::Cancelled);

        // Reversals net every per-type sum to zero.
        let report = db.ledger().query(None, None).await.unwrap();
        assert_eq!(report.totals.sale_cents, 0);
        assert_eq!(report.totals.tax_cents, 0);
        assert_eq!(report.totals.cogs_cents, 0);
        assert_eq!(report.entries.len(), 6);
    }

    #[tokio::test]
    async fn test_cancel_is_rejected_the_second_time() {
        let db = test_db().await;
        let pid = seed_product(&db, "Coca-Cola 330ml", 100, 60, 10).await;

        let draft = DraftOrder::new(
            PaymentType::Cash,
            TaxRate::zero(),
            vec![catalog_line(&pid, "Coca-Cola 330ml", 2, 100)],
        );
        let placed = db.settlement().place_order(&draft).await.unwrap();

        db.settlement()
            .cancel_order(&placed.invoice_no)
            .await
            .unwrap();
        let err = db
            .settlement()
            .cancel_order(&placed.invoice_no)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SettlementError::Core(CoreError::AlreadyCancelled(_))
        ));

        // The second attempt changed nothing: stock restored exactly once.
        let product = db.products().get_by_id(&pid).await.unwrap().unwrap();
        assert_eq!(product.stock, 10);
        assert_eq!(db.ledger().count().await.unwrap(), 6);
    }

    #[tokio::test]
    async fn test_cancel_unknown_invoice() {
        let db = test_db().await;
        let err = db.settlement().cancel_order("INV-missing").await.unwrap_err();
        assert!(matches!(
            err,
            SettlementError::Core(CoreError::OrderNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_cancel_cogs_reversal_uses_current_cost() {
        let db = test_db().await;
        let pid = seed_product(&db, "Coca-Cola 330ml", 100, 60, 10).await;

        let draft = DraftOrder::new(
            PaymentType::Cash,
            TaxRate::zero(),
            vec![catalog_line(&pid, "Coca-Cola 330ml", 2, 100)],
        );
        let placed = db.settlement().place_order(&draft).await.unwrap();

        // Cost changes between sale and cancellation.
        let mut product = db.products().get_by_id(&pid).await.unwrap().unwrap();
        product.cost_cents = 70;
        db.products().update(&product).await.unwrap();

        db.settlement()
            .cancel_order(&placed.invoice_no)
            .await
            .unwrap();

        let report = db.ledger().query(None, None).await.unwrap();
        // Original COGS 120 at cost 60, reversal -140 at cost 70.
        assert_eq!(report.totals.cogs_cents, 120 - 140);
    }

    #[tokio::test]
    async fn test_adjust_inventory_records_audit_entry() {
        let db = test_db().await;
        let pid = seed_product(&db, "Coca-Cola 330ml", 100, 60, 10).await;

        let new_stock = db
            .settlement()
            .adjust_inventory(&pid, -3, "damage")
            .await
            .unwrap();
        assert_eq!(new_stock, 7);

        let product = db.products().get_by_id(&pid).await.unwrap().unwrap();
        assert_eq!(product.stock, 7);

        let report = db.ledger().query(None, None).await.unwrap();
        assert_eq!(report.entries.len(), 1);
        let entry = &report.entries[0];
        assert_eq!(entry.entry_type, LedgerEntryType::Adjustment);
        assert_eq!(entry.amount_cents, 0);

        let meta = entry.adjustment_meta().unwrap();
        assert_eq!(meta.delta, -3);
        assert_eq!(meta.reason, "damage");
        assert_eq!(meta.name, "Coca-Cola 330ml");
    }

    #[tokio::test]
    async fn test_adjust_inventory_can_go_negative() {
        let db = test_db().await;
        let pid = seed_product(&db, "Coca-Cola 330ml", 100, 60, 2).await;

        let new_stock = db
            .settlement()
            .adjust_inventory(&pid, -5, "audit correction")
            .await
            .unwrap();
        assert_eq!(new_stock, -3);
    }

    #[tokio::test]
    async fn test_adjust_inventory_zero_delta_rejected() {
        let db = test_db().await;
        let pid = seed_product(&db, "Coca-Cola 330ml", 100, 60, 10).await;

        let err = db
            .settlement()
            .adjust_inventory(&pid, 0, "noop")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SettlementError::Core(CoreError::InvalidAdjustment { .. })
        ));
        assert_eq!(db.ledger().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_adjust_inventory_blank_reason_defaults() {
        let db = test_db().await;
        let pid = seed_product(&db, "Coca-Cola 330ml", 100, 60, 10).await;

        db.settlement()
            .adjust_inventory(&pid, 5, "  ")
            .await
            .unwrap();

        let report = db.ledger().query(None, None).await.unwrap();
        let meta = report.entries[0].adjustment_meta().unwrap();
        assert_eq!(meta.reason, "manual");
    }

    #[tokio::test]
    async fn test_hard_delete_leaves_ledger_intact() {
        let db = test_db().await;
        let pid = seed_product(&db, "Coca-Cola 330ml", 100, 60, 10).await;

        let draft = DraftOrder::new(
            PaymentType::Cash,
            TaxRate::from_bps(1800),
            vec![catalog_line(&pid, "Coca-Cola 330ml", 2, 100)],
        );
        let placed = db.settlement().place_order(&draft).await.unwrap();

        db.orders()
            .delete_by_invoice(&placed.invoice_no)
            .await
            .unwrap();

        // Order and its items are gone, the ledger keeps the history.
        assert!(db
            .orders()
            .get_by_invoice(&placed.invoice_no)
            .await
            .unwrap()
            .is_none());
        assert_eq!(db.ledger().count().await.unwrap(), 3);
        let report = db.ledger().query(None, None).await.unwrap();
        assert_eq!(report.totals.sale_cents, 236);
    }

    #[tokio::test]
    async fn test_ledger_date_range_query() {
        let db = test_db().await;
        let pid = seed_product(&db, "Coca-Cola 330ml", 100, 60, 10).await;

        let draft = DraftOrder::new(
            PaymentType::Cash,
            TaxRate::zero(),
            vec![catalog_line(&pid, "Coca-Cola 330ml", 1, 100)],
        );
        db.settlement().place_order(&draft).await.unwrap();

        let now = Utc::now();
        let long_ago = now - chrono::Duration::days(365);

        let report = db.ledger().query(Some(long_ago), Some(now)).await.unwrap();
        assert_eq!(report.entries.len(), 3);

        // A window entirely in the past matches nothing.
        let report = db
            .ledger()
            .query(Some(long_ago), Some(long_ago + chrono::Duration::days(1)))
            .await
            .unwrap();
        assert!(report.entries.is_empty());
    }

    #[tokio::test]
    async fn test_invoice_numbers_are_unique_in_a_burst() {
        let db = test_db().await;
        let pid = seed_product(&db, "Coca-Cola 330ml", 100, 60, 100).await;

        let mut invoices = std::collections::HashSet::new();
        for _ in 0..10 {
            let draft = DraftOrder::new(
                PaymentType::Cash,
                TaxRate::zero(),
                vec![catalog_line(&pid, "Coca-Cola 330ml", 1, 100)],
            );
            let placed = db.settlement().place_order(&draft).await.unwrap();
            assert!(invoices.insert(placed.invoice_no));
        }
    }

    #[tokio::test]
    async fn test_orders_keep_customer_reference() {
        let db = test_db().await;
        let pid = seed_product(&db, "Coca-Cola 330ml", 100, 60, 10).await;

        let mut draft = DraftOrder::new(
            PaymentType::Online,
            TaxRate::zero(),
            vec![catalog_line(&pid, "Coca-Cola 330ml", 1, 100)],
        );
        draft.customer_id = Some("cust-42".to_string());

        let placed = db.settlement().place_order(&draft).await.unwrap();
        let order = db
            .orders()
            .get_by_invoice(&placed.invoice_no)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(order.customer_id.as_deref(), Some("cust-42"));
        assert_eq!(order.payment_type, PaymentType::Online);

        let entries = db.ledger().entries_for_order(&placed.order_id).await.unwrap();
        assert!(entries
            .iter()
            .all(|e| e.customer_id.as_deref() == Some("cust-42")));
    }
}
