//! # Order Repository
//!
//! Read-side and cleanup operations for orders and their line items.
//!
//! ## Division of Labor
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  Writes (order insert, status transition, stock, ledger postings)   │
//! │      └── SettlementEngine, inside one transaction                   │
//! │                                                                     │
//! │  Reads (lookups, listings, history) and the operational hard        │
//! │  delete                                                             │
//! │      └── THIS REPOSITORY                                            │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqlitePool;
use tracing::{debug, warn};

use crate::error::{DbError, DbResult};
use tally_core::{LineItem, Order, OrderDetail};

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

const ORDER_COLUMNS: &str = "id, invoice_no, status, payment_type, tax_rate_bps, \
     subtotal_cents, tax_cents, total_cents, customer_id, created_at, updated_at";

const ITEM_COLUMNS: &str =
    "id, order_id, product_id, name, quantity, unit_price_cents, line_total_cents, created_at";

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Gets an order header by invoice number.
    pub async fn get_by_invoice(&self, invoice_no: &str) -> DbResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE invoice_no = ?1"
        ))
        .bind(invoice_no)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    /// Gets all line items for an order, in insertion order.
    pub async fn get_items(&self, order_id: &str) -> DbResult<Vec<LineItem>> {
        let items = sqlx::query_as::<_, LineItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM order_items WHERE order_id = ?1 ORDER BY created_at, id"
        ))
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Gets the full order record (header + items) by invoice number.
    pub async fn get_detail(&self, invoice_no: &str) -> DbResult<Option<OrderDetail>> {
        let Some(order) = self.get_by_invoice(invoice_no).await? else {
            return Ok(None);
        };

        let items = self.get_items(&order.id).await?;
        Ok(Some(OrderDetail { order, items }))
    }

    /// Lists all orders, newest first.
    pub async fn list(&self) -> DbResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    /// Lists a customer's orders, newest first (order-history query for
    /// the customer directory).
    pub async fn list_for_customer(&self, customer_id: &str) -> DbResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE customer_id = ?1 \
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    /// Hard-deletes an order by invoice number. Line items cascade.
    ///
    /// This bypasses ledger reversal entirely and is retained for
    /// operational cleanup only - use `SettlementEngine::cancel_order`
    /// to undo a sale. Ledger history for the invoice survives.
    pub async fn delete_by_invoice(&self, invoice_no: &str) -> DbResult<()> {
        warn!(invoice_no = %invoice_no, "Hard-deleting order (no ledger reversal)");

        let result = sqlx::query("DELETE FROM orders WHERE invoice_no = ?1")
            .bind(invoice_no)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", invoice_no));
        }

        debug!(invoice_no = %invoice_no, "Order deleted");
        Ok(())
    }
}
