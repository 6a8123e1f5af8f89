//! # Product Repository
//!
//! Database operations for the catalog store.
//!
//! ## Key Operations
//! - CRUD with soft delete
//! - Delta-based stock updates
//! - Low-stock listing for replenishment
//!
//! ## Stock Update Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  ❌ WRONG: absolute update (lost-update anomaly)                    │
//! │     UPDATE products SET stock = 7 WHERE id = ?                      │
//! │                                                                     │
//! │  ✅ CORRECT: delta update                                           │
//! │     UPDATE products SET stock = stock - 3                           │
//! │                                                                     │
//! │  Two terminals selling concurrently compose: -3 + -2 = -5 total.    │
//! │  Settlement goes further and guards the decrement with a stock      │
//! │  floor inside its transaction (see settlement.rs).                  │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use tally_core::Product;

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

const PRODUCT_COLUMNS: &str = "id, sku, barcode, name, category, price_cents, cost_cents, \
     stock, is_active, created_at, updated_at";

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets a product by its SKU.
    pub async fn get_by_sku(&self, sku: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE sku = ?1"
        ))
        .bind(sku)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Lists active products sorted by name.
    pub async fn list_active(&self, limit: u32) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE is_active = 1 ORDER BY name LIMIT ?1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Lists active products at or below the given stock threshold.
    ///
    /// Used by replenishment views; sorted most-depleted first.
    pub async fn low_stock(&self, threshold: i64) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE is_active = 1 AND stock <= ?1 ORDER BY stock, name"
        ))
        .bind(threshold)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Inserts a new product.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - SKU or barcode already exists
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, name = %product.name, "Inserting product");

        sqlx::query(
            "INSERT INTO products \
             (id, sku, barcode, name, category, price_cents, cost_cents, \
              stock, is_active, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        )
        .bind(&product.id)
        .bind(&product.sku)
        .bind(&product.barcode)
        .bind(&product.name)
        .bind(&product.category)
        .bind(product.price_cents)
        .bind(product.cost_cents)
        .bind(product.stock)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Updates an existing product (all fields except id and stock;
    /// stock moves only by delta, see `update_stock`).
    pub async fn update(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, "Updating product");

        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE products SET \
             sku = ?2, barcode = ?3, name = ?4, category = ?5, \
             price_cents = ?6, cost_cents = ?7, is_active = ?8, updated_at = ?9 \
             WHERE id = ?1",
        )
        .bind(&product.id)
        .bind(&product.sku)
        .bind(&product.barcode)
        .bind(&product.name)
        .bind(&product.category)
        .bind(product.price_cents)
        .bind(product.cost_cents)
        .bind(product.is_active)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", &product.id));
        }

        Ok(())
    }

    /// Updates product stock by a delta (negative for sales, positive
    /// for restocking). No floor is applied here; settlement enforces
    /// its own guarded decrement in-transaction.
    pub async fn update_stock(&self, id: &str, delta: i64) -> DbResult<()> {
        debug!(id = %id, delta = %delta, "Updating stock");

        let now = Utc::now();

        let result =
            sqlx::query("UPDATE products SET stock = stock + ?2, updated_at = ?3 WHERE id = ?1")
                .bind(id)
                .bind(delta)
                .bind(now)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Soft-deletes a product by setting is_active = false.
    ///
    /// Historical line items still reference the product, so rows are
    /// never removed.
    pub async fn soft_delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Soft-deleting product");

        let now = Utc::now();

        let result = sqlx::query("UPDATE products SET is_active = 0, updated_at = ?2 WHERE id = ?1")
            .bind(id)
            .bind(now)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts active products (for diagnostics and seed checks).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Helper to generate a new product ID.
pub fn generate_product_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    fn sample_product(name: &str, stock: i64) -> Product {
        let now = Utc::now();
        Product {
            id: generate_product_id(),
            sku: Some(format!("SKU-{}", name.replace(' ', "-").to_uppercase())),
            barcode: None,
            name: name.to_string(),
            category: "Beverages".to_string(),
            price_cents: 250,
            cost_cents: 150,
            stock,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = test_db().await;
        let repo = db.products();

        let product = sample_product("Coca-Cola 330ml", 10);
        repo.insert(&product).await.unwrap();

        let fetched = repo.get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Coca-Cola 330ml");
        assert_eq!(fetched.stock, 10);
        assert_eq!(fetched.price_cents, 250);

        let by_sku = repo
            .get_by_sku(product.sku.as_deref().unwrap())
            .await
            .unwrap();
        assert!(by_sku.is_some());

        assert!(repo.get_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_sku_rejected() {
        let db = test_db().await;
        let repo = db.products();

        let a = sample_product("Pepsi 330ml", 5);
        let mut b = sample_product("Pepsi 500ml", 5);
        b.sku = a.sku.clone();

        repo.insert(&a).await.unwrap();
        let err = repo.insert(&b).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_update_stock_delta() {
        let db = test_db().await;
        let repo = db.products();

        let product = sample_product("Sprite 330ml", 10);
        repo.insert(&product).await.unwrap();

        repo.update_stock(&product.id, -3).await.unwrap();
        repo.update_stock(&product.id, 1).await.unwrap();

        let fetched = repo.get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(fetched.stock, 8);

        // Manual restock may push below zero elsewhere; plain delta has no floor
        repo.update_stock(&product.id, -20).await.unwrap();
        let fetched = repo.get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(fetched.stock, -12);

        assert!(repo.update_stock("missing", 1).await.is_err());
    }

    #[tokio::test]
    async fn test_soft_delete_hides_from_listings() {
        let db = test_db().await;
        let repo = db.products();

        let product = sample_product("Fanta 330ml", 4);
        repo.insert(&product).await.unwrap();
        assert_eq!(repo.count().await.unwrap(), 1);

        repo.soft_delete(&product.id).await.unwrap();
        assert_eq!(repo.count().await.unwrap(), 0);
        assert!(repo.list_active(10).await.unwrap().is_empty());

        // Still reachable by id for historical lookups
        let fetched = repo.get_by_id(&product.id).await.unwrap().unwrap();
        assert!(!fetched.is_active);
    }

    #[tokio::test]
    async fn test_low_stock_listing() {
        let db = test_db().await;
        let repo = db.products();

        repo.insert(&sample_product("Plenty", 50)).await.unwrap();
        repo.insert(&sample_product("Scarce", 2)).await.unwrap();
        repo.insert(&sample_product("Gone", 0)).await.unwrap();

        let low = repo.low_stock(5).await.unwrap();
        assert_eq!(low.len(), 2);
        assert_eq!(low[0].name, "Gone"); // most depleted first
        assert_eq!(low[1].name, "Scarce");
    }
}
