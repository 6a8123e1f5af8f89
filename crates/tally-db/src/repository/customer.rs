//! # Customer Repository
//!
//! Database operations for the customer directory.
//!
//! Orders reference customers by id string with no foreign-key
//! enforcement: a dangling reference is tolerated and renders as
//! "Walk-in Customer" via [`CustomerRepository::display_name`].

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use tally_core::{Customer, WALK_IN_CUSTOMER};

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

const CUSTOMER_COLUMNS: &str = "id, name, phone, email, address, created_at, updated_at";

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Gets a customer by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Checks whether a customer id resolves. Used only for display
    /// fallback, never for enforcement.
    pub async fn exists(&self, id: &str) -> DbResult<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers WHERE id = ?1")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count > 0)
    }

    /// Resolves a display name for an optional customer reference.
    ///
    /// Missing reference or dangling id both fall back to
    /// "Walk-in Customer".
    pub async fn display_name(&self, customer_id: Option<&str>) -> DbResult<String> {
        let Some(id) = customer_id else {
            return Ok(WALK_IN_CUSTOMER.to_string());
        };

        let name = self.get_by_id(id).await?.map(|c| c.name);
        Ok(name.unwrap_or_else(|| WALK_IN_CUSTOMER.to_string()))
    }

    /// Lists all customers sorted by name.
    pub async fn list(&self) -> DbResult<Vec<Customer>> {
        let customers = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers ORDER BY name"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    /// Inserts a new customer.
    pub async fn insert(&self, customer: &Customer) -> DbResult<()> {
        debug!(id = %customer.id, name = %customer.name, "Inserting customer");

        sqlx::query(
            "INSERT INTO customers (id, name, phone, email, address, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(&customer.id)
        .bind(&customer.name)
        .bind(&customer.phone)
        .bind(&customer.email)
        .bind(&customer.address)
        .bind(customer.created_at)
        .bind(customer.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Updates an existing customer.
    pub async fn update(&self, customer: &Customer) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE customers SET name = ?2, phone = ?3, email = ?4, address = ?5, \
             updated_at = ?6 WHERE id = ?1",
        )
        .bind(&customer.id)
        .bind(&customer.name)
        .bind(&customer.phone)
        .bind(&customer.email)
        .bind(&customer.address)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", &customer.id));
        }

        Ok(())
    }
}

/// Helper to generate a new customer ID.
pub fn generate_customer_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    fn sample_customer(name: &str) -> Customer {
        let now = Utc::now();
        Customer {
            id: generate_customer_id(),
            name: name.to_string(),
            phone: Some("555-0100".to_string()),
            email: None,
            address: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_insert_get_list() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.customers();

        repo.insert(&sample_customer("Bea")).await.unwrap();
        repo.insert(&sample_customer("Ada")).await.unwrap();

        let all = repo.list().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].name, "Ada"); // sorted by name

        assert!(repo.exists(&all[0].id).await.unwrap());
        assert!(!repo.exists("missing").await.unwrap());
    }

    #[tokio::test]
    async fn test_display_name_fallback() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.customers();

        let customer = sample_customer("Ada");
        repo.insert(&customer).await.unwrap();

        assert_eq!(
            repo.display_name(Some(&customer.id)).await.unwrap(),
            "Ada"
        );
        // Dangling reference tolerated
        assert_eq!(
            repo.display_name(Some("dangling-id")).await.unwrap(),
            WALK_IN_CUSTOMER
        );
        // No reference at all
        assert_eq!(repo.display_name(None).await.unwrap(), WALK_IN_CUSTOMER);
    }
}
