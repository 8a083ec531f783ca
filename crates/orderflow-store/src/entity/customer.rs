//! # Customer Repository
//!
//! Storage operations for customer accounts.
//!
//! ## Key Operations
//! - Lookup by id (the id doubles as the login email)
//! - Insert (registration, fails on duplicates)
//! - Upsert (auto-provisioning at intake)
//!
//! Auto-provisioned rows carry an empty password hash and cannot log in
//! until the customer registers properly.

use sqlx::{Row, SqlitePool};
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use orderflow_core::types::{partition_key, Customer};

/// Repository for customer storage operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Gets a customer by id (case-insensitive).
    ///
    /// ## Returns
    /// * `Ok(Some(Customer))` - Customer found
    /// * `Ok(None)` - Customer not found
    pub async fn get(&self, customer_id: &str) -> StoreResult<Option<Customer>> {
        let row = sqlx::query(
            r#"
            SELECT customer_id, name, email, shipping_address, password_hash, disabled
            FROM customers
            WHERE customer_id = ?1
            "#,
        )
        .bind(customer_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| Customer {
            customer_id: row.get("customer_id"),
            name: row.get("name"),
            email: row.get("email"),
            shipping_address: row.get("shipping_address"),
            password_hash: row.get("password_hash"),
            disabled: row.get("disabled"),
        }))
    }

    /// Inserts a new customer.
    ///
    /// ## Returns
    /// * `Ok(())` - Inserted
    /// * `Err(StoreError::UniqueViolation)` - Customer id already exists
    pub async fn insert(&self, customer: &Customer) -> StoreResult<()> {
        debug!(id = %customer.customer_id, "Inserting customer");

        sqlx::query(
            r#"
            INSERT INTO customers (
                customer_id, partition, name, email, shipping_address,
                password_hash, disabled
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&customer.customer_id)
        .bind(partition_key(&customer.customer_id))
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(&customer.shipping_address)
        .bind(&customer.password_hash)
        .bind(customer.disabled)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Inserts or replaces a customer row.
    ///
    /// Used by intake auto-provisioning, where creating an existing customer
    /// again is a no-op rather than an error. Existing rows keep their stored
    /// credentials: the replace only happens when the id is new.
    pub async fn upsert_if_absent(&self, customer: &Customer) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO customers (
                customer_id, partition, name, email, shipping_address,
                password_hash, disabled
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&customer.customer_id)
        .bind(partition_key(&customer.customer_id))
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(&customer.shipping_address)
        .bind(&customer.password_hash)
        .bind(customer.disabled)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Updates an existing customer's profile and credentials.
    ///
    /// ## Returns
    /// * `Err(StoreError::NotFound)` - Customer doesn't exist
    pub async fn update(&self, customer: &Customer) -> StoreResult<()> {
        debug!(id = %customer.customer_id, "Updating customer");

        let result = sqlx::query(
            r#"
            UPDATE customers SET
                name = ?2,
                email = ?3,
                shipping_address = ?4,
                password_hash = ?5,
                disabled = ?6
            WHERE customer_id = ?1
            "#,
        )
        .bind(&customer.customer_id)
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(&customer.shipping_address)
        .bind(&customer.password_hash)
        .bind(customer.disabled)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Customer", &customer.customer_id));
        }

        Ok(())
    }

    /// Lists up to `limit` customers, ordered by id.
    ///
    /// Used as the directory snapshot for tracking search.
    pub async fn list(&self, limit: i64) -> StoreResult<Vec<Customer>> {
        let rows = sqlx::query(
            r#"
            SELECT customer_id, name, email, shipping_address, password_hash, disabled
            FROM customers
            ORDER BY customer_id
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| Customer {
                customer_id: row.get("customer_id"),
                name: row.get("name"),
                email: row.get("email"),
                shipping_address: row.get("shipping_address"),
                password_hash: row.get("password_hash"),
                disabled: row.get("disabled"),
            })
            .collect())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::pool::{Store, StoreConfig};
    use orderflow_core::types::Customer;

    fn customer(id: &str, name: &str) -> Customer {
        Customer {
            customer_id: id.to_string(),
            name: name.to_string(),
            email: id.to_string(),
            shipping_address: "Unknown".to_string(),
            password_hash: String::new(),
            disabled: false,
        }
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let store = Store::new(StoreConfig::in_memory()).await.unwrap();
        let repo = store.customers();

        repo.insert(&customer("alice@x.com", "Alice")).await.unwrap();

        let found = repo.get("alice@x.com").await.unwrap().unwrap();
        assert_eq!(found.name, "Alice");
        assert!(!found.has_login());
    }

    #[tokio::test]
    async fn test_insert_duplicate_fails() {
        let store = Store::new(StoreConfig::in_memory()).await.unwrap();
        let repo = store.customers();

        repo.insert(&customer("alice@x.com", "Alice")).await.unwrap();
        let err = repo.insert(&customer("alice@x.com", "Alice")).await;
        assert!(err.is_err());
    }

    #[tokio::test]
    async fn test_upsert_if_absent_keeps_existing() {
        let store = Store::new(StoreConfig::in_memory()).await.unwrap();
        let repo = store.customers();

        let mut registered = customer("alice@x.com", "Alice Smith");
        registered.password_hash = "abc123".to_string();
        repo.insert(&registered).await.unwrap();

        // Auto-provisioning the same id must not clobber credentials.
        let provisioned = customer("alice@x.com", "Customer alice@x.com");
        let created = repo.upsert_if_absent(&provisioned).await.unwrap();
        assert!(!created);

        let found = repo.get("alice@x.com").await.unwrap().unwrap();
        assert_eq!(found.name, "Alice Smith");
        assert_eq!(found.password_hash, "abc123");
    }

    #[tokio::test]
    async fn test_customer_identity_ignores_case() {
        let store = Store::new(StoreConfig::in_memory()).await.unwrap();
        let repo = store.customers();

        repo.insert(&customer("alice@x.com", "Alice")).await.unwrap();

        // Lookups ignore case.
        let found = repo.get("Alice@X.com").await.unwrap().unwrap();
        assert_eq!(found.name, "Alice");

        // So does identity: a differently-cased provision is the same row.
        let created = repo
            .upsert_if_absent(&customer("ALICE@X.COM", "Customer ALICE@X.COM"))
            .await
            .unwrap();
        assert!(!created);
        assert_eq!(repo.list(10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let store = Store::new(StoreConfig::in_memory()).await.unwrap();
        assert!(store.customers().get("ghost").await.unwrap().is_none());
    }
}
