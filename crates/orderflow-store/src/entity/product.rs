//! # Product Repository
//!
//! Storage operations for the catalog, including stock reservation.
//!
//! ## Stock Reservation (Compare-And-Swap)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 Reserve 3 units of product P                            │
//! │                                                                         │
//! │  ❌ WRONG: read-check-write without a guard                             │
//! │     read quantity=5 ──► 5 >= 3 ok ──► write quantity=2                 │
//! │     (a concurrent reservation between read and write oversells)        │
//! │                                                                         │
//! │  ✅ CORRECT: version-guarded write                                      │
//! │     read (quantity=5, version=7)                                        │
//! │     UPDATE ... SET quantity = quantity - 3, version = version + 1      │
//! │     WHERE product_id = ? AND version = 7                               │
//! │          │                                                              │
//! │          ├── 1 row affected  → reservation committed                   │
//! │          └── 0 rows affected → lost the race, re-read and retry        │
//! │                                                                         │
//! │  The loop is bounded; persistent contention surfaces as an error       │
//! │  instead of spinning forever.                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use orderflow_core::types::{partition_key, Product};

/// Upper bound on compare-and-swap retries for one reservation.
const MAX_CAS_ATTEMPTS: u32 = 5;

/// Repository for product storage operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = store.products();
/// let reserved = repo.reserve_stock("p1", 3).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by its id.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get(&self, product_id: &str) -> StoreResult<Option<Product>> {
        let row = sqlx::query(
            r#"
            SELECT product_id, name, description, price_cents, category,
                   image_url, thumbnail_url, quantity, version,
                   created_at, updated_at
            FROM products
            WHERE product_id = ?1
            "#,
        )
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(row_to_product))
    }

    /// Lists up to `limit` catalog products, ordered by name.
    pub async fn list(&self, limit: i64) -> StoreResult<Vec<Product>> {
        let rows = sqlx::query(
            r#"
            SELECT product_id, name, description, price_cents, category,
                   image_url, thumbnail_url, quantity, version,
                   created_at, updated_at
            FROM products
            ORDER BY name
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(row_to_product).collect())
    }

    /// Inserts or replaces a catalog product.
    pub async fn upsert(&self, product: &Product) -> StoreResult<()> {
        debug!(id = %product.product_id, "Upserting product");

        sqlx::query(
            r#"
            INSERT OR REPLACE INTO products (
                product_id, partition, name, description, price_cents,
                category, image_url, thumbnail_url, quantity, version,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(&product.product_id)
        .bind(partition_key(&product.product_id))
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price_cents)
        .bind(&product.category)
        .bind(&product.image_url)
        .bind(&product.thumbnail_url)
        .bind(product.quantity)
        .bind(product.version)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Reserves stock for one order line.
    ///
    /// ## Returns
    /// * `Ok(true)` - Stock decremented by `qty`
    /// * `Ok(false)` - Unknown product, non-positive qty, or not enough stock
    /// * `Err(StoreError::VersionConflict)` - Retries exhausted under contention
    ///
    /// The availability check and the decrement are a single guarded write,
    /// so two concurrent reservations can never both take the last unit.
    pub async fn reserve_stock(&self, product_id: &str, qty: i64) -> StoreResult<bool> {
        if qty <= 0 {
            return Ok(false);
        }

        for attempt in 0..MAX_CAS_ATTEMPTS {
            let Some(product) = self.get(product_id).await? else {
                return Ok(false);
            };
            if product.quantity < qty {
                return Ok(false);
            }

            let now = Utc::now();
            let result = sqlx::query(
                r#"
                UPDATE products
                SET quantity = quantity - ?2,
                    version = version + 1,
                    updated_at = ?3
                WHERE product_id = ?1 AND version = ?4
                "#,
            )
            .bind(product_id)
            .bind(qty)
            .bind(now)
            .bind(product.version)
            .execute(&self.pool)
            .await?;

            if result.rows_affected() == 1 {
                debug!(id = %product_id, qty = %qty, "Stock reserved");
                return Ok(true);
            }

            debug!(
                id = %product_id,
                attempt = attempt + 1,
                "Reservation lost the race, retrying"
            );
        }

        Err(StoreError::version_conflict("Product", product_id))
    }

    /// Applies a signed quantity delta to a product.
    ///
    /// Used when consuming inventory-update messages. The delta is applied
    /// as-is: duplicate deliveries of the same message apply it twice, and
    /// the resulting quantity can go negative. Callers who care must
    /// deduplicate upstream.
    ///
    /// ## Returns
    /// * `Err(StoreError::NotFound)` - Product doesn't exist
    pub async fn adjust_quantity(&self, product_id: &str, delta: i64) -> StoreResult<()> {
        debug!(id = %product_id, delta = %delta, "Adjusting quantity");

        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE products
            SET quantity = quantity + ?2,
                version = version + 1,
                updated_at = ?3
            WHERE product_id = ?1
            "#,
        )
        .bind(product_id)
        .bind(delta)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Product", product_id));
        }

        Ok(())
    }

    /// Counts catalog products (for diagnostics and seed checks).
    pub async fn count(&self) -> StoreResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

fn row_to_product(row: sqlx::sqlite::SqliteRow) -> Product {
    Product {
        product_id: row.get("product_id"),
        name: row.get("name"),
        description: row.get("description"),
        price_cents: row.get("price_cents"),
        category: row.get("category"),
        image_url: row.get("image_url"),
        thumbnail_url: row.get("thumbnail_url"),
        quantity: row.get("quantity"),
        version: row.get("version"),
        created_at: row.get::<DateTime<Utc>, _>("created_at"),
        updated_at: row.get::<DateTime<Utc>, _>("updated_at"),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
