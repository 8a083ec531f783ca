//! # Order Repository
//!
//! Whole-document persistence for orders.
//!
//! ## Storage Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Order Row Layout                                   │
//! │                                                                         │
//! │  order_id │ partition │ customer_id │ created_at │ status │ lines │ history
//! │  ─────────┼───────────┼─────────────┼────────────┼────────┼───────┼────────
//! │  "a1b2.." │    "A"    │ "x@y.com"   │ 2026-08-.. │ Queued │ JSON  │ JSON
//! │                                                                         │
//! │  Lines and history are JSON arrays. Orders are small documents; they  │
//! │  are always read and written whole, never patched column-by-column.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Upsert is last-writer-wins: concurrent status writes to the same order
//! overwrite each other's history, which callers tolerate.

use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use orderflow_core::types::{partition_key, Order, OrderLine, OrderStatus, OrderStatusEvent};

/// Repository for order storage operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Gets an order by its id.
    ///
    /// ## Returns
    /// * `Ok(Some(Order))` - Order found
    /// * `Ok(None)` - Order not found
    pub async fn get(&self, order_id: &str) -> StoreResult<Option<Order>> {
        let row = sqlx::query(
            r#"
            SELECT order_id, customer_id, created_at, status, lines, history
            FROM orders
            WHERE order_id = ?1
            "#,
        )
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(row_to_order).transpose()
    }

    /// Inserts or replaces the whole order document.
    pub async fn upsert(&self, order: &Order) -> StoreResult<()> {
        debug!(id = %order.order_id, status = %order.status, "Upserting order");

        let lines = serde_json::to_string(&order.lines)
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        let history = serde_json::to_string(&order.history)
            .map_err(|e| StoreError::Internal(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT OR REPLACE INTO orders (
                order_id, partition, customer_id, created_at, status, lines, history
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&order.order_id)
        .bind(partition_key(&order.order_id))
        .bind(&order.customer_id)
        .bind(order.created_at)
        .bind(order.status.as_str())
        .bind(lines)
        .bind(history)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Lists the newest `limit` orders.
    pub async fn list(&self, limit: i64) -> StoreResult<Vec<Order>> {
        let rows = sqlx::query(
            r#"
            SELECT order_id, customer_id, created_at, status, lines, history
            FROM orders
            ORDER BY created_at DESC, order_id DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(row_to_order).collect()
    }

    /// Lists one customer's newest `limit` orders.
    ///
    /// The id match is case-insensitive (the column collates NOCASE).
    pub async fn list_by_customer(&self, customer_id: &str, limit: i64) -> StoreResult<Vec<Order>> {
        let rows = sqlx::query(
            r#"
            SELECT order_id, customer_id, created_at, status, lines, history
            FROM orders
            WHERE customer_id = ?1
            ORDER BY created_at DESC, order_id DESC
            LIMIT ?2
            "#,
        )
        .bind(customer_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(row_to_order).collect()
    }

    /// Counts stored orders (for diagnostics).
    pub async fn count(&self) -> StoreResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

fn row_to_order(row: sqlx::sqlite::SqliteRow) -> StoreResult<Order> {
    let order_id: String = row.get("order_id");

    let status_str: String = row.get("status");
    let status: OrderStatus = status_str
        .parse()
        .map_err(|_| StoreError::Internal(format!("stored status '{status_str}' is not valid")))?;

    let lines_json: String = row.get("lines");
    let lines: Vec<OrderLine> =
        serde_json::from_str(&lines_json).map_err(|e| StoreError::CorruptDocument {
            entity: "Order".to_string(),
            id: order_id.clone(),
            source: e,
        })?;

    let history_json: String = row.get("history");
    let history: Vec<OrderStatusEvent> =
        serde_json::from_str(&history_json).map_err(|e| StoreError::CorruptDocument {
            entity: "Order".to_string(),
            id: order_id.clone(),
            source: e,
        })?;

    Ok(Order {
        order_id,
        customer_id: row.get("customer_id"),
        created_at: row.get::<DateTime<Utc>, _>("created_at"),
        status,
        lines,
        history,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::pool::{Store, StoreConfig};
    use orderflow_core::types::{Order, OrderLine, OrderStatus, OrderStatusEvent};

    fn order(order_id: &str, customer_id: &str) -> Order {
        Order::new(
            order_id.to_string(),
            customer_id.to_string(),
            vec![OrderLine {
                product_id: "p1".to_string(),
                quantity: 2,
                unit_price_cents: 499,
            }],
        )
    }

    #[tokio::test]
    async fn test_upsert_and_get_round_trips_documents() {
        let store = Store::new(StoreConfig::in_memory()).await.unwrap();
        let repo = store.orders();

        let o = order("o1", "alice@x.com");
        repo.upsert(&o).await.unwrap();

        let found = repo.get("o1").await.unwrap().unwrap();
        assert_eq!(found.status, OrderStatus::Queued);
        assert_eq!(found.lines.len(), 1);
        assert_eq!(found.history.len(), 1);
        assert_eq!(found.history[0].notes, "Order created");
    }

    #[tokio::test]
    async fn test_upsert_replaces_whole_document() {
        let store = Store::new(StoreConfig::in_memory()).await.unwrap();
        let repo = store.orders();

        let mut o = order("o1", "alice@x.com");
        repo.upsert(&o).await.unwrap();

        o.push_status(OrderStatusEvent::now(
            OrderStatus::Processing,
            "Processing started",
        ));
        repo.upsert(&o).await.unwrap();

        let found = repo.get("o1").await.unwrap().unwrap();
        assert_eq!(found.status, OrderStatus::Processing);
        assert_eq!(found.history.len(), 2);
    }

    #[tokio::test]
    async fn test_list_by_customer_is_scoped_and_newest_first() {
        let store = Store::new(StoreConfig::in_memory()).await.unwrap();
        let repo = store.orders();

        let mut first = order("o1", "alice@x.com");
        first.created_at = chrono::Utc::now() - chrono::Duration::minutes(5);
        repo.upsert(&first).await.unwrap();
        repo.upsert(&order("o2", "alice@x.com")).await.unwrap();
        repo.upsert(&order("o3", "bob@x.com")).await.unwrap();

        let alices = repo.list_by_customer("alice@x.com", 50).await.unwrap();
        assert_eq!(alices.len(), 2);
        assert_eq!(alices[0].order_id, "o2");
        assert_eq!(alices[1].order_id, "o1");

        // The cap keeps only the newest rows.
        let capped = repo.list_by_customer("alice@x.com", 1).await.unwrap();
        assert_eq!(capped.len(), 1);
        assert_eq!(capped[0].order_id, "o2");

        let all = repo.list(2).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_list_by_customer_matches_id_case_insensitively() {
        let store = Store::new(StoreConfig::in_memory()).await.unwrap();
        let repo = store.orders();

        repo.upsert(&order("o1", "alice@x.com")).await.unwrap();

        let found = repo.list_by_customer("Alice@X.com", 50).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].order_id, "o1");
    }

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let store = Store::new(StoreConfig::in_memory()).await.unwrap();
        assert!(store.orders().get("ghost").await.unwrap().is_none());
    }
}
