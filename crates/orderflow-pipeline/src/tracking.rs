//! # Order Tracking
//!
//! Status queries and manual status overrides.
//!
//! ## Visibility and Overrides
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Tracking Surface                                │
//! │                                                                         │
//! │  get_order / list_orders                                               │
//! │    • SystemAdmin sees everything                                       │
//! │    • a customer sees only their own orders                             │
//! │    • list supports a search query (union of matchers) and a status     │
//! │      filter, newest first                                              │
//! │                                                                         │
//! │  set_status (admin only)                                               │
//! │    1. parse the requested status (five-value vocabulary)               │
//! │    2. same status        → no-op, nothing written                      │
//! │    3. legal transition   → history event appended, order persisted     │
//! │    4. illegal transition → rejected, nothing written                   │
//! │                                                                         │
//! │  Queued ──► Processing ──► Shipped ──► Completed                       │
//! │     └──────────┴──────────────┴────► Canceled (non-terminal only)      │
//! │                                                                         │
//! │  The processor stops at Shipped; Completed is only ever reached        │
//! │  through an override here.                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::{debug, info, warn};

use crate::error::PipelineResult;
use orderflow_core::auth::Principal;
use orderflow_core::search::{filter_orders, matchers_for};
use orderflow_core::types::{Order, OrderStatus, OrderStatusEvent};
use orderflow_core::CoreError;
use orderflow_store::Store;

/// Most orders returned by one listing query.
const ORDER_LIST_LIMIT: i64 = 100;

/// Most customers loaded as the search directory snapshot.
const CUSTOMER_DIRECTORY_LIMIT: i64 = 500;

/// Tracking and override surface over the order store.
#[derive(Debug, Clone)]
pub struct OrderTracking {
    store: Store,
}

impl OrderTracking {
    /// Creates a new tracking surface over a store.
    pub fn new(store: Store) -> Self {
        OrderTracking { store }
    }

    /// Fetches a single order, enforcing visibility.
    ///
    /// ## Errors
    /// * `CoreError::OrderNotFound` - No such order
    /// * `CoreError::Forbidden` - Order belongs to another customer
    pub async fn get_order(&self, principal: &Principal, order_id: &str) -> PipelineResult<Order> {
        let order = self
            .store
            .orders()
            .get(order_id)
            .await?
            .ok_or_else(|| CoreError::OrderNotFound(order_id.to_string()))?;

        if !principal.may_view(&order) {
            return Err(CoreError::Forbidden(format!(
                "order {order_id} belongs to another customer"
            ))
            .into());
        }

        Ok(order)
    }

    /// Lists visible orders, newest first, with optional search and status
    /// filters. Results are capped at [`ORDER_LIST_LIMIT`] rows.
    ///
    /// The search query widens by union: an order matches if its id starts
    /// with the query, its customer id contains it, or the query resolves to
    /// a customer by name. A blank query means "no filter".
    pub async fn list_orders(
        &self,
        principal: &Principal,
        query: Option<&str>,
        status: Option<OrderStatus>,
    ) -> PipelineResult<Vec<Order>> {
        let mut orders = match principal.customer_scope() {
            Some(customer_id) => {
                self.store
                    .orders()
                    .list_by_customer(customer_id, ORDER_LIST_LIMIT)
                    .await?
            }
            None => self.store.orders().list(ORDER_LIST_LIMIT).await?,
        };

        if let Some(query) = query.filter(|q| !q.trim().is_empty()) {
            let directory = self.store.customers().list(CUSTOMER_DIRECTORY_LIMIT).await?;
            let matchers = matchers_for(query, &directory);
            orders = filter_orders(orders, &matchers);
        }

        if let Some(status) = status {
            orders.retain(|o| o.status == status);
        }

        debug!(count = orders.len(), "Listed orders");
        Ok(orders)
    }

    /// Manually overrides an order's status.
    ///
    /// Admin only. The requested status arrives as a string and must be one
    /// of the five known values; anything else (e.g. "Delivered") is
    /// rejected before the order is even loaded.
    ///
    /// ## Returns
    /// The order after the override. Setting the current status again is a
    /// no-op that returns the order unchanged.
    pub async fn set_status(
        &self,
        principal: &Principal,
        order_id: &str,
        status: &str,
        notes: Option<&str>,
    ) -> PipelineResult<Order> {
        if !principal.may_override_status() {
            return Err(CoreError::Forbidden("status overrides require admin".to_string()).into());
        }

        let next: OrderStatus = status.parse()?;

        let mut order = self
            .store
            .orders()
            .get(order_id)
            .await?
            .ok_or_else(|| CoreError::OrderNotFound(order_id.to_string()))?;

        if order.status == next {
            debug!(order = %order_id, status = %next, "Status unchanged, no-op");
            return Ok(order);
        }

        if !order.status.can_transition_to(next) {
            warn!(
                order = %order_id,
                from = %order.status,
                to = %next,
                "Rejected status override"
            );
            return Err(CoreError::InvalidTransition {
                from: order.status,
                to: next,
            }
            .into());
        }

        let notes = notes
            .map(str::to_string)
            .unwrap_or_else(|| format!("Status changed to {next}"));
        order.push_status(OrderStatusEvent::now(next, notes));
        self.store.orders().upsert(&order).await?;

        info!(order = %order_id, status = %next, "Status overridden");
        self.store
            .audit_log()
            .info(&format!("Order {order_id} status set to {next}"))
            .await;

        Ok(order)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use orderflow_core::types::{Customer, OrderLine};
    use orderflow_store::StoreConfig;

    fn admin() -> Principal {
        Principal::SystemAdmin
    }

    fn customer(id: &str) -> Principal {
        Principal::Customer {
            customer_id: id.to_string(),
        }
    }

    async fn store_with_order(order_id: &str, customer_id: &str) -> Store {
        let store = Store::new(StoreConfig::in_memory()).await.unwrap();
        store
            .orders()
            .upsert(&Order::new(
                order_id.to_string(),
                customer_id.to_string(),
                vec![OrderLine {
                    product_id: "p1".to_string(),
                    quantity: 1,
                    unit_price_cents: 499,
                }],
            ))
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_override_walks_the_status_machine() {
        let store = store_with_order("o1", "alice@x.com").await;
        let tracking = OrderTracking::new(store.clone());

        tracking
            .set_status(&admin(), "o1", "Processing", None)
            .await
            .unwrap();
        tracking.set_status(&admin(), "o1", "Shipped", None).await.unwrap();
        let order = tracking
            .set_status(&admin(), "o1", "Completed", Some("Confirmed delivered"))
            .await
            .unwrap();

        assert_eq!(order.status, OrderStatus::Completed);
        assert_eq!(order.history.len(), 4);
        assert_eq!(order.history.last().unwrap().notes, "Confirmed delivered");
    }

    #[tokio::test]
    async fn test_unknown_status_value_rejected_without_mutation() {
        let store = store_with_order("o1", "alice@x.com").await;
        let tracking = OrderTracking::new(store.clone());

        let err = tracking
            .set_status(&admin(), "o1", "Delivered", None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Invalid status value"));

        let order = store.orders().get("o1").await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Queued);
        assert_eq!(order.history.len(), 1);
    }

    #[tokio::test]
    async fn test_illegal_transition_rejected_without_mutation() {
        let store = store_with_order("o1", "alice@x.com").await;
        let tracking = OrderTracking::new(store.clone());
        tracking
            .set_status(&admin(), "o1", "Processing", None)
            .await
            .unwrap();
        tracking.set_status(&admin(), "o1", "Shipped", None).await.unwrap();

        // Backwards move.
        let err = tracking
            .set_status(&admin(), "o1", "Processing", None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Invalid status transition"));

        let order = store.orders().get("o1").await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Shipped);
        assert_eq!(order.history.len(), 3);
    }

    #[tokio::test]
    async fn test_same_status_is_noop() {
        let store = store_with_order("o1", "alice@x.com").await;
        let tracking = OrderTracking::new(store.clone());

        let order = tracking.set_status(&admin(), "o1", "Queued", None).await.unwrap();
        assert_eq!(order.history.len(), 1);
    }

    #[tokio::test]
    async fn test_cancel_only_from_non_terminal() {
        let store = store_with_order("o1", "alice@x.com").await;
        let tracking = OrderTracking::new(store.clone());

        tracking.set_status(&admin(), "o1", "Canceled", None).await.unwrap();

        // Canceled is terminal: nothing moves it again.
        let err = tracking
            .set_status(&admin(), "o1", "Processing", None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Invalid status transition"));
    }

    #[tokio::test]
    async fn test_customers_cannot_override() {
        let store = store_with_order("o1", "alice@x.com").await;
        let tracking = OrderTracking::new(store);

        let err = tracking
            .set_status(&customer("alice@x.com"), "o1", "Canceled", None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Forbidden"));
    }

    #[tokio::test]
    async fn test_get_order_enforces_visibility() {
        let store = store_with_order("o1", "alice@x.com").await;
        let tracking = OrderTracking::new(store);

        assert!(tracking.get_order(&admin(), "o1").await.is_ok());
        assert!(tracking
            .get_order(&customer("alice@x.com"), "o1")
            .await
            .is_ok());

        let err = tracking
            .get_order(&customer("bob@x.com"), "o1")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Forbidden"));

        let err = tracking.get_order(&admin(), "ghost").await.unwrap_err();
        assert!(err.to_string().contains("Order not found"));
    }

    #[tokio::test]
    async fn test_list_orders_scoping_and_filters() {
        let store = store_with_order("abc-1", "alice@x.com").await;
        store
            .orders()
            .upsert(&Order::new(
                "xyz-2".to_string(),
                "bob@x.com".to_string(),
                vec![OrderLine {
                    product_id: "p1".to_string(),
                    quantity: 1,
                    unit_price_cents: 100,
                }],
            ))
            .await
            .unwrap();
        store
            .customers()
            .insert(&Customer {
                customer_id: "bob@x.com".to_string(),
                name: "Bob Jones".to_string(),
                email: "bob@x.com".to_string(),
                shipping_address: "Unknown".to_string(),
                password_hash: String::new(),
                disabled: false,
            })
            .await
            .unwrap();

        let tracking = OrderTracking::new(store.clone());

        // Customers only see their own orders.
        let mine = tracking
            .list_orders(&customer("alice@x.com"), None, None)
            .await
            .unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].order_id, "abc-1");

        // The scope match ignores case: a principal whose id differs in
        // casing from the stored order still sees it.
        let mine = tracking
            .list_orders(&customer("Alice@X.com"), None, None)
            .await
            .unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].order_id, "abc-1");

        // Admin search by customer name resolves through the directory.
        let hits = tracking
            .list_orders(&admin(), Some("jones"), None)
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].customer_id, "bob@x.com");

        // Status filter.
        tracking
            .set_status(&admin(), "abc-1", "Canceled", None)
            .await
            .unwrap();
        let canceled = tracking
            .list_orders(&admin(), None, Some(OrderStatus::Canceled))
            .await
            .unwrap();
        assert_eq!(canceled.len(), 1);
        assert_eq!(canceled[0].order_id, "abc-1");
    }
}
