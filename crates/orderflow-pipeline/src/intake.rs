//! # Order Intake
//!
//! Accepts order requests, reserves stock, and hands the order to the
//! processor through the queue.
//!
//! ## Intake Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Order Intake Flow                                │
//! │                                                                         │
//! │  IntakeRequest                                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  1. Resolve products from the catalog                                  │
//! │  2. Validate (collect-all) ──── errors ──► reject, nothing written     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  3. Auto-provision the customer if unknown                             │
//! │  4. Persist the order (status Queued, "Order created")                 │
//! │  5. Reserve stock line by line (guarded decrement)                     │
//! │       │          └── a line loses a race ──► reject; already-reserved  │
//! │       │                                      lines stay reserved       │
//! │       ▼                                                                 │
//! │  6. Enqueue NewOrderMessage on "new-orders"                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Ok(Order) ── caller sees Queued; the processor takes it from here    │
//! │                                                                         │
//! │  Steps 4-6 are sequential writes without a surrounding transaction:    │
//! │  a crash between them leaves a Queued order that never ships. The      │
//! │  audit trail records each step so operators can reconcile.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::{debug, info, warn};

use crate::error::PipelineResult;
use crate::messages::{encode, NewOrderMessage};
use orderflow_core::error::{CoreError, ValidationError};
use orderflow_core::types::{generate_id, Customer, Order, Product};
use orderflow_core::validation::{plan_order, IntakeRequest};
use orderflow_store::{Store, NEW_ORDERS_QUEUE};

/// Order intake front door.
///
/// Cloneable; clones share the underlying store.
#[derive(Debug, Clone)]
pub struct OrderIntake {
    store: Store,
}

impl OrderIntake {
    /// Creates a new intake over a store.
    pub fn new(store: Store) -> Self {
        OrderIntake { store }
    }

    /// Creates an order from an intake request.
    ///
    /// ## Returns
    /// * `Ok(Order)` - Persisted at `Queued` and handed to the processor
    /// * `Err(CoreError::Validation)` - Every collected failure; nothing was
    ///   written (unless a reservation lost a race mid-way, see below)
    ///
    /// ## Mid-flight reservation failure
    /// Validation checks stock before any write, but a concurrent order can
    /// still take the units between the check and the reservation. When that
    /// happens the request fails with the same insufficient-stock error, the
    /// order row remains at `Queued` without a queue message, and lines
    /// reserved before the failing one stay reserved.
    pub async fn create_order(&self, request: &IntakeRequest) -> PipelineResult<Order> {
        debug!(
            customer = %request.customer_id,
            lines = request.product_ids.len(),
            "Intake request received"
        );

        // Resolve the requested catalog entries; unknown ids stay None and
        // are skipped by validation.
        let mut resolved: Vec<Option<Product>> = Vec::with_capacity(request.product_ids.len());
        for product_id in &request.product_ids {
            resolved.push(self.store.products().get(product_id).await?);
        }

        let lines = match plan_order(request, &resolved) {
            Ok(lines) => lines,
            Err(errors) => {
                warn!(
                    customer = %request.customer_id,
                    errors = errors.len(),
                    "Intake request rejected"
                );
                self.store
                    .audit_log()
                    .error(&format!(
                        "Order rejected for customer {}: {}",
                        request.customer_id,
                        CoreError::Validation(errors.clone())
                    ))
                    .await;
                return Err(CoreError::Validation(errors).into());
            }
        };

        let customer_id = request.customer_id.trim().to_string();
        self.provision_customer(&customer_id).await?;

        let order = Order::new(generate_id(), customer_id.clone(), lines);
        self.store.orders().upsert(&order).await?;

        // Reserve stock per line. Validation already checked availability,
        // so a failure here means a concurrent order won the units.
        for line in &order.lines {
            let reserved = self
                .store
                .products()
                .reserve_stock(&line.product_id, line.quantity)
                .await?;

            if !reserved {
                let (name, available) = match self.store.products().get(&line.product_id).await? {
                    Some(p) => (p.name, p.quantity),
                    None => (line.product_id.clone(), 0),
                };
                warn!(
                    order = %order.order_id,
                    product = %line.product_id,
                    "Reservation lost to a concurrent order"
                );
                self.store
                    .audit_log()
                    .error(&format!(
                        "Order {} reservation failed for product {}",
                        order.order_id, line.product_id
                    ))
                    .await;
                return Err(CoreError::Validation(vec![ValidationError::InsufficientStock {
                    product_id: line.product_id.clone(),
                    name,
                    available,
                    requested: line.quantity,
                }])
                .into());
            }
        }

        let payload = encode(&NewOrderMessage::for_order(&order))?;
        self.store.queue().enqueue(NEW_ORDERS_QUEUE, &payload).await?;

        info!(
            order = %order.order_id,
            customer = %order.customer_id,
            lines = order.lines.len(),
            total_cents = order.total_cents(),
            "Order created and queued"
        );
        self.store
            .audit_log()
            .info(&format!(
                "Order {} created for customer {}",
                order.order_id, order.customer_id
            ))
            .await;

        Ok(order)
    }

    /// Creates a placeholder account for a first-time customer id.
    ///
    /// Existing accounts are left untouched; the placeholder has no login.
    async fn provision_customer(&self, customer_id: &str) -> PipelineResult<()> {
        let placeholder = Customer {
            customer_id: customer_id.to_string(),
            name: format!("Customer {customer_id}"),
            email: customer_id.to_string(),
            shipping_address: "Unknown".to_string(),
            password_hash: String::new(),
            disabled: false,
        };

        let created = self.store.customers().upsert_if_absent(&placeholder).await?;
        if created {
            debug!(customer = %customer_id, "Auto-provisioned customer");
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::decode;
    use chrono::Utc;
    use orderflow_core::types::OrderStatus;
    use orderflow_store::{StoreConfig, DEFAULT_LEASE};

    async fn store_with_product(id: &str, quantity: i64) -> Store {
        let store = Store::new(StoreConfig::in_memory()).await.unwrap();
        store
            .products()
            .upsert(&Product {
                product_id: id.to_string(),
                name: format!("Product {id}"),
                description: String::new(),
                price_cents: 499,
                category: "test".to_string(),
                image_url: None,
                thumbnail_url: None,
                quantity,
                version: 0,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            })
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_create_order_reserves_and_enqueues() {
        let store = store_with_product("p1", 5).await;
        let intake = OrderIntake::new(store.clone());

        let order = intake
            .create_order(&IntakeRequest::single("alice@x.com", "p1", 3))
            .await
            .unwrap();

        assert_eq!(order.status, OrderStatus::Queued);
        assert_eq!(order.history[0].notes, "Order created");

        // Stock reserved up front.
        assert_eq!(store.products().get("p1").await.unwrap().unwrap().quantity, 2);

        // Handoff message decodes back to the order.
        let msg = store
            .queue()
            .dequeue(NEW_ORDERS_QUEUE, DEFAULT_LEASE)
            .await
            .unwrap()
            .unwrap();
        let wire: NewOrderMessage = decode(&msg.payload).unwrap();
        assert_eq!(wire.order_id, order.order_id);
        assert_eq!(wire.lines[0].quantity, 3);
        assert_eq!(wire.lines[0].unit_price, 499);
    }

    #[tokio::test]
    async fn test_insufficient_stock_writes_nothing() {
        let store = store_with_product("p1", 5).await;
        let intake = OrderIntake::new(store.clone());

        let err = intake
            .create_order(&IntakeRequest::single("alice@x.com", "p1", 10))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Insufficient stock"));

        assert_eq!(store.orders().count().await.unwrap(), 0);
        assert_eq!(store.products().get("p1").await.unwrap().unwrap().quantity, 5);
        assert_eq!(store.queue().depth(NEW_ORDERS_QUEUE).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_auto_provisions_unknown_customer() {
        let store = store_with_product("p1", 5).await;
        let intake = OrderIntake::new(store.clone());

        intake
            .create_order(&IntakeRequest::single("new@x.com", "p1", 1))
            .await
            .unwrap();

        let customer = store.customers().get("new@x.com").await.unwrap().unwrap();
        assert_eq!(customer.name, "Customer new@x.com");
        assert_eq!(customer.shipping_address, "Unknown");
        assert!(!customer.has_login());
    }

    #[tokio::test]
    async fn test_existing_customer_not_clobbered() {
        let store = store_with_product("p1", 5).await;
        store
            .customers()
            .insert(&Customer {
                customer_id: "alice@x.com".to_string(),
                name: "Alice Smith".to_string(),
                email: "alice@x.com".to_string(),
                shipping_address: "1 Main St".to_string(),
                password_hash: "abc".to_string(),
                disabled: false,
            })
            .await
            .unwrap();

        let intake = OrderIntake::new(store.clone());
        intake
            .create_order(&IntakeRequest::single("alice@x.com", "p1", 1))
            .await
            .unwrap();

        let customer = store.customers().get("alice@x.com").await.unwrap().unwrap();
        assert_eq!(customer.name, "Alice Smith");
        assert_eq!(customer.password_hash, "abc");
    }

    #[tokio::test]
    async fn test_unknown_products_are_skipped() {
        let store = store_with_product("p1", 5).await;
        let intake = OrderIntake::new(store.clone());

        let request = IntakeRequest {
            customer_id: "alice@x.com".to_string(),
            product_ids: vec!["ghost".to_string(), "p1".to_string()],
            quantities: vec![4, 2],
        };
        let order = intake.create_order(&request).await.unwrap();
        assert_eq!(order.lines.len(), 1);
        assert_eq!(order.lines[0].product_id, "p1");

        // Entirely-unknown requests fail like empty ones.
        let err = intake
            .create_order(&IntakeRequest::single("alice@x.com", "ghost", 1))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("At least one product is required"));
    }
}
