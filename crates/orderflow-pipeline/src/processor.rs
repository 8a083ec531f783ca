//! # Order Processor
//!
//! Background worker that drives queued orders to shipment.
//!
//! ## Processing Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Order Processor Flow                               │
//! │                                                                         │
//! │  ┌──────────────┐   poll    ┌──────────────────────────────────────┐   │
//! │  │ "new-orders" │──────────►│            OrderProcessor            │   │
//! │  │    queue     │           │                                      │   │
//! │  └──────────────┘           │  1. decode NewOrderMessage           │   │
//! │                             │  2. load order                       │   │
//! │                             │  3. Queued → Processing              │   │
//! │                             │     ("Processing started")           │   │
//! │                             │  4. fulfillment delay                │   │
//! │                             │  5. Processing → Shipped             │   │
//! │                             │     ("Order shipped")                │   │
//! │                             │  6. publish stock deltas ────────┐   │   │
//! │                             │  7. ack                          │   │   │
//! │                             └──────────────────────────────────┼───┘   │
//! │                                                                ▼       │
//! │  ┌─────────────────────┐   poll   ┌───────────────────────────────┐   │
//! │  │ "inventory-updates" │─────────►│  decode, apply delta, ack     │   │
//! │  │       queue         │          └───────────────────────────────┘   │
//! │  └─────────────────────┘                                               │
//! │                                                                         │
//! │  FAILURE HANDLING:                                                     │
//! │  • transient error → nack (redelivered) until max_attempts             │
//! │  • poison (bad payload, missing entity) → dropped with an audit line  │
//! │  • redelivery of a half-processed order resumes where it left off;    │
//! │    a redelivery after Shipped is acked without touching the order     │
//! │                                                                         │
//! │  NOT IDEMPOTENT: a redelivery that resumes from Processing publishes   │
//! │  its stock deltas again. Combined with intake's up-front reservation,  │
//! │  consumed deltas decrement stock a second time.                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::config::ProcessorConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::messages::{decode, encode, InventoryUpdateMessage, NewOrderMessage};
use orderflow_core::types::{Order, OrderStatus, OrderStatusEvent};
use orderflow_store::queue::QueueMessage;
use orderflow_store::{Store, StoreError, INVENTORY_UPDATES_QUEUE, NEW_ORDERS_QUEUE};

// =============================================================================
// Fulfillment Delay
// =============================================================================

/// The pause between accepting an order and shipping it.
///
/// Behind a trait so deployments can plug in real fulfillment signals and
/// tests can skip the wait entirely.
#[async_trait]
pub trait FulfillmentDelay: Send + Sync {
    async fn wait(&self);
}

/// Fixed-length simulated fulfillment (picking/packing) time.
#[derive(Debug, Clone)]
pub struct SimulatedDelay {
    delay: Duration,
}

impl SimulatedDelay {
    pub fn new(delay: Duration) -> Self {
        SimulatedDelay { delay }
    }
}

#[async_trait]
impl FulfillmentDelay for SimulatedDelay {
    async fn wait(&self) {
        tokio::time::sleep(self.delay).await;
    }
}

/// Ships immediately, with no pause.
#[derive(Debug, Clone, Default)]
pub struct NoDelay;

#[async_trait]
impl FulfillmentDelay for NoDelay {
    async fn wait(&self) {}
}

// =============================================================================
// Processor
// =============================================================================

/// Background worker consuming the order and inventory queues.
pub struct OrderProcessor {
    /// Storage handle.
    store: Store,

    /// Worker tunables.
    config: ProcessorConfig,

    /// Pluggable fulfillment pause.
    delay: Arc<dyn FulfillmentDelay>,

    /// Shutdown receiver.
    shutdown_rx: mpsc::Receiver<()>,
}

/// Handle for controlling a running processor.
#[derive(Clone)]
pub struct OrderProcessorHandle {
    shutdown_tx: mpsc::Sender<()>,
}

impl OrderProcessorHandle {
    /// Triggers graceful shutdown. The worker finishes the message in
    /// flight, then stops.
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(()).await;
    }
}

impl OrderProcessor {
    /// Creates a new processor and its control handle.
    ///
    /// The fulfillment pause is a [`SimulatedDelay`] of the configured
    /// `fulfillment_delay`; use [`OrderProcessor::with_delay`] to plug in a
    /// different strategy.
    pub fn new(store: Store, config: ProcessorConfig) -> (Self, OrderProcessorHandle) {
        let delay = Arc::new(SimulatedDelay::new(config.fulfillment_delay));
        Self::with_delay(store, config, delay)
    }

    /// Creates a processor with a custom fulfillment pause.
    pub fn with_delay(
        store: Store,
        config: ProcessorConfig,
        delay: Arc<dyn FulfillmentDelay>,
    ) -> (Self, OrderProcessorHandle) {
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let processor = OrderProcessor {
            store,
            config,
            delay,
            shutdown_rx,
        };

        (processor, OrderProcessorHandle { shutdown_tx })
    }

    /// Runs the processor loop.
    ///
    /// This should be spawned as a background task.
    pub async fn run(mut self) {
        info!("Order processor starting");

        let mut interval = tokio::time::interval(self.config.poll_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let handled = self.drain().await;
                    if handled > 0 {
                        debug!(handled, "Drained queues");
                    }
                }

                _ = self.shutdown_rx.recv() => {
                    info!("Order processor shutting down");
                    break;
                }
            }
        }

        info!("Order processor stopped");
    }

    /// Processes messages until both queues are empty.
    ///
    /// ## Returns
    /// Number of messages settled (acked or dropped).
    pub async fn drain(&self) -> usize {
        let mut handled = 0;

        loop {
            match self.poll_once().await {
                Ok(true) => handled += 1,
                Ok(false) => break,
                Err(e) => {
                    error!(error = %e, "Queue poll failed");
                    break;
                }
            }
        }

        handled
    }

    /// Claims and settles at most one message across both queues.
    ///
    /// New orders take priority so freshly published inventory deltas are
    /// consumed in the same drain.
    async fn poll_once(&self) -> PipelineResult<bool> {
        let queue = self.store.queue();

        if let Some(msg) = queue.dequeue(NEW_ORDERS_QUEUE, self.config.lease).await? {
            let outcome = self.handle_new_order(&msg).await;
            self.settle(&msg, outcome).await?;
            return Ok(true);
        }

        if let Some(msg) = queue
            .dequeue(INVENTORY_UPDATES_QUEUE, self.config.lease)
            .await?
        {
            let outcome = self.handle_inventory_update(&msg).await;
            self.settle(&msg, outcome).await?;
            return Ok(true);
        }

        Ok(false)
    }

    /// Acks, nacks, or drops a message based on the handler outcome.
    async fn settle(&self, msg: &QueueMessage, outcome: PipelineResult<()>) -> PipelineResult<()> {
        match outcome {
            Ok(()) => self.store.queue().ack(msg.id).await?,

            Err(e) if e.is_retryable() && msg.attempts < self.config.max_attempts => {
                warn!(
                    queue = %msg.queue,
                    id = msg.id,
                    attempts = msg.attempts,
                    error = %e,
                    "Message failed, returning for redelivery"
                );
                self.store.queue().nack(msg.id).await?;
            }

            Err(e) => {
                error!(
                    queue = %msg.queue,
                    id = msg.id,
                    attempts = msg.attempts,
                    error = %e,
                    "Dropping message"
                );
                self.store
                    .audit_log()
                    .error(&format!(
                        "Dropped message {} from {}: {}",
                        msg.id, msg.queue, e
                    ))
                    .await;
                self.store.queue().ack(msg.id).await?;
            }
        }
        Ok(())
    }

    /// Drives one order from its current status to Shipped.
    async fn handle_new_order(&self, msg: &QueueMessage) -> PipelineResult<()> {
        let wire: NewOrderMessage = decode(&msg.payload)?;

        let mut order = self
            .store
            .orders()
            .get(&wire.order_id)
            .await?
            .ok_or_else(|| {
                PipelineError::Store(StoreError::not_found("Order", &wire.order_id))
            })?;

        match order.status {
            OrderStatus::Queued => {
                order.push_status(OrderStatusEvent::now(
                    OrderStatus::Processing,
                    "Processing started",
                ));
                self.store.orders().upsert(&order).await?;
                debug!(order = %order.order_id, "Processing started");

                self.delay.wait().await;
                self.ship(&mut order).await?;
            }

            // Redelivery after a crash between the two persists: resume.
            OrderStatus::Processing => {
                debug!(order = %order.order_id, "Resuming half-processed order");
                self.delay.wait().await;
                self.ship(&mut order).await?;
            }

            // Redelivery of an order that already made it through.
            _ => {
                debug!(
                    order = %order.order_id,
                    status = %order.status,
                    "Order already settled, acking redelivery"
                );
            }
        }

        Ok(())
    }

    /// Marks an order Shipped and publishes its stock deltas.
    async fn ship(&self, order: &mut Order) -> PipelineResult<()> {
        order.push_status(OrderStatusEvent::now(OrderStatus::Shipped, "Order shipped"));
        self.store.orders().upsert(order).await?;

        if self.config.publish_inventory_on_ship {
            for line in &order.lines {
                let delta = InventoryUpdateMessage {
                    product_id: line.product_id.clone(),
                    quantity_delta: -line.quantity,
                };
                let payload = encode(&delta)?;
                self.store
                    .queue()
                    .enqueue(INVENTORY_UPDATES_QUEUE, &payload)
                    .await?;
            }
        }

        info!(order = %order.order_id, "Order shipped");
        self.store
            .audit_log()
            .info(&format!("Order {} shipped", order.order_id))
            .await;

        Ok(())
    }

    /// Applies one stock delta.
    async fn handle_inventory_update(&self, msg: &QueueMessage) -> PipelineResult<()> {
        let wire: InventoryUpdateMessage = decode(&msg.payload)?;

        self.store
            .products()
            .adjust_quantity(&wire.product_id, wire.quantity_delta)
            .await?;

        debug!(
            product = %wire.product_id,
            delta = wire.quantity_delta,
            "Inventory delta applied"
        );
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
