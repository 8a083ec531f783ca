//! # orderflow-store: Storage Layer for Orderflow
//!
//! This crate provides persistence for the order-fulfillment pipeline.
//! It uses SQLite for durable storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Orderflow Data Flow                               │
//! │                                                                         │
//! │  Pipeline component (intake / processor / tracking)                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 orderflow-store (THIS CRATE)                    │   │
//! │  │                                                                 │   │
//! │  │   ┌────────────┐  ┌──────────────┐  ┌─────────┐  ┌──────────┐ │   │
//! │  │   │   Store    │  │ Repositories │  │  Queue  │  │  Audit   │ │   │
//! │  │   │ (pool.rs)  │  │ (entity/*)   │  │(queue.rs)│ │(audit.rs)│ │   │
//! │  │   │            │  │              │  │         │  │          │ │   │
//! │  │   │ SqlitePool │◄─│ CustomerRepo │  │ enqueue │  │ capped   │ │   │
//! │  │   │ Migrations │  │ ProductRepo  │  │ dequeue │  │ daily    │ │   │
//! │  │   │            │  │ OrderRepo    │  │ ack/nack│  │ sink     │ │   │
//! │  │   └────────────┘  └──────────────┘  └─────────┘  └──────────┘ │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database (single file, WAL mode)                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Storage error types
//! - [`entity`] - Entity repositories (customer, product, order)
//! - [`queue`] - Durable message queue with visibility leases
//! - [`audit`] - Best-effort capped audit log sink
//!
//! ## Usage
//!
//! ```rust,ignore
//! use orderflow_store::{Store, StoreConfig};
//!
//! let store = Store::new(StoreConfig::new("./orderflow.db")).await?;
//!
//! let reserved = store.products().reserve_stock("p1", 3).await?;
//! store.queue().enqueue(orderflow_store::NEW_ORDERS_QUEUE, &payload).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod audit;
pub mod entity;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod queue;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{StoreError, StoreResult};
pub use pool::{Store, StoreConfig};

// Repository re-exports for convenience
pub use audit::AuditLog;
pub use entity::customer::CustomerRepository;
pub use entity::order::OrderRepository;
pub use entity::product::ProductRepository;
pub use queue::{MessageQueue, QueueMessage, DEFAULT_LEASE, INVENTORY_UPDATES_QUEUE, NEW_ORDERS_QUEUE};
