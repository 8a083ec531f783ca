//! # orderflow-pipeline: Order Fulfillment Machinery
//!
//! This crate wires intake, the durable queue, and the background processor
//! into the asynchronous order-fulfillment pipeline.
//!
//! ## Pipeline Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Orderflow Pipeline                                 │
//! │                                                                         │
//! │  IntakeRequest                                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌───────────┐  reserve   ┌──────────────────┐                         │
//! │  │OrderIntake│───────────►│   product table  │                         │
//! │  │           │  persist   ├──────────────────┤                         │
//! │  │           │───────────►│   order table    │                         │
//! │  └─────┬─────┘            └──────────────────┘                         │
//! │        │ enqueue (base64 JSON)                                         │
//! │        ▼                                                                │
//! │  ┌──────────────┐  poll   ┌────────────────┐  Queued → Processing     │
//! │  │ "new-orders" │────────►│ OrderProcessor │        → Shipped         │
//! │  │    queue     │         │   (worker)     │  + stock deltas          │
//! │  └──────────────┘         └───────┬────────┘                           │
//! │                                   │ "inventory-updates"                │
//! │                                   ▼                                    │
//! │                           (same worker applies deltas)                 │
//! │                                                                         │
//! │  OrderTracking: queries + admin overrides (Shipped → Completed,        │
//! │                 Canceled from any non-terminal status)                 │
//! │  Registration:  sign-up and login verification                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`intake`] - Order intake (validate, provision, reserve, enqueue)
//! - [`processor`] - Background worker and the fulfillment-delay seam
//! - [`tracking`] - Status queries and manual overrides
//! - [`registration`] - Sign-up and credential verification
//! - [`messages`] - Wire contracts and base64 JSON transport encoding
//! - [`config`] - Processor tunables and the admin credential
//! - [`error`] - Pipeline error types and retry classification
//!
//! ## Usage
//!
//! ```rust,ignore
//! use orderflow_pipeline::{OrderIntake, OrderProcessor, ProcessorConfig};
//! use orderflow_store::{Store, StoreConfig};
//!
//! let store = Store::new(StoreConfig::new("./orderflow.db")).await?;
//!
//! let (processor, handle) = OrderProcessor::new(store.clone(), ProcessorConfig::default());
//! tokio::spawn(processor.run());
//!
//! let intake = OrderIntake::new(store);
//! let order = intake.create_order(&request).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod intake;
pub mod messages;
pub mod processor;
pub mod registration;
pub mod tracking;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{AdminCredential, ProcessorConfig};
pub use error::{PipelineError, PipelineResult};
pub use intake::OrderIntake;
pub use messages::{InventoryUpdateMessage, NewOrderMessage};
pub use processor::{
    FulfillmentDelay, NoDelay, OrderProcessor, OrderProcessorHandle, SimulatedDelay,
};
pub use registration::{Registration, StoreCredentialVerifier};
pub use tracking::OrderTracking;
