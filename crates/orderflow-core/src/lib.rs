//! # orderflow-core: Pure Business Logic for Orderflow
//!
//! This crate is the **heart** of the order-fulfillment pipeline. It contains
//! all business logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Orderflow Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  orderflow-pipeline                             │   │
//! │  │    OrderIntake ──► OrderProcessor ──► Tracking                  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ orderflow-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │ validation│  │  search   │  │   │
//! │  │   │   Order   │  │   Money   │  │ plan_order│  │  matchers │  │   │
//! │  │   │  Product  │  │           │  │           │  │           │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO QUEUES • PURE FUNCTIONS            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  orderflow-store (Storage Layer)                │   │
//! │  │           SQLite entities, message queue, audit log             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Customer, Product, Order) and the status machine
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`error`] - Domain error types
//! - [`validation`] - Order intake validation (collect-all, not fail-fast)
//! - [`search`] - Tracking search matchers composed by set union
//! - [`auth`] - Principals and the credential-verification capability
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod auth;
pub mod error;
pub mod money;
pub mod search;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use orderflow_core::Order` instead of
// `use orderflow_core::types::Order`

pub use auth::Principal;
pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum quantity accepted on a single order line.
///
/// Input sanity ceiling for typo-scale requests (100000 for 10), checked
/// before the stock comparison: a quantity above it fails `OutOfRange` even
/// when stock would cover it. Raise it in step with the largest stock level
/// the catalog is allowed to carry.
pub const MAX_LINE_QUANTITY: i64 = 1_000_000;

/// Maximum price accepted for a catalog product, in cents.
pub const MAX_PRICE_CENTS: i64 = 100_000_000;
