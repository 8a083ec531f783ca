//! # Domain Types
//!
//! Core domain types used throughout Orderflow.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Customer     │   │     Product     │   │      Order      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  customer_id    │   │  product_id     │   │  order_id       │       │
//! │  │  name / email   │   │  price_cents    │   │  customer_id    │       │
//! │  │  password_hash  │   │  quantity       │   │  status         │       │
//! │  │  disabled       │   │  version (CAS)  │   │  lines, history │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   OrderLine     │   │ OrderStatusEvent│   │   OrderStatus   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  product_id     │   │  timestamp      │   │  Queued         │       │
//! │  │  quantity       │   │  status         │   │  Processing     │       │
//! │  │  unit_price     │   │  notes          │   │  Shipped ...    │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity & Partitioning
//! Entities are addressed by `(partition(id), id)` where the partition is the
//! upper-cased first character of the id. Customer ids compare
//! case-insensitively everywhere (they are usually email addresses).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::CoreError;
use crate::money::Money;

// =============================================================================
// Partition Key
// =============================================================================

/// Returns the partition key for an entity id: the upper-cased first character.
///
/// ## Example
/// ```rust
/// use orderflow_core::types::partition_key;
///
/// assert_eq!(partition_key("alice@example.com"), "A");
/// assert_eq!(partition_key("p-100"), "P");
/// ```
pub fn partition_key(id: &str) -> String {
    id.chars()
        .next()
        .map(|c| c.to_uppercase().to_string())
        .unwrap_or_default()
}

/// Generates a new entity id (UUID v4 string).
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Customer
// =============================================================================

/// A customer account.
///
/// Created on first order (auto-provisioned) or via explicit registration.
/// Never hard-deleted; the `disabled` flag soft-disables the account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    /// Globally unique identity. Compared case-insensitively; for registered
    /// customers this is their email address.
    pub customer_id: String,

    /// Display name.
    pub name: String,

    /// Contact email.
    pub email: String,

    /// Shipping address ("Unknown" for auto-provisioned accounts).
    pub shipping_address: String,

    /// One-way password hash (hex SHA-256). Empty means no login configured.
    pub password_hash: String,

    /// Whether the account is disabled.
    pub disabled: bool,
}

impl Customer {
    /// Checks whether this customer can log in at all.
    pub fn has_login(&self) -> bool {
        !self.password_hash.is_empty() && !self.disabled
    }

    /// Case-insensitive identity comparison.
    pub fn is(&self, customer_id: &str) -> bool {
        self.customer_id.eq_ignore_ascii_case(customer_id)
    }
}

// =============================================================================
// Product
// =============================================================================

/// A catalog product with finite stock.
///
/// Reservations go through the store's compare-and-swap on `version` and
/// never oversell. Raw shipment deltas bypass that guard, so `quantity` can
/// dip below zero when deliveries are duplicated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Unique identifier (UUID v4 or a business id).
    pub product_id: String,

    /// Display name shown in validation errors and the catalog.
    pub name: String,

    /// Optional long description.
    pub description: String,

    /// Price in cents (smallest currency unit), always > 0.
    pub price_cents: i64,

    /// Catalog category.
    pub category: String,

    /// Stored image reference, if any.
    pub image_url: Option<String>,

    /// Stored thumbnail reference, if any.
    pub thumbnail_url: Option<String>,

    /// Quantity on hand.
    pub quantity: i64,

    /// Optimistic-concurrency token for stock writes.
    pub version: i64,

    /// When the product was created.
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Checks if the requested quantity can be reserved from current stock.
    pub fn can_reserve(&self, quantity: i64) -> bool {
        quantity > 0 && self.quantity >= quantity
    }
}

// =============================================================================
// Order Status
// =============================================================================

/// The status of an order.
///
/// ## Lifecycle
/// ```text
/// Queued ──► Processing ──► Shipped ──► Completed
///    │            │            │
///    └────────────┴────────────┴──────► Canceled
/// ```
/// `Completed` and `Canceled` are terminal. Any transition not drawn above is
/// invalid and must be rejected without mutating the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    /// Order persisted, waiting for the processor.
    Queued,
    /// Processor has picked the order up.
    Processing,
    /// Fulfillment done; inventory corrections published.
    Shipped,
    /// Closed out via the override path.
    Completed,
    /// Explicitly canceled from any non-terminal state.
    Canceled,
}

impl OrderStatus {
    /// The wire/storage name of this status.
    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Queued => "Queued",
            OrderStatus::Processing => "Processing",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Completed => "Completed",
            OrderStatus::Canceled => "Canceled",
        }
    }

    /// Whether no further transitions are allowed from this status.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Canceled)
    }

    /// Whether moving from `self` to `next` is a valid transition.
    ///
    /// Same-status requests are not transitions; callers treat them as
    /// no-ops before consulting this.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        match (self, next) {
            (Queued, Processing) => true,
            (Processing, Shipped) => true,
            (Shipped, Completed) => true,
            (from, Canceled) => !from.is_terminal(),
            _ => false,
        }
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Queued
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = CoreError;

    /// Parses one of the five vocabulary values. Anything else is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Queued" => Ok(OrderStatus::Queued),
            "Processing" => Ok(OrderStatus::Processing),
            "Shipped" => Ok(OrderStatus::Shipped),
            "Completed" => Ok(OrderStatus::Completed),
            "Canceled" => Ok(OrderStatus::Canceled),
            other => Err(CoreError::InvalidStatusValue(other.to_string())),
        }
    }
}

// =============================================================================
// Order Status Event
// =============================================================================

/// An immutable, timestamped record of a status transition.
///
/// History is append-only: events are never edited or removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderStatusEvent {
    /// When the transition happened (UTC).
    pub timestamp: DateTime<Utc>,

    /// The status the order moved to.
    pub status: OrderStatus,

    /// Operator/processor note ("Order created", "Processing started", ...).
    pub notes: String,
}

impl OrderStatusEvent {
    /// Creates an event stamped with the current time.
    pub fn now(status: OrderStatus, notes: impl Into<String>) -> Self {
        OrderStatusEvent {
            timestamp: Utc::now(),
            status,
            notes: notes.into(),
        }
    }
}

// =============================================================================
// Order Line
// =============================================================================

/// A line item on an order.
///
/// `unit_price_cents` is a value snapshot taken at order time, deliberately
/// decoupled from later catalog price changes. Lines are immutable once the
/// order is persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLine {
    /// The ordered product.
    pub product_id: String,

    /// Quantity ordered, always > 0.
    pub quantity: i64,

    /// Unit price in cents at order time (frozen).
    pub unit_price_cents: i64,
}

impl OrderLine {
    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Line total before any adjustments (unit price × quantity).
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.unit_price_cents * self.quantity)
    }
}

// =============================================================================
// Order
// =============================================================================

/// A customer order with its append-only status history.
///
/// ## Invariants
/// - `history` is never empty and its first event is always `Queued`.
/// - `status` always equals the status of the most recently appended event.
/// - `lines` are immutable after the order is persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Unique identifier (UUID v4).
    pub order_id: String,

    /// Owning customer identity.
    pub customer_id: String,

    /// Creation timestamp (UTC).
    pub created_at: DateTime<Utc>,

    /// Current status; mirror of the last history event.
    pub status: OrderStatus,

    /// Ordered, immutable line items.
    pub lines: Vec<OrderLine>,

    /// Append-only status history.
    pub history: Vec<OrderStatusEvent>,
}

impl Order {
    /// Creates a new order with its validated lines, seeded with the initial
    /// `Queued` history event so the status/history invariant holds from
    /// birth.
    pub fn new(order_id: impl Into<String>, customer_id: impl Into<String>, lines: Vec<OrderLine>) -> Self {
        Order {
            order_id: order_id.into(),
            customer_id: customer_id.into(),
            created_at: Utc::now(),
            status: OrderStatus::Queued,
            lines,
            history: vec![OrderStatusEvent::now(OrderStatus::Queued, "Order created")],
        }
    }

    /// Appends a status event and updates the current status in one step.
    ///
    /// This is the only way the order's status should ever change; it keeps
    /// the status/history invariant intact. Transition validity is the
    /// caller's responsibility (the processor and the override path each
    /// enforce their own rules).
    pub fn push_status(&mut self, event: OrderStatusEvent) {
        self.status = event.status;
        self.history.push(event);
    }

    /// Order total across all lines, in cents.
    pub fn total_cents(&self) -> i64 {
        self.lines
            .iter()
            .map(|l| l.unit_price_cents * l.quantity)
            .sum()
    }

    /// Case-insensitive owner check.
    pub fn belongs_to(&self, customer_id: &str) -> bool {
        self.customer_id.eq_ignore_ascii_case(customer_id)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
