//! # Pipeline Configuration
//!
//! Tunables for the processor worker and login verification.
//!
//! ## Defaults
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Processor Defaults                                  │
//! │                                                                         │
//! │  poll_interval            1s     queue poll cadence when idle           │
//! │  lease                    30s    visibility lease per claimed message   │
//! │  max_attempts             5      deliveries before a message is dropped │
//! │  fulfillment_delay        500ms  simulated picking/packing time         │
//! │  publish_inventory_on_ship true  emit stock deltas at shipment          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `publish_inventory_on_ship` is on by default: intake already decrements
//! stock at reservation time, so shipment deltas decrement it a second time
//! once consumed. Operators who want reservation-only accounting turn the
//! flag off.

use std::time::Duration;

use orderflow_core::auth::hash_password;

// =============================================================================
// Processor Configuration
// =============================================================================

/// Configuration for the order processor worker.
#[derive(Debug, Clone)]
pub struct ProcessorConfig {
    /// How often the worker polls the queues when idle.
    /// Default: 1 second
    pub poll_interval: Duration,

    /// Visibility lease for claimed messages.
    /// Default: 30 seconds
    pub lease: Duration,

    /// Deliveries after which a message is dropped as poison.
    /// Default: 5
    pub max_attempts: i64,

    /// Simulated picking/packing time between Processing and Shipped.
    /// Default: 500 milliseconds
    pub fulfillment_delay: Duration,

    /// Whether shipment publishes per-line stock deltas to the
    /// inventory-updates queue.
    /// Default: true
    pub publish_inventory_on_ship: bool,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        ProcessorConfig {
            poll_interval: Duration::from_secs(1),
            lease: Duration::from_secs(30),
            max_attempts: 5,
            fulfillment_delay: Duration::from_millis(500),
            publish_inventory_on_ship: true,
        }
    }
}

impl ProcessorConfig {
    /// Sets the idle poll interval.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the message visibility lease.
    pub fn lease(mut self, lease: Duration) -> Self {
        self.lease = lease;
        self
    }

    /// Sets the poison-message delivery cap.
    pub fn max_attempts(mut self, attempts: i64) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Sets the simulated fulfillment delay.
    pub fn fulfillment_delay(mut self, delay: Duration) -> Self {
        self.fulfillment_delay = delay;
        self
    }

    /// Sets whether shipment publishes inventory deltas.
    pub fn publish_inventory_on_ship(mut self, publish: bool) -> Self {
        self.publish_inventory_on_ship = publish;
        self
    }
}

// =============================================================================
// Admin Credential
// =============================================================================

/// The operations login accepted by the credential verifier.
///
/// The password is stored hashed; the plaintext never outlives construction.
#[derive(Debug, Clone)]
pub struct AdminCredential {
    /// Login id for the operations account (compared case-insensitively).
    pub login_id: String,

    /// Hex SHA-256 of the admin password.
    pub password_hash: String,
}

impl AdminCredential {
    /// Builds an admin credential from a plaintext password.
    pub fn new(login_id: impl Into<String>, password: &str) -> Self {
        AdminCredential {
            login_id: login_id.into(),
            password_hash: hash_password(password),
        }
    }

    /// Builds an admin credential from an already-hashed password.
    pub fn with_hash(login_id: impl Into<String>, password_hash: impl Into<String>) -> Self {
        AdminCredential {
            login_id: login_id.into(),
            password_hash: password_hash.into(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ProcessorConfig::default();
        assert_eq!(config.poll_interval, Duration::from_secs(1));
        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.fulfillment_delay, Duration::from_millis(500));
        assert!(config.publish_inventory_on_ship);
    }

    #[test]
    fn test_builder() {
        let config = ProcessorConfig::default()
            .poll_interval(Duration::from_millis(10))
            .max_attempts(2)
            .publish_inventory_on_ship(false);

        assert_eq!(config.poll_interval, Duration::from_millis(10));
        assert_eq!(config.max_attempts, 2);
        assert!(!config.publish_inventory_on_ship);
    }
}
