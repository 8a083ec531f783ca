//! # Error Types
//!
//! Domain-specific error types for orderflow-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  orderflow-core errors (this file)                                     │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures (collected)          │
//! │                                                                         │
//! │  orderflow-store errors (separate crate)                               │
//! │  └── StoreError       - Storage operation failures                     │
//! │                                                                         │
//! │  orderflow-pipeline errors (separate crate)                            │
//! │  └── PipelineError    - Intake/processor failures                      │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → PipelineError → caller            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product name, available count, etc.)
//! 3. Errors are enum variants, never String
//! 4. Intake validation COLLECTS errors instead of failing fast

use thiserror::Error;

use crate::types::OrderStatus;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations. They are reported to the
/// caller and never mutate any state.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product cannot be found in the catalog.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Order cannot be found.
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// Customer cannot be found.
    #[error("Customer not found: {0}")]
    CustomerNotFound(String),

    /// A requested status string is not in the five-value vocabulary.
    ///
    /// ## When This Occurs
    /// - An override request carries e.g. "Delivered"
    /// - A stored/wire status string was corrupted
    #[error("Invalid status value: {0}")]
    InvalidStatusValue(String),

    /// A status transition outside the state machine was requested.
    ///
    /// ```text
    /// Queued ──► Processing ──► Shipped ──► Completed
    ///    └─────────┴──────────────┴────► Canceled (non-terminal only)
    /// ```
    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    /// The caller's principal does not permit the operation.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Validation failed; every collected field error is included.
    #[error("Validation failed: {}", format_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn format_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

// =============================================================================
// Validation Error
// =============================================================================

/// A single intake validation failure.
///
/// Intake collects ALL failures for a request and returns them together
/// (`CoreError::Validation`), so the caller sees every problem at once.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// The order carried no usable product lines.
    #[error("At least one product is required")]
    NoProducts,

    /// Parallel product/quantity lists have different lengths.
    #[error("Product and quantity counts must match ({products} products, {quantities} quantities)")]
    LengthMismatch { products: usize, quantities: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Requested quantity exceeds current stock. Reported per product with
    /// the display name and the available count.
    #[error("Insufficient stock for product {name}. Available: {available}")]
    InsufficientStock {
        product_id: String,
        name: String,
        available: i64,
        requested: i64,
    },

    /// Invalid format (e.g. a non-email registration id).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g. registering an existing customer id).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_stock_message_names_product() {
        let err = ValidationError::InsufficientStock {
            product_id: "p1".to_string(),
            name: "Espresso Beans 1kg".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for product Espresso Beans 1kg. Available: 3"
        );
    }

    #[test]
    fn test_validation_errors_join() {
        let err = CoreError::Validation(vec![
            ValidationError::Required {
                field: "customerId".to_string(),
            },
            ValidationError::NoProducts,
        ]);
        let msg = err.to_string();
        assert!(msg.contains("customerId is required"));
        assert!(msg.contains("At least one product is required"));
    }

    #[test]
    fn test_invalid_transition_message() {
        let err = CoreError::InvalidTransition {
            from: OrderStatus::Shipped,
            to: OrderStatus::Processing,
        };
        assert_eq!(
            err.to_string(),
            "Invalid status transition: Shipped -> Processing"
        );
    }
}
