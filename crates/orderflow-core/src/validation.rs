//! # Intake Validation
//!
//! Pure validation for order intake requests.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   Intake Validation Pipeline                            │
//! │                                                                         │
//! │  IntakeRequest { customer_id, product_ids[], quantities[] }            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  1. customer_id non-empty?                                             │
//! │  2. at least one product? parallel lengths match?                      │
//! │  3. per line:                                                          │
//! │     ├── unknown product  → silently skipped (not an error)            │
//! │     ├── quantity <= 0    → error collected                            │
//! │     └── quantity > stock → error collected (names the product)        │
//! │  4. zero accepted lines? → fails like an empty request                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Ok(Vec<OrderLine>)  or  Err(ALL collected errors)                     │
//! │                                                                         │
//! │  COLLECT-ALL: every failure is gathered and returned together, the     │
//! │  caller sees the full picture in one response.                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The product lookup itself is I/O and lives in the pipeline crate; this
//! module only sees the already-resolved products, keeping it pure.

use crate::error::ValidationError;
use crate::types::{OrderLine, Product};
use crate::MAX_LINE_QUANTITY;

/// An order intake request as posted by the caller.
///
/// Products and quantities arrive as parallel lists (index i of one pairs
/// with index i of the other), mirroring the submitting form.
#[derive(Debug, Clone, Default)]
pub struct IntakeRequest {
    /// The ordering customer's identity.
    pub customer_id: String,

    /// Requested product ids, parallel to `quantities`.
    pub product_ids: Vec<String>,

    /// Requested quantities, parallel to `product_ids`.
    pub quantities: Vec<i64>,
}

impl IntakeRequest {
    /// Convenience constructor for a single-line request.
    pub fn single(customer_id: impl Into<String>, product_id: impl Into<String>, qty: i64) -> Self {
        IntakeRequest {
            customer_id: customer_id.into(),
            product_ids: vec![product_id.into()],
            quantities: vec![qty],
        }
    }
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, Vec<ValidationError>>;

/// Plans the accepted order lines for an intake request.
///
/// `resolved` is parallel to `request.product_ids`: `None` marks a product id
/// that does not exist in the catalog. Unknown products are skipped silently -
/// they are not errors, but they also never appear in the final order.
///
/// ## Returns
/// * `Ok(lines)` - the lines to persist, with unit prices snapshotted
/// * `Err(errors)` - every validation failure found, collected
pub fn plan_order(
    request: &IntakeRequest,
    resolved: &[Option<Product>],
) -> ValidationResult<Vec<OrderLine>> {
    let mut errors = Vec::new();

    if request.customer_id.trim().is_empty() {
        errors.push(ValidationError::Required {
            field: "customerId".to_string(),
        });
    }

    if request.product_ids.is_empty() {
        errors.push(ValidationError::NoProducts);
    }

    let lengths_match = request.product_ids.len() == request.quantities.len();
    if !request.product_ids.is_empty() && !lengths_match {
        errors.push(ValidationError::LengthMismatch {
            products: request.product_ids.len(),
            quantities: request.quantities.len(),
        });
    }

    // Lines can only be paired up when the parallel lists agree in length.
    let mut accepted = Vec::new();
    if lengths_match {
        for (i, product) in resolved.iter().enumerate() {
            let Some(product) = product else {
                // Unknown product id: skipped, not an error.
                continue;
            };
            let qty = request.quantities[i];

            if qty <= 0 {
                errors.push(ValidationError::MustBePositive {
                    field: "quantity".to_string(),
                });
                continue;
            }
            if qty > MAX_LINE_QUANTITY {
                errors.push(ValidationError::OutOfRange {
                    field: "quantity".to_string(),
                    min: 1,
                    max: MAX_LINE_QUANTITY,
                });
                continue;
            }
            if qty > product.quantity {
                errors.push(ValidationError::InsufficientStock {
                    product_id: product.product_id.clone(),
                    name: product.name.clone(),
                    available: product.quantity,
                    requested: qty,
                });
                continue;
            }

            accepted.push(OrderLine {
                product_id: product.product_id.clone(),
                quantity: qty,
                unit_price_cents: product.price_cents,
            });
        }
    }

    // All lines filtered away (e.g. every product id was unknown): the
    // request fails exactly as if no products were supplied.
    if errors.is_empty() && accepted.is_empty() {
        errors.push(ValidationError::NoProducts);
    }

    if errors.is_empty() {
        Ok(accepted)
    } else {
        Err(errors)
    }
}

/// Validates a registration request (explicit customer sign-up).
///
/// ## Rules
/// - customer id required, must look like an email address
/// - display name required
/// - password required
pub fn validate_registration(
    customer_id: &str,
    name: &str,
    password: &str,
) -> ValidationResult<()> {
    let mut errors = Vec::new();

    let id = customer_id.trim();
    if id.is_empty() {
        errors.push(ValidationError::Required {
            field: "customerId".to_string(),
        });
    } else if !id.contains('@') || id.starts_with('@') || id.ends_with('@') {
        errors.push(ValidationError::InvalidFormat {
            field: "customerId".to_string(),
            reason: "must be an email address".to_string(),
        });
    }

    if name.trim().is_empty() {
        errors.push(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if password.is_empty() {
        errors.push(ValidationError::Required {
            field: "password".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn product(id: &str, name: &str, price_cents: i64, quantity: i64) -> Product {
        Product {
            product_id: id.to_string(),
            name: name.to_string(),
            description: String::new(),
            price_cents,
            category: "test".to_string(),
            image_url: None,
            thumbnail_url: None,
            quantity,
            version: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_happy_path_snapshots_price() {
        let request = IntakeRequest::single("a@x.com", "P1", 3);
        let resolved = vec![Some(product("P1", "Widget", 499, 5))];

        let lines = plan_order(&request, &resolved).unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].product_id, "P1");
        assert_eq!(lines[0].quantity, 3);
        assert_eq!(lines[0].unit_price_cents, 499);
    }

    #[test]
    fn test_empty_customer_and_no_products_collected_together() {
        let request = IntakeRequest {
            customer_id: "  ".to_string(),
            product_ids: vec![],
            quantities: vec![],
        };
        let errors = plan_order(&request, &[]).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(matches!(errors[0], ValidationError::Required { .. }));
        assert!(matches!(errors[1], ValidationError::NoProducts));
    }

    #[test]
    fn test_length_mismatch() {
        let request = IntakeRequest {
            customer_id: "a@x.com".to_string(),
            product_ids: vec!["P1".to_string(), "P2".to_string()],
            quantities: vec![1],
        };
        let resolved = vec![Some(product("P1", "Widget", 100, 5)), None];
        let errors = plan_order(&request, &resolved).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::LengthMismatch { .. })));
    }

    #[test]
    fn test_unknown_product_silently_skipped() {
        let request = IntakeRequest {
            customer_id: "a@x.com".to_string(),
            product_ids: vec!["GHOST".to_string(), "P1".to_string()],
            quantities: vec![2, 1],
        };
        let resolved = vec![None, Some(product("P1", "Widget", 100, 5))];

        let lines = plan_order(&request, &resolved).unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].product_id, "P1");
    }

    #[test]
    fn test_all_unknown_products_fails_like_empty() {
        let request = IntakeRequest::single("a@x.com", "GHOST", 2);
        let errors = plan_order(&request, &[None]).unwrap_err();
        assert_eq!(errors, vec![ValidationError::NoProducts]);
    }

    #[test]
    fn test_insufficient_stock_reports_name_and_available() {
        let request = IntakeRequest::single("a@x.com", "P1", 10);
        let resolved = vec![Some(product("P1", "Widget", 100, 5))];

        let errors = plan_order(&request, &resolved).unwrap_err();
        assert_eq!(errors.len(), 1);
        match &errors[0] {
            ValidationError::InsufficientStock {
                name,
                available,
                requested,
                ..
            } => {
                assert_eq!(name, "Widget");
                assert_eq!(*available, 5);
                assert_eq!(*requested, 10);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_zero_and_negative_quantities_rejected() {
        let request = IntakeRequest {
            customer_id: "a@x.com".to_string(),
            product_ids: vec!["P1".to_string(), "P2".to_string()],
            quantities: vec![0, -3],
        };
        let resolved = vec![
            Some(product("P1", "Widget", 100, 5)),
            Some(product("P2", "Gadget", 200, 5)),
        ];
        let errors = plan_order(&request, &resolved).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors
            .iter()
            .all(|e| matches!(e, ValidationError::MustBePositive { .. })));
    }

    #[test]
    fn test_mixed_good_and_bad_lines_fails_with_errors_only() {
        // One valid line, one over-stock line: the request as a whole fails.
        let request = IntakeRequest {
            customer_id: "a@x.com".to_string(),
            product_ids: vec!["P1".to_string(), "P2".to_string()],
            quantities: vec![1, 99],
        };
        let resolved = vec![
            Some(product("P1", "Widget", 100, 5)),
            Some(product("P2", "Gadget", 200, 5)),
        ];
        let errors = plan_order(&request, &resolved).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            errors[0],
            ValidationError::InsufficientStock { .. }
        ));
    }

    #[test]
    fn test_validate_registration() {
        assert!(validate_registration("a@x.com", "Alice", "secret").is_ok());

        let errors = validate_registration("not-an-email", "", "").unwrap_err();
        assert_eq!(errors.len(), 3);
    }
}
