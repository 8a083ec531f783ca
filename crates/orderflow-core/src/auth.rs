//! # Principals and Credentials
//!
//! Who is acting, and how passwords are checked.
//!
//! ## Authorization Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Principals                                     │
//! │                                                                         │
//! │  Principal::SystemAdmin                                                 │
//! │    • sees every order                                                   │
//! │    • may override order status                                          │
//! │                                                                         │
//! │  Principal::Customer { customer_id }                                    │
//! │    • sees only their own orders                                         │
//! │    • may NOT override status                                            │
//! │                                                                         │
//! │  Callers construct the principal; nothing in this crate reads a        │
//! │  session, header, or config. Verification of credentials is behind     │
//! │  the CredentialVerifier trait so policies are injectable.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Password hashes are hex-encoded SHA-256 of the UTF-8 password. An empty
//! password hashes to the empty string, and hex comparison ignores case, so
//! hashes produced by older tooling with upper-case hex still verify.

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use crate::types::Order;

// =============================================================================
// Principal
// =============================================================================

/// The identity on whose behalf an operation runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    /// Operations staff. Full visibility, may override status.
    SystemAdmin,

    /// A storefront customer, scoped to their own orders.
    Customer { customer_id: String },
}

impl Principal {
    /// Whether this principal may see the given order.
    pub fn may_view(&self, order: &Order) -> bool {
        match self {
            Principal::SystemAdmin => true,
            Principal::Customer { customer_id } => order.belongs_to(customer_id),
        }
    }

    /// Whether this principal may force an order status override.
    pub fn may_override_status(&self) -> bool {
        matches!(self, Principal::SystemAdmin)
    }

    /// The customer id this principal is scoped to, if any.
    pub fn customer_scope(&self) -> Option<&str> {
        match self {
            Principal::SystemAdmin => None,
            Principal::Customer { customer_id } => Some(customer_id),
        }
    }
}

// =============================================================================
// Password Hashing
// =============================================================================

/// Hashes a password to lower-case hex SHA-256.
///
/// The empty password maps to the empty string, which marks an account that
/// has no login (auto-provisioned customers).
pub fn hash_password(password: &str) -> String {
    if password.is_empty() {
        return String::new();
    }
    let digest = Sha256::digest(password.as_bytes());
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}

/// Verifies a password against a stored hash.
///
/// Hex comparison is case-insensitive. An empty stored hash never verifies:
/// accounts without a password cannot log in.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    if stored_hash.is_empty() {
        return false;
    }
    hash_password(password).eq_ignore_ascii_case(stored_hash)
}

// =============================================================================
// Credential Verification
// =============================================================================

/// Verifies login credentials and produces a principal.
///
/// Implementations decide where admin credentials live (config, env, a
/// directory) and how customer records are looked up. Returning `None` means
/// the credentials do not match any account.
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    async fn verify(&self, login_id: &str, password: &str) -> Option<Principal>;
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Order, OrderLine};

    fn order_for(customer_id: &str) -> Order {
        Order::new(
            "o1".to_string(),
            customer_id.to_string(),
            vec![OrderLine {
                product_id: "p1".to_string(),
                quantity: 1,
                unit_price_cents: 100,
            }],
        )
    }

    #[test]
    fn test_hash_is_lowercase_sha256_hex() {
        // SHA-256("password")
        assert_eq!(
            hash_password("password"),
            "5e884898da28047151d0e56f8dc6292773603d0d6aabbdd62a11ef721d1542d8"
        );
    }

    #[test]
    fn test_empty_password_hashes_to_empty() {
        assert_eq!(hash_password(""), "");
    }

    #[test]
    fn test_verify_ignores_hex_case() {
        let upper = hash_password("password").to_uppercase();
        assert!(verify_password("password", &upper));
        assert!(!verify_password("wrong", &upper));
    }

    #[test]
    fn test_empty_stored_hash_never_verifies() {
        assert!(!verify_password("", ""));
        assert!(!verify_password("anything", ""));
    }

    #[test]
    fn test_admin_sees_everything() {
        let order = order_for("alice@x.com");
        assert!(Principal::SystemAdmin.may_view(&order));
        assert!(Principal::SystemAdmin.may_override_status());
    }

    #[test]
    fn test_customer_scoped_to_own_orders() {
        let order = order_for("alice@x.com");
        let alice = Principal::Customer {
            customer_id: "Alice@X.com".to_string(),
        };
        let bob = Principal::Customer {
            customer_id: "bob@x.com".to_string(),
        };
        assert!(alice.may_view(&order));
        assert!(!bob.may_view(&order));
        assert!(!alice.may_override_status());
    }
}
