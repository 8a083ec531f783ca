//! # Registration and Login
//!
//! Explicit customer sign-up and credential verification.
//!
//! ## Account Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Customer Account States                            │
//! │                                                                         │
//! │  (none) ──register──────────────────► registered (has login)           │
//! │     │                                      ▲                            │
//! │     └──first order (auto-provision)──► placeholder (no login)          │
//! │                                            │                            │
//! │                                        register upgrades in place       │
//! │                                                                         │
//! │  Registering an id that already has a login is a duplicate error.      │
//! │  Registering over a placeholder keeps its order history and adds       │
//! │  the profile and credentials.                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Login verification is behind [`CredentialVerifier`]; the store-backed
//! implementation also accepts one configured operations login and maps it
//! to [`Principal::SystemAdmin`].

use async_trait::async_trait;
use tracing::{debug, info};

use crate::config::AdminCredential;
use crate::error::PipelineResult;
use orderflow_core::auth::{hash_password, verify_password, CredentialVerifier, Principal};
use orderflow_core::error::ValidationError;
use orderflow_core::types::Customer;
use orderflow_core::validation::validate_registration;
use orderflow_core::CoreError;
use orderflow_store::Store;

// =============================================================================
// Registration
// =============================================================================

/// Customer sign-up service.
#[derive(Debug, Clone)]
pub struct Registration {
    store: Store,
}

impl Registration {
    /// Creates a new registration service over a store.
    pub fn new(store: Store) -> Self {
        Registration { store }
    }

    /// Registers a customer account.
    ///
    /// ## Returns
    /// * `Ok(Customer)` - The stored account with credentials set
    /// * `Err(CoreError::Validation)` - Field errors, or the id already has
    ///   a login
    pub async fn register(
        &self,
        customer_id: &str,
        name: &str,
        password: &str,
        shipping_address: Option<&str>,
    ) -> PipelineResult<Customer> {
        if let Err(errors) = validate_registration(customer_id, name, password) {
            return Err(CoreError::Validation(errors).into());
        }

        let customer_id = customer_id.trim();
        let existing = self.store.customers().get(customer_id).await?;

        if let Some(existing) = &existing {
            if existing.has_login() {
                return Err(CoreError::Validation(vec![ValidationError::Duplicate {
                    field: "customerId".to_string(),
                    value: customer_id.to_string(),
                }])
                .into());
            }
        }

        let customer = Customer {
            customer_id: customer_id.to_string(),
            name: name.trim().to_string(),
            email: customer_id.to_string(),
            shipping_address: shipping_address
                .map(str::to_string)
                .or_else(|| existing.as_ref().map(|c| c.shipping_address.clone()))
                .unwrap_or_else(|| "Unknown".to_string()),
            password_hash: hash_password(password),
            disabled: false,
        };

        if existing.is_some() {
            // Placeholder from auto-provisioning: upgrade in place.
            self.store.customers().update(&customer).await?;
            debug!(customer = %customer_id, "Upgraded placeholder account");
        } else {
            self.store.customers().insert(&customer).await?;
        }

        info!(customer = %customer_id, "Customer registered");
        self.store
            .audit_log()
            .info(&format!("Customer {customer_id} registered"))
            .await;

        Ok(customer)
    }
}

// =============================================================================
// Credential Verification
// =============================================================================

/// Store-backed credential verifier with one configured admin login.
pub struct StoreCredentialVerifier {
    store: Store,
    admin: AdminCredential,
}

impl StoreCredentialVerifier {
    pub fn new(store: Store, admin: AdminCredential) -> Self {
        StoreCredentialVerifier { store, admin }
    }
}

#[async_trait]
impl CredentialVerifier for StoreCredentialVerifier {
    /// Checks the admin credential first, then the customer directory.
    ///
    /// Returns `None` for unknown ids, wrong passwords, disabled accounts,
    /// and placeholder accounts without a login.
    async fn verify(&self, login_id: &str, password: &str) -> Option<Principal> {
        let login_id = login_id.trim();

        if login_id.eq_ignore_ascii_case(&self.admin.login_id)
            && verify_password(password, &self.admin.password_hash)
        {
            return Some(Principal::SystemAdmin);
        }

        let customer = self.store.customers().get(login_id).await.ok()??;
        if customer.disabled || !verify_password(password, &customer.password_hash) {
            return None;
        }

        Some(Principal::Customer {
            customer_id: customer.customer_id,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use orderflow_store::StoreConfig;

    async fn store() -> Store {
        Store::new(StoreConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_register_creates_account_with_login() {
        let store = store().await;
        let registration = Registration::new(store.clone());

        let customer = registration
            .register("alice@x.com", "Alice", "secret", Some("1 Main St"))
            .await
            .unwrap();

        assert!(customer.has_login());
        assert_eq!(customer.shipping_address, "1 Main St");

        let stored = store.customers().get("alice@x.com").await.unwrap().unwrap();
        assert!(verify_password("secret", &stored.password_hash));
    }

    #[tokio::test]
    async fn test_register_rejects_existing_login() {
        let store = store().await;
        let registration = Registration::new(store);

        registration
            .register("alice@x.com", "Alice", "secret", None)
            .await
            .unwrap();

        let err = registration
            .register("alice@x.com", "Alice Again", "other", None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[tokio::test]
    async fn test_register_upgrades_placeholder() {
        let store = store().await;
        store
            .customers()
            .insert(&Customer {
                customer_id: "alice@x.com".to_string(),
                name: "Customer alice@x.com".to_string(),
                email: "alice@x.com".to_string(),
                shipping_address: "Unknown".to_string(),
                password_hash: String::new(),
                disabled: false,
            })
            .await
            .unwrap();

        let registration = Registration::new(store.clone());
        let customer = registration
            .register("alice@x.com", "Alice Smith", "secret", None)
            .await
            .unwrap();

        assert_eq!(customer.name, "Alice Smith");
        assert!(customer.has_login());
    }

    #[tokio::test]
    async fn test_register_validates_fields() {
        let store = store().await;
        let registration = Registration::new(store);

        let err = registration
            .register("not-an-email", "", "", None)
            .await
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("invalid format"));
        assert!(msg.contains("name is required"));
        assert!(msg.contains("password is required"));
    }

    #[tokio::test]
    async fn test_verify_admin_and_customer() {
        let store = store().await;
        Registration::new(store.clone())
            .register("alice@x.com", "Alice", "secret", None)
            .await
            .unwrap();

        let verifier =
            StoreCredentialVerifier::new(store, AdminCredential::new("ops@example.local", "admin123"));

        assert_eq!(
            verifier.verify("OPS@example.local", "admin123").await,
            Some(Principal::SystemAdmin)
        );
        assert_eq!(
            verifier.verify("alice@x.com", "secret").await,
            Some(Principal::Customer {
                customer_id: "alice@x.com".to_string()
            })
        );
        assert_eq!(verifier.verify("alice@x.com", "wrong").await, None);
        assert_eq!(verifier.verify("ghost@x.com", "secret").await, None);
    }

    #[tokio::test]
    async fn test_verify_rejects_disabled_and_placeholder_accounts() {
        let store = store().await;
        store
            .customers()
            .insert(&Customer {
                customer_id: "frozen@x.com".to_string(),
                name: "Frozen".to_string(),
                email: "frozen@x.com".to_string(),
                shipping_address: "Unknown".to_string(),
                password_hash: hash_password("secret"),
                disabled: true,
            })
            .await
            .unwrap();
        store
            .customers()
            .insert(&Customer {
                customer_id: "ghosted@x.com".to_string(),
                name: "Placeholder".to_string(),
                email: "ghosted@x.com".to_string(),
                shipping_address: "Unknown".to_string(),
                password_hash: String::new(),
                disabled: false,
            })
            .await
            .unwrap();

        let verifier =
            StoreCredentialVerifier::new(store, AdminCredential::new("ops@example.local", "admin123"));

        assert_eq!(verifier.verify("frozen@x.com", "secret").await, None);
        // Empty stored hash never verifies, even with an empty password.
        assert_eq!(verifier.verify("ghosted@x.com", "").await, None);
    }
}
