//! # Tracking Search
//!
//! Matcher predicates for the order-tracking search box.
//!
//! ## Matching Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Search Composition                                │
//! │                                                                         │
//! │  query ──► matchers_for(query, customers) ──► [Matcher; ...]           │
//! │                                                                         │
//! │  Each matcher is an independent predicate over an order:               │
//! │    • CustomerIdIn   - orders whose customer id resolved from the query │
//! │    • OrderIdPrefix  - orders whose id starts with the query            │
//! │    • CustomerIdTerm - orders whose customer id contains the query      │
//! │                                                                         │
//! │  An order is a hit when ANY matcher accepts it (set union).            │
//! │  Matchers never exclude - adding one can only widen the result.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All comparisons are case-insensitive; the query is trimmed first. An empty
//! query yields no matchers, which callers treat as "no filter".

use std::collections::HashSet;

use crate::types::{Customer, Order};

// =============================================================================
// Matcher
// =============================================================================

/// One search predicate over orders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Matcher {
    /// Matches orders placed by any of the resolved customer ids.
    ///
    /// Populated by resolving the query against the customer directory
    /// (display-name and email matches).
    CustomerIdIn(HashSet<String>),

    /// Matches orders whose id starts with the query (case-insensitive).
    OrderIdPrefix(String),

    /// Matches orders whose customer id contains the query as a substring.
    CustomerIdTerm(String),
}

impl Matcher {
    /// Tests a single order against this matcher.
    pub fn matches(&self, order: &Order) -> bool {
        match self {
            Matcher::CustomerIdIn(ids) => ids.contains(&order.customer_id.to_lowercase()),
            Matcher::OrderIdPrefix(prefix) => order
                .order_id
                .to_lowercase()
                .starts_with(prefix.as_str()),
            Matcher::CustomerIdTerm(term) => {
                order.customer_id.to_lowercase().contains(term.as_str())
            }
        }
    }
}

// =============================================================================
// Matcher Construction
// =============================================================================

/// Builds the matcher set for a search query.
///
/// `customers` is the directory snapshot used to resolve name/email hits into
/// customer ids. Returns an empty vec for a blank query.
pub fn matchers_for(query: &str, customers: &[Customer]) -> Vec<Matcher> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    let resolved: HashSet<String> = customers
        .iter()
        .filter(|c| {
            c.name.to_lowercase().contains(&needle) || c.customer_id.to_lowercase().contains(&needle)
        })
        .map(|c| c.customer_id.to_lowercase())
        .collect();

    let mut matchers = Vec::new();
    if !resolved.is_empty() {
        matchers.push(Matcher::CustomerIdIn(resolved));
    }
    matchers.push(Matcher::OrderIdPrefix(needle.clone()));
    matchers.push(Matcher::CustomerIdTerm(needle));
    matchers
}

/// Filters orders to those accepted by at least one matcher.
///
/// An empty matcher set means "no filter": every order passes through
/// unchanged. Relative order of the input is preserved.
pub fn filter_orders(orders: Vec<Order>, matchers: &[Matcher]) -> Vec<Order> {
    if matchers.is_empty() {
        return orders;
    }
    orders
        .into_iter()
        .filter(|o| matchers.iter().any(|m| m.matches(o)))
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Order, OrderLine};

    fn customer(id: &str, name: &str) -> Customer {
        Customer {
            customer_id: id.to_string(),
            name: name.to_string(),
            email: id.to_string(),
            shipping_address: "Unknown".to_string(),
            password_hash: String::new(),
            disabled: false,
        }
    }

    fn order(order_id: &str, customer_id: &str) -> Order {
        Order::new(
            order_id.to_string(),
            customer_id.to_string(),
            vec![OrderLine {
                product_id: "p1".to_string(),
                quantity: 1,
                unit_price_cents: 100,
            }],
        )
    }

    #[test]
    fn test_blank_query_yields_no_matchers() {
        assert!(matchers_for("   ", &[]).is_empty());
        assert!(matchers_for("", &[]).is_empty());
    }

    #[test]
    fn test_empty_matchers_pass_everything() {
        let orders = vec![order("o1", "a@x.com"), order("o2", "b@x.com")];
        let hits = filter_orders(orders.clone(), &[]);
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn test_order_id_prefix_case_insensitive() {
        let orders = vec![order("ABC-123", "a@x.com"), order("XYZ-999", "b@x.com")];
        let matchers = matchers_for("abc", &[]);
        let hits = filter_orders(orders, &matchers);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].order_id, "ABC-123");
    }

    #[test]
    fn test_customer_name_resolves_to_id_union() {
        let customers = vec![
            customer("alice@x.com", "Alice Smith"),
            customer("bob@x.com", "Bob Jones"),
        ];
        let orders = vec![order("o1", "alice@x.com"), order("o2", "bob@x.com")];

        let matchers = matchers_for("smith", &customers);
        let hits = filter_orders(orders, &matchers);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].customer_id, "alice@x.com");
    }

    #[test]
    fn test_union_never_narrows() {
        // Query hits one order by id prefix and a different one by customer
        // id substring; both appear in the result.
        let customers = vec![customer("bob@x.com", "Bob Jones")];
        let orders = vec![order("bobsled-1", "alice@x.com"), order("o2", "bob@x.com")];

        let matchers = matchers_for("bob", &customers);
        let hits = filter_orders(orders, &matchers);
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn test_no_hits() {
        let orders = vec![order("o1", "alice@x.com")];
        let matchers = matchers_for("zzz", &[]);
        assert!(filter_orders(orders, &matchers).is_empty());
    }
}
