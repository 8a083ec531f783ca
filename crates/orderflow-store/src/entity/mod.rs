//! # Entity Repositories
//!
//! Repository implementations for the three entity tables.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The Repository pattern abstracts storage access behind a clean API.   │
//! │                                                                         │
//! │  Pipeline component                                                     │
//! │       │                                                                 │
//! │       │  store.products().reserve_stock("p1", 3)                        │
//! │       │  ↓                                                              │
//! │       ▼                                                                 │
//! │  ProductRepository                                                     │
//! │  ├── get(&self, id)                                                    │
//! │  ├── upsert(&self, product)                                            │
//! │  ├── reserve_stock(&self, id, qty)                                     │
//! │  └── adjust_quantity(&self, id, delta)                                 │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Benefits:                                                              │
//! │  • SQL is isolated in one place                                        │
//! │  • Easy to exercise against an in-memory store in tests               │
//! │  • Can swap storage implementations                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`customer::CustomerRepository`] - Customer lookup and provisioning
//! - [`product::ProductRepository`] - Catalog CRUD and stock reservation
//! - [`order::OrderRepository`] - Whole-document order persistence

pub mod customer;
pub mod order;
pub mod product;
