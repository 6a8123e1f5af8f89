//! # Repository Module
//!
//! Database repository implementations for Tally POS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                     │
//! │                                                                     │
//! │  Caller                                                             │
//! │    │  db.products().get_by_id(id)                                   │
//! │    ▼                                                                │
//! │  ProductRepository                                                  │
//! │  ├── get_by_id(&self, id)                                           │
//! │  ├── insert(&self, product)                                         │
//! │  └── update_stock(&self, id, delta)                                 │
//! │    │  SQL query                                                     │
//! │    ▼                                                                │
//! │  SQLite Database                                                    │
//! │                                                                     │
//! │  SQL is isolated in one place; repositories are cheap clones of     │
//! │  the shared pool. Multi-statement invariants (settlement) do NOT    │
//! │  live here - they belong to the SettlementEngine transaction.       │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`product::ProductRepository`] - Catalog store CRUD and stock
//! - [`order::OrderRepository`] - Order and line item reads, hard delete
//! - [`customer::CustomerRepository`] - Customer directory
//! - [`ledger::LedgerRepository`] - Append-only ledger reads

pub mod customer;
pub mod ledger;
pub mod order;
pub mod product;
