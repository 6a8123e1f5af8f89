//! # Tally DB
//!
//! SQLite persistence and the settlement engine for Tally POS.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                            tally-db                                     │
//! │                                                                         │
//! │  ┌──────────────┐     ┌──────────────────────────────────────────┐      │
//! │  │   Database   │────►│              SqlitePool (WAL)            │      │
//! │  │  (pool.rs)   │     └──────────────────────────────────────────┘      │
//! │  └──────┬───────┘                                                       │
//! │         │                                                               │
//! │         ├──► ProductRepository   catalog reads/writes                   │
//! │         ├──► OrderRepository     order + line item reads, hard delete   │
//! │         ├──► CustomerRepository  directory, walk-in fallback            │
//! │         ├──► LedgerRepository    range queries + per-type totals        │
//! │         │                                                               │
//! │         └──► SettlementEngine    THE write path: place / cancel /       │
//! │                                  adjust, one transaction each           │
//! │                                                                         │
//! │  Domain types and business rules live in tally-core; this crate         │
//! │  only adds storage and the transactional settlement contract.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - `pool` - Connection pool setup, WAL configuration, repository access
//! - `migrations` - Embedded schema migrations
//! - `repository` - Per-entity data access (product, order, customer, ledger)
//! - `settlement` - Atomic settlement operations
//! - `error` - `DbError` and conversions from sqlx

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod settlement;

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use repository::customer::CustomerRepository;
pub use repository::ledger::{LedgerReport, LedgerRepository, LedgerTotals};
pub use repository::order::OrderRepository;
pub use repository::product::ProductRepository;
pub use settlement::{PlacedOrder, SettlementEngine, SettlementError, SettlementResult};
