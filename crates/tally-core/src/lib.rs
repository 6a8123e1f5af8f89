//! # tally-core: Pure Business Logic for Tally POS
//!
//! This crate is the **heart** of the Tally POS settlement engine. It holds
//! all business logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      Tally POS Architecture                         │
//! │                                                                     │
//! │  ┌───────────────────────────────────────────────────────────────┐ │
//! │  │                  Caller (HTTP layer, CLI, ...)                │ │
//! │  └─────────────────────────────┬─────────────────────────────────┘ │
//! │                                │                                    │
//! │  ┌─────────────────────────────▼─────────────────────────────────┐ │
//! │  │               ★ tally-core (THIS CRATE) ★                     │ │
//! │  │                                                               │ │
//! │  │  ┌───────────┐ ┌───────────┐ ┌───────────┐ ┌──────────────┐  │ │
//! │  │  │   types   │ │   money   │ │   draft   │ │  validation  │  │ │
//! │  │  │  Product  │ │   Money   │ │DraftOrder │ │    rules     │  │ │
//! │  │  │   Order   │ │  TaxCalc  │ │  totals   │ │    checks    │  │ │
//! │  │  └───────────┘ └───────────┘ └───────────┘ └──────────────┘  │ │
//! │  │                                                               │ │
//! │  │  NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │ │
//! │  └─────────────────────────────┬─────────────────────────────────┘ │
//! │                                │                                    │
//! │  ┌─────────────────────────────▼─────────────────────────────────┐ │
//! │  │              tally-db (storage + settlement engine)           │ │
//! │  └───────────────────────────────────────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Order, LedgerEntry, Customer, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`draft`] - Draft orders: the validated input to settlement
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same input = same output, always
//! 2. **No I/O**: database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: all monetary values are in cents (i64)
//! 4. **Explicit Errors**: all errors are typed, never strings or panics

pub mod draft;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;

pub use draft::{DraftLine, DraftOrder, OrderTotals};
pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Display fallback for orders whose customer reference is missing or
/// dangling. No foreign key enforces the reference, so this must always
/// be available.
pub const WALK_IN_CUSTOMER: &str = "Walk-in Customer";

/// Maximum line items allowed in a single order.
///
/// ## Business Reason
/// Prevents runaway carts and ensures reasonable transaction sizes.
pub const MAX_ORDER_LINES: usize = 100;

/// Maximum quantity of a single line item.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_LINE_QUANTITY: i64 = 999;
