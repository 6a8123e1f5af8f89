//! # Error Types
//!
//! Domain-specific error types for tally-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                 │
//! │                                                                     │
//! │  tally-core errors (this file)                                      │
//! │  ├── CoreError        - Business rule violations                    │
//! │  └── ValidationError  - Input validation failures                   │
//! │                                                                     │
//! │  tally-db errors (separate crate)                                   │
//! │  ├── DbError          - Database operation failures                 │
//! │  └── SettlementError  - CoreError + DbError at the engine surface   │
//! │                                                                     │
//! │  Flow: ValidationError → CoreError → SettlementError → caller       │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product name, invoice, ...)
//! 3. Errors are enum variants, never String
//! 4. Each variant maps to a user-facing message

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations surfaced by settlement.
///
/// All of these are client-input errors scoped to a single request: none
/// is retried automatically and none is fatal to the process.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An order must contain at least one line item.
    #[error("Cart is empty")]
    EmptyCart,

    /// A line references a catalog product that does not exist.
    ///
    /// Carries the line's captured name so the message is meaningful to
    /// the cashier even when the id is an opaque UUID.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Insufficient stock to settle the order.
    ///
    /// ## User Workflow
    /// ```text
    /// place_order (qty: 5)
    ///      │
    ///      ▼
    /// Check stock: available=3
    ///      │
    ///      ▼
    /// InsufficientStock { name: "Coke", available: 3, requested: 5 }
    /// ```
    #[error("Insufficient stock for {name}: available {available}, requested {requested}")]
    InsufficientStock {
        name: String,
        available: i64,
        requested: i64,
    },

    /// No order exists with the given invoice number.
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// The order was already cancelled; cancellation is
    /// idempotent-by-rejection and never double-reverses.
    #[error("Order {0} is already cancelled")]
    AlreadyCancelled(String),

    /// Manual inventory adjustment rejected (zero or missing delta).
    #[error("Invalid inventory adjustment: {reason}")]
    InvalidAdjustment { reason: String },

    /// Order has exceeded the maximum allowed line items.
    #[error("Order cannot have more than {max} line items")]
    OrderTooLarge { max: usize },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when a request payload doesn't meet requirements and are
/// raised before any mutation begins.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;
