//! # Draft Orders
//!
//! The validated input to settlement: a proposed cart of line items plus
//! payment and tax context.
//!
//! ## Settlement Input Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                     Draft → Settled Order                           │
//! │                                                                     │
//! │  Caller builds DraftOrder ──► validate() ──► SettlementEngine       │
//! │                                   │              │                  │
//! │            EmptyCart, bad qty, ◄──┘              ▼                  │
//! │            bad price, bad rate          place_order() resolves      │
//! │                                         prices, checks stock,       │
//! │                                         persists atomically         │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Validation here is pure and runs before any storage mutation begins.
//! Stock availability is NOT checked here - that requires the catalog and
//! happens inside the settlement transaction.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{PaymentType, TaxRate};
use crate::validation::{
    validate_name, validate_price_cents, validate_quantity, validate_tax_rate_bps,
};
use crate::MAX_ORDER_LINES;

/// A proposed line item.
///
/// `product_id = None` marks a manual/ad-hoc entry: it never touches stock
/// and always uses the supplied price.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftLine {
    pub product_id: Option<String>,
    pub name: String,
    pub quantity: i64,
    /// Caller-supplied unit price in cents. For catalog lines this is
    /// only honored under manual pricing (see [`DraftOrder::manual_pricing`]);
    /// otherwise the engine re-prices from the catalog.
    pub unit_price_cents: i64,
}

impl DraftLine {
    /// `unit_price * quantity`.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.unit_price_cents).multiply_quantity(self.quantity)
    }
}

/// A proposed sale, not yet settled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftOrder {
    /// Optional customer reference (display only, never enforced).
    pub customer_id: Option<String>,
    pub payment_type: PaymentType,
    pub tax_rate: TaxRate,
    pub lines: Vec<DraftLine>,
    /// When true, caller-supplied prices on catalog lines are honored
    /// (discounting / manual pricing capability). When false, catalog
    /// lines are re-priced from the current catalog price at settlement.
    pub manual_pricing: bool,
}

impl DraftOrder {
    /// Creates a draft with catalog pricing and no customer.
    pub fn new(payment_type: PaymentType, tax_rate: TaxRate, lines: Vec<DraftLine>) -> Self {
        DraftOrder {
            customer_id: None,
            payment_type,
            tax_rate,
            lines,
            manual_pricing: false,
        }
    }

    /// Validates the draft against pure business rules.
    ///
    /// ## Checks
    /// - at least one line (`EmptyCart`)
    /// - at most [`MAX_ORDER_LINES`] lines
    /// - every quantity in 1..=999, every price >= 0, non-empty names
    /// - tax rate <= 10000 bps
    pub fn validate(&self) -> CoreResult<()> {
        if self.lines.is_empty() {
            return Err(CoreError::EmptyCart);
        }

        if self.lines.len() > MAX_ORDER_LINES {
            return Err(CoreError::OrderTooLarge {
                max: MAX_ORDER_LINES,
            });
        }

        validate_tax_rate_bps(self.tax_rate.bps())?;

        for line in &self.lines {
            validate_name(&line.name)?;
            validate_quantity(line.quantity)?;
            validate_price_cents(line.unit_price_cents)?;
        }

        Ok(())
    }
}

/// Computed monetary totals for an order.
///
/// ## Invariants
/// - `total == subtotal + tax` by construction
/// - `tax == round_half_up(subtotal * bps / 10000)` exactly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTotals {
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub total_cents: i64,
}

impl OrderTotals {
    /// Computes totals over resolved lines at the given tax rate.
    ///
    /// Tax applies to the order subtotal, not per line, so rounding
    /// happens once.
    pub fn compute(lines: &[DraftLine], tax_rate: TaxRate) -> OrderTotals {
        let subtotal = lines
            .iter()
            .fold(Money::zero(), |acc, line| acc + line.line_total());
        let tax = subtotal.calculate_tax(tax_rate);
        let total = subtotal + tax;

        OrderTotals {
            subtotal_cents: subtotal.cents(),
            tax_cents: tax.cents(),
            total_cents: total.cents(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
