//! # Domain Types
//!
//! Core domain types for Tally POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                │
//! │                                                                     │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────┐        │
//! │  │    Product     │  │     Order      │  │  LedgerEntry   │        │
//! │  │  ────────────  │  │  ────────────  │  │  ────────────  │        │
//! │  │  id (UUID)     │  │  id (UUID)     │  │  id (UUID)     │        │
//! │  │  sku (business)│  │  invoice_no    │  │  entry_type    │        │
//! │  │  price_cents   │  │  status        │  │  amount_cents  │        │
//! │  │  stock         │  │  total_cents   │  │  order_id      │        │
//! │  └────────────────┘  └───────┬────────┘  └────────────────┘        │
//! │                              │ 1:N                                  │
//! │                      ┌───────▼────────┐                             │
//! │                      │    LineItem    │  snapshot of name/price     │
//! │                      │  (immutable)   │  at time of sale            │
//! │                      └────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Orders have two identifiers:
//! - `id`: UUID v4 - immutable, used for database relations
//! - `invoice_no`: human-readable business id, unique, shown on receipts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 1800 bps = 18% (e.g., a common GST rate)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    /// Checks if tax rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product in the catalog store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Stock Keeping Unit - optional business identifier (sparse unique).
    pub sku: Option<String>,

    /// Barcode (EAN-13, UPC-A, etc.).
    pub barcode: Option<String>,

    /// Display name shown to cashier and on the invoice.
    pub name: String,

    /// Free-form category label.
    pub category: String,

    /// Retail unit price in cents.
    pub price_cents: i64,

    /// Unit cost in cents, drives COGS ledger postings.
    pub cost_cents: i64,

    /// Current stock level. Settlement keeps this non-negative; manual
    /// adjustments may push it below zero (a policy choice).
    pub stock: i64,

    /// Whether product is active (soft delete).
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the retail price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Returns the unit cost as a Money type.
    #[inline]
    pub fn cost(&self) -> Money {
        Money::from_cents(self.cost_cents)
    }

    /// Checks whether `quantity` units can be sold from current stock.
    #[inline]
    pub fn has_stock(&self, quantity: i64) -> bool {
        self.stock >= quantity
    }
}

// =============================================================================
// Order Status
// =============================================================================

/// The status of an order.
///
/// ## State Machine
/// ```text
/// PAID ────────┐
///              ├──► CANCELLED (terminal)
/// PENDING ─────┘
/// ```
/// Orders are recorded as already settled, so PAID is the initial state.
/// PENDING is an alternate initial status settable by an external
/// integration path, never produced by settlement itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    /// Order settled and paid.
    #[default]
    Paid,
    /// Recorded but awaiting payment (external integration path only).
    Pending,
    /// Cancelled: stock restored, ledger reversed. Terminal.
    Cancelled,
}

impl OrderStatus {
    /// Whether `cancel_order` may transition this status to CANCELLED.
    #[inline]
    pub const fn can_cancel(&self) -> bool {
        matches!(self, OrderStatus::Paid | OrderStatus::Pending)
    }
}

// =============================================================================
// Payment Type
// =============================================================================

/// How an already-decided payment was made. The engine only records the
/// type; there is no gateway integration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentType {
    #[default]
    Cash,
    Card,
    Online,
}

// =============================================================================
// Order
// =============================================================================

/// A settled order (header row; line items are stored separately).
///
/// Created once by the settlement engine. `status` is the only field
/// mutated post-creation (the PAID/PENDING → CANCELLED transition).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Order {
    pub id: String,
    /// Human-readable invoice number, unique.
    pub invoice_no: String,
    pub status: OrderStatus,
    pub payment_type: PaymentType,
    /// Tax rate captured at settlement time, in basis points.
    pub tax_rate_bps: u32,
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    /// Invariant at creation: `total_cents == subtotal_cents + tax_cents`.
    pub total_cents: i64,
    /// Optional customer reference. Not foreign-key enforced; a dangling
    /// reference renders as "Walk-in Customer".
    pub customer_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }

    #[inline]
    pub fn tax(&self) -> Money {
        Money::from_cents(self.tax_cents)
    }

    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    #[inline]
    pub fn tax_rate(&self) -> TaxRate {
        TaxRate::from_bps(self.tax_rate_bps)
    }
}

// =============================================================================
// Line Item
// =============================================================================

/// A line item of an order, immutable after order creation.
///
/// Uses the snapshot pattern: name and unit price are frozen at sale time
/// and do not follow later catalog edits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct LineItem {
    pub id: String,
    pub order_id: String,
    /// Catalog reference. `None` means a manual/ad-hoc line that never
    /// touches stock.
    pub product_id: Option<String>,
    /// Product name at time of sale (frozen).
    pub name: String,
    /// Quantity sold (> 0).
    pub quantity: i64,
    /// Unit price in cents at time of sale (frozen).
    pub unit_price_cents: i64,
    /// `unit_price_cents * quantity`.
    pub line_total_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl LineItem {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents)
    }
}

/// An order header together with its line items, as returned by
/// order lookups.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDetail {
    pub order: Order,
    pub items: Vec<LineItem>,
}

// =============================================================================
// Ledger
// =============================================================================

/// Classification of a ledger posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[serde(rename_all = "UPPERCASE")]
pub enum LedgerEntryType {
    /// Gross sale amount (order total). Negative for reversals.
    Sale,
    /// Tax portion of a sale. Negative for reversals.
    Tax,
    /// Cost of goods sold, from catalog unit costs. Negative for reversals.
    Cogs,
    /// Manual inventory adjustment marker. Amount is always zero; the
    /// delta/reason live in `meta`.
    Adjustment,
}

/// An immutable financial posting in the append-only ledger.
///
/// ## Invariants
/// - Never updated or deleted once written.
/// - Every settled order has exactly one SALE, TAX and COGS entry with
///   non-negative amounts; a cancelled order additionally has one of each
///   with the negated absolute amounts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct LedgerEntry {
    pub id: String,
    pub entry_type: LedgerEntryType,
    /// `None` for non-order adjustments.
    pub order_id: Option<String>,
    pub invoice_no: Option<String>,
    /// Signed amount in cents: positive for original postings, negative
    /// for reversals, zero for ADJUSTMENT markers.
    pub amount_cents: i64,
    pub customer_id: Option<String>,
    pub payment_type: PaymentType,
    /// JSON metadata (see [`AdjustmentMeta`] for ADJUSTMENT entries).
    pub meta: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }

    /// Decodes the adjustment metadata payload, if present and well-formed.
    pub fn adjustment_meta(&self) -> Option<AdjustmentMeta> {
        self.meta.as_deref().and_then(AdjustmentMeta::from_json)
    }
}

/// Metadata recorded with an ADJUSTMENT ledger entry. The ledger amount
/// field is informational only for that entry type - it does not move
/// money - so the actual delta lives here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustmentMeta {
    pub product_id: String,
    pub name: String,
    pub delta: i64,
    pub reason: String,
}

impl AdjustmentMeta {
    /// Serializes to the JSON stored in `ledger_entries.meta`.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Parses the stored JSON payload; `None` if malformed.
    pub fn from_json(json: &str) -> Option<Self> {
        serde_json::from_str(json).ok()
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A customer directory record. Orders reference customers by id string
/// with no foreign-key enforcement.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================
