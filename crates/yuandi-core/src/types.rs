//! # Domain Types
//!
//! Core domain types used throughout YUANDI Collection Management.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────────┐   │
//! │  │    Product      │   │      Order      │   │ InventoryMovement   │   │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────────  │   │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  product_id (FK)    │   │
//! │  │  sku (business) │   │  order_no       │   │  movement_type      │   │
//! │  │  on_hand        │   │  status         │   │  quantity (signed)  │   │
//! │  │  sale_price_krw │   │  total_krw      │   │  balance_before/    │   │
//! │  └─────────────────┘   └─────────────────┘   │  balance_after      │   │
//! │                                              └─────────────────────┘   │
//! │  ┌─────────────────┐   ┌─────────────────┐                             │
//! │  │  OrderStatus    │   │  MovementType   │                             │
//! │  │  ─────────────  │   │  ─────────────  │                             │
//! │  │  Paid           │   │  Inbound        │                             │
//! │  │  Shipped        │   │  Sale           │                             │
//! │  │  Done           │   │  Adjustment     │                             │
//! │  │  Refunded       │   │  Disposal       │                             │
//! │  └─────────────────┘   │  Refund         │                             │
//! │                        └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business ID: (sku, order_no) - human-readable, shown to operators

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;

// =============================================================================
// Product
// =============================================================================

/// A catalog product.
///
/// `on_hand` is mutated only through the stock ledger operations in
/// [`crate::stock`] — every change is paired with an [`InventoryMovement`].
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Stock Keeping Unit - business identifier (see [`crate::sku`]).
    pub sku: String,

    /// Category free-text as entered at catalog time (e.g., "가방", "bag").
    pub category: String,

    /// Model free-text (e.g., "Classic Flap").
    pub model: String,

    /// Color free-text (e.g., "black", "블랙").
    pub color: String,

    /// Brand free-text (e.g., "Chanel").
    pub brand: String,

    /// Purchase cost in CNY fen (1/100 yuan).
    pub cost_cny_fen: i64,

    /// Sale price in KRW won (KRW has no minor unit).
    pub sale_price_krw: i64,

    /// Current available inventory quantity. Never negative.
    pub on_hand: i64,

    /// Threshold at or below which the product counts as low-stock.
    pub low_stock_threshold: i64,

    /// Whether product is active (soft delete).
    /// Products referenced by orders are never hard-deleted.
    pub is_active: bool,

    /// When the product was created.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// Catalog entry input for a new product.
///
/// The SKU is not part of the input — it is synthesized from these fields
/// by [`crate::sku::generate_sku`] and retried on collision at the
/// persistence boundary.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub category: String,
    pub model: String,
    pub color: String,
    pub brand: String,
    pub cost_cny_fen: i64,
    pub sale_price_krw: i64,
    pub low_stock_threshold: i64,
}

impl Product {
    /// Builds a product from catalog input and a synthesized SKU.
    ///
    /// Stock starts at zero; units enter through inbound movements.
    pub fn from_new(new: NewProduct, sku: String) -> Self {
        let now = Utc::now();
        Product {
            id: Uuid::new_v4().to_string(),
            sku,
            category: new.category,
            model: new.model,
            color: new.color,
            brand: new.brand,
            cost_cny_fen: new.cost_cny_fen,
            sale_price_krw: new.sale_price_krw,
            on_hand: 0,
            low_stock_threshold: new.low_stock_threshold,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Display name shown to operators: "Brand Model Color".
    pub fn display_name(&self) -> String {
        format!("{} {} {}", self.brand, self.model, self.color)
            .trim()
            .to_string()
    }

    /// Returns the sale price as a Money value (KRW won).
    #[inline]
    pub fn sale_price(&self) -> Money {
        Money::from_minor(self.sale_price_krw)
    }

    /// Returns the purchase cost as a Money value (CNY fen).
    #[inline]
    pub fn cost(&self) -> Money {
        Money::from_minor(self.cost_cny_fen)
    }

    /// Checks whether current stock covers the requested quantity.
    #[inline]
    pub fn can_fulfill(&self, quantity: i64) -> bool {
        self.on_hand >= quantity
    }

    /// Checks whether the product is at or below its low-stock threshold.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.on_hand <= self.low_stock_threshold
    }
}

// =============================================================================
// Order Status
// =============================================================================

/// The status of an order.
///
/// ## State Machine
/// ```text
/// PAID ──(ship)──► SHIPPED ──(deliver)──► DONE
///   │                 │                     │
///   └──────(refund)───┴─────────(refund)────┴──► REFUNDED
/// ```
/// Transitions are monotonic; REFUNDED may follow any prior state and is
/// terminal. Refunding triggers stock restoration exactly once (guarded
/// by `Order::refunded_at`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Payment received, stock deducted, awaiting shipment.
    Paid,
    /// Parcel handed to the carrier.
    Shipped,
    /// Parcel delivered.
    Done,
    /// Order refunded; stock restored. Terminal.
    Refunded,
}

impl OrderStatus {
    /// Whether a transition from `self` to `next` is allowed.
    ///
    /// ## Example
    /// ```rust
    /// use yuandi_core::types::OrderStatus;
    ///
    /// assert!(OrderStatus::Paid.can_transition_to(OrderStatus::Shipped));
    /// assert!(OrderStatus::Done.can_transition_to(OrderStatus::Refunded));
    /// assert!(!OrderStatus::Refunded.can_transition_to(OrderStatus::Paid));
    /// assert!(!OrderStatus::Shipped.can_transition_to(OrderStatus::Paid));
    /// ```
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Paid, Shipped) | (Shipped, Done) | (Paid | Shipped | Done, Refunded)
        )
    }

    /// Lowercase storage/display form.
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Paid => "paid",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Done => "done",
            OrderStatus::Refunded => "refunded",
        }
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Paid
    }
}

// =============================================================================
// Order
// =============================================================================

/// A customer order.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Order {
    pub id: String,
    /// Business identifier in the form `ORD-YYMMDD-NNN` (see
    /// [`crate::order_number`]). Unique.
    pub order_no: String,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    /// Normalized Personal Customs Clearance Code (`P` + 12 digits).
    pub pccc_code: String,
    pub status: OrderStatus,
    /// Sum of item subtotals, in KRW won.
    pub total_krw: i64,
    pub memo: Option<String>,
    /// Set exactly once, when the order is refunded. Guards at-most-once
    /// stock restoration.
    #[ts(as = "Option<String>")]
    pub refunded_at: Option<DateTime<Utc>>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// Order-intake input.
///
/// Prices are NOT part of the input — unit prices are snapshotted from
/// the catalog at intake time, and the total is computed from them.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub customer_name: String,
    pub customer_phone: Option<String>,
    /// Raw customs code as typed; validated and normalized at intake.
    pub pccc_code: String,
    pub memo: Option<String>,
    pub items: Vec<NewOrderItem>,
}

/// One requested line in an order-intake input.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderItem {
    pub product_id: String,
    pub quantity: i64,
}

// =============================================================================
// Order Item
// =============================================================================

/// A line item in an order.
/// Uses snapshot pattern to freeze product data at time of sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    pub product_id: String,
    /// SKU at time of sale (frozen).
    pub sku_snapshot: String,
    /// Display name at time of sale (frozen).
    pub name_snapshot: String,
    /// Quantity sold.
    pub quantity: i64,
    /// Unit price in KRW won at time of sale (frozen).
    pub unit_price_krw: i64,
    /// Line subtotal (unit_price × quantity).
    pub subtotal_krw: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl OrderItem {
    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_minor(self.unit_price_krw)
    }

    /// Returns the line subtotal as Money.
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_minor(self.subtotal_krw)
    }
}

/// Sums item subtotals into the order total (KRW won).
pub fn order_total_krw(items: &[OrderItem]) -> i64 {
    items.iter().map(|i| i.subtotal_krw).sum()
}

/// Verifies the order-total invariant: `total_krw == Σ item subtotals`.
///
/// ## Errors
/// - [`CoreError::EmptyOrder`] when there are no items
/// - [`CoreError::TotalMismatch`] when the sums disagree
pub fn verify_order_total(order: &Order, items: &[OrderItem]) -> CoreResult<()> {
    if items.is_empty() {
        return Err(CoreError::EmptyOrder);
    }

    let expected = order_total_krw(items);
    if order.total_krw != expected {
        return Err(CoreError::TotalMismatch {
            expected,
            actual: order.total_krw,
        });
    }

    Ok(())
}

// =============================================================================
// Inventory Movement
// =============================================================================

/// The kind of stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum MovementType {
    /// Purchased stock received into inventory.
    Inbound,
    /// Units deducted by an order.
    Sale,
    /// Manual operator correction (signed).
    Adjustment,
    /// Damaged/lost units written off.
    Disposal,
    /// Units restored by an order refund.
    Refund,
}

/// An immutable, append-only stock movement record.
///
/// ## Invariant
/// `balance_after = balance_before + quantity` (quantity is signed), and
/// the latest movement's `balance_after` equals the product's current
/// `on_hand`. The persistence layer writes the movement and the `on_hand`
/// update in one transaction.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct InventoryMovement {
    pub id: String,
    pub product_id: String,
    pub movement_type: MovementType,
    /// Signed unit delta: positive for inbound/refund, negative for
    /// sale/disposal, either sign for adjustments.
    pub quantity: i64,
    /// `on_hand` before this movement was applied.
    pub balance_before: i64,
    /// `on_hand` after this movement was applied.
    pub balance_after: i64,
    /// What the movement references (e.g., "order").
    pub ref_type: Option<String>,
    /// Identifier of the referenced entity (e.g., an order id).
    pub ref_id: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl InventoryMovement {
    /// Checks the balance arithmetic invariant.
    #[inline]
    pub fn is_consistent(&self) -> bool {
        self.balance_after == self.balance_before + self.quantity
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
