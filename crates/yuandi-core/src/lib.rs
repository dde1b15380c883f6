//! # yuandi-core: Pure Business Logic for YUANDI Collection Management
//!
//! This crate is the **heart** of the YUANDI order and inventory system.
//! It contains all business logic as pure functions with zero I/O
//! dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     YUANDI Core Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Route Handlers (out of scope)                   │   │
//! │  │   order intake ──► refund ──► catalog entry ──► stock ops      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ yuandi-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │    sku    │  │   stock   │  │   pccc    │  │   │
//! │  │   │  Product  │  │ generator │  │  ledger   │  │ validator │  │   │
//! │  │   │   Order   │  │           │  │   ops     │  │           │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK                            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                   yuandi-db (Database Layer)                    │   │
//! │  │          SQLite queries, migrations, repositories               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Order, InventoryMovement, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`error`] - Domain error types
//! - [`sku`] - Product code (SKU) generation
//! - [`order_number`] - Date-scoped order number allocation
//! - [`pccc`] - Personal Customs Clearance Code validation
//! - [`stock`] - Stock check/deduct/restore with movement records
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **No I/O**: Database, network, file system access is FORBIDDEN here.
//!    The only ambient inputs are the clock and the entropy source, both
//!    confined to identifier synthesis.
//! 2. **Integer Money**: All monetary values are integers in the smallest
//!    currency unit (won for KRW, fen for CNY) to avoid float errors.
//! 3. **Explicit Errors**: All errors are typed, never strings or panics.
//! 4. **Ledger Consistency**: `on_hand` is only ever changed together with
//!    an [`types::InventoryMovement`] record carrying the before/after
//!    balance snapshot.
//!
//! ## Example Usage
//!
//! ```rust
//! use yuandi_core::pccc::validate_pccc;
//! use yuandi_core::stock::{check_stock, deduct_stock};
//!
//! # use yuandi_core::types::{NewProduct, Product};
//! # let new = NewProduct {
//! #     category: "bag".to_string(),
//! #     model: "classic".to_string(),
//! #     color: "black".to_string(),
//! #     brand: "chanel".to_string(),
//! #     cost_cny_fen: 500_000,
//! #     sale_price_krw: 1_500_000,
//! #     low_stock_threshold: 5,
//! # };
//! # let mut product = Product::from_new(new, "BAG-CLAS-BL-CHA-A1B2C".to_string());
//! # product.on_hand = 10;
//! // Order intake: validate the customs code first
//! let code = validate_pccc("p123456789012").unwrap();
//! assert_eq!(code.as_str(), "P123456789012");
//!
//! // Then check and deduct stock, receiving the movement record
//! let check = check_stock(&product, 3).unwrap();
//! assert!(check.has_stock);
//!
//! let movement = deduct_stock(&mut product, 3, Some("order"), Some("ord-1")).unwrap();
//! assert_eq!(product.on_hand, 7);
//! assert_eq!(movement.balance_after, 7);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod order_number;
pub mod pccc;
pub mod sku;
pub mod stock;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use yuandi_core::Product` instead of
// `use yuandi_core::types::Product`

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{Currency, Money};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum line items allowed in a single order
///
/// ## Business Reason
/// Parcels clearing Korean customs under a personal code are small;
/// anything larger than this is a data-entry mistake.
pub const MAX_ORDER_ITEMS: usize = 100;

/// Maximum quantity of a single item in an order
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;
