//! # Stock Ledger Operations
//!
//! Keeps `Product::on_hand` consistent with an auditable movement history
//! and enforces non-negative stock.
//!
//! ## Ledger Discipline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Every Stock Change Is Two Writes                     │
//! │                                                                         │
//! │  deduct_stock(product, 3)                                              │
//! │       │                                                                 │
//! │       ├── 1. product.on_hand: 10 → 7                                   │
//! │       │                                                                 │
//! │       └── 2. InventoryMovement {                                       │
//! │               type: sale, quantity: -3,                                │
//! │               balance_before: 10, balance_after: 7                     │
//! │             }                                                           │
//! │                                                                         │
//! │  The two MUST be applied atomically: the persistence layer wraps        │
//! │  the UPDATE and the movement INSERT in one transaction; in-memory       │
//! │  embeddings apply both inside one critical section.                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Operations
//! | operation       | movement type | sign | guard                        |
//! |-----------------|---------------|------|------------------------------|
//! | `receive_stock` | inbound       | +    | quantity > 0                 |
//! | `deduct_stock`  | sale          | −    | quantity > 0, covers on_hand |
//! | `restore_stock` | refund        | +    | quantity > 0                 |
//! | `adjust_stock`  | adjustment    | ±    | delta ≠ 0, result ≥ 0        |
//! | `dispose_stock` | disposal      | −    | quantity > 0, covers on_hand |
//!
//! `restore_stock` is unconditional on the upper side: nothing bounds
//! cumulative restorations against what was deducted. Callers bound it
//! via the order-level at-most-once refund guard.

use chrono::Utc;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::{InventoryMovement, MovementType, Product};
use crate::validation::validate_quantity;

// =============================================================================
// Stock Check
// =============================================================================

/// Read-only stock availability snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockCheck {
    /// Whether `available` covers `requested`.
    pub has_stock: bool,
    /// Units on hand at check time.
    pub available: i64,
    /// Units requested.
    pub requested: i64,
    /// Units missing (0 when satisfiable).
    pub shortage: i64,
}

/// Checks whether `quantity` units can be taken from the product.
///
/// Read-only. `quantity` must be ≥ 0 — a negative request is a caller
/// error, not a business outcome.
///
/// ## Example
/// ```rust
/// # use yuandi_core::types::{NewProduct, Product};
/// use yuandi_core::stock::check_stock;
///
/// # let new = NewProduct {
/// #     category: "bag".to_string(), model: "m".to_string(),
/// #     color: "c".to_string(), brand: "b".to_string(),
/// #     cost_cny_fen: 0, sale_price_krw: 0, low_stock_threshold: 0,
/// # };
/// # let product = Product::from_new(new, "SKU".to_string());
/// // Product with on_hand = 0
/// let check = check_stock(&product, 1).unwrap();
/// assert!(!check.has_stock);
/// assert_eq!(check.available, 0);
/// assert_eq!(check.requested, 1);
/// assert_eq!(check.shortage, 1);
/// ```
pub fn check_stock(product: &Product, quantity: i64) -> CoreResult<StockCheck> {
    if quantity < 0 {
        return Err(ValidationError::MustBeNonNegative {
            field: "quantity".to_string(),
        }
        .into());
    }

    let available = product.on_hand;
    let shortage = (quantity - available).max(0);

    Ok(StockCheck {
        has_stock: shortage == 0,
        available,
        requested: quantity,
        shortage,
    })
}

// =============================================================================
// Mutating Operations
// =============================================================================

/// Deducts `quantity` units for a sale.
///
/// Re-runs the stock check first; on shortage the product is left
/// untouched and [`CoreError::InsufficientStock`] is returned. On success
/// `on_hand` decreases and the `sale` movement (with balance snapshot)
/// is returned for the caller to persist in the same transaction.
pub fn deduct_stock(
    product: &mut Product,
    quantity: i64,
    ref_type: Option<&str>,
    ref_id: Option<&str>,
) -> CoreResult<InventoryMovement> {
    validate_quantity(quantity)?;

    let check = check_stock(product, quantity)?;
    if !check.has_stock {
        return Err(CoreError::InsufficientStock {
            sku: product.sku.clone(),
            available: check.available,
            requested: quantity,
        });
    }

    apply(product, MovementType::Sale, -quantity, ref_type, ref_id)
}

/// Restores `quantity` units from a refund.
///
/// Unconditional increment — `on_hand` never decreases here, and no
/// upper bound is enforced. At-most-once semantics per order come from
/// the order's `refunded_at` guard, not from this function.
pub fn restore_stock(
    product: &mut Product,
    quantity: i64,
    ref_type: Option<&str>,
    ref_id: Option<&str>,
) -> CoreResult<InventoryMovement> {
    validate_quantity(quantity)?;
    apply(product, MovementType::Refund, quantity, ref_type, ref_id)
}

/// Receives `quantity` purchased units into inventory.
pub fn receive_stock(
    product: &mut Product,
    quantity: i64,
    ref_type: Option<&str>,
    ref_id: Option<&str>,
) -> CoreResult<InventoryMovement> {
    validate_quantity(quantity)?;
    apply(product, MovementType::Inbound, quantity, ref_type, ref_id)
}

/// Applies a signed manual correction.
///
/// `delta` may be negative, but the result must stay ≥ 0; a correction
/// below zero fails with [`CoreError::InsufficientStock`].
pub fn adjust_stock(
    product: &mut Product,
    delta: i64,
    ref_type: Option<&str>,
    ref_id: Option<&str>,
) -> CoreResult<InventoryMovement> {
    if delta == 0 {
        return Err(ValidationError::MustBePositive {
            field: "delta".to_string(),
        }
        .into());
    }

    if delta < 0 && product.on_hand + delta < 0 {
        return Err(CoreError::InsufficientStock {
            sku: product.sku.clone(),
            available: product.on_hand,
            requested: -delta,
        });
    }

    apply(product, MovementType::Adjustment, delta, ref_type, ref_id)
}

/// Writes off `quantity` damaged or lost units.
pub fn dispose_stock(
    product: &mut Product,
    quantity: i64,
    ref_type: Option<&str>,
    ref_id: Option<&str>,
) -> CoreResult<InventoryMovement> {
    validate_quantity(quantity)?;

    let check = check_stock(product, quantity)?;
    if !check.has_stock {
        return Err(CoreError::InsufficientStock {
            sku: product.sku.clone(),
            available: check.available,
            requested: quantity,
        });
    }

    apply(product, MovementType::Disposal, -quantity, ref_type, ref_id)
}

/// Applies a signed delta and builds the movement record.
///
/// Callers have already validated the delta; `on_hand ≥ 0` holds on exit
/// for every public operation.
fn apply(
    product: &mut Product,
    movement_type: MovementType,
    signed_quantity: i64,
    ref_type: Option<&str>,
    ref_id: Option<&str>,
) -> CoreResult<InventoryMovement> {
    let balance_before = product.on_hand;
    let balance_after = balance_before + signed_quantity;

    let now = Utc::now();
    product.on_hand = balance_after;
    product.updated_at = now;

    Ok(InventoryMovement {
        id: Uuid::new_v4().to_string(),
        product_id: product.id.clone(),
        movement_type,
        quantity: signed_quantity,
        balance_before,
        balance_after,
        ref_type: ref_type.map(str::to_string),
        ref_id: ref_id.map(str::to_string),
        created_at: now,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NewProduct;

    fn test_product(on_hand: i64) -> Product {
        let new = NewProduct {
            category: "bag".to_string(),
            model: "classic".to_string(),
            color: "black".to_string(),
            brand: "chanel".to_string(),
            cost_cny_fen: 500_000,
            sale_price_krw: 1_500_000,
            low_stock_threshold: 5,
        };
        let mut product = Product::from_new(new, "BAG-CLAS-BL-CHA-A1B2C".to_string());
        product.on_hand = on_hand;
        product
    }

    #[test]
    fn test_check_stock_satisfiable() {
        let product = test_product(10);
        let check = check_stock(&product, 3).unwrap();

        assert!(check.has_stock);
        assert_eq!(check.available, 10);
        assert_eq!(check.requested, 3);
        assert_eq!(check.shortage, 0);
    }

    #[test]
    fn test_check_stock_empty_shelf() {
        let product = test_product(0);
        let check = check_stock(&product, 1).unwrap();

        assert_eq!(
            check,
            StockCheck {
                has_stock: false,
                available: 0,
                requested: 1,
                shortage: 1,
            }
        );
    }

    #[test]
    fn test_check_stock_rejects_negative_quantity() {
        let product = test_product(10);
        let err = check_stock(&product, -1).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn test_deduct_success_and_movement() {
        let mut product = test_product(10);

        let movement = deduct_stock(&mut product, 3, Some("order"), Some("o1")).unwrap();

        assert_eq!(product.on_hand, 7);
        assert_eq!(movement.movement_type, MovementType::Sale);
        assert_eq!(movement.quantity, -3);
        assert_eq!(movement.balance_before, 10);
        assert_eq!(movement.balance_after, 7);
        assert!(movement.is_consistent());
        assert_eq!(movement.ref_type.as_deref(), Some("order"));
        assert_eq!(movement.ref_id.as_deref(), Some("o1"));
    }

    #[test]
    fn test_deduct_to_exactly_zero_then_fail() {
        let mut product = test_product(10);

        deduct_stock(&mut product, 10, None, None).unwrap();
        assert_eq!(product.on_hand, 0);

        let err = deduct_stock(&mut product, 1, None, None).unwrap_err();
        match &err {
            CoreError::InsufficientStock {
                available,
                requested,
                ..
            } => {
                assert_eq!(*available, 0);
                assert_eq!(*requested, 1);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }
        assert_eq!(err.shortage(), Some(1));
        // on_hand untouched by the failed deduction
        assert_eq!(product.on_hand, 0);
    }

    #[test]
    fn test_deduct_insufficient_leaves_product_untouched() {
        let mut product = test_product(3);
        let before = product.updated_at;

        let err = deduct_stock(&mut product, 5, None, None).unwrap_err();
        assert!(matches!(err, CoreError::InsufficientStock { .. }));
        assert_eq!(product.on_hand, 3);
        assert_eq!(product.updated_at, before);
    }

    #[test]
    fn test_restore_then_deduct_round_trip() {
        let mut product = test_product(10);

        restore_stock(&mut product, 4, Some("order"), Some("o1")).unwrap();
        assert_eq!(product.on_hand, 14);

        deduct_stock(&mut product, 4, None, None).unwrap();
        assert_eq!(product.on_hand, 10);
    }

    #[test]
    fn test_restore_movement_is_refund_typed() {
        let mut product = test_product(0);

        let movement = restore_stock(&mut product, 2, Some("order"), Some("o9")).unwrap();

        assert_eq!(movement.movement_type, MovementType::Refund);
        assert_eq!(movement.quantity, 2);
        assert_eq!(movement.balance_before, 0);
        assert_eq!(movement.balance_after, 2);
        assert!(movement.is_consistent());
    }

    #[test]
    fn test_restore_is_unbounded_above() {
        // No cap on cumulative restorations (matching observed behavior);
        // order-level refund guards bound it in practice
        let mut product = test_product(1);
        restore_stock(&mut product, 999, None, None).unwrap();
        assert_eq!(product.on_hand, 1000);
    }

    #[test]
    fn test_zero_and_negative_mutations_rejected() {
        let mut product = test_product(10);

        assert!(deduct_stock(&mut product, 0, None, None).is_err());
        assert!(deduct_stock(&mut product, -2, None, None).is_err());
        assert!(restore_stock(&mut product, 0, None, None).is_err());
        assert!(receive_stock(&mut product, -1, None, None).is_err());
        assert_eq!(product.on_hand, 10);
    }

    #[test]
    fn test_receive_stock() {
        let mut product = test_product(0);

        let movement = receive_stock(&mut product, 20, None, None).unwrap();

        assert_eq!(product.on_hand, 20);
        assert_eq!(movement.movement_type, MovementType::Inbound);
        assert_eq!(movement.quantity, 20);
    }

    #[test]
    fn test_adjustment_signed_both_ways() {
        let mut product = test_product(10);

        let up = adjust_stock(&mut product, 5, None, None).unwrap();
        assert_eq!(up.quantity, 5);
        assert_eq!(product.on_hand, 15);

        let down = adjust_stock(&mut product, -3, None, None).unwrap();
        assert_eq!(down.quantity, -3);
        assert_eq!(down.movement_type, MovementType::Adjustment);
        assert_eq!(product.on_hand, 12);
    }

    #[test]
    fn test_adjustment_cannot_go_below_zero() {
        let mut product = test_product(2);

        let err = adjust_stock(&mut product, -3, None, None).unwrap_err();
        assert!(matches!(err, CoreError::InsufficientStock { .. }));
        assert_eq!(product.on_hand, 2);

        assert!(adjust_stock(&mut product, 0, None, None).is_err());
    }

    #[test]
    fn test_disposal_is_guarded_like_a_sale() {
        let mut product = test_product(4);

        let movement = dispose_stock(&mut product, 4, None, None).unwrap();
        assert_eq!(movement.movement_type, MovementType::Disposal);
        assert_eq!(movement.quantity, -4);
        assert_eq!(product.on_hand, 0);

        assert!(dispose_stock(&mut product, 1, None, None).is_err());
    }

    #[test]
    fn test_movement_chain_stays_consistent() {
        let mut product = test_product(0);
        let mut movements = Vec::new();

        movements.push(receive_stock(&mut product, 10, None, None).unwrap());
        movements.push(deduct_stock(&mut product, 3, None, None).unwrap());
        movements.push(restore_stock(&mut product, 3, None, None).unwrap());
        movements.push(adjust_stock(&mut product, -2, None, None).unwrap());
        movements.push(dispose_stock(&mut product, 1, None, None).unwrap());

        // Each record is internally consistent and chains onto the next
        for pair in movements.windows(2) {
            assert!(pair[0].is_consistent());
            assert_eq!(pair[0].balance_after, pair[1].balance_before);
        }

        // The latest balance_after equals current on_hand
        assert_eq!(movements.last().unwrap().balance_after, product.on_hand);
        assert_eq!(product.on_hand, 7);
    }
}
