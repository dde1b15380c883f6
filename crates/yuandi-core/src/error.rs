//! # Error Types
//!
//! Domain-specific error types for yuandi-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  yuandi-core errors (this file)                                        │
//! │  ├── CoreError        - General domain errors                          │
//! │  ├── ValidationError  - Input validation failures                      │
//! │  └── PcccError        - Customs code failures (pccc module)            │
//! │                                                                         │
//! │  yuandi-db errors (separate crate)                                     │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → route handler           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (SKU, order number, etc.)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

use crate::pccc::PcccError;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations or domain logic failures.
/// They should be caught and translated to user-friendly messages.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product cannot be found.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Insufficient stock to satisfy a deduction.
    ///
    /// ## When This Occurs
    /// - Order intake requests more than `on_hand`
    /// - Disposal requests more than `on_hand`
    ///
    /// ## User Workflow
    /// ```text
    /// Order item (qty: 5)
    ///      │
    ///      ▼
    /// check_stock: available=3
    ///      │
    ///      ▼
    /// InsufficientStock { sku: "BAG-...", available: 3, requested: 5 }
    ///      │
    ///      ▼
    /// UI shows: "재고 부족 — 3 available, 5 requested"
    /// ```
    #[error("Insufficient stock for {sku}: available {available}, requested {requested}")]
    InsufficientStock {
        sku: String,
        available: i64,
        requested: i64,
    },

    /// Order not found.
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// Order is not in a state that allows the requested transition.
    ///
    /// ## When This Occurs
    /// - Shipping an order that is already DONE
    /// - Marking a REFUNDED order as delivered
    #[error("Order {order_no} is {current}, cannot transition to {requested}")]
    InvalidStatusTransition {
        order_no: String,
        current: String,
        requested: String,
    },

    /// Refund requested for an order that was already refunded.
    ///
    /// Stock restoration runs at most once per order; a second refund
    /// request must not double-restore.
    #[error("Order {order_no} was already refunded")]
    AlreadyRefunded { order_no: String },

    /// Order has no line items.
    #[error("Order must contain at least one item")]
    EmptyOrder,

    /// Order total does not equal the sum of its item subtotals.
    #[error("Order total mismatch: expected {expected}, got {actual}")]
    TotalMismatch { expected: i64, actual: i64 },

    /// Customs code error (wraps PcccError).
    #[error("Customs code error: {0}")]
    Pccc(#[from] PcccError),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Number of units missing for an [`CoreError::InsufficientStock`] error.
    ///
    /// Returns `None` for every other variant.
    ///
    /// ## Example
    /// ```rust
    /// use yuandi_core::error::CoreError;
    ///
    /// let err = CoreError::InsufficientStock {
    ///     sku: "BAG".to_string(),
    ///     available: 3,
    ///     requested: 5,
    /// };
    /// assert_eq!(err.shortage(), Some(2));
    /// ```
    pub fn shortage(&self) -> Option<i64> {
        match self {
            CoreError::InsufficientStock {
                available,
                requested,
                ..
            } => Some((requested - available).max(0)),
            _ => None,
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
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

    /// Value must be zero or greater.
    #[error("{field} must not be negative")]
    MustBeNonNegative { field: String },

    /// Invalid format (e.g., invalid UUID, malformed order number).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

/// Convenience type alias for Results with ValidationError.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            sku: "BAG-CLAS-BK-CHA-A1B2C".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for BAG-CLAS-BK-CHA-A1B2C: available 3, requested 5"
        );
    }

    #[test]
    fn test_shortage_is_derived() {
        let err = CoreError::InsufficientStock {
            sku: "X".to_string(),
            available: 0,
            requested: 1,
        };
        assert_eq!(err.shortage(), Some(1));

        assert_eq!(CoreError::EmptyOrder.shortage(), None);
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "customer_name".to_string(),
        };
        assert_eq!(err.to_string(), "customer_name is required");

        let err = ValidationError::MustBeNonNegative {
            field: "quantity".to_string(),
        };
        assert_eq!(err.to_string(), "quantity must not be negative");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "sku".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
