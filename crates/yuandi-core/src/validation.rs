//! # Validation Module
//!
//! Input validation utilities for YUANDI Collection Management.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Frontend (TypeScript)                                        │
//! │  ├── Basic format checks (empty, length)                               │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Route handler (Rust)                                         │
//! │  ├── Type validation (deserialization)                                 │
//! │  └── THIS MODULE: Business rule validation                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL constraints                                              │
//! │  ├── UNIQUE constraints (sku, order_no)                                │
//! │  └── CHECK constraints (on_hand >= 0)                                  │
//! │                                                                         │
//! │  Defense in depth: Multiple layers catch different errors              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::{ValidationError, ValidationResult};
use crate::MAX_ITEM_QUANTITY;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a SKU (Stock Keeping Unit).
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 50 characters
/// - Should contain only alphanumeric characters, hyphens, underscores
///
/// ## Example
/// ```rust
/// use yuandi_core::validation::validate_sku;
///
/// assert!(validate_sku("BAG-CLAS-BL-CHA-A1B2C").is_ok());
/// assert!(validate_sku("").is_err());
/// assert!(validate_sku("has space").is_err());
/// ```
pub fn validate_sku(sku: &str) -> ValidationResult<()> {
    let sku = sku.trim();

    if sku.is_empty() {
        return Err(ValidationError::Required {
            field: "sku".to_string(),
        });
    }

    if sku.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "sku".to_string(),
            max: 50,
        });
    }

    if !sku
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "sku".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a customer name.
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 100 characters
pub fn validate_customer_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "customer_name".to_string(),
        });
    }

    if name.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: "customer_name".to_string(),
            max: 100,
        });
    }

    Ok(())
}

/// Validates an order number against the `ORD-YYMMDD-NNN` shape.
///
/// ## Example
/// ```rust
/// use yuandi_core::validation::validate_order_no;
///
/// assert!(validate_order_no("ORD-240823-001").is_ok());
/// assert!(validate_order_no("ORD-240823-1042").is_ok()); // widened sequence
/// assert!(validate_order_no("240823-001").is_err());
/// ```
pub fn validate_order_no(order_no: &str) -> ValidationResult<()> {
    let invalid = |reason: &str| ValidationError::InvalidFormat {
        field: "order_no".to_string(),
        reason: reason.to_string(),
    };

    let mut parts = order_no.split('-');
    let (prefix, date, seq) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(p), Some(d), Some(s), None) => (p, d, s),
        _ => return Err(invalid("expected ORD-YYMMDD-NNN")),
    };

    if prefix != crate::order_number::ORDER_NO_PREFIX {
        return Err(invalid("must start with 'ORD-'"));
    }

    if date.len() != 6 || !date.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid("date part must be 6 digits (YYMMDD)"));
    }

    if seq.len() < 3 || !seq.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid("sequence part must be at least 3 digits"));
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity value.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price/amount in minor units.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (samples, giveaways)
pub fn validate_price(minor: i64) -> ValidationResult<()> {
    if minor < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string format.
///
/// ## Example
/// ```rust
/// use yuandi_core::validation::validate_uuid;
///
/// assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("not-a-uuid").is_err());
/// ```
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_sku() {
        assert!(validate_sku("BAG-CLAS-BL-CHA-A1B2C").is_ok());
        assert!(validate_sku("ABC123").is_ok());
        assert!(validate_sku("product_1").is_ok());

        assert!(validate_sku("").is_err());
        assert!(validate_sku("   ").is_err());
        assert!(validate_sku("has space").is_err());
        assert!(validate_sku(&"A".repeat(100)).is_err());
    }

    #[test]
    fn test_validate_customer_name() {
        assert!(validate_customer_name("김철수").is_ok());
        assert!(validate_customer_name("Wang Wei").is_ok());
        assert!(validate_customer_name("").is_err());
        // 100-char limit counts characters, not bytes
        assert!(validate_customer_name(&"가".repeat(100)).is_ok());
        assert!(validate_customer_name(&"가".repeat(101)).is_err());
    }

    #[test]
    fn test_validate_order_no() {
        assert!(validate_order_no("ORD-240823-001").is_ok());
        assert!(validate_order_no("ORD-240823-999").is_ok());
        assert!(validate_order_no("ORD-240823-1000").is_ok());

        assert!(validate_order_no("").is_err());
        assert!(validate_order_no("ORD-240823").is_err());
        assert!(validate_order_no("ORD-240823-001-X").is_err());
        assert!(validate_order_no("XYZ-240823-001").is_err());
        assert!(validate_order_no("ORD-2408-001").is_err());
        assert!(validate_order_no("ORD-240823-01").is_err());
        assert!(validate_order_no("ORD-24O823-001").is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_price() {
        assert!(validate_price(0).is_ok());
        assert!(validate_price(1_500_000).is_ok());
        assert!(validate_price(-100).is_err());
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_uuid("").is_err());
        assert!(validate_uuid("not-a-uuid").is_err());
        assert!(validate_uuid("123").is_err());
    }
}
