//! # Validation Module
//!
//! Input validation for the cart's action surface.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: UI                                                           │
//! │  └── Quantity inputs, product buttons                                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: CartStore (basket-store)                                     │
//! │  └── THIS MODULE: product id + quantity checks, per config policy      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Reducers (cart.rs)                                           │
//! │  └── No checks. Reducers apply whatever they are handed.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use basket_core::validation::{validate_product_id, validate_quantity};
//!
//! assert!(validate_product_id("sku-123").is_ok());
//! assert!(validate_quantity(5).is_ok());
//! assert!(validate_quantity(0).is_err());
//! ```

use crate::error::ValidationError;
use crate::{MAX_ITEM_QUANTITY, MAX_PRODUCT_ID_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validates a product identifier.
///
/// ## Rules
/// - Must not be empty or whitespace only
/// - At most [`MAX_PRODUCT_ID_LEN`] characters
/// - No control characters
pub fn validate_product_id(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "product_id".to_string(),
        });
    }

    if id.chars().count() > MAX_PRODUCT_ID_LEN {
        return Err(ValidationError::TooLong {
            field: "product_id".to_string(),
            max: MAX_PRODUCT_ID_LEN,
        });
    }

    if id.chars().any(char::is_control) {
        return Err(ValidationError::InvalidFormat {
            field: "product_id".to_string(),
            reason: "must not contain control characters".to_string(),
        });
    }

    Ok(())
}

/// Validates a quantity value.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Cart page: quantity input                                              │
/// │                                                                         │
/// │  User types 0                                                          │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_quantity(0) ← THIS FUNCTION (only under the reject policy)   │
/// │       │                                                                 │
/// │       ├── qty <= 0?  → Error: "quantity must be positive"              │
/// │       ├── qty > 999? → Error: "quantity must be between 1 and 999"     │
/// │       └── OK → update_quantity applied                                 │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
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

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_product_id() {
        assert!(validate_product_id("X").is_ok());
        assert!(validate_product_id("550e8400-e29b-41d4").is_ok());
        assert!(validate_product_id("with space").is_ok());

        assert!(matches!(
            validate_product_id(""),
            Err(ValidationError::Required { .. })
        ));
        assert!(validate_product_id("   ").is_err());
        assert!(matches!(
            validate_product_id(&"A".repeat(MAX_PRODUCT_ID_LEN + 1)),
            Err(ValidationError::TooLong { .. })
        ));
        assert!(matches!(
            validate_product_id("bad\nid"),
            Err(ValidationError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(100).is_ok());
        assert!(validate_quantity(999).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(matches!(
            validate_quantity(1000),
            Err(ValidationError::OutOfRange { min: 1, max: 999, .. })
        ));
    }
}
