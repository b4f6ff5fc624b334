//! # Error Types
//!
//! Domain-specific error types for shopdash-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  shopdash-core errors (this file)                                      │
//! │  ├── CoreError        - Derivation failures                            │
//! │  └── ValidationError  - Malformed entity rows (InvalidInput)           │
//! │                                                                         │
//! │  shopdash-db errors (separate crate)                                   │
//! │  └── DbError          - Repository failures, wraps CoreError           │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → caller                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Empty Input Is Not An Error
//! Zero orders, zero reviews or zero contacts yield neutral results
//! (0, 0.0, empty sequences). No variant exists for them.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core derivation errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// More than one promotion qualifies for the same product at the same time.
    ///
    /// ## When This Occurs
    /// Only from the strict resolver
    /// ([`resolve_unique_active_promotion`](crate::promotion::resolve_unique_active_promotion)).
    /// The default resolver keeps the first match in input order.
    #[error("Product {product_id} has {} overlapping active promotions: {promotion_ids:?}", promotion_ids.len())]
    AmbiguousPromotion {
        product_id: String,
        promotion_ids: Vec<String>,
    },

    /// A revenue objective must be strictly positive.
    #[error("Revenue objective must be positive, got {cents} cents")]
    InvalidObjective { cents: i64 },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Core functions reject malformed rows rather than coercing them.
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

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Invalid format (e.g., invalid UUID, unknown enum value).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// A stored derived value disagrees with the value recomputed from its parts.
    #[error("{field} is {actual} but should be {expected}")]
    Mismatch {
        field: String,
        expected: i64,
        actual: i64,
    },
}

impl ValidationError {
    /// Shorthand for [`ValidationError::Required`].
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }

    /// Shorthand for [`ValidationError::Negative`].
    pub fn negative(field: impl Into<String>) -> Self {
        ValidationError::Negative {
            field: field.into(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::AmbiguousPromotion {
            product_id: "3".to_string(),
            promotion_ids: vec!["promo_1".to_string(), "promo_2".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Product 3 has 2 overlapping active promotions: [\"promo_1\", \"promo_2\"]"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        assert_eq!(ValidationError::required("name").to_string(), "name is required");

        let err = ValidationError::Mismatch {
            field: "subtotal_cents".to_string(),
            expected: 900,
            actual: 950,
        };
        assert_eq!(err.to_string(), "subtotal_cents is 950 but should be 900");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::negative("price").into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
