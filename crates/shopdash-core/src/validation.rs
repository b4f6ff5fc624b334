//! # Validation Module
//!
//! Input validation for rows entering the derivation core.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Repository decode (shopdash-db)                              │
//! │  ├── Unknown enum values, malformed JSON columns                       │
//! │  └── Row → domain type conversion                                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Field rules (positive quantity, non-negative price, 1..=5 stars)  │
//! │  └── Stored derived values (subtotal, total, net amount)               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Malformed rows are rejected, never coerced.
//!
//! ## Usage
//! ```rust,no_run
//! use shopdash_core::validation::{validate_sku, validate_quantity};
//!
//! validate_sku("BG-ANGEL-001").unwrap();
//! validate_quantity(2).unwrap();
//! ```

use crate::error::ValidationError;
use crate::money::{Money, Rate};
use crate::types::{
    Contact, Discount, DiscountType, LineItem, Order, Payment, Product, Promotion, Review,
};
use crate::{MAX_AMOUNT_CENTS, MAX_ITEM_QUANTITY, MAX_NAME_LENGTH, MAX_SEARCH_LENGTH};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a SKU (Stock Keeping Unit).
///
/// ## Rules
/// - Must not be empty
/// - At most 50 characters
/// - Only alphanumeric characters, hyphens and underscores
///
/// ## Example
/// ```rust
/// use shopdash_core::validation::validate_sku;
///
/// assert!(validate_sku("BG-ANGEL-001").is_ok());
/// assert!(validate_sku("").is_err());
/// assert!(validate_sku("A".repeat(100).as_str()).is_err());
/// ```
pub fn validate_sku(sku: &str) -> ValidationResult<()> {
    let sku = sku.trim();

    if sku.is_empty() {
        return Err(ValidationError::required("sku"));
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

/// Validates a display name (product, promotion, contact).
///
/// ## Example
/// ```rust
/// use shopdash_core::validation::validate_name;
///
/// assert!(validate_name("name", "Bougie Angel").is_ok());
/// assert!(validate_name("name", "  ").is_err());
/// ```
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::required(field));
    }

    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LENGTH,
        });
    }

    Ok(())
}

/// Validates a search term and returns it trimmed.
///
/// Empty is allowed (matches everything).
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > MAX_SEARCH_LENGTH {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: MAX_SEARCH_LENGTH,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line-item quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY
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

/// Validates a price in cents. Zero is allowed, up to [`MAX_AMOUNT_CENTS`].
///
/// ## Example
/// ```rust
/// use shopdash_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents(4500).is_ok());
/// assert!(validate_price_cents(0).is_ok());
/// assert!(validate_price_cents(-100).is_err());
/// assert!(validate_price_cents(i64::MAX).is_err());
/// ```
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    validate_non_negative("price", cents)?;
    validate_amount_bound("price", cents)
}

/// Validates a payment amount in cents (> 0).
pub fn validate_payment_amount(cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "amount".to_string(),
        });
    }

    validate_amount_bound("amount", cents)
}

/// Computes `quantity × unit_price` for a line item.
///
/// Quantity and price are validated first, so the product never overflows
/// silently; a product above [`MAX_AMOUNT_CENTS`] is rejected.
pub fn line_subtotal(quantity: i64, unit_price: Money) -> ValidationResult<Money> {
    validate_quantity(quantity)?;
    validate_price_cents(unit_price.cents())?;

    let subtotal = unit_price
        .checked_multiply_quantity(quantity)
        .ok_or_else(|| amount_out_of_range("subtotal_cents"))?;
    validate_amount_bound("subtotal_cents", subtotal.cents())?;
    Ok(subtotal)
}

/// Sums line subtotals, rejecting a sum above [`MAX_AMOUNT_CENTS`].
pub fn sum_subtotals(subtotals: impl IntoIterator<Item = Money>) -> ValidationResult<Money> {
    let mut sum = Money::zero();
    for subtotal in subtotals {
        sum = sum
            .checked_add(subtotal)
            .ok_or_else(|| amount_out_of_range("subtotal_cents"))?;
    }
    validate_amount_bound("subtotal_cents", sum.cents())?;
    Ok(sum)
}

/// Validates a rate in basis points (0 to 10000).
pub fn validate_rate_bps(field: &str, bps: i64) -> ValidationResult<()> {
    if !(0..=10_000).contains(&bps) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: 10_000,
        });
    }

    Ok(())
}

fn validate_non_negative(field: &str, value: i64) -> ValidationResult<()> {
    if value < 0 {
        return Err(ValidationError::negative(field));
    }
    Ok(())
}

fn validate_amount_bound(field: &str, cents: i64) -> ValidationResult<()> {
    if cents > MAX_AMOUNT_CENTS {
        return Err(amount_out_of_range(field));
    }
    Ok(())
}

fn amount_out_of_range(field: &str) -> ValidationError {
    ValidationError::OutOfRange {
        field: field.to_string(),
        min: 0,
        max: MAX_AMOUNT_CENTS,
    }
}

fn validate_matches(field: &str, expected: i64, actual: i64) -> ValidationResult<()> {
    if expected != actual {
        return Err(ValidationError::Mismatch {
            field: field.to_string(),
            expected,
            actual,
        });
    }
    Ok(())
}

// =============================================================================
// Entity Validators
// =============================================================================

/// Validates a line item, including its stored subtotal.
pub fn validate_line_item(item: &LineItem) -> ValidationResult<()> {
    if item.product_id.trim().is_empty() {
        return Err(ValidationError::required("product_id"));
    }
    let expected = line_subtotal(item.quantity, item.unit_price())?;
    validate_matches("subtotal_cents", expected.cents(), item.subtotal_cents)
}

/// Validates an order's items and its stored monetary fields.
///
/// ## Identities
/// ```text
/// subtotal = Σ item.subtotal
/// total    = subtotal + shipping + tax − discount
/// ```
pub fn validate_order(order: &Order) -> ValidationResult<()> {
    if order.contact_id.trim().is_empty() {
        return Err(ValidationError::required("contact_id"));
    }

    for item in &order.items {
        validate_line_item(item)?;
    }

    validate_non_negative("shipping_cents", order.shipping_cents)?;
    validate_non_negative("tax_cents", order.tax_cents)?;
    validate_non_negative("discount_cents", order.discount_cents)?;

    validate_non_negative("subtotal_cents", order.subtotal_cents)?;
    validate_amount_bound("subtotal_cents", order.subtotal_cents)?;
    validate_amount_bound("shipping_cents", order.shipping_cents)?;
    validate_amount_bound("tax_cents", order.tax_cents)?;
    validate_amount_bound("discount_cents", order.discount_cents)?;

    // Orders created by hand may carry no items; only check the sum when they do
    if !order.items.is_empty() {
        let items_subtotal = sum_subtotals(order.items.iter().map(LineItem::subtotal))?;
        validate_matches("subtotal_cents", items_subtotal.cents(), order.subtotal_cents)?;
    }

    // Every term is bounded by MAX_AMOUNT_CENTS, so this cannot overflow
    validate_matches(
        "total_cents",
        order.subtotal_cents + order.shipping_cents + order.tax_cents - order.discount_cents,
        order.total_cents,
    )
}

/// Validates a payment's amounts (`net = amount − fee`).
pub fn validate_payment(payment: &Payment) -> ValidationResult<()> {
    validate_payment_amount(payment.amount_cents)?;
    validate_non_negative("fee_cents", payment.fee_cents)?;
    validate_amount_bound("fee_cents", payment.fee_cents)?;
    validate_matches(
        "net_amount_cents",
        payment.amount_cents - payment.fee_cents,
        payment.net_amount_cents,
    )
}

/// Validates a catalog product.
pub fn validate_product(product: &Product) -> ValidationResult<()> {
    validate_name("name", &product.name)?;
    if let Some(sku) = &product.sku {
        validate_sku(sku)?;
    }
    validate_price_cents(product.price_cents)?;
    validate_non_negative("stock_quantity", product.stock_quantity)?;
    validate_non_negative("low_stock_threshold", product.low_stock_threshold)
}

/// Checks a raw promotion value and returns it typed.
///
/// ## Rules
/// - Percentage: 0 to 10000 basis points
/// - Fixed: 0 to [`MAX_AMOUNT_CENTS`]
pub fn typed_discount(discount_type: DiscountType, value: i64) -> ValidationResult<Discount> {
    match discount_type {
        DiscountType::Percentage => {
            validate_rate_bps("discount_value", value)?;
            Ok(Discount::Percentage(Rate::from_bps(value as u32)))
        }
        DiscountType::Fixed => {
            validate_non_negative("discount_value", value)?;
            validate_amount_bound("discount_value", value)?;
            Ok(Discount::Fixed(Money::from_cents(value)))
        }
    }
}

/// Validates a promotion's value and window.
pub fn validate_promotion(promotion: &Promotion) -> ValidationResult<()> {
    validate_name("name", &promotion.name)?;

    typed_discount(promotion.discount_type, promotion.discount_value)?;

    if promotion.end_date < promotion.start_date {
        return Err(ValidationError::InvalidFormat {
            field: "end_date".to_string(),
            reason: format!(
                "{} is before start_date {}",
                promotion.end_date, promotion.start_date
            ),
        });
    }

    Ok(())
}

/// Validates a review rating (1 to 5 stars).
pub fn validate_review(review: &Review) -> ValidationResult<()> {
    if !(1..=5).contains(&review.rating) {
        return Err(ValidationError::OutOfRange {
            field: "rating".to_string(),
            min: 1,
            max: 5,
        });
    }
    Ok(())
}

/// Validates a contact.
pub fn validate_contact(contact: &Contact) -> ValidationResult<()> {
    validate_name("username", &contact.username)?;
    validate_name("full_name", &contact.full_name)?;
    validate_non_negative("total_messages", contact.total_messages)
}

// =============================================================================
// Unit Tests
// =============================================================================
