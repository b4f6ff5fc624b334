//! # Order Totals
//!
//! Computes the monetary fields of an order from its line items, and the
//! provider fee of a payment.
//!
//! ## Business Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  subtotal = Σ quantity × unit_price                                     │
//! │  shipping = 0            if subtotal >  200.00                          │
//! │           = flat rate    otherwise (9.90 unless configured)             │
//! │  tax      = subtotal × 20 %                                             │
//! │  discount = subtotal × 5 % if subtotal > 300.00, else 0                 │
//! │  total    = subtotal + shipping + tax − discount                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! Both thresholds are strict: exactly 200.00 still pays shipping, exactly
//! 300.00 gets no discount.
//!
//! Only the shipping flat rate is configurable ([`PricingPolicy`]). The
//! thresholds and rates are fixed business policy.
//!
//! ## Example
//! ```rust
//! use shopdash_core::totals::{build_line_item, compute_order_totals, PricingPolicy};
//! use shopdash_core::money::Money;
//!
//! let items = vec![
//!     build_line_item("1", "Bougie", 2, Money::from_cents(450)).unwrap(),
//!     build_line_item("2", "Coffret", 1, Money::from_cents(2500)).unwrap(),
//! ];
//! let totals = compute_order_totals(&items, &PricingPolicy::default()).unwrap();
//! assert_eq!(totals.total.cents(), 5070);
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreResult;
use crate::money::{Money, Rate};
use crate::types::LineItem;
use crate::validation::{
    line_subtotal, sum_subtotals, validate_line_item, validate_name, ValidationResult,
};

// =============================================================================
// Fixed Policy
// =============================================================================

/// Subtotals strictly above this ship for free (200.00).
pub const FREE_SHIPPING_THRESHOLD: Money = Money::from_cents(20_000);

/// Subtotals strictly above this get the bulk discount (300.00).
pub const BULK_DISCOUNT_THRESHOLD: Money = Money::from_cents(30_000);

/// VAT applied to every subtotal (20 %).
pub const TAX_RATE: Rate = Rate::from_bps(2000);

/// Bulk discount rate (5 %).
pub const BULK_DISCOUNT_RATE: Rate = Rate::from_bps(500);

/// Flat shipping rate observed in production data (9.90).
pub const DEFAULT_SHIPPING_FLAT_RATE: Money = Money::from_cents(990);

// =============================================================================
// Pricing Policy
// =============================================================================

/// Deployment-tunable part of the order pricing rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingPolicy {
    /// Shipping charged when the subtotal does not exceed the free threshold.
    pub shipping_flat_rate: Money,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            shipping_flat_rate: DEFAULT_SHIPPING_FLAT_RATE,
        }
    }
}

// =============================================================================
// Order Totals
// =============================================================================

/// The computed monetary fields of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderTotals {
    pub subtotal: Money,
    pub shipping: Money,
    pub tax: Money,
    pub discount: Money,
    pub total: Money,
}

impl OrderTotals {
    /// Applies the pricing rules to an already-summed subtotal.
    pub fn from_subtotal(subtotal: Money, policy: &PricingPolicy) -> Self {
        let shipping = if subtotal > FREE_SHIPPING_THRESHOLD {
            Money::zero()
        } else {
            policy.shipping_flat_rate
        };

        let tax = subtotal.apply_rate(TAX_RATE);

        let discount = if subtotal > BULK_DISCOUNT_THRESHOLD {
            subtotal.apply_rate(BULK_DISCOUNT_RATE)
        } else {
            Money::zero()
        };

        // Each component is already whole cents, so the total is exact
        let total = subtotal + shipping + tax - discount;

        Self {
            subtotal,
            shipping,
            tax,
            discount,
            total,
        }
    }

    /// Returns true if shipping was waived.
    #[inline]
    pub fn has_free_shipping(&self) -> bool {
        self.shipping.is_zero()
    }
}

/// Computes the totals of an order from its line items.
///
/// Every item is validated first (quantity ≥ 1, unit price ≥ 0, stored
/// subtotal consistent); the first malformed item aborts the computation.
/// An empty item list yields a zero subtotal (shipping still applies).
/// A subtotal above [`MAX_AMOUNT_CENTS`](crate::MAX_AMOUNT_CENTS) is rejected.
pub fn compute_order_totals(items: &[LineItem], policy: &PricingPolicy) -> CoreResult<OrderTotals> {
    for item in items {
        validate_line_item(item)?;
    }

    let subtotal = sum_subtotals(items.iter().map(LineItem::subtotal))?;

    Ok(OrderTotals::from_subtotal(subtotal, policy))
}

/// Builds a validated line item, freezing name and unit price.
pub fn build_line_item(
    product_id: impl Into<String>,
    product_name: impl Into<String>,
    quantity: i64,
    unit_price: Money,
) -> ValidationResult<LineItem> {
    let subtotal = line_subtotal(quantity, unit_price)?;
    let item = LineItem {
        product_id: product_id.into(),
        product_name: product_name.into(),
        quantity,
        unit_price_cents: unit_price.cents(),
        subtotal_cents: subtotal.cents(),
    };
    validate_name("product_name", &item.product_name)?;
    validate_line_item(&item)?;
    Ok(item)
}

// =============================================================================
// Payment Fees
// =============================================================================

/// Provider fee schedule: a percentage of the amount plus a fixed part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentFeePolicy {
    pub rate: Rate,
    pub fixed: Money,
}

impl Default for PaymentFeePolicy {
    /// 2.9 % + 0.25, the schedule observed on card payments.
    fn default() -> Self {
        Self {
            rate: Rate::from_bps(290),
            fixed: Money::from_cents(25),
        }
    }
}

/// Fee and net amount of a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PaymentFees {
    pub fee: Money,
    /// `amount − fee`, exactly.
    pub net: Money,
}

/// Computes the provider fee and the net amount for `amount`.
///
/// ## Example
/// ```rust
/// use shopdash_core::money::Money;
/// use shopdash_core::totals::{compute_payment_fees, PaymentFeePolicy};
///
/// let fees = compute_payment_fees(Money::from_cents(5070), &PaymentFeePolicy::default());
/// assert_eq!(fees.fee.cents(), 172); // 1.4703 + 0.25 → 1.47 + 0.25
/// assert_eq!(fees.net.cents(), 4898);
/// ```
pub fn compute_payment_fees(amount: Money, policy: &PaymentFeePolicy) -> PaymentFees {
    let fee = amount.apply_rate(policy.rate) + policy.fixed;
    PaymentFees {
        fee,
        net: amount - fee,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
