//! # Promotion Resolver
//!
//! Decides which promotion, if any, prices a product at a given instant.
//!
//! ## Activity Rule
//! ```text
//! active(promo, product, now) ⇔ promo.is_active
//!                              ∧ product ∈ promo.product_ids
//!                              ∧ start_date ≤ date(now) ≤ end_date
//! ```
//! `now` is reduced to its UTC calendar date, so a promotion ending on
//! 2025-01-31 is still active at 2025-01-31T23:59:59Z.
//!
//! ## Overlapping Promotions
//! [`resolve_active_promotion`] keeps the first qualifying promotion in the
//! order the slice was given. Callers that want another priority sort the
//! slice before resolving. [`resolve_unique_active_promotion`] reports the
//! overlap as [`CoreError::AmbiguousPromotion`] instead, and
//! [`find_promotion_conflicts`] lists every overlapping product.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Discount, Product, Promotion};
use crate::validation::ValidationResult;

/// Returns true if `promotion` is running on `today`, regardless of products.
#[inline]
fn is_running_on(promotion: &Promotion, today: NaiveDate) -> bool {
    promotion.is_active && promotion.start_date <= today && today <= promotion.end_date
}

/// Returns true if `promotion` applies to `product_id` at `now`.
pub fn is_active_for(promotion: &Promotion, product_id: &str, now: DateTime<Utc>) -> bool {
    is_running_on(promotion, now.date_naive()) && promotion.covers(product_id)
}

/// Returns the first promotion active for `product_id` at `now`.
///
/// ## Example
/// ```rust,ignore
/// let promo = resolve_active_promotion("3", &promotions, Utc::now());
/// let price = match promo {
///     Some(p) => apply_discount(product.price(), p)?,
///     None => product.price(),
/// };
/// ```
pub fn resolve_active_promotion<'a>(
    product_id: &str,
    promotions: &'a [Promotion],
    now: DateTime<Utc>,
) -> Option<&'a Promotion> {
    promotions
        .iter()
        .find(|promo| is_active_for(promo, product_id, now))
}

/// Like [`resolve_active_promotion`], but fails when more than one
/// promotion qualifies.
pub fn resolve_unique_active_promotion<'a>(
    product_id: &str,
    promotions: &'a [Promotion],
    now: DateTime<Utc>,
) -> CoreResult<Option<&'a Promotion>> {
    let matching: Vec<&Promotion> = promotions
        .iter()
        .filter(|promo| is_active_for(promo, product_id, now))
        .collect();

    match matching.as_slice() {
        [] => Ok(None),
        [only] => Ok(Some(*only)),
        many => Err(CoreError::AmbiguousPromotion {
            product_id: product_id.to_string(),
            promotion_ids: many.iter().map(|p| p.id.clone()).collect(),
        }),
    }
}

/// A product covered by more than one active promotion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PromotionConflict {
    pub product_id: String,
    /// Qualifying promotions, in input order. The first one wins.
    pub promotion_ids: Vec<String>,
}

/// Lists every product in `product_ids` with overlapping active promotions.
pub fn find_promotion_conflicts<'a, I>(
    product_ids: I,
    promotions: &[Promotion],
    now: DateTime<Utc>,
) -> Vec<PromotionConflict>
where
    I: IntoIterator<Item = &'a str>,
{
    product_ids
        .into_iter()
        .filter_map(|product_id| {
            match resolve_unique_active_promotion(product_id, promotions, now) {
                Err(CoreError::AmbiguousPromotion {
                    product_id,
                    promotion_ids,
                }) => Some(PromotionConflict {
                    product_id,
                    promotion_ids,
                }),
                _ => None,
            }
        })
        .collect()
}

/// Returns the promotions running at `now`, in input order.
pub fn running_promotions(promotions: &[Promotion], now: DateTime<Utc>) -> Vec<&Promotion> {
    let today = now.date_naive();
    promotions
        .iter()
        .filter(|promo| is_running_on(promo, today))
        .collect()
}

// =============================================================================
// Discount Application
// =============================================================================

/// Applies `promotion`'s discount to `price`.
///
/// - Percentage: `price − round(price × rate)`
/// - Fixed: `price − value`
///
/// The result is floored at zero. A promotion whose raw value is out of
/// range is rejected instead of priced.
///
/// ## Example
/// ```rust
/// use shopdash_core::money::Money;
/// use shopdash_core::promotion::apply_discount_value;
/// use shopdash_core::types::Discount;
///
/// let fixed = Discount::Fixed(Money::from_cents(10_000));
/// assert_eq!(apply_discount_value(Money::from_cents(5_000), fixed), Money::zero());
/// ```
pub fn apply_discount(price: Money, promotion: &Promotion) -> ValidationResult<Money> {
    Ok(apply_discount_value(price, promotion.discount()?))
}

/// Applies a typed discount to `price`, floored at zero.
pub fn apply_discount_value(price: Money, discount: Discount) -> Money {
    let reduced = match discount {
        Discount::Percentage(rate) => price - price.apply_rate(rate),
        Discount::Fixed(amount) => price - amount,
    };
    reduced.floor_at_zero()
}

/// A product's price after promotion resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PricedProduct {
    pub product_id: String,
    pub base_price: Money,
    pub final_price: Money,
    /// The promotion that produced `final_price`, if any.
    pub promotion_id: Option<String>,
}

impl PricedProduct {
    /// Amount saved thanks to the promotion.
    #[inline]
    pub fn savings(&self) -> Money {
        self.base_price - self.final_price
    }

    #[inline]
    pub fn is_discounted(&self) -> bool {
        self.promotion_id.is_some()
    }
}

/// Resolves the active promotion for `product` and prices it.
///
/// Fails when the winning promotion carries an out-of-range value.
pub fn price_product(
    product: &Product,
    promotions: &[Promotion],
    now: DateTime<Utc>,
) -> ValidationResult<PricedProduct> {
    let base_price = product.price();
    let promotion = resolve_active_promotion(&product.id, promotions, now);

    let final_price = match promotion {
        Some(promo) => apply_discount(base_price, promo)?,
        None => base_price,
    };

    Ok(PricedProduct {
        product_id: product.id.clone(),
        base_price,
        final_price,
        promotion_id: promotion.map(|promo| promo.id.clone()),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
