//! # Money Module
//!
//! Provides the `Money` type, the `Rate` type and the ONE rounding function
//! every monetary computation in the workspace goes through.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    17.40 + 25.00 = 42.400000000000006  ❌                               │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    1740 + 2500 = 4240 cents, exactly                                    │
//! │                                                                         │
//! │  Sums never round. Only rate products and averages round, and they     │
//! │  all go through `round_div` (half away from zero).                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use shopdash_core::money::{Money, Rate};
//!
//! let subtotal = Money::from_cents(3400); // 34.00
//! let tax = subtotal.apply_rate(Rate::from_bps(2000)); // 20 %
//! assert_eq!(tax.cents(), 680);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Rounding
// =============================================================================

/// Divides `numerator` by `denominator`, rounding half away from zero.
///
/// This is the single rounding rule of the workspace: tax, discounts,
/// promotion percentages, payment fees and averages all use it, so totals
/// reconcile to the cent. Returns `None` for a zero denominator or a
/// quotient outside `i64`.
///
/// ## Examples
/// ```rust
/// use shopdash_core::money::round_div;
///
/// assert_eq!(round_div(5, 2), Some(3));   //  2.5 →  3
/// assert_eq!(round_div(-5, 2), Some(-3)); // -2.5 → -3
/// assert_eq!(round_div(7, 3), Some(2));   //  2.33 → 2
/// assert_eq!(round_div(0, 7), Some(0));
/// assert_eq!(round_div(1, 0), None);
/// ```
pub fn round_div(numerator: i128, denominator: i128) -> Option<i64> {
    if denominator == 0 {
        return None;
    }

    // Normalize so the denominator is positive
    let (n, d) = if denominator < 0 {
        (numerator.checked_neg()?, denominator.checked_neg()?)
    } else {
        (numerator, denominator)
    };

    // n/d + 1/2 == (2n + d) / 2d; integer division truncates toward zero,
    // so the negative branch mirrors the positive one.
    let twice_n = n.checked_mul(2)?;
    let twice_d = d.checked_mul(2)?;
    let rounded = if n >= 0 {
        twice_n.checked_add(d)? / twice_d
    } else {
        twice_n.checked_sub(d)? / twice_d
    };

    i64::try_from(rounded).ok()
}

// =============================================================================
// Rate
// =============================================================================

/// A rate in basis points (1 bps = 0.01 %).
///
/// ## Rates used by the business
/// - 2000 bps: VAT on every order
/// - 500 bps: bulk discount above 300.00
/// - 290 bps: payment provider fee
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Rate(u32);

impl Rate {
    /// Creates a rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Rate(bps)
    }

    /// Creates a rate from a whole percentage (`15` → 15 %).
    #[inline]
    pub const fn from_percent(percent: u32) -> Self {
        Rate(percent * 100)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero rate.
    #[inline]
    pub const fn zero() -> Self {
        Rate(0)
    }
}

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in cents.
///
/// ## Where Money Flows
/// ```text
/// LineItem.unit_price × quantity ──► Order.subtotal ──► tax / shipping /
///     discount ──► Order.total ──► ContactStats.total_spent
///                               └──► DashboardStats.revenue
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ## Example
    /// ```rust
    /// use shopdash_core::money::Money;
    ///
    /// let price = Money::from_cents(450); // 4.50
    /// assert_eq!(price.cents(), 450);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units.
    ///
    /// ## Example
    /// ```rust
    /// use shopdash_core::money::Money;
    ///
    /// assert_eq!(Money::from_major_minor(9, 90).cents(), 990);
    /// assert_eq!(Money::from_major_minor(-5, 50).cents(), -550);
    /// ```
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns the value as a float in major units (display and ratios only).
    #[inline]
    pub fn as_major_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative.
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Floors the value at zero.
    ///
    /// ## Example
    /// ```rust
    /// use shopdash_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(-5000).floor_at_zero(), Money::zero());
    /// assert_eq!(Money::from_cents(120).floor_at_zero().cents(), 120);
    /// ```
    #[inline]
    pub const fn floor_at_zero(self) -> Self {
        if self.0 < 0 {
            Money(0)
        } else {
            self
        }
    }

    /// Returns `self × rate`, rounded with [`round_div`].
    ///
    /// ## Example
    /// ```rust
    /// use shopdash_core::money::{Money, Rate};
    ///
    /// // 5 % of 300.01 = 15.0005 → 15.00
    /// let discount = Money::from_cents(30001).apply_rate(Rate::from_bps(500));
    /// assert_eq!(discount.cents(), 1500);
    /// ```
    pub fn apply_rate(&self, rate: Rate) -> Money {
        // Only rates above 100 % can leave i64; those saturate.
        let saturated = if self.0 < 0 { i64::MIN } else { i64::MAX };
        Money(round_div(self.0 as i128 * rate.bps() as i128, 10_000).unwrap_or(saturated))
    }

    /// Multiplies money by a quantity, or `None` on overflow.
    ///
    /// ## Example
    /// ```rust
    /// use shopdash_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(450).checked_multiply_quantity(2), Some(Money::from_cents(900)));
    /// assert_eq!(Money::from_cents(i64::MAX).checked_multiply_quantity(2), None);
    /// ```
    #[inline]
    pub const fn checked_multiply_quantity(&self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Adds two amounts, or `None` on overflow.
    #[inline]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Divides money evenly by `count`, rounded with [`round_div`].
    ///
    /// Returns zero when `count` is zero instead of faulting.
    pub fn average(total: Money, count: usize) -> Money {
        if count == 0 {
            return Money::zero();
        }
        // count > 0, and |total / count| ≤ |total|
        Money(round_div(total.0 as i128, count as i128).unwrap_or(total.0))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display shows money with two decimals and no currency symbol.
///
/// The frontend owns localized formatting ("17,40 €").
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + *m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_div_half_away_from_zero() {
        assert_eq!(round_div(15, 10), Some(2));
        assert_eq!(round_div(25, 10), Some(3));
        assert_eq!(round_div(-15, 10), Some(-2));
        assert_eq!(round_div(-25, 10), Some(-3));
        assert_eq!(round_div(14, 10), Some(1));
        assert_eq!(round_div(-14, 10), Some(-1));
    }

    #[test]
    fn test_round_div_odd_denominator() {
        assert_eq!(round_div(5, 3), Some(2));
        assert_eq!(round_div(4, 3), Some(1));
        assert_eq!(round_div(-5, 3), Some(-2));
        assert_eq!(round_div(9, -2), Some(-5));
    }

    #[test]
    fn test_round_div_rejects_zero_denominator_and_overflow() {
        assert_eq!(round_div(1, 0), None);
        assert_eq!(round_div(0, 0), None);
        assert_eq!(round_div(i128::from(i64::MAX) * 4, 2), None);
        assert_eq!(round_div(i128::MIN, -1), None);
    }

    #[test]
    fn test_checked_money_arithmetic() {
        let price = Money::from_cents(450);
        assert_eq!(price.checked_multiply_quantity(3), Some(Money::from_cents(1350)));
        assert_eq!(Money::from_cents(i64::MAX).checked_multiply_quantity(2), None);
        assert_eq!(Money::from_cents(2).checked_multiply_quantity(i64::MAX), None);

        assert_eq!(price.checked_add(price), Some(Money::from_cents(900)));
        assert_eq!(Money::from_cents(i64::MAX).checked_add(Money::from_cents(1)), None);
    }

    #[test]
    fn test_apply_rate_saturates_above_full_rate() {
        let rate = Rate::from_bps(u32::MAX);
        assert_eq!(Money::from_cents(i64::MAX).apply_rate(rate).cents(), i64::MAX);
        assert_eq!(Money::from_cents(i64::MIN).apply_rate(rate).cents(), i64::MIN);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(1740).to_string(), "17.40");
        assert_eq!(Money::from_cents(5).to_string(), "0.05");
        assert_eq!(Money::from_cents(-550).to_string(), "-5.50");
        assert_eq!(Money::zero().to_string(), "0.00");
    }

    #[test]
    fn test_arithmetic_and_sum() {
        let a = Money::from_cents(1740);
        let b = Money::from_cents(2500);

        assert_eq!((a + b).cents(), 4240);
        assert_eq!((b - a).cents(), 760);
        assert_eq!((a * 3).cents(), 5220);

        let total: Money = [a, b].iter().sum();
        assert_eq!(total.cents(), 4240);
    }

    #[test]
    fn test_apply_rate() {
        // 20 % of 34.00
        assert_eq!(Money::from_cents(3400).apply_rate(Rate::from_bps(2000)).cents(), 680);
        // 2.9 % of 17.40 = 0.5046 → 0.50
        assert_eq!(Money::from_cents(1740).apply_rate(Rate::from_bps(290)).cents(), 50);
        // 15 % of 4.50 = 0.675 → 0.68 (half away from zero)
        assert_eq!(Money::from_cents(450).apply_rate(Rate::from_percent(15)).cents(), 68);
    }

    #[test]
    fn test_average_guards_zero_count() {
        assert_eq!(Money::average(Money::from_cents(1000), 0), Money::zero());
        assert_eq!(Money::average(Money::from_cents(1000), 3).cents(), 333);
        assert_eq!(Money::average(Money::from_cents(1001), 2).cents(), 501);
    }

    #[test]
    fn test_floor_at_zero() {
        assert_eq!(Money::from_cents(-1).floor_at_zero(), Money::zero());
        assert_eq!(Money::from_cents(0).floor_at_zero(), Money::zero());
        assert_eq!(Money::from_cents(1).floor_at_zero().cents(), 1);
    }

    #[test]
    fn test_rate_constructors() {
        assert_eq!(Rate::from_percent(20).bps(), 2000);
        assert!((Rate::from_bps(290).percentage() - 2.9).abs() < 1e-9);
    }
}
