//! # Money Module
//!
//! Provides the `Money` type for monetary values and the `Rate` type for
//! percentages (tax rates, margins, utilization, growth).
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  A dashboard summing invoice balances in floating point:                │
//! │    13500.10 + 13840.20 = 27340.299999999996  ❌ WRONG!                  │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    1350010 + 1384020 = 2734030 cents = $27340.30                        │
//! │                                                                         │
//! │  Sums are exact, associative and commutative, so aggregates do not     │
//! │  depend on the order the filtered rows arrive in.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use oakline_core::money::{Money, Rate};
//!
//! let subtotal = Money::from_major(28_000);
//! let tax = subtotal.apply_rate(Rate::from_bps(800)); // 8%
//! assert_eq!(tax, Money::from_major(2_240));
//!
//! let used = Money::from_major(16_000);
//! let limit = Money::from_major(150_000);
//! assert_eq!(Rate::ratio(used, limit).map(|r| r.bps()), Some(1067));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in cents.
///
/// ## Design Decisions
/// - **i64 (signed)**: account balances may be negative (contra accounts,
///   overdrafts) and stock movements may reverse charges
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Serde transparent**: serialises as a plain integer of cents
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[serde(transparent)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ```rust
    /// use oakline_core::money::Money;
    ///
    /// let price = Money::from_cents(1099);
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from whole currency units.
    ///
    /// Fixture amounts are whole dollars, so this keeps them readable.
    #[inline]
    pub const fn from_major(major: i64) -> Self {
        Money(major * 100)
    }

    /// Creates a Money value from major and minor units.
    ///
    /// For negative amounts, only the major unit should be negative:
    /// `from_major_minor(-5, 50)` is -$5.50.
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

    /// Returns the whole-unit portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the cents portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
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

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Multiplies money by a quantity.
    ///
    /// ```rust
    /// use oakline_core::money::Money;
    ///
    /// let unit_price = Money::from_major(1_800);
    /// assert_eq!(unit_price.multiply_quantity(10), Money::from_major(18_000));
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Like [`multiply_quantity`](Self::multiply_quantity), but `None` on
    /// overflow. Use it for caller-supplied quantities.
    #[inline]
    pub const fn checked_multiply_quantity(&self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Applies a rate and returns the resulting portion, rounded half up.
    ///
    /// Used for tax on a subtotal and for percentage discounts.
    ///
    /// ## Implementation
    /// Integer math: `(amount * bps + 5000) / 10000`, widened to i128 so
    /// large ledger balances cannot overflow.
    pub fn apply_rate(&self, rate: Rate) -> Money {
        let scaled = self.0 as i128 * rate.bps() as i128;
        let rounded = if scaled >= 0 {
            (scaled + 5000) / 10000
        } else {
            (scaled - 5000) / 10000
        };
        Money(rounded as i64)
    }

    /// Divides money evenly by a count, rounding toward zero.
    ///
    /// Returns zero for a zero count, which keeps averages over empty
    /// filtered sets at zero instead of propagating a division error.
    pub fn average_over(&self, count: usize) -> Money {
        if count == 0 {
            return Money::zero();
        }
        Money(self.0 / count as i64)
    }

    /// Returns the smaller of two values.
    #[inline]
    pub fn min(self, other: Money) -> Money {
        if self.0 <= other.0 {
            self
        } else {
            other
        }
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Debug-friendly display. Currency-aware formatting lives in the
/// dashboard configuration.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            self.dollars().abs(),
            self.cents_part()
        )
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

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
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
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Rate
// =============================================================================

/// A rate in basis points (1 bps = 0.01%).
///
/// ## Why Basis Points?
/// 800 bps = 8% sales tax, 1067 bps = 10.67% credit utilization. Signed so
/// that month-over-month growth can be negative.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[serde(transparent)]
#[ts(export)]
pub struct Rate(i64);

impl Rate {
    /// Creates a rate from basis points.
    #[inline]
    pub const fn from_bps(bps: i64) -> Self {
        Rate(bps)
    }

    /// Creates a rate from a percentage (8.25 → 825 bps).
    pub fn from_percentage(pct: f64) -> Self {
        Rate((pct * 100.0).round() as i64)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> i64 {
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

    /// Computes `part / whole` as a rate, rounded half away from zero.
    ///
    /// Returns `None` when `whole` is zero. That is the case where a
    /// naive percentage computation would produce NaN.
    ///
    /// ```rust
    /// use oakline_core::money::{Money, Rate};
    ///
    /// assert_eq!(Rate::ratio(Money::from_major(1), Money::from_major(4)), Some(Rate::from_bps(2500)));
    /// assert_eq!(Rate::ratio(Money::from_major(1), Money::zero()), None);
    /// ```
    pub fn ratio(part: Money, whole: Money) -> Option<Rate> {
        Self::ratio_of(part.cents(), whole.cents())
    }

    /// Computes `part / whole` for plain counts.
    pub fn ratio_of(part: i64, whole: i64) -> Option<Rate> {
        if whole == 0 {
            return None;
        }
        let scaled = part as i128 * 10000;
        let whole = whole as i128;
        let half = whole.abs() / 2;
        let rounded = if (scaled >= 0) == (whole > 0) {
            (scaled.abs() + half) / whole.abs()
        } else {
            -((scaled.abs() + half) / whole.abs())
        };
        Some(Rate(rounded as i64))
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}%", sign, (self.0 / 100).abs(), (self.0 % 100).abs())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_major_and_parts() {
        let money = Money::from_major(13_500);
        assert_eq!(money.cents(), 1_350_000);
        assert_eq!(money.dollars(), 13_500);
        assert_eq!(money.cents_part(), 0);

        let negative = Money::from_major_minor(-5, 50);
        assert_eq!(negative.cents(), -550);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(1099).to_string(), "$10.99");
        assert_eq!(Money::from_cents(-550).to_string(), "-$5.50");
        assert_eq!(Money::zero().to_string(), "$0.00");
    }

    #[test]
    fn test_sum_is_order_independent() {
        let amounts = vec![
            Money::from_cents(1_350_010),
            Money::from_cents(1_384_020),
            Money::from_cents(-2_500),
        ];
        let forward: Money = amounts.iter().sum();
        let backward: Money = amounts.iter().rev().sum();
        assert_eq!(forward, backward);
        assert_eq!(forward.cents(), 2_731_530);
    }

    #[test]
    fn test_apply_rate_rounding() {
        // $10.00 at 8.25% = $0.825 → $0.83
        assert_eq!(Money::from_cents(1000).apply_rate(Rate::from_bps(825)).cents(), 83);
        // discount of 5% on $15,200
        assert_eq!(
            Money::from_major(15_200).apply_rate(Rate::from_bps(500)),
            Money::from_major(760)
        );
        // negative amounts round away from zero symmetrically
        assert_eq!(Money::from_cents(-1000).apply_rate(Rate::from_bps(825)).cents(), -83);
    }

    #[test]
    fn test_average_over_empty_is_zero() {
        assert_eq!(Money::from_major(100).average_over(0), Money::zero());
        assert_eq!(Money::from_major(100).average_over(4), Money::from_major(25));
    }

    #[test]
    fn test_rate_ratio() {
        assert_eq!(Rate::ratio_of(1, 3), Some(Rate::from_bps(3333)));
        assert_eq!(Rate::ratio_of(2, 3), Some(Rate::from_bps(6667)));
        assert_eq!(Rate::ratio_of(-1, 4), Some(Rate::from_bps(-2500)));
        assert_eq!(Rate::ratio_of(5, 0), None);
    }

    #[test]
    fn test_rate_display_and_percentage() {
        assert_eq!(Rate::from_bps(825).to_string(), "8.25%");
        assert_eq!(Rate::from_bps(-1250).to_string(), "-12.50%");
        assert_eq!(Rate::from_percentage(8.25).bps(), 825);
        assert!((Rate::from_bps(1067).percentage() - 10.67).abs() < 1e-9);
    }
}
