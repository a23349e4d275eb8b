//! # Money Module
//!
//! Provides the `Money` type for currency amounts on operation records.
//!
//! ## Representation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Rates are fractional per-unit prices ($0.84 per package, $0.35 per kg) │
//! │  and weights are fractional kilograms, so derived amounts are not whole │
//! │  cents:                                                                 │
//! │                                                                         │
//! │    50.3 kg × $0.35 = $17.605                                            │
//! │                                                                         │
//! │  Money is therefore an f64 amount, used the same way everywhere:       │
//! │  the calculator, the database columns (REAL) and the aggregates.       │
//! │  Rounding to cents only happens when an amount is displayed.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use logi_core::money::Money;
//!
//! let crew = Money::new(200.0);
//! let forklift = Money::new(50.0);
//! assert_eq!((crew + forklift).to_string(), "$250.00");
//!
//! let revenue = Money::new(0.84) * 100.0;
//! assert!((revenue.amount() - 84.0).abs() < 1e-9);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A signed currency amount.
///
/// ## Design Decisions
/// - **f64**: rates and weights are fractional, see the module docs
/// - **signed**: differences (`adimex_diff`, `service_diff`) go negative
/// - **transparent**: serializes as a bare number and binds as a REAL column
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
#[serde(transparent)]
#[ts(export)]
pub struct Money(f64);

impl Money {
    /// Creates a Money value from a currency amount.
    #[inline]
    pub const fn new(amount: f64) -> Self {
        Money(amount)
    }

    /// Returns the raw amount.
    #[inline]
    pub const fn amount(&self) -> f64 {
        self.0
    }

    /// Zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0.0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0 == 0.0
    }

    /// Checks if the value is below zero.
    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0 < 0.0
    }

    /// Checks that the amount is neither NaN nor infinite.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.0.is_finite()
    }

    /// Amount rounded to whole cents, for display and exports.
    pub fn rounded_cents(&self) -> i64 {
        (self.0 * 100.0).round() as i64
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Renders as `$1,234.56`, the format used by the dashboard metrics.
///
/// ## Example
/// ```rust
/// use logi_core::money::Money;
///
/// assert_eq!(Money::new(1234567.891).to_string(), "$1,234,567.89");
/// assert_eq!(Money::new(-216.0).to_string(), "-$216.00");
/// ```
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cents = self.rounded_cents();
        let sign = if cents < 0 { "-" } else { "" };
        let cents = cents.unsigned_abs();

        let digits = (cents / 100).to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }

        write!(f, "{}${}.{:02}", sign, grouped, cents % 100)
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl From<f64> for Money {
    fn from(amount: f64) -> Self {
        Money(amount)
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

/// Scales an amount, e.g. a per-unit rate by a unit count.
impl Mul<f64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, factor: f64) -> Self {
        Money(self.0 * factor)
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
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Money::new(84.0).to_string(), "$84.00");
        assert_eq!(Money::new(17.5).to_string(), "$17.50");
        assert_eq!(Money::new(0.0).to_string(), "$0.00");
        assert_eq!(Money::new(-2.5).to_string(), "-$2.50");
        assert_eq!(Money::new(999.999).to_string(), "$1,000.00");
        assert_eq!(Money::new(1234567.0).to_string(), "$1,234,567.00");
    }

    #[test]
    fn test_display_tiny_negative_rounds_to_zero() {
        assert_eq!(Money::new(-0.001).to_string(), "$0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::new(200.0);
        let b = Money::new(50.0);

        assert_eq!((a + b).amount(), 250.0);
        assert_eq!((a - b).amount(), 150.0);
        assert_eq!((-b).amount(), -50.0);

        let mut c = a;
        c += b;
        c -= Money::new(25.0);
        assert_eq!(c.amount(), 225.0);
    }

    #[test]
    fn test_sum() {
        let items = vec![Money::new(1.5), Money::new(2.5), Money::new(6.0)];
        let by_ref: Money = items.iter().sum();
        let by_value: Money = items.into_iter().sum();
        assert_eq!(by_ref.amount(), 10.0);
        assert_eq!(by_value.amount(), 10.0);

        let empty: Vec<Money> = Vec::new();
        assert!(empty.iter().sum::<Money>().is_zero());
    }

    #[test]
    fn test_checks() {
        assert!(Money::zero().is_zero());
        assert!(Money::new(-0.01).is_negative());
        assert!(!Money::new(f64::NAN).is_finite());
        assert_eq!(Money::new(0.125).rounded_cents(), 13);
    }

    #[test]
    fn test_serializes_as_number() {
        let json = serde_json::to_string(&Money::new(84.5)).unwrap();
        assert_eq!(json, "84.5");
        let back: Money = serde_json::from_str("17.5").unwrap();
        assert_eq!(back, Money::new(17.5));
    }
}
