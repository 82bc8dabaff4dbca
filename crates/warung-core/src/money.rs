//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Decimal Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A ledger that sums thousands of sales drifts by real money.            │
//! │                                                                         │
//! │  OUR SOLUTION: base-10 Decimal end to end                              │
//! │    PostgreSQL NUMERIC(14,2) ⇄ rust_decimal::Decimal ⇄ JSON string       │
//! │    0.1 + 0.2 = 0.3 exactly                                              │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use warung_core::money::Money;
//!
//! let price = Money::from_minor(850); // 8.50
//!
//! let line_total = price.multiply_quantity(3).unwrap(); // 25.50
//! let with_fee = line_total + Money::from_major(2);      // 27.50
//! assert_eq!(with_fee, Money::from_minor(2750));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use std::str::FromStr;
use ts_rs::TS;

use crate::error::{CoreResult, ValidationError};

/// Number of decimal places the store keeps for every monetary column.
pub const MONEY_SCALE: u32 = 2;

/// Exclusive magnitude bound of `NUMERIC(14,2)`: 10^12.
pub const STORE_LIMIT: Decimal = Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0);

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value with exact decimal semantics.
///
/// ## Design Decisions
/// - **Signed**: account balances and ledger deltas go negative
/// - **Newtype over Decimal**: zero-cost, but keeps floats out of the API
/// - **Serialized as a string**: `"24.00"` survives any JSON client intact
///
/// ## Where Money Flows
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  SaleLine.selling_price × quantity ──► Transaction.total               │
/// │                                          │                              │
/// │  SaleLine.cost_price × quantity ──► BalanceDelta (account debit)        │
/// │                                          │                              │
/// │                                          ▼                              │
/// │                               CapitalEntry (capital_history row)        │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
#[serde(transparent)]
#[ts(export)]
pub struct Money(#[ts(as = "String")] Decimal);

impl Money {
    /// Wraps an existing decimal value.
    #[inline]
    pub const fn from_decimal(amount: Decimal) -> Self {
        Money(amount)
    }

    /// Creates a value from whole currency units.
    ///
    /// ```rust
    /// use warung_core::money::Money;
    ///
    /// assert_eq!(Money::from_major(8).to_string(), "8.00");
    /// ```
    #[inline]
    pub fn from_major(units: i64) -> Self {
        Money(Decimal::from(units))
    }

    /// Creates a value from minor units (hundredths).
    ///
    /// ```rust
    /// use warung_core::money::Money;
    ///
    /// assert_eq!(Money::from_minor(1099).to_string(), "10.99");
    /// assert_eq!(Money::from_minor(-550).to_string(), "-5.50");
    /// ```
    #[inline]
    pub fn from_minor(minor: i64) -> Self {
        Money(Decimal::new(minor, MONEY_SCALE))
    }

    /// Returns the underlying decimal.
    #[inline]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Checks if the value is strictly greater than zero.
    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Checks if the value is strictly less than zero.
    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    #[inline]
    pub fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Multiplies money by a quantity.
    ///
    /// Fails with `OutOfRange` when the product does not fit the store.
    ///
    /// ```rust
    /// use warung_core::money::Money;
    ///
    /// let unit_price = Money::from_major(8);
    /// assert_eq!(unit_price.multiply_quantity(3).unwrap(), Money::from_major(24));
    ///
    /// let huge = Money::from_major(600_000_000_000);
    /// assert!(huge.multiply_quantity(2).is_err());
    /// ```
    pub fn multiply_quantity(&self, qty: i64) -> CoreResult<Self> {
        let product = self
            .0
            .checked_mul(Decimal::from(qty))
            .map(Money)
            .filter(Money::fits_store_range)
            .ok_or_else(|| Money::out_of_range("total"))?;
        Ok(product)
    }

    /// Addition that reports overflow instead of panicking.
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Money)
    }

    /// Whether the magnitude stays below [`STORE_LIMIT`].
    pub fn fits_store_range(&self) -> bool {
        self.0.abs() < STORE_LIMIT
    }

    /// The `OutOfRange` error for a money field.
    pub fn out_of_range(field: &str) -> ValidationError {
        ValidationError::OutOfRange {
            field: field.to_string(),
            reason: format!("magnitude must be below {STORE_LIMIT}"),
        }
    }

    /// Whether the value fits the store's `NUMERIC(14,2)` columns without rounding.
    ///
    /// `8.50` and `8.5` fit; `8.505` does not.
    pub fn fits_store_scale(&self) -> bool {
        self.0.normalize().scale() <= MONEY_SCALE
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Always renders two decimal places: `24.00`, `-5.50`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl FromStr for Money {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s.trim()).map(Money)
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
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

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_minor_and_major() {
        assert_eq!(Money::from_minor(1099).amount(), Decimal::new(1099, 2));
        assert_eq!(Money::from_major(10), Money::from_minor(1000));
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_minor(1099).to_string(), "10.99");
        assert_eq!(Money::from_major(5).to_string(), "5.00");
        assert_eq!(Money::from_minor(-550).to_string(), "-5.50");
        assert_eq!(Money::zero().to_string(), "0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_major(10);
        let b = Money::from_major(5);

        assert_eq!(a + b, Money::from_major(15));
        assert_eq!(a - b, Money::from_major(5));
        assert_eq!(a.multiply_quantity(3).unwrap(), Money::from_major(30));
        assert_eq!(-a, Money::from_major(-10));
    }

    /// The classic float failure must not happen here.
    #[test]
    fn test_no_binary_float_drift() {
        let tenth: Money = "0.1".parse().unwrap();
        let fifth: Money = "0.2".parse().unwrap();
        assert_eq!(tenth + fifth, "0.3".parse::<Money>().unwrap());

        let total: Money = std::iter::repeat(tenth).take(1000).sum();
        assert_eq!(total, Money::from_major(100));
    }

    #[test]
    fn test_scale_check() {
        assert!("8.5".parse::<Money>().unwrap().fits_store_scale());
        assert!("8.50".parse::<Money>().unwrap().fits_store_scale());
        assert!("8.500".parse::<Money>().unwrap().fits_store_scale());
        assert!(!"8.505".parse::<Money>().unwrap().fits_store_scale());
    }

    #[test]
    fn test_store_range() {
        let largest: Money = "999999999999.99".parse().unwrap();
        assert!(largest.fits_store_range());
        assert!((-largest).fits_store_range());
        assert!(!(largest + Money::from_minor(1)).fits_store_range());
        assert_eq!(Money::from_decimal(STORE_LIMIT).to_string(), "1000000000000.00");
    }

    #[test]
    fn test_multiply_quantity_overflow_is_an_error() {
        let max: Money = "79228162514264337593543950335".parse().unwrap();
        assert!(matches!(
            max.multiply_quantity(2),
            Err(crate::CoreError::Validation(ValidationError::OutOfRange { .. }))
        ));

        // Fits Decimal, but not the store.
        let big = Money::from_major(500_000_000_000);
        assert!(big.multiply_quantity(2).is_err());
        assert_eq!(
            big.multiply_quantity(1).unwrap(),
            Money::from_major(500_000_000_000)
        );
    }

    #[test]
    fn test_checked_add() {
        let max: Money = "79228162514264337593543950335".parse().unwrap();
        assert_eq!(max.checked_add(Money::from_major(1)), None);
        assert_eq!(
            Money::from_major(1).checked_add(Money::from_minor(50)),
            Some(Money::from_minor(150))
        );
    }

    #[test]
    fn test_zero_and_sign_checks() {
        assert!(Money::zero().is_zero());
        assert!(!Money::zero().is_positive());
        assert!(Money::from_minor(1).is_positive());
        assert!(Money::from_minor(-1).is_negative());
        assert_eq!(Money::from_minor(-1).abs(), Money::from_minor(1));
    }

    #[test]
    fn test_json_accepts_string_and_number() {
        let from_str: Money = serde_json::from_str("\"24.50\"").unwrap();
        let from_num: Money = serde_json::from_str("24.5").unwrap();
        assert_eq!(from_str, from_num);
        assert_eq!(serde_json::to_string(&Money::from_minor(2450)).unwrap(), "\"24.50\"");
    }
}
