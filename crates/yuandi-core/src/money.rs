//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Minor Units                                      │
//! │    KRW has no minor unit  → 1 won  = 1                                  │
//! │    CNY has two decimals   → ¥1.00  = 100 fen                            │
//! │                                                                         │
//! │  The database, calculations, and API all use minor units.               │
//! │  Only the UI converts for display.                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use yuandi_core::money::{Currency, Money};
//!
//! // Create from minor units (the only way)
//! let price = Money::from_minor(1_500_000); // ₩1,500,000
//!
//! // Arithmetic operations
//! let pair = price * 2;
//! let total = price + Money::from_minor(80_000);
//!
//! assert_eq!(pair.minor(), 3_000_000);
//! assert_eq!(total.format_in(Currency::Krw), "₩1,580,000");
//! ```

use serde::{Deserialize, Serialize};
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Currency
// =============================================================================

/// Currencies handled by the business: goods are purchased in CNY and
/// sold in KRW.
///
/// The currency is a formatting/interpretation concern only — amounts are
/// stored as bare minor units and the schema fixes which currency each
/// column carries (`cost_cny_fen`, `sale_price_krw`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Currency {
    /// Korean won. No minor unit.
    Krw,
    /// Chinese yuan. Minor unit: fen (1/100).
    Cny,
}

impl Currency {
    /// Number of decimal places in the display form.
    #[inline]
    pub const fn decimals(self) -> u32 {
        match self {
            Currency::Krw => 0,
            Currency::Cny => 2,
        }
    }

    /// Display symbol.
    #[inline]
    pub const fn symbol(self) -> &'static str {
        match self {
            Currency::Krw => "₩",
            Currency::Cny => "¥",
        }
    }
}

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit.
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for refunds and corrections
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units.
    ///
    /// ## Example
    /// ```rust
    /// use yuandi_core::money::Money;
    ///
    /// let price = Money::from_minor(1099);
    /// assert_eq!(price.minor(), 1099);
    /// ```
    #[inline]
    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn minor(&self) -> i64 {
        self.0
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

    /// Formats the amount for display in the given currency.
    ///
    /// Thousands separators on the major part; minor digits only for
    /// currencies that have them.
    ///
    /// ## Example
    /// ```rust
    /// use yuandi_core::money::{Currency, Money};
    ///
    /// assert_eq!(Money::from_minor(1_500_000).format_in(Currency::Krw), "₩1,500,000");
    /// assert_eq!(Money::from_minor(500_000).format_in(Currency::Cny), "¥5,000.00");
    /// assert_eq!(Money::from_minor(-80_000).format_in(Currency::Krw), "-₩80,000");
    /// ```
    pub fn format_in(&self, currency: Currency) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();

        let scale = 10u64.pow(currency.decimals());
        let major = abs / scale;
        let minor = abs % scale;

        let major_str = group_thousands(major);
        if currency.decimals() == 0 {
            format!("{}{}{}", sign, currency.symbol(), major_str)
        } else {
            format!(
                "{}{}{}.{:0width$}",
                sign,
                currency.symbol(),
                major_str,
                minor,
                width = currency.decimals() as usize
            )
        }
    }
}

/// Inserts comma separators every three digits.
fn group_thousands(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }

    let mut groups = Vec::new();
    while n > 0 {
        groups.push((n % 1000) as u16);
        n /= 1000;
    }

    let mut out = String::new();
    for (i, g) in groups.iter().rev().enumerate() {
        if i == 0 {
            out.push_str(&g.to_string());
        } else {
            out.push_str(&format!(",{:03}", g));
        }
    }
    out
}

// =============================================================================
// Operator Implementations
// =============================================================================

impl Add for Money {
    type Output = Money;

    #[inline]
    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;

    #[inline]
    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, rhs: Money) {
        self.0 -= rhs.0;
    }
}

impl Mul<i64> for Money {
    type Output = Money;

    /// Multiplies by a quantity (e.g., unit price × quantity).
    #[inline]
    fn mul(self, qty: i64) -> Money {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
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
    fn test_arithmetic() {
        let a = Money::from_minor(1000);
        let b = Money::from_minor(250);

        assert_eq!((a + b).minor(), 1250);
        assert_eq!((a - b).minor(), 750);
        assert_eq!((b * 4).minor(), 1000);

        let mut c = a;
        c += b;
        assert_eq!(c.minor(), 1250);
        c -= b;
        assert_eq!(c.minor(), 1000);
    }

    #[test]
    fn test_sum() {
        let total: Money = [100, 200, 300]
            .iter()
            .map(|&m| Money::from_minor(m))
            .sum();
        assert_eq!(total.minor(), 600);
    }

    #[test]
    fn test_krw_formatting() {
        assert_eq!(Money::from_minor(0).format_in(Currency::Krw), "₩0");
        assert_eq!(Money::from_minor(999).format_in(Currency::Krw), "₩999");
        assert_eq!(Money::from_minor(1_000).format_in(Currency::Krw), "₩1,000");
        assert_eq!(
            Money::from_minor(1_234_567).format_in(Currency::Krw),
            "₩1,234,567"
        );
    }

    #[test]
    fn test_cny_formatting() {
        assert_eq!(Money::from_minor(0).format_in(Currency::Cny), "¥0.00");
        assert_eq!(Money::from_minor(5).format_in(Currency::Cny), "¥0.05");
        assert_eq!(
            Money::from_minor(123_456).format_in(Currency::Cny),
            "¥1,234.56"
        );
    }

    #[test]
    fn test_negative_formatting() {
        assert_eq!(
            Money::from_minor(-80_000).format_in(Currency::Krw),
            "-₩80,000"
        );
        assert_eq!(Money::from_minor(-5).format_in(Currency::Cny), "-¥0.05");
    }

    #[test]
    fn test_abs_and_predicates() {
        let refund = Money::from_minor(-550);
        assert!(refund.is_negative());
        assert_eq!(refund.abs().minor(), 550);
        assert!(Money::zero().is_zero());
    }
}
