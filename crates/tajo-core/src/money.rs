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
//! │  A butcher counter multiplies weights by per-kg prices all day:        │
//! │    1.5 kg × $93.30 must be $139.95, to the centavo, every time         │
//! │                                                                         │
//! │  OUR SOLUTION: rust_decimal                                             │
//! │    Exact base-10 arithmetic; two decimals compare and add exactly.     │
//! │    The database stores the same decimal text it gets back.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## The zero-or-absent convention
//! In this domain a zero price is never a legitimate business state: a
//! product either has a price or has none. Incoming price fields that are
//! numerically zero are therefore stored as *absent*, via
//! [`Money::from_input`]. Absent and zero are distinct on purpose.
//!
//! ## Usage
//! ```rust
//! use tajo_core::money::Money;
//! use rust_decimal::Decimal;
//!
//! let price = Money::new(Decimal::new(25050, 2)).unwrap(); // 250.50
//! assert_eq!(price.to_string(), "250.50");
//!
//! // Negative amounts never construct:
//! assert!(Money::new(Decimal::new(-1, 2)).is_err());
//! ```

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use std::str::FromStr;

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreError;

// =============================================================================
// Money Type
// =============================================================================

/// A non-negative exact-decimal monetary value.
///
/// ## Design Decisions
/// - **Decimal inside**: arbitrary-precision base-10; no binary rounding
/// - **Non-negative by construction**: refunds are not part of this ledger,
///   so a negative amount is always caller error
/// - **Single field tuple struct**: zero-cost abstraction over `Decimal`
/// - **Serde via `Decimal`**: deserializing re-runs the same validation
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Money(#[ts(type = "string")] Decimal);

impl Money {
    /// Creates a Money value from an exact decimal amount.
    ///
    /// Fails with [`CoreError::InvalidMonetaryValue`] if the amount is
    /// negative.
    pub fn new(amount: Decimal) -> Result<Self, CoreError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(CoreError::InvalidMonetaryValue {
                reason: format!("amount must not be negative, got {amount}"),
            });
        }
        Ok(Money(amount))
    }

    /// Creates a Money value from a binary float at the API boundary.
    ///
    /// Fails on NaN, infinities and negative values. The float is converted
    /// once, here, and never used in arithmetic.
    pub fn from_f64(value: f64) -> Result<Self, CoreError> {
        let amount = Decimal::from_f64(value).ok_or_else(|| CoreError::InvalidMonetaryValue {
            reason: format!("amount must be a finite number, got {value}"),
        })?;
        Money::new(amount)
    }

    /// Maps an optional incoming price to its stored form.
    ///
    /// ## The zero-or-absent rule
    /// ```text
    /// None      ⇒ None        (field not supplied)
    /// Some(0)   ⇒ None        (zero means "no price set")
    /// Some(x>0) ⇒ Some(x)
    /// Some(x<0) ⇒ InvalidMonetaryValue
    /// ```
    ///
    /// A caller that wants to clear a stored price submits 0.
    pub fn from_input(value: Option<Decimal>) -> Result<Option<Self>, CoreError> {
        match value {
            None => Ok(None),
            Some(v) if v.is_zero() => Ok(None),
            Some(v) => Money::new(v).map(Some),
        }
    }

    /// Zero money value.
    #[inline]
    pub fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    /// The underlying decimal amount.
    #[inline]
    pub fn amount(&self) -> Decimal {
        self.0
    }

    /// Checks if the value is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Subtracts, returning `None` when the result would go negative.
    ///
    /// There is no `Sub` impl on purpose: a negative money value cannot
    /// exist, so the caller must handle the underflow case explicitly.
    pub fn checked_sub(&self, other: Money) -> Option<Money> {
        let diff = self.0 - other.0;
        if diff.is_sign_negative() && !diff.is_zero() {
            None
        } else {
            Some(Money(diff))
        }
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Canonical display: fixed two fractional digits.
///
/// This is the API output format; `150` renders as `"150.00"`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl TryFrom<Decimal> for Money {
    type Error = CoreError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Money::new(value)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Decimal {
        money.0
    }
}

/// Parses the canonical decimal string form ("250.50").
impl FromStr for Money {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let amount = Decimal::from_str(s.trim()).map_err(|e| CoreError::InvalidMonetaryValue {
            reason: format!("unparsable amount {s:?}: {e}"),
        })?;
        Money::new(amount)
    }
}

/// Addition of two Money values. Sums of non-negatives stay non-negative.
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

/// Addition assignment (+=).
impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

/// Summation, for ticket totals and daily aggregates.
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
    use rust_decimal_macros::dec;

    #[test]
    fn test_new_rejects_negative() {
        assert!(Money::new(dec!(-0.01)).is_err());
        assert!(Money::new(dec!(0)).is_ok());
        assert!(Money::new(dec!(250.50)).is_ok());
    }

    #[test]
    fn test_from_f64_rejects_non_finite() {
        assert!(Money::from_f64(f64::NAN).is_err());
        assert!(Money::from_f64(f64::INFINITY).is_err());
        assert!(Money::from_f64(-1.0).is_err());
        assert_eq!(Money::from_f64(60.0).unwrap().amount(), dec!(60));
    }

    #[test]
    fn test_zero_input_becomes_absent() {
        assert_eq!(Money::from_input(None).unwrap(), None);
        assert_eq!(Money::from_input(Some(dec!(0))).unwrap(), None);
        assert_eq!(Money::from_input(Some(dec!(0.00))).unwrap(), None);
        assert_eq!(
            Money::from_input(Some(dec!(60))).unwrap(),
            Some(Money::new(dec!(60)).unwrap())
        );
        assert!(Money::from_input(Some(dec!(-5))).is_err());
    }

    #[test]
    fn test_display_two_decimals() {
        assert_eq!(Money::new(dec!(150)).unwrap().to_string(), "150.00");
        assert_eq!(Money::new(dec!(93.3)).unwrap().to_string(), "93.30");
        assert_eq!(Money::new(dec!(0)).unwrap().to_string(), "0.00");
    }

    /// The classic float failure, done right.
    #[test]
    fn test_exact_addition() {
        let a = Money::new(dec!(0.1)).unwrap();
        let b = Money::new(dec!(0.2)).unwrap();
        assert_eq!((a + b).amount(), dec!(0.3));

        let mut total = Money::zero();
        total += Money::new(dec!(700)).unwrap();
        total += Money::new(dec!(140)).unwrap();
        assert_eq!(total.amount(), dec!(840));
    }

    #[test]
    fn test_checked_sub() {
        let a = Money::new(dec!(10)).unwrap();
        let b = Money::new(dec!(4)).unwrap();
        assert_eq!(a.checked_sub(b).unwrap().amount(), dec!(6));
        assert_eq!(b.checked_sub(a), None);
        assert_eq!(a.checked_sub(a).unwrap(), Money::zero());
    }

    #[test]
    fn test_sum_and_ordering() {
        let total: Money = [dec!(60), dec!(62.50), dec!(1.25)]
            .into_iter()
            .map(|d| Money::new(d).unwrap())
            .sum();
        assert_eq!(total.amount(), dec!(123.75));

        assert!(Money::new(dec!(2)).unwrap() > Money::new(dec!(1.99)).unwrap());
    }

    #[test]
    fn test_serde_rejects_negative() {
        let ok: Money = serde_json::from_str("\"250.50\"").unwrap();
        assert_eq!(ok.amount(), dec!(250.50));

        let err = serde_json::from_str::<Money>("\"-1\"");
        assert!(err.is_err());
    }

    #[test]
    fn test_from_str() {
        assert_eq!(
            Money::from_str(" 840.00 ").unwrap().amount(),
            dec!(840.00)
        );
        assert!(Money::from_str("abc").is_err());
        assert!(Money::from_str("-3").is_err());
    }
}
