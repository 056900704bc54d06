//! Full-precision monetary amounts and their display formatting.
//!
//! Amounts are carried through every calculation at the full precision of
//! `rust_decimal`; rounding to cents happens only in [`Money::round2`] and
//! when a value is formatted.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use std::str::FromStr;

/// A monetary amount with no fixed scale.
///
/// # Examples
///
/// ```
/// use std::str::FromStr;
/// use wealth_engine::Money;
///
/// let amount = Money::from_str("10.005").unwrap();
/// assert_eq!(amount.to_string(), "10.01");
/// assert_eq!(amount.round2(), Money::from_str("10.01").unwrap());
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Zero value.
    pub const ZERO: Self = Money(Decimal::ZERO);

    pub fn new(value: Decimal) -> Self {
        Money(value)
    }

    /// Whole currency units.
    pub fn from_units(units: i64) -> Self {
        Money(Decimal::from(units))
    }

    /// The underlying decimal, unrounded.
    pub fn amount(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns `true` for amounts strictly greater than zero.
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Rounds to two decimals as `floor(x * 100 + 0.5) / 100` would.
    ///
    /// Halves round toward positive infinity, so `-1.005` becomes `-1.00`.
    /// Works at any magnitude, including the ends of the decimal range.
    pub fn round2(&self) -> Self {
        let strategy = if self.0.is_sign_negative() {
            RoundingStrategy::MidpointTowardZero
        } else {
            RoundingStrategy::MidpointAwayFromZero
        };
        let rounded = self.0.round_dp_with_strategy(2, strategy);
        if rounded.is_zero() {
            Money(Decimal::ZERO)
        } else {
            Money(rounded)
        }
    }
}

impl From<Decimal> for Money {
    fn from(value: Decimal) -> Self {
        Money(value)
    }
}

impl FromStr for Money {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Decimal::from_str(s.trim()).map(Money)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.round2().0)
    }
}

/// Addition and subtraction saturate at the ends of the decimal range.
impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Money(self.0.saturating_sub(rhs.0))
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 = self.0.saturating_sub(rhs.0);
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Money(-self.0)
    }
}

/// Scales an amount by a growth factor, saturating at the decimal range.
impl Mul<Decimal> for Money {
    type Output = Self;

    fn mul(self, rhs: Decimal) -> Self::Output {
        Money(self.0.saturating_mul(rhs))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

/// Formats an amount as whole euros the way the Italian locale does.
///
/// Thousands are separated with `.` only once the integer part reaches five
/// digits, matching the locale's minimum grouping rule. Negative amounts keep
/// their sign even when they round to zero (`-0 €`).
///
/// ```
/// use wealth_engine::{format_currency, Money};
///
/// assert_eq!(format_currency(Money::from_units(1234)), "1234 €");
/// assert_eq!(format_currency(Money::from_units(1234567)), "1.234.567 €");
/// ```
pub fn format_currency(amount: Money) -> String {
    let rounded = amount
        .amount()
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let digits = rounded.abs().trunc().to_string();

    let grouped = if digits.len() < 5 {
        digits
    } else {
        let mut out = String::with_capacity(digits.len() + digits.len() / 3);
        for (idx, ch) in digits.chars().enumerate() {
            if idx > 0 && (digits.len() - idx) % 3 == 0 {
                out.push('.');
            }
            out.push(ch);
        }
        out
    };

    if amount.is_negative() {
        format!("-{} €", grouped)
    } else {
        format!("{} €", grouped)
    }
}

/// Formats a percentage with two fixed decimals, e.g. `7.00%`.
pub fn format_percentage(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.2}%", rounded)
}
