//! Money and currency value objects.
//!
//! Amounts are stored as integer minor units (cents) so arithmetic is exact.
//! Every place that needs to round to two decimals goes through
//! [`div_round_half_even`], i.e. banker's rounding: an exact half cent
//! rounds to the even neighbour (0.005 -> 0.00, 0.015 -> 0.02).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Add;
use std::str::FromStr;

use super::ValidationError;

/// Divides `numerator` by `denominator` rounding half to even.
///
/// `denominator` must be positive.
pub fn div_round_half_even(numerator: i128, denominator: i128) -> i128 {
    debug_assert!(denominator > 0);
    let quotient = numerator.div_euclid(denominator);
    let remainder = numerator.rem_euclid(denominator);
    match (remainder * 2).cmp(&denominator) {
        std::cmp::Ordering::Less => quotient,
        std::cmp::Ordering::Greater => quotient + 1,
        std::cmp::Ordering::Equal => {
            if quotient.rem_euclid(2) == 0 {
                quotient
            } else {
                quotient + 1
            }
        }
    }
}

/// A monetary amount in minor units (cents).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Creates an amount from cents.
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Creates an amount from whole units and cents, e.g. `(40, 0)` for 40.00.
    pub const fn from_major(units: i64, cents: i64) -> Self {
        Self(units * 100 + cents)
    }

    /// Returns the amount in cents.
    pub const fn cents(&self) -> i64 {
        self.0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Applies a rate expressed in basis points (1/100 of a percent),
    /// rounding the result to whole cents.
    pub fn apply_basis_points(&self, basis_points: u32) -> Money {
        let scaled = i128::from(self.0) * i128::from(basis_points);
        Money(div_round_half_even(scaled, 10_000) as i64)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl FromStr for Money {
    type Err = ValidationError;

    /// Parses decimal notation with at most two fractional digits ("25", "25.5", "25.50").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::invalid_format("amount", format!("'{}' is not a decimal amount", s));

        let trimmed = s.trim();
        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let (whole, fraction) = match digits.split_once('.') {
            Some((w, f)) => (w, f),
            None => (digits, ""),
        };
        if whole.is_empty()
            || fraction.len() > 2
            || !whole.chars().all(|c| c.is_ascii_digit())
            || !fraction.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid());
        }

        let units: i64 = whole.parse().map_err(|_| invalid())?;
        let cents: i64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().map_err(|_| invalid())? * 10,
            _ => fraction.parse().map_err(|_| invalid())?,
        };
        let total = units
            .checked_mul(100)
            .and_then(|v| v.checked_add(cents))
            .ok_or_else(invalid)?;
        Ok(Money(if negative { -total } else { total }))
    }
}

/// Three-letter currency code (ISO 4217 style), always upper case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency(String);

impl Currency {
    /// Creates a currency code, normalising to upper case.
    pub fn new(code: impl Into<String>) -> Result<Self, ValidationError> {
        let code = code.into();
        if code.is_empty() {
            return Err(ValidationError::empty_field("currency"));
        }
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ValidationError::invalid_format(
                "currency",
                format!("'{}' is not a three-letter code", code),
            ));
        }
        Ok(Self(code.to_ascii_uppercase()))
    }

    pub fn usd() -> Self {
        Self("USD".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Currency {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Currency::new(value)
    }
}

impl From<Currency> for String {
    fn from(c: Currency) -> Self {
        c.0
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_even_rounds_ties_to_even_neighbour() {
        // 0.5 -> 0, 1.5 -> 2, 2.5 -> 2, 3.5 -> 4
        assert_eq!(div_round_half_even(5, 10), 0);
        assert_eq!(div_round_half_even(15, 10), 2);
        assert_eq!(div_round_half_even(25, 10), 2);
        assert_eq!(div_round_half_even(35, 10), 4);
    }

    #[test]
    fn half_even_rounds_non_ties_to_nearest() {
        assert_eq!(div_round_half_even(14, 10), 1);
        assert_eq!(div_round_half_even(16, 10), 2);
        assert_eq!(div_round_half_even(-16, 10), -2);
        assert_eq!(div_round_half_even(-15, 10), -2);
    }

    #[test]
    fn ten_percent_of_hundred_is_ten() {
        let tax = Money::from_major(100, 0).apply_basis_points(1000);
        assert_eq!(tax, Money::from_major(10, 0));
    }

    #[test]
    fn basis_points_use_bankers_rounding() {
        // 10% of 0.05 = 0.005 -> 0.00 ; 10% of 0.15 = 0.015 -> 0.02
        assert_eq!(Money::from_cents(5).apply_basis_points(1000), Money::from_cents(0));
        assert_eq!(Money::from_cents(15).apply_basis_points(1000), Money::from_cents(2));
        assert_eq!(Money::from_cents(25).apply_basis_points(1000), Money::from_cents(2));
    }

    #[test]
    fn displays_two_decimals() {
        assert_eq!(Money::from_cents(4000).to_string(), "40.00");
        assert_eq!(Money::from_cents(5).to_string(), "0.05");
        assert_eq!(Money::from_cents(-250).to_string(), "-2.50");
    }

    #[test]
    fn parses_decimal_notation() {
        assert_eq!("40".parse::<Money>().unwrap(), Money::from_cents(4000));
        assert_eq!("25.5".parse::<Money>().unwrap(), Money::from_cents(2550));
        assert_eq!("0.07".parse::<Money>().unwrap(), Money::from_cents(7));
        assert_eq!("-1.25".parse::<Money>().unwrap(), Money::from_cents(-125));
    }

    #[test]
    fn rejects_malformed_amounts() {
        assert!("".parse::<Money>().is_err());
        assert!("1.234".parse::<Money>().is_err());
        assert!("ten".parse::<Money>().is_err());
        assert!(".50".parse::<Money>().is_err());
    }

    #[test]
    fn currency_is_normalised_to_upper_case() {
        assert_eq!(Currency::new("eur").unwrap().as_str(), "EUR");
    }

    #[test]
    fn currency_rejects_bad_codes() {
        assert!(Currency::new("").is_err());
        assert!(Currency::new("US").is_err());
        assert!(Currency::new("US1").is_err());
        assert!(Currency::new("DOLLAR").is_err());
    }
}
