//! Money amounts using decimal arithmetic.
//!
//! Amounts are stored as [`Decimal`] and persisted as plain JSON numbers so
//! records stay readable by anything else sharing the store. Reading is
//! lenient: numbers and numeric strings are accepted, anything else (and any
//! negative amount) becomes zero.

use core::fmt;
use core::iter::Sum;
use core::ops::Add;
use core::str::FromStr;

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use super::quantity::Quantity;

/// Errors that can occur when parsing a [`Money`] amount strictly.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MoneyError {
    /// The input is not a decimal number.
    #[error("invalid amount: {0}")]
    Invalid(String),
    /// The input is below zero.
    #[error("amount cannot be negative")]
    Negative,
}

/// A non-negative money amount in the store's single currency.
///
/// ## Examples
///
/// ```
/// use pocket_shop_core::Money;
///
/// let price = Money::parse("1000").unwrap();
/// assert_eq!(price.to_string(), "$1,000");
///
/// // Strict parsing rejects garbage; lenient coercion turns it into zero.
/// assert!(Money::parse("abc").is_err());
/// assert_eq!(Money::coerce(&serde_json::json!("abc")), Money::ZERO);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(Decimal);

impl Money {
    /// Zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create an amount from a decimal, clamping negatives to zero.
    #[must_use]
    pub fn new(amount: Decimal) -> Self {
        if amount.is_sign_negative() {
            Self::ZERO
        } else {
            Self(amount)
        }
    }

    /// Create an amount from whole currency units.
    #[must_use]
    pub fn from_units(units: u64) -> Self {
        Self(Decimal::from(units))
    }

    /// Parse an amount strictly.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not a decimal number or is negative.
    pub fn parse(s: &str) -> Result<Self, MoneyError> {
        let amount =
            parse_decimal(s.trim()).ok_or_else(|| MoneyError::Invalid(s.to_owned()))?;
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(MoneyError::Negative);
        }
        Ok(Self(amount.abs()))
    }

    /// Coerce an arbitrary JSON value into an amount.
    ///
    /// Numbers and numeric strings convert; everything else is zero.
    #[must_use]
    pub fn coerce(value: &Value) -> Self {
        let amount = match value {
            Value::Number(n) => n
                .as_i64()
                .map(Decimal::from)
                .or_else(|| n.as_u64().map(Decimal::from))
                .or_else(|| n.as_f64().and_then(Decimal::from_f64)),
            Value::String(s) => parse_decimal(s.trim()),
            _ => None,
        };
        amount.map_or(Self::ZERO, Self::new)
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Whether the amount is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Multiply a unit price by a line quantity.
    #[must_use]
    pub fn times(self, quantity: Quantity) -> Self {
        Self(self.0.saturating_mul(Decimal::from(quantity.get())))
    }
}

fn parse_decimal(s: &str) -> Option<Decimal> {
    if s.is_empty() {
        return None;
    }
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self::new(amount)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let normalized = self.0.normalize();
        if normalized.scale() == 0 {
            if let Some(whole) = normalized.to_i64() {
                return serializer.serialize_i64(whole);
            }
        }
        serializer.serialize_f64(normalized.to_f64().unwrap_or_default())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::coerce(&value))
    }
}

/// Formats as `$` followed by a thousands-grouped amount with at most two
/// fraction digits, trailing zeros dropped (`$1,234.5`).
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self
            .0
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
            .normalize();
        let text = rounded.to_string();
        let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), ""));

        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, digit) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(digit);
        }

        if fraction.is_empty() {
            write!(f, "${grouped}")
        } else {
            write!(f, "${grouped}.{fraction}")
        }
    }
}
