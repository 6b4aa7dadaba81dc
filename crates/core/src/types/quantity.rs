//! Line-item quantity, always at least one.

use core::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A positive whole quantity.
///
/// Construction clamps to `1..=u32::MAX`; deserialization accepts numbers or
/// numeric strings, floors fractions, and falls back to one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Quantity(u32);

impl Quantity {
    /// The smallest valid quantity.
    pub const ONE: Self = Self(1);

    /// Create a quantity, clamping to at least one.
    #[must_use]
    pub fn new(n: i64) -> Self {
        Self(u32::try_from(n.max(1)).unwrap_or(u32::MAX))
    }

    /// Coerce an arbitrary JSON value into a quantity.
    #[must_use]
    pub fn coerce(value: &Value) -> Self {
        let n = match value {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(floor_to_i64)),
            Value::String(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().map(floor_to_i64))
            }
            _ => None,
        };
        n.map_or(Self::ONE, Self::new)
    }

    /// The quantity as a plain integer.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Add two quantities, saturating at `u32::MAX`.
    #[must_use]
    pub const fn saturating_add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

#[allow(clippy::cast_possible_truncation)] // saturating float-to-int cast is the intent
fn floor_to_i64(f: f64) -> i64 {
    if f.is_finite() { f.floor() as i64 } else { 1 }
}

impl Default for Quantity {
    fn default() -> Self {
        Self::ONE
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for Quantity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::coerce(&value))
    }
}
