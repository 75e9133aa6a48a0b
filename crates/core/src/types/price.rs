//! Type-safe price and quantity representations.
//!
//! Remote payloads are loosely typed: a price may arrive as `10`, `10.5`, or
//! `"10.50"`, and a quantity as `2` or `"2"`. Both types coerce any of those
//! shapes on ingress and always serialize back as JSON numbers.

use core::fmt;
use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Coerce a loosely typed JSON value into a decimal.
///
/// Accepts integers, floats, and numeric strings (including scientific
/// notation). Returns `None` for anything else.
fn coerce_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(Decimal::from(i))
            } else if let Some(u) = n.as_u64() {
                Some(Decimal::from(u))
            } else {
                n.as_f64().and_then(|f| Decimal::try_from(f).ok())
            }
        }
        Value::String(s) => {
            let s = s.trim();
            Decimal::from_str(s)
                .or_else(|_| Decimal::from_scientific(s))
                .ok()
        }
        _ => None,
    }
}

/// A non-negative unit price.
///
/// Stored as an exact decimal so that cart totals do not accumulate
/// floating-point error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Price(Decimal);

impl Price {
    /// The zero price.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price, rejecting negative amounts.
    #[must_use]
    pub fn new(amount: Decimal) -> Option<Self> {
        (amount >= Decimal::ZERO).then_some(Self(amount))
    }

    /// Coerce a loosely typed JSON value into a price.
    ///
    /// Missing, unparseable, or negative values become [`Price::ZERO`].
    #[must_use]
    pub fn coerce(value: Option<&Value>) -> Self {
        value
            .and_then(coerce_decimal)
            .and_then(Self::new)
            .unwrap_or(Self::ZERO)
    }

    /// Get the underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Line total for `quantity` units at this price.
    ///
    /// Saturates at [`Decimal::MAX`] instead of overflowing.
    #[must_use]
    pub fn times(&self, quantity: Quantity) -> Decimal {
        self.0
            .checked_mul(Decimal::from(quantity.get()))
            .unwrap_or(Decimal::MAX)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl From<u32> for Price {
    fn from(amount: u32) -> Self {
        Self(Decimal::from(amount))
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        rust_decimal::serde::float::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        coerce_decimal(&value)
            .and_then(Self::new)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid price: {value}")))
    }
}

/// A line quantity, always at least one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Quantity(u32);

impl Quantity {
    /// A single unit.
    pub const ONE: Self = Self(1);

    /// Create a quantity, rejecting zero.
    #[must_use]
    pub const fn new(quantity: u32) -> Option<Self> {
        if quantity == 0 {
            None
        } else {
            Some(Self(quantity))
        }
    }

    /// Coerce a loosely typed JSON value into a quantity.
    ///
    /// Missing, unparseable, or sub-1 values become [`Quantity::ONE`].
    /// Fractional values are truncated.
    #[must_use]
    pub fn coerce(value: Option<&Value>) -> Self {
        value
            .and_then(coerce_decimal)
            .and_then(|d| u32::try_from(d.trunc()).ok())
            .and_then(Self::new)
            .unwrap_or(Self::ONE)
    }

    /// Get the underlying count.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Add another quantity, saturating at `u32::MAX`.
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }
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

impl Serialize for Quantity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.0)
    }
}

impl<'de> Deserialize<'de> for Quantity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        coerce_decimal(&value)
            .and_then(|d| u32::try_from(d.trunc()).ok())
            .and_then(Self::new)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid quantity: {value}")))
    }
}
