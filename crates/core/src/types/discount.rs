//! Discount codes and the cart's final total.
//!
//! Discounts are applied on the cart screen only; orders are placed without
//! them.

use core::fmt;
use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::cart::{CartSnapshot, saturating_add};

/// Reasons a discount code was not applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiscountError {
    #[error("Please enter a discount code")]
    Empty,

    #[error("Invalid discount code: {0}")]
    Unknown(String),
}

/// A recognized discount code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DiscountCode {
    Welcome10,
    Save20,
    Health15,
    FirstOrder,
}

impl DiscountCode {
    pub const ALL: [Self; 4] = [Self::Welcome10, Self::Save20, Self::Health15, Self::FirstOrder];

    /// Parse a code as typed by the customer (surrounding whitespace and case
    /// are ignored).
    ///
    /// # Errors
    ///
    /// Returns `DiscountError::Empty` for a blank input and
    /// `DiscountError::Unknown` for anything not in [`DiscountCode::ALL`].
    pub fn parse(input: &str) -> Result<Self, DiscountError> {
        let code = input.trim().to_uppercase();
        if code.is_empty() {
            return Err(DiscountError::Empty);
        }
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == code)
            .ok_or(DiscountError::Unknown(code))
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Welcome10 => "WELCOME10",
            Self::Save20 => "SAVE20",
            Self::Health15 => "HEALTH15",
            Self::FirstOrder => "FIRSTORDER",
        }
    }

    /// Fraction of the subtotal taken off.
    #[must_use]
    pub fn rate(&self) -> Decimal {
        match self {
            Self::Welcome10 => Decimal::new(10, 2),
            Self::Save20 => Decimal::new(20, 2),
            Self::Health15 => Decimal::new(15, 2),
            Self::FirstOrder => Decimal::new(25, 2),
        }
    }

    /// Rate as a whole percentage, e.g. `10` for `WELCOME10`.
    #[must_use]
    pub fn percent(&self) -> Decimal {
        self.rate() * Decimal::ONE_HUNDRED
    }
}

impl fmt::Display for DiscountCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DiscountCode {
    type Err = DiscountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Subtotal, tax, discount, and final total for a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
}

impl CartTotals {
    /// Totals for `cart` with an optional discount.
    ///
    /// Tax is always zero. The discount never exceeds the subtotal.
    #[must_use]
    pub fn compute(cart: &CartSnapshot, code: Option<DiscountCode>) -> Self {
        let subtotal = cart.total_price();
        let tax = Decimal::ZERO;
        let discount = code.map_or(Decimal::ZERO, |c| {
            subtotal
                .checked_mul(c.rate())
                .unwrap_or(subtotal)
                .min(subtotal)
        });

        Self {
            subtotal,
            tax,
            discount,
            total: saturating_add(subtotal, tax) - discount,
        }
    }

    /// Totals for a code as typed by the customer.
    ///
    /// A rejected code applies no discount; the error is returned alongside
    /// so the caller can tell the customer why.
    #[must_use]
    pub fn with_code(cart: &CartSnapshot, input: &str) -> (Self, Option<DiscountError>) {
        match DiscountCode::parse(input) {
            Ok(code) => (Self::compute(cart, Some(code)), None),
            Err(e) => (Self::compute(cart, None), Some(e)),
        }
    }
}
