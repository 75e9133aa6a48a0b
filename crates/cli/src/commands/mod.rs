//! Subcommand implementations.
//!
//! Command output goes to stdout; logs go to stderr.

pub mod cart;
pub mod checkout;
pub mod favorites;
pub mod orders;
pub mod products;

use rust_decimal::Decimal;

/// Format an amount as money with two decimal places.
fn money(amount: Decimal) -> String {
    format!("${:.2}", amount.round_dp(2))
}
