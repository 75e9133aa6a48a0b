//! Vitashop storefront client library.
//!
//! Talks to the remote Vitashop API on behalf of a customer:
//!
//! - [`cart`] - the synchronized cart
//! - [`checkout`] - form validation and order submission
//! - [`api`] - HTTP client for carts, orders, and the catalog
//! - [`favorites`] and [`storage`] - state kept on this machine
//!
//! [`state::Storefront`] wires these together from a [`config::StorefrontConfig`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod checkout;
pub mod config;
pub mod error;
pub mod favorites;
pub mod state;
pub mod storage;

pub use error::{AppError, Result};
pub use state::Storefront;
