//! Core types for Vitashop.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod discount;
pub mod email;
pub mod id;
pub mod price;
pub mod status;

pub use cart::{CartLine, CartSnapshot, PLACEHOLDER_IMAGE_URL, UNKNOWN_PRODUCT_NAME};
pub use discount::{CartTotals, DiscountCode, DiscountError};
pub use email::{Email, EmailError};
pub use id::*;
pub use price::{Price, Quantity};
pub use status::SubmissionState;
