//! Vitashop Core - Shared types library.
//!
//! This crate provides common types used across all Vitashop components:
//! - `storefront` - Cart synchronization, checkout, and catalog client library
//! - `cli` - Command-line front end driving the storefront library
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no storage. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for identifiers, prices, quantities, emails,
//!   cart lines, discount codes, and submission states

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
