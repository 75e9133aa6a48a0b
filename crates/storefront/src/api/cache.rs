//! Cache types for catalog responses.

use vitashop_core::ProductId;

use super::types::{Category, Product};

/// Cache key for catalog lookups.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Product(ProductId),
    Categories,
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Product(Box<Product>),
    Categories(Vec<Category>),
}
