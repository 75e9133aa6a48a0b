//! Catalog and order types returned by the remote API.
//!
//! These are the canonical shapes; the loosely typed responses are mapped
//! onto them in [`super::wire`].

use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Map, Value};
use vitashop_core::{CategoryId, OrderId, Price, ProductId, Quantity};

use crate::config::DEFAULT_PAGE_SIZE;

/// Category value meaning "no category filter".
pub const ALL_CATEGORIES: &str = "All Products";

// =============================================================================
// Catalog
// =============================================================================

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub price: Price,
    pub image_url: Option<String>,
    pub category_id: Option<CategoryId>,
    pub category: Option<String>,
    pub rating: Option<Decimal>,
    pub review_count: Option<u32>,
    pub tag: Option<String>,
    pub is_new: bool,
    pub is_limited: bool,
    pub features: Vec<String>,
}

/// One page of a product listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPage {
    pub items: Vec<Product>,
    pub total_count: u64,
    pub page_number: u32,
    pub page_size: u32,
    /// Explicit "more pages" flag, when the server sends one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_more: Option<bool>,
}

impl ProductPage {
    /// Number of pages for the reported total.
    #[must_use]
    pub fn total_pages(&self) -> u64 {
        if self.page_size == 0 {
            return 0;
        }
        self.total_count.div_ceil(u64::from(self.page_size))
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        self.has_more
            .unwrap_or_else(|| u64::from(self.page_number) < self.total_pages())
    }

    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.page_number > 1
    }
}

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

/// Parameters for a product listing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductQuery {
    pub page_number: u32,
    pub page_size: u32,
    pub search_term: Option<String>,
    pub category_id: Option<String>,
}

impl Default for ProductQuery {
    fn default() -> Self {
        Self {
            page_number: 1,
            page_size: DEFAULT_PAGE_SIZE,
            search_term: None,
            category_id: None,
        }
    }
}

impl ProductQuery {
    /// Query string pairs for this request.
    ///
    /// Page number and size are always sent. The search term is sent only
    /// when non-blank, and the category only when it is not
    /// [`ALL_CATEGORIES`].
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("pageNumber", self.page_number.to_string()),
            ("pageSize", self.page_size.to_string()),
        ];

        if let Some(term) = self.search_term.as_deref()
            && !term.trim().is_empty()
        {
            pairs.push(("searchTerm", term.to_string()));
        }

        if let Some(category) = self.category_id.as_deref()
            && !category.is_empty()
            && category != ALL_CATEGORIES
        {
            pairs.push(("categoryId", category.to_string()));
        }

        pairs
    }
}

// =============================================================================
// Orders
// =============================================================================

/// Result of a successful checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderResult {
    /// Server-assigned order identifier.
    pub id: OrderId,
    /// Everything else the server echoed back.
    pub echo: Map<String, Value>,
}

/// An order as returned by the lookup endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub order_date: Option<String>,
    pub customer_email: Option<String>,
    pub items: Vec<OrderItem>,
    pub total_price: Price,
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: ProductId,
    pub product_name: Option<String>,
    pub price: Option<Price>,
    pub quantity: Quantity,
}

// =============================================================================
// Fallback Categories
// =============================================================================

/// Categories shown when the server cannot be reached.
const FALLBACK_CATEGORIES: [(&str, &str); 6] = [
    ("1", "Marine & Bovine Blend"),
    ("2", "High Absorption Formula"),
    ("3", "Bone & Immune Support"),
    ("4", "Muscle & Nerve Support"),
    ("5", "Cardiovascular Health"),
    ("6", "Gut Health Formula"),
];

/// The built-in category list.
#[must_use]
pub fn fallback_categories() -> Vec<Category> {
    FALLBACK_CATEGORIES
        .iter()
        .map(|(id, name)| Category {
            id: CategoryId::new(*id),
            name: (*name).to_string(),
        })
        .collect()
}
