//! Canonical cart types.
//!
//! A [`CartSnapshot`] is immutable: every mutation helper returns a new
//! snapshot, which is what the synchronization layer sends to the remote
//! store and then publishes.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::{Price, Quantity};

/// Name used when a line arrives without one.
pub const UNKNOWN_PRODUCT_NAME: &str = "Unknown";

/// Image used when a line arrives without one.
pub const PLACEHOLDER_IMAGE_URL: &str = "https://via.placeholder.com/150";

/// Money addition that saturates at [`Decimal::MAX`].
pub(crate) fn saturating_add(a: Decimal, b: Decimal) -> Decimal {
    a.checked_add(b).unwrap_or(Decimal::MAX)
}

/// A single product line in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: ProductId,
    pub product_name: String,
    pub price: Price,
    pub quantity: Quantity,
    pub image_url: String,
}

impl CartLine {
    /// Total for this line (price x quantity).
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price.times(self.quantity)
    }
}

/// Ordered sequence of cart lines with at most one line per product.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartSnapshot {
    lines: Vec<CartLine>,
}

impl CartSnapshot {
    /// The empty cart.
    #[must_use]
    pub const fn empty() -> Self {
        Self { lines: Vec::new() }
    }

    /// Build a snapshot from lines, merging duplicates by product ID.
    ///
    /// The first occurrence keeps its position and metadata; later
    /// occurrences contribute only their quantity.
    #[must_use]
    pub fn from_lines(lines: impl IntoIterator<Item = CartLine>) -> Self {
        let mut snapshot = Self::empty();
        for line in lines {
            if let Some(existing) = snapshot.find_mut(&line.product_id) {
                existing.quantity = existing.quantity.saturating_add(line.quantity);
            } else {
                snapshot.lines.push(line);
            }
        }
        snapshot
    }

    /// Lines in cart order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Consume the snapshot and return its lines.
    #[must_use]
    pub fn into_lines(self) -> Vec<CartLine> {
        self.lines
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Find the line for a product.
    #[must_use]
    pub fn find(&self, product_id: &ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|l| &l.product_id == product_id)
    }

    fn find_mut(&mut self, product_id: &ProductId) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|l| &l.product_id == product_id)
    }

    /// Sum of price x quantity over all lines, saturating at [`Decimal::MAX`].
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.lines
            .iter()
            .map(CartLine::line_total)
            .fold(Decimal::ZERO, saturating_add)
    }

    /// Sum of quantities over all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity.get())).sum()
    }

    /// Snapshot with `quantity` more units of `line.product_id`.
    ///
    /// If the product is already present its quantity is incremented and its
    /// other fields are kept; otherwise `line` is appended with `quantity`.
    #[must_use]
    pub fn with_added(&self, line: CartLine, quantity: Quantity) -> Self {
        let mut next = self.clone();
        if let Some(existing) = next.find_mut(&line.product_id) {
            existing.quantity = existing.quantity.saturating_add(quantity);
        } else {
            next.lines.push(CartLine { quantity, ..line });
        }
        next
    }

    /// Snapshot with the quantity of `product_id` replaced.
    ///
    /// Returns `None` if the product is not in the cart.
    #[must_use]
    pub fn with_quantity(&self, product_id: &ProductId, quantity: Quantity) -> Option<Self> {
        let mut next = self.clone();
        next.find_mut(product_id)?.quantity = quantity;
        Some(next)
    }

    /// Snapshot without the line for `product_id`.
    #[must_use]
    pub fn without(&self, product_id: &ProductId) -> Self {
        Self {
            lines: self
                .lines
                .iter()
                .filter(|l| &l.product_id != product_id)
                .cloned()
                .collect(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn line(id: &str, price: u32, quantity: u32) -> CartLine {
        CartLine {
            product_id: ProductId::new(id),
            product_name: format!("Product {id}"),
            price: Price::from(price),
            quantity: Quantity::new(quantity).unwrap(),
            image_url: PLACEHOLDER_IMAGE_URL.to_string(),
        }
    }

    #[test]
    fn test_empty_total_is_zero() {
        assert_eq!(CartSnapshot::empty().total_price(), Decimal::ZERO);
        assert_eq!(CartSnapshot::empty().item_count(), 0);
    }

    #[test]
    fn test_total_price() {
        let cart = CartSnapshot::from_lines([line("p1", 10, 2), line("p2", 3, 3)]);
        assert_eq!(cart.total_price(), Decimal::from(29));
        assert_eq!(cart.item_count(), 5);
    }

    #[test]
    fn test_total_price_saturates_instead_of_overflowing() {
        let huge = CartLine {
            price: Price::new(Decimal::MAX).unwrap(),
            ..line("p1", 0, 2)
        };
        let cart = CartSnapshot::from_lines([huge, line("p2", 10, 1)]);

        assert_eq!(cart.lines()[0].line_total(), Decimal::MAX);
        assert_eq!(cart.total_price(), Decimal::MAX);
    }

    #[test]
    fn test_total_price_saturates_for_coerced_remote_price() {
        let price = Price::coerce(Some(&serde_json::json!("79228162514264337593543950335")));
        let cart = CartSnapshot::from_lines([CartLine {
            price,
            ..line("p1", 0, 2)
        }]);

        assert_eq!(cart.total_price(), Decimal::MAX);
    }

    #[test]
    fn test_from_lines_merges_duplicates() {
        let cart = CartSnapshot::from_lines([line("p1", 10, 2), line("p1", 99, 3)]);
        assert_eq!(cart.len(), 1);
        let merged = cart.find(&ProductId::new("p1")).unwrap();
        assert_eq!(merged.quantity.get(), 5);
        assert_eq!(merged.price, Price::from(10));
    }

    #[test]
    fn test_with_added_increments_existing() {
        let cart = CartSnapshot::from_lines([line("p1", 10, 2)]);
        let next = cart.with_added(line("p1", 10, 1), Quantity::new(3).unwrap());
        assert_eq!(next.len(), 1);
        assert_eq!(next.lines()[0].quantity.get(), 5);
        // Original untouched
        assert_eq!(cart.lines()[0].quantity.get(), 2);
    }

    #[test]
    fn test_with_added_appends_new() {
        let cart = CartSnapshot::from_lines([line("p1", 10, 2)]);
        let next = cart.with_added(line("p2", 5, 1), Quantity::new(4).unwrap());
        assert_eq!(next.len(), 2);
        assert_eq!(next.lines()[1].product_id.as_str(), "p2");
        assert_eq!(next.lines()[1].quantity.get(), 4);
    }

    #[test]
    fn test_with_quantity() {
        let cart = CartSnapshot::from_lines([line("p1", 10, 2)]);
        let next = cart
            .with_quantity(&ProductId::new("p1"), Quantity::new(7).unwrap())
            .unwrap();
        assert_eq!(next.lines()[0].quantity.get(), 7);
        assert!(
            cart.with_quantity(&ProductId::new("nope"), Quantity::ONE)
                .is_none()
        );
    }

    #[test]
    fn test_without() {
        let cart = CartSnapshot::from_lines([line("p1", 10, 2), line("p2", 1, 1)]);
        let next = cart.without(&ProductId::new("p1"));
        assert_eq!(next.len(), 1);
        assert_eq!(next.lines()[0].product_id.as_str(), "p2");
        assert_eq!(
            CartSnapshot::empty().without(&ProductId::new("p1")),
            CartSnapshot::empty()
        );
    }

    #[test]
    fn test_serializes_camel_case() {
        let cart = CartSnapshot::from_lines([line("p1", 10, 2)]);
        let json = serde_json::to_value(&cart).unwrap();
        assert_eq!(json[0]["productId"], "p1");
        assert_eq!(json[0]["quantity"], 2);
        assert_eq!(json[0]["price"], 10.0);
    }
}
