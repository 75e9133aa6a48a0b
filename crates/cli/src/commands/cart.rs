//! Cart commands.
//!
//! The cart screen caps each line at [`MAX_QUANTITY_PER_ITEM`] units; the
//! synchronized cart itself has no cap. Setting a quantity below 1 removes
//! the line.

use vitashop_core::{CartSnapshot, CartTotals, DiscountError, ProductId, Quantity};
use vitashop_storefront::cart::ProductRef;
use vitashop_storefront::error::{AppError, Result, add_breadcrumb};
use vitashop_storefront::Storefront;

use super::money;

/// Most units of one product a customer may hold in the cart.
pub const MAX_QUANTITY_PER_ITEM: u32 = 10;

/// Print the cart, with an optional discount code applied to the total.
pub fn show(storefront: &Storefront, discount: Option<&str>) {
    let cart = storefront.cart().snapshot();

    if cart.is_empty() {
        println!("Your cart is empty.");
        return;
    }

    for line in cart.lines() {
        println!(
            "{:<26} {:<32} {:>3} x {:>10} = {:>10}",
            line.product_id.as_str(),
            line.product_name,
            line.quantity.get(),
            money(line.price.amount()),
            money(line.line_total())
        );
    }
    println!();
    println!("Items: {} ({} products)", cart.item_count(), cart.len());

    let (applied, rejected) = totals(&cart, discount);
    if let Some(error) = rejected {
        println!("{error}");
    }
    println!("Subtotal: {}", money(applied.subtotal));
    println!("Tax: {}", money(applied.tax));
    if !applied.discount.is_zero() {
        println!("Discount: -{}", money(applied.discount));
    }
    println!("Total: {}", money(applied.total));
}

/// Totals for `cart`. A rejected code applies no discount.
fn totals(cart: &CartSnapshot, discount: Option<&str>) -> (CartTotals, Option<DiscountError>) {
    discount.map_or_else(
        || (CartTotals::compute(cart, None), None),
        |code| CartTotals::with_code(cart, code),
    )
}

/// What `cart update` does for a requested quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QuantityChange {
    Remove,
    Set(Quantity),
}

fn plan_update(quantity: i64) -> Result<QuantityChange> {
    if quantity < 1 {
        return Ok(QuantityChange::Remove);
    }
    let requested = u32::try_from(quantity).unwrap_or(u32::MAX);
    check_cap(requested)?;
    Ok(Quantity::new(requested).map_or(QuantityChange::Remove, QuantityChange::Set))
}

/// Add a catalog product to the cart.
pub async fn add(storefront: &Storefront, product_id: &str, quantity: u32) -> Result<()> {
    let id = ProductId::new(product_id);
    let quantity = Quantity::new(quantity)
        .ok_or_else(|| AppError::InvalidInput("quantity must be at least 1".to_string()))?;

    let in_cart = storefront
        .cart()
        .snapshot()
        .find(&id)
        .map_or(0, |line| line.quantity.get());
    check_cap(in_cart.saturating_add(quantity.get()))?;

    let product = storefront.api().get_product(&id).await?;
    add_breadcrumb("cart", "Add item", Some(&[("product_id", product_id)]));
    storefront
        .cart()
        .add_item(&ProductRef::from(&product), quantity)
        .await?;

    println!("Added {} x {} to your cart.", quantity, product.name);
    Ok(())
}

/// Change the quantity of a line already in the cart.
pub async fn update(storefront: &Storefront, product_id: &str, quantity: i64) -> Result<()> {
    let change = plan_update(quantity)?;

    let id = ProductId::new(product_id);
    if storefront.cart().snapshot().find(&id).is_none() {
        return Err(AppError::NotFound(format!("Product not in cart: {product_id}")));
    }

    match change {
        QuantityChange::Remove => {
            add_breadcrumb("cart", "Remove item", Some(&[("product_id", product_id)]));
            storefront.cart().remove_item(&id).await?;
            println!("Removed {product_id} from your cart.");
        }
        QuantityChange::Set(quantity) => {
            add_breadcrumb("cart", "Update quantity", Some(&[("product_id", product_id)]));
            storefront
                .cart()
                .update_quantity(&id, i64::from(quantity.get()))
                .await?;
        }
    }
    show(storefront, None);
    Ok(())
}

/// Remove a line from the cart.
pub async fn remove(storefront: &Storefront, product_id: &str) -> Result<()> {
    add_breadcrumb("cart", "Remove item", Some(&[("product_id", product_id)]));
    storefront
        .cart()
        .remove_item(&ProductId::new(product_id))
        .await?;
    println!("Removed {product_id} from your cart.");
    Ok(())
}

/// Empty the cart.
pub async fn clear(storefront: &Storefront) -> Result<()> {
    add_breadcrumb("cart", "Clear cart", None);
    storefront.cart().clear().await?;
    println!("Your cart is empty.");
    Ok(())
}

fn check_cap(quantity: u32) -> Result<()> {
    if quantity > MAX_QUANTITY_PER_ITEM {
        return Err(AppError::InvalidInput(format!(
            "at most {MAX_QUANTITY_PER_ITEM} of each product per order"
        )));
    }
    Ok(())
}
