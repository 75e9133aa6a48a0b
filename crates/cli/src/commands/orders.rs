//! Order lookup commands.

use vitashop_core::OrderId;
use vitashop_storefront::Storefront;
use vitashop_storefront::api::Order;
use vitashop_storefront::error::Result;

use super::money;

/// Print the orders of the customer behind the configured auth token.
pub async fn list(storefront: &Storefront) -> Result<()> {
    let orders = storefront.api().get_user_orders().await?;

    if orders.is_empty() {
        println!("You have no orders yet.");
        return Ok(());
    }

    for order in &orders {
        println!("{}", summary(order));
    }
    Ok(())
}

/// Print one order with its items.
pub async fn show(storefront: &Storefront, id: &str) -> Result<()> {
    let order = storefront.api().get_order(&OrderId::new(id)).await?;

    println!("{}", summary(&order));
    if let Some(email) = &order.customer_email {
        println!("Customer: {email}");
    }
    for item in &order.items {
        println!(
            "  {:<26} {:<32} {:>3} x {:>10}",
            item.product_id.as_str(),
            item.product_name.as_deref().unwrap_or("-"),
            item.quantity.get(),
            item.price.map_or_else(|| "-".to_string(), |p| money(p.amount()))
        );
    }
    Ok(())
}

fn summary(order: &Order) -> String {
    format!(
        "{:<12} {:<12} {:<26} {:>10}",
        order.id.as_str(),
        order.status.as_deref().unwrap_or("Unknown"),
        order.order_date.as_deref().unwrap_or("-"),
        money(order.total_price.amount())
    )
}
