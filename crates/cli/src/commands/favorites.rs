//! Favorites commands.

use vitashop_core::ProductId;
use vitashop_storefront::Storefront;
use vitashop_storefront::error::Result;

/// Print favorite product IDs.
pub async fn list(storefront: &Storefront) {
    let favorites = storefront.favorites().await;

    if favorites.is_empty() {
        println!("No favorites yet.");
        return;
    }

    for id in favorites.ids() {
        println!("{id}");
    }
}

/// Add or remove a favorite.
pub async fn toggle(storefront: &Storefront, product_id: &str) -> Result<()> {
    let mut favorites = storefront.favorites().await;
    let added = favorites.toggle(&ProductId::new(product_id)).await?;

    if added {
        println!("Added {product_id} to favorites.");
    } else {
        println!("Removed {product_id} from favorites.");
    }
    Ok(())
}
