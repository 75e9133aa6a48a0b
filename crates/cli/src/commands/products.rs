//! Catalog commands.

use vitashop_core::{CategoryId, ProductId};
use vitashop_storefront::Storefront;
use vitashop_storefront::api::ProductQuery;
use vitashop_storefront::error::{AppError, Result};

use super::money;

/// Print one page of products.
pub async fn list(
    storefront: &Storefront,
    page: u32,
    size: Option<u32>,
    search: Option<String>,
    category: Option<String>,
) -> Result<()> {
    let query = ProductQuery {
        page_number: page.max(1),
        page_size: size.unwrap_or(storefront.config().page_size).max(1),
        search_term: search,
        category_id: category,
    };

    let page = storefront.api().get_products(&query).await?;

    if page.items.is_empty() {
        println!("No products found.");
        return Ok(());
    }

    for product in &page.items {
        let badge = match (product.is_new, product.is_limited) {
            (true, _) => " [new]",
            (false, true) => " [limited]",
            (false, false) => "",
        };
        println!(
            "{:<26} {:<40} {:>10}{badge}",
            product.id.as_str(),
            product.name,
            money(product.price.amount())
        );
    }

    println!();
    println!(
        "Page {} of {} ({} products){}{}",
        page.page_number,
        page.total_pages().max(1),
        page.total_count,
        if page.has_previous() { "  < prev" } else { "" },
        if page.has_next() { "  next >" } else { "" },
    );

    Ok(())
}

/// Print one product in detail.
pub async fn show(storefront: &Storefront, id: &str) -> Result<()> {
    let id = ProductId::new(id);
    let product = storefront.api().get_product(&id).await?;
    let favorite = storefront.favorites().await.contains(&id);

    println!("{}{}", product.name, if favorite { "  (favorite)" } else { "" });
    println!("  id:       {}", product.id);
    println!("  price:    {}", money(product.price.amount()));
    let category: Option<&str> = product
        .category
        .as_deref()
        .or_else(|| product.category_id.as_ref().map(AsRef::as_ref));
    if let Some(category) = category {
        println!("  category: {category}");
    }
    if let Some(rating) = product.rating {
        println!(
            "  rating:   {rating} ({} reviews)",
            product.review_count.unwrap_or(0)
        );
    }
    if let Some(tag) = &product.tag {
        println!("  tag:      {tag}");
    }
    if let Some(description) = &product.description {
        println!();
        println!("{description}");
    }
    if !product.features.is_empty() {
        println!();
        for feature in &product.features {
            println!("  - {feature}");
        }
    }

    Ok(())
}

/// Print all categories.
pub async fn categories(storefront: &Storefront) {
    let categories = storefront.api().get_categories().await;

    if categories.is_empty() {
        println!("No categories available.");
        return;
    }

    for category in categories {
        println!("{:<26} {}", category.id.as_str(), category.name);
    }
}

/// Print one category.
pub async fn category(storefront: &Storefront, id: &str) -> Result<()> {
    let category = storefront
        .api()
        .get_category(&CategoryId::new(id))
        .await
        .ok_or_else(|| AppError::NotFound(format!("Category not found: {id}")))?;

    println!("{:<26} {}", category.id.as_str(), category.name);
    Ok(())
}
