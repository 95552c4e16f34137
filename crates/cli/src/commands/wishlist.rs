//! Wishlist commands.

use habaluna_storefront::Storefront;
use habaluna_storefront::stores::FetchOutcome;

use super::CliError;

/// Sync with the backend, then print the saved products.
#[allow(clippy::print_stdout)]
pub async fn show(storefront: &Storefront) {
    let wishlist = storefront.wishlist();
    if let FetchOutcome::Stale(e) = wishlist.fetch().await {
        println!("Showing saved wishlist (backend unavailable: {e})");
    }

    if wishlist.is_empty() {
        println!("Wishlist is empty");
        return;
    }
    let currency = storefront.config().currency;
    for item in wishlist.items() {
        println!(
            "{:<16} {} {}",
            item.product.slug,
            item.product.name,
            currency.format(item.product.price(currency))
        );
    }
}

/// Save a product by slug.
#[allow(clippy::print_stdout)]
pub async fn add(storefront: &Storefront, slug: &str) -> Result<(), CliError> {
    let product = storefront.catalog().product_by_slug(slug).await?;
    storefront.wishlist().add(&product.snapshot()).await?;
    println!("Saved {}", product.name);
    Ok(())
}

/// Unsave a product by slug.
#[allow(clippy::print_stdout)]
pub async fn remove(storefront: &Storefront, slug: &str) -> Result<(), CliError> {
    let product = storefront.catalog().product_by_slug(slug).await?;
    storefront.wishlist().remove(&product.id).await;
    println!("Removed {}", product.name);
    Ok(())
}

/// Save or unsave a product by slug.
#[allow(clippy::print_stdout)]
pub async fn toggle(storefront: &Storefront, slug: &str) -> Result<(), CliError> {
    let product = storefront.catalog().product_by_slug(slug).await?;
    if storefront.wishlist().toggle(&product.snapshot()).await? {
        println!("Saved {}", product.name);
    } else {
        println!("Removed {}", product.name);
    }
    Ok(())
}
