//! Catalog commands.

use habaluna_storefront::Storefront;
use habaluna_storefront::models::ProductQuery;

use super::CliError;

/// Print one page of products.
#[allow(clippy::print_stdout)]
pub async fn list(storefront: &Storefront, query: &ProductQuery) -> Result<(), CliError> {
    let page = storefront.catalog().list_products(query).await?;
    let currency = storefront.config().currency;

    for product in &page.data {
        println!(
            "{:<24} {:<32} {}",
            product.slug,
            product.name,
            currency.format(product.price(currency))
        );
    }
    println!("page {} ({} of {} products)", page.page, page.data.len(), page.total);
    Ok(())
}

/// Print a product and its variants.
#[allow(clippy::print_stdout)]
pub async fn show(storefront: &Storefront, slug: &str) -> Result<(), CliError> {
    let product = storefront.catalog().product_by_slug(slug).await?;
    let currency = storefront.config().currency;

    println!("{} ({})", product.name, product.slug);
    println!("id:    {}", product.id);
    println!("price: {}", currency.format(product.price(currency)));
    if let Some(stock) = product.stock {
        println!("stock: {stock}");
    }
    if let Some(description) = product.description.as_deref().filter(|d| !d.is_empty()) {
        println!();
        println!("{description}");
    }
    if !product.variants.is_empty() {
        println!();
        println!("variants:");
        for variant in &product.variants {
            let price = variant
                .snapshot()
                .price(currency)
                .or_else(|| product.price(currency));
            println!("  {:<16} {:<20} {}", variant.id, variant.name, currency.format(price));
        }
    }
    Ok(())
}
