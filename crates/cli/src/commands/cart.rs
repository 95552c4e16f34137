//! Cart commands.

use habaluna_core::{CartItemId, VariantId};
use habaluna_storefront::Storefront;
use habaluna_storefront::stores::{CartMode, FetchOutcome};

use super::CliError;

/// Sync with the backend, then print every line and the totals.
#[allow(clippy::print_stdout)]
pub async fn show(storefront: &Storefront) {
    let cart = storefront.cart();
    match cart.fetch_cart().await {
        FetchOutcome::Synced => {}
        FetchOutcome::SessionInvalidated => println!("Session expired, signed out"),
        FetchOutcome::Stale(e) => println!("Showing saved cart (backend unavailable: {e})"),
    }

    let state = cart.state();
    let currency = cart.currency();
    if state.is_empty() {
        println!("Cart is empty");
        return;
    }

    for item in &state.items {
        let variant = item
            .product_variant
            .as_ref()
            .map(|v| format!(" ({})", v.name))
            .unwrap_or_default();
        println!(
            "{:<28} {}{} x{} @ {} = {}",
            item.id,
            item.product.name,
            variant,
            item.quantity,
            currency.format(item.unit_price(currency)),
            currency.format(Some(item.line_total(currency))),
        );
    }
    println!("subtotal: {}", currency.format(Some(state.subtotal)));
    println!("total:    {}", currency.format(Some(state.total)));
    if cart.mode() == CartMode::LocalOnly {
        println!("(some lines are only saved on this device)");
    }
}

/// Look up a product by slug and add it to the cart.
#[allow(clippy::print_stdout)]
pub async fn add(
    storefront: &Storefront,
    slug: &str,
    variant: Option<&str>,
    quantity: u32,
) -> Result<(), CliError> {
    let product = storefront.catalog().product_by_slug(slug).await?;
    let variant = match variant {
        Some(id) => Some(
            product
                .variant(&VariantId::new(id))
                .map(|v| v.snapshot())
                .ok_or_else(|| CliError::UnknownVariant {
                    slug: slug.to_string(),
                    variant: id.to_string(),
                })?,
        ),
        None => None,
    };

    storefront
        .cart()
        .add_to_cart(&product.snapshot(), variant.as_ref(), quantity)
        .await?;
    println!(
        "Added {} x{} ({} items in cart)",
        product.name,
        quantity,
        storefront.cart().item_count()
    );
    Ok(())
}

/// Set a line's quantity.
pub async fn update(storefront: &Storefront, item_id: &str, quantity: u32) -> Result<(), CliError> {
    storefront
        .cart()
        .update_item_quantity(&CartItemId::new(item_id), quantity)
        .await?;
    Ok(())
}

/// Remove a line.
pub async fn remove(storefront: &Storefront, item_id: &str) {
    storefront.cart().remove_item(&CartItemId::new(item_id)).await;
}

/// Print the number of units in the cart.
#[allow(clippy::print_stdout)]
pub fn count(storefront: &Storefront) {
    println!("{}", storefront.cart().item_count());
}

/// Push local-only lines to the account cart.
#[allow(clippy::print_stdout)]
pub async fn merge(storefront: &Storefront) -> Result<(), CliError> {
    if !storefront.auth().is_authenticated() {
        return Err(CliError::NotSignedIn);
    }

    let report = storefront.cart().merge_local_into_remote().await?;
    if report.merged > 0 {
        println!("Moved {} line(s) into your account cart", report.merged);
    }
    for rejected in &report.rejected {
        println!("Dropped {}: {}", rejected.item.product.name, rejected.reason);
    }
    Ok(())
}

/// Empty the local cart.
#[allow(clippy::print_stdout)]
pub async fn clear(storefront: &Storefront) {
    storefront.cart().clear().await;
    println!("Cart cleared");
}
