//! Cart mutations applied on the client only.
//!
//! These never touch the network. Every function leaves `subtotal` and `total`
//! recomputed from the lines.

use habaluna_core::{CartItemId, Currency};

use crate::models::{CartItem, CartState, ProductSnapshot, VariantSnapshot};

/// Add `quantity` units of a product/variant, merging into the existing
/// local line for the same pair or prepending a new one.
pub(super) fn add_line(
    state: &mut CartState,
    product: &ProductSnapshot,
    variant: Option<&VariantSnapshot>,
    quantity: u32,
    currency: Currency,
) -> CartItemId {
    let id = CartItemId::local(&product.id, variant.map(|v| &v.id));

    match state.items.iter_mut().find(|item| item.id == id) {
        Some(existing) => {
            existing.quantity = existing.quantity.saturating_add(quantity);
        }
        None => state.items.insert(
            0,
            CartItem {
                id: id.clone(),
                product: product.clone(),
                product_variant: variant.cloned(),
                quantity,
            },
        ),
    }

    state.recompute_totals(currency);
    id
}

/// Set a line's quantity in place. Returns `false` if no line has `id`.
pub(super) fn set_quantity(
    state: &mut CartState,
    id: &CartItemId,
    quantity: u32,
    currency: Currency,
) -> bool {
    let Some(item) = state.items.iter_mut().find(|item| &item.id == id) else {
        return false;
    };
    item.quantity = quantity;
    state.recompute_totals(currency);
    true
}

/// Drop a line. Returns `false` if no line has `id`.
pub(super) fn remove_line(state: &mut CartState, id: &CartItemId, currency: Currency) -> bool {
    let before = state.items.len();
    state.items.retain(|item| &item.id != id);
    let removed = state.items.len() != before;
    state.recompute_totals(currency);
    removed
}
