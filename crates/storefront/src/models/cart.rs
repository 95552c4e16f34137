//! Cart types.

use habaluna_core::price::{self, Currency};
use habaluna_core::{CartItemId, ProductId, VariantId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::product::{ProductSnapshot, VariantSnapshot};

/// One line in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Remote-issued ID, or `local-<productId>-<variantId|default>`.
    pub id: CartItemId,
    pub product: ProductSnapshot,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_variant: Option<VariantSnapshot>,
    pub quantity: u32,
}

impl CartItem {
    /// Unit price: the variant's price when a priced variant is attached,
    /// otherwise the product's price.
    #[must_use]
    pub fn unit_price(&self, currency: Currency) -> Option<Decimal> {
        self.product_variant
            .as_ref()
            .and_then(|variant| variant.price(currency))
            .or_else(|| self.product.price(currency))
    }

    /// Unit price times quantity. Lines without a price contribute zero, and
    /// so do lines whose product does not fit in a `Decimal`.
    #[must_use]
    pub fn line_total(&self, currency: Currency) -> Decimal {
        let unit = self.unit_price(currency).unwrap_or_default();
        unit.checked_mul(Decimal::from(self.quantity))
            .unwrap_or_else(|| {
                warn!(
                    item_id = %self.id,
                    quantity = self.quantity,
                    "Line total overflows, counting it as unpriced"
                );
                Decimal::ZERO
            })
    }
}

/// Client-visible cart: lines plus totals.
///
/// This is also the shape of `GET /cart` and of the persisted `cart-storage` record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartState {
    #[serde(default)]
    pub items: Vec<CartItem>,
    #[serde(default, deserialize_with = "price::lenient_or_zero")]
    pub subtotal: Decimal,
    #[serde(default, deserialize_with = "price::lenient_or_zero")]
    pub total: Decimal,
}

impl CartState {
    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Find a line by ID.
    #[must_use]
    pub fn item(&self, id: &CartItemId) -> Option<&CartItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    /// Lines that only exist on the client.
    pub fn local_items(&self) -> impl Iterator<Item = &CartItem> {
        self.items.iter().filter(|item| item.id.is_local())
    }

    /// Recompute `subtotal` and `total` from the lines. No shipping or tax
    /// is applied client-side, so both end up equal.
    pub fn recompute_totals(&mut self, currency: Currency) {
        let subtotal = self
            .items
            .iter()
            .try_fold(Decimal::ZERO, |acc, item| {
                acc.checked_add(item.line_total(currency))
            })
            .unwrap_or_else(|| {
                warn!(lines = self.items.len(), "Cart subtotal overflows, capping it");
                Decimal::MAX
            });
        self.subtotal = subtotal;
        self.total = subtotal;
    }
}

/// Body of `POST /cart`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCartItem {
    pub product_id: ProductId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_variant_id: Option<VariantId>,
    pub quantity: u32,
}

/// Body of `PATCH /cart/{itemId}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UpdateCartItem {
    pub quantity: u32,
}
