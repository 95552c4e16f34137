//! Wishlist types.

use chrono::{DateTime, Utc};
use habaluna_core::{ProductId, WishlistItemId};
use serde::{Deserialize, Serialize};

use super::product::ProductSnapshot;

/// A saved product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistItem {
    /// Remote-issued ID, or `local-<productId>`.
    pub id: WishlistItemId,
    pub product_id: ProductId,
    pub product: ProductSnapshot,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Persisted wishlist record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WishlistState {
    #[serde(default)]
    pub items: Vec<WishlistItem>,
}

impl WishlistState {
    /// Whether the product is saved.
    #[must_use]
    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.items.iter().any(|item| &item.product_id == product_id)
    }
}

/// Body of `POST /wishlist`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddWishlistItem {
    pub product_id: ProductId,
}
