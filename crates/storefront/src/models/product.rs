//! Product and variant types.
//!
//! [`ProductSnapshot`]/[`VariantSnapshot`] are the copies embedded in cart
//! lines and wishlist entries. [`Product`] is the full catalog record.

use habaluna_core::price::{self, Currency};
use habaluna_core::{ProductId, VariantId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Product data carried by a cart line or wishlist entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSnapshot {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    /// Price in US dollars.
    #[serde(
        rename = "priceUSD",
        default,
        deserialize_with = "price::lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub price_usd: Option<Decimal>,
    /// Price in pesos (moneda nacional).
    #[serde(
        rename = "priceMNs",
        default,
        deserialize_with = "price::lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub price_mns: Option<Decimal>,
    /// Image URLs, primary image first.
    #[serde(default)]
    pub images: Vec<String>,
}

impl ProductSnapshot {
    /// Price in the given currency, if the product has one.
    #[must_use]
    pub const fn price(&self, currency: Currency) -> Option<Decimal> {
        match currency {
            Currency::Usd => self.price_usd,
            Currency::Cup => self.price_mns,
        }
    }
}

/// Variant data carried by a cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantSnapshot {
    pub id: VariantId,
    pub name: String,
    #[serde(
        rename = "priceUSD",
        default,
        deserialize_with = "price::lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub price_usd: Option<Decimal>,
    #[serde(
        rename = "priceMNs",
        default,
        deserialize_with = "price::lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub price_mns: Option<Decimal>,
}

impl VariantSnapshot {
    /// Price in the given currency, if the variant has one.
    #[must_use]
    pub const fn price(&self, currency: Currency) -> Option<Decimal> {
        match currency {
            Currency::Usd => self.price_usd,
            Currency::Cup => self.price_mns,
        }
    }
}

/// A purchasable variant of a catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductVariant {
    pub id: VariantId,
    pub name: String,
    #[serde(rename = "priceUSD", default, deserialize_with = "price::lenient")]
    pub price_usd: Option<Decimal>,
    #[serde(rename = "priceMNs", default, deserialize_with = "price::lenient")]
    pub price_mns: Option<Decimal>,
    /// Units on hand, when the backend exposes it.
    #[serde(default)]
    pub stock: Option<i64>,
}

impl ProductVariant {
    /// Copy the fields a cart line keeps.
    #[must_use]
    pub fn snapshot(&self) -> VariantSnapshot {
        VariantSnapshot {
            id: self.id.clone(),
            name: self.name.clone(),
            price_usd: self.price_usd,
            price_mns: self.price_mns,
        }
    }
}

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "priceUSD", default, deserialize_with = "price::lenient")]
    pub price_usd: Option<Decimal>,
    #[serde(rename = "priceMNs", default, deserialize_with = "price::lenient")]
    pub price_mns: Option<Decimal>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub stock: Option<i64>,
    #[serde(default)]
    pub variants: Vec<ProductVariant>,
}

impl Product {
    /// Copy the fields a cart line or wishlist entry keeps.
    #[must_use]
    pub fn snapshot(&self) -> ProductSnapshot {
        ProductSnapshot {
            id: self.id.clone(),
            name: self.name.clone(),
            slug: self.slug.clone(),
            price_usd: self.price_usd,
            price_mns: self.price_mns,
            images: self.images.clone(),
        }
    }

    /// Look up a variant by ID.
    #[must_use]
    pub fn variant(&self, id: &VariantId) -> Option<&ProductVariant> {
        self.variants.iter().find(|v| &v.id == id)
    }

    /// Price in the given currency, if the product has one.
    #[must_use]
    pub const fn price(&self, currency: Currency) -> Option<Decimal> {
        match currency {
            Currency::Usd => self.price_usd,
            Currency::Cup => self.price_mns,
        }
    }
}

/// One page of catalog results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPage {
    pub data: Vec<Product>,
    #[serde(default)]
    pub total: u64,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default)]
    pub limit: u32,
}

const fn default_page() -> u32 {
    1
}

/// Catalog listing filters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ProductQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub category: Option<String>,
}

impl ProductQuery {
    /// Query-string pairs for the set filters, in a stable order.
    #[must_use]
    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            pairs.push(("search", search.to_string()));
        }
        if let Some(category) = self.category.as_deref().filter(|s| !s.is_empty()) {
            pairs.push(("category", category.to_string()));
        }
        pairs
    }
}
