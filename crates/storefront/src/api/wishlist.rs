//! `/wishlist` endpoints.

use habaluna_core::ProductId;
use reqwest::Method;
use tracing::instrument;

use super::{ApiClient, ApiError};
use crate::models::{AddWishlistItem, WishlistItem};
use crate::stores::wishlist::WishlistApi;

impl WishlistApi for ApiClient {
    #[instrument(skip(self))]
    async fn fetch_wishlist(&self) -> Result<Vec<WishlistItem>, ApiError> {
        let url = self.endpoint(&["wishlist"])?;
        self.execute_json(self.request(Method::GET, url)).await
    }

    #[instrument(skip(self), fields(product_id = %product_id))]
    async fn add_to_wishlist(&self, product_id: &ProductId) -> Result<(), ApiError> {
        let url = self.endpoint(&["wishlist"])?;
        let body = AddWishlistItem {
            product_id: product_id.clone(),
        };
        self.execute(self.request(Method::POST, url).json(&body))
            .await
            .map(drop)
    }

    #[instrument(skip(self), fields(product_id = %product_id))]
    async fn remove_from_wishlist(&self, product_id: &ProductId) -> Result<(), ApiError> {
        let url = self.endpoint(&["wishlist", product_id.as_str()])?;
        self.execute(self.request(Method::DELETE, url))
            .await
            .map(drop)
    }
}
