//! `/cart` endpoints.

use habaluna_core::CartItemId;
use reqwest::Method;
use tracing::instrument;

use super::{ApiClient, ApiError};
use crate::models::{AddCartItem, CartState, UpdateCartItem};
use crate::stores::cart::CartApi;

impl CartApi for ApiClient {
    #[instrument(skip(self))]
    async fn fetch_cart(&self) -> Result<CartState, ApiError> {
        let url = self.endpoint(&["cart"])?;
        self.execute_json(self.request(Method::GET, url)).await
    }

    #[instrument(skip(self), fields(product_id = %item.product_id, quantity = item.quantity))]
    async fn add_item(&self, item: &AddCartItem) -> Result<(), ApiError> {
        let url = self.endpoint(&["cart"])?;
        self.execute(self.request(Method::POST, url).json(item))
            .await
            .map(drop)
    }

    #[instrument(skip(self), fields(item_id = %id))]
    async fn update_item(&self, id: &CartItemId, quantity: u32) -> Result<(), ApiError> {
        let url = self.endpoint(&["cart", id.as_str()])?;
        self.execute(
            self.request(Method::PATCH, url)
                .json(&UpdateCartItem { quantity }),
        )
        .await
        .map(drop)
    }

    #[instrument(skip(self), fields(item_id = %id))]
    async fn remove_item(&self, id: &CartItemId) -> Result<(), ApiError> {
        let url = self.endpoint(&["cart", id.as_str()])?;
        self.execute(self.request(Method::DELETE, url))
            .await
            .map(drop)
    }
}
