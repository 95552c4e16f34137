//! `/products` endpoints.

use reqwest::Method;
use tracing::instrument;

use super::{ApiClient, ApiError};
use crate::models::{Product, ProductPage, ProductQuery};

impl ApiClient {
    /// List catalog products.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not a product page.
    #[instrument(skip(self))]
    pub async fn list_products(&self, query: &ProductQuery) -> Result<ProductPage, ApiError> {
        let mut url = self.endpoint(&["products"])?;
        let pairs = query.pairs();
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }
        self.execute_json(self.request(Method::GET, url)).await
    }

    /// Get a product by its slug.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found or the request fails.
    #[instrument(skip(self), fields(slug = %slug))]
    pub async fn product_by_slug(&self, slug: &str) -> Result<Product, ApiError> {
        let url = self.endpoint(&["products", "slug", slug])?;
        self.execute_json(self.request(Method::GET, url)).await
    }
}
