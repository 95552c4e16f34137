//! Read-only product catalog.
//!
//! Wraps the `/products` endpoints with a `moka` cache and retries transient
//! failures through a [`RetryPolicy`]. Search results are never cached.

use std::time::Duration;

use moka::future::Cache;
use tracing::{debug, instrument};

use crate::api::{ApiClient, ApiError};
use crate::models::{Product, ProductPage, ProductQuery};
use crate::retry::RetryPolicy;

const CACHE_CAPACITY: u64 = 1000;

/// Cache key for catalog reads.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
enum CacheKey {
    Product(String),
    Products(ProductQuery),
}

/// Cached catalog responses.
#[derive(Debug, Clone)]
enum CacheValue {
    Product(Box<Product>),
    Products(ProductPage),
}

/// Cached, retrying catalog reader.
#[derive(Clone)]
pub struct Catalog {
    api: ApiClient,
    cache: Cache<CacheKey, CacheValue>,
    retry: RetryPolicy,
}

impl std::fmt::Debug for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Catalog")
            .field("cached_entries", &self.cache.entry_count())
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl Catalog {
    /// Create a catalog over `api` with the given cache TTL.
    #[must_use]
    pub fn new(api: ApiClient, ttl: Duration, retry: RetryPolicy) -> Self {
        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(ttl)
            .build();

        Self { api, cache, retry }
    }

    /// List products matching `query`.
    ///
    /// # Errors
    ///
    /// Returns the last error once retries are exhausted.
    #[instrument(skip(self))]
    pub async fn list_products(&self, query: &ProductQuery) -> Result<ProductPage, ApiError> {
        let cacheable = query.search.as_deref().is_none_or(str::is_empty);
        let key = CacheKey::Products(query.clone());

        if cacheable && let Some(CacheValue::Products(page)) = self.cache.get(&key).await {
            debug!("Cache hit for product list");
            return Ok(page);
        }

        let page = self.retry.run(move || self.api.list_products(query)).await?;

        if cacheable {
            self.cache
                .insert(key, CacheValue::Products(page.clone()))
                .await;
        }
        Ok(page)
    }

    /// Get one product by slug.
    ///
    /// # Errors
    ///
    /// Returns the last error once retries are exhausted; a missing product
    /// is a 404 status error and is not retried past the policy.
    #[instrument(skip(self), fields(slug = %slug))]
    pub async fn product_by_slug(&self, slug: &str) -> Result<Product, ApiError> {
        let key = CacheKey::Product(slug.to_string());

        if let Some(CacheValue::Product(product)) = self.cache.get(&key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let product = self.retry.run(move || self.api.product_by_slug(slug)).await?;

        self.cache
            .insert(key, CacheValue::Product(Box::new(product.clone())))
            .await;
        Ok(product)
    }

    /// Drop one cached product.
    pub async fn invalidate_product(&self, slug: &str) {
        self.cache
            .invalidate(&CacheKey::Product(slug.to_string()))
            .await;
    }

    /// Drop everything cached.
    pub async fn invalidate_all(&self) {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
    }
}
