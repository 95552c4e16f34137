//! Client state shared by every command.

use std::sync::Arc;

use tracing::instrument;

use crate::api::{ApiClient, ApiError};
use crate::catalog::Catalog;
use crate::config::StorefrontConfig;
use crate::retry::RetryPolicy;
use crate::storage::{FileStorage, Storage};
use crate::stores::{AuthStore, CartStore, Session, WishlistStore};

/// Everything a storefront client needs, wired together.
///
/// This struct is cheaply cloneable via `Arc`. The auth store feeds the API
/// client's bearer token and is injected into the cart and wishlist stores
/// as their [`Session`].
#[derive(Clone)]
pub struct Storefront {
    inner: Arc<StorefrontInner>,
}

struct StorefrontInner {
    config: StorefrontConfig,
    api: ApiClient,
    auth: AuthStore,
    cart: CartStore,
    wishlist: WishlistStore,
    catalog: Catalog,
}

impl std::fmt::Debug for Storefront {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storefront")
            .field("api", &self.inner.api)
            .field("auth", &self.inner.auth)
            .field("cart", &self.inner.cart)
            .finish_non_exhaustive()
    }
}

impl Storefront {
    /// Create the client with durable state under `config.state_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self, ApiError> {
        let storage: Arc<dyn Storage> = Arc::new(FileStorage::new(config.state_dir.clone()));
        Self::with_storage(config, storage)
    }

    /// Create the client over an explicit storage backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_storage(
        config: StorefrontConfig,
        storage: Arc<dyn Storage>,
    ) -> Result<Self, ApiError> {
        let auth = AuthStore::new(Arc::clone(&storage));
        let api = ApiClient::new(&config, Some(auth.token_source()))?;
        let session: Arc<dyn Session> = Arc::new(auth.clone());

        let cart = CartStore::new(
            api.clone(),
            Arc::clone(&session),
            Arc::clone(&storage),
            config.currency,
        );
        let wishlist = WishlistStore::new(api.clone(), session, storage);
        let catalog = Catalog::new(api.clone(), config.cache_ttl, RetryPolicy::default());

        Ok(Self {
            inner: Arc::new(StorefrontInner {
                config,
                api,
                auth,
                cart,
                wishlist,
                catalog,
            }),
        })
    }

    /// Sign out and forget the signed-in user's cart and wishlist, in memory
    /// and on disk, so the next session starts empty.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        self.inner.auth.logout();
        self.inner.cart.clear().await;
        self.inner.wishlist.clear().await;
    }

    /// Get a reference to the client configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the REST client.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    /// Get a reference to the session store.
    #[must_use]
    pub fn auth(&self) -> &AuthStore {
        &self.inner.auth
    }

    /// Get a reference to the cart store.
    #[must_use]
    pub fn cart(&self) -> &CartStore {
        &self.inner.cart
    }

    /// Get a reference to the wishlist store.
    #[must_use]
    pub fn wishlist(&self) -> &WishlistStore {
        &self.inner.wishlist
    }

    /// Get a reference to the product catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }
}
