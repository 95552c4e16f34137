//! Wishlist store.
//!
//! Same shape as the cart store: the backend copy wins when reachable, a
//! client-side list (entries keyed `local-<productId>`) stands in while the
//! user is signed out. Persisted under `wishlist-storage`.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use habaluna_core::{ProductId, WishlistItemId};
use tracing::{debug, info, instrument, warn};

use super::FetchOutcome;
use super::auth::Session;
use crate::api::{ApiClient, ApiError, ErrorKind};
use crate::models::{ProductSnapshot, WishlistItem, WishlistState};
use crate::storage::{self, Storage, keys};

/// Backend `/wishlist` endpoints.
pub trait WishlistApi: Send + Sync {
    /// `GET /wishlist`.
    fn fetch_wishlist(&self) -> impl Future<Output = Result<Vec<WishlistItem>, ApiError>> + Send;

    /// `POST /wishlist`.
    fn add_to_wishlist(
        &self,
        product_id: &ProductId,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// `DELETE /wishlist/{productId}`.
    fn remove_from_wishlist(
        &self,
        product_id: &ProductId,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;
}

/// Wishlist backed by the REST API, with a local-only fallback.
///
/// Cheap to clone; clones share state.
pub struct WishlistStore<A = ApiClient> {
    inner: Arc<WishlistStoreInner<A>>,
}

struct WishlistStoreInner<A> {
    api: A,
    session: Arc<dyn Session>,
    storage: Arc<dyn Storage>,
    state: Mutex<WishlistState>,
    ops: tokio::sync::Mutex<()>,
}

impl<A> Clone for WishlistStore<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A> std::fmt::Debug for WishlistStore<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WishlistStore")
            .field("items", &self.lock_state().items.len())
            .finish_non_exhaustive()
    }
}

impl<A: WishlistApi> WishlistStore<A> {
    /// Create the store and hydrate it from the `wishlist-storage` record.
    pub fn new(api: A, session: Arc<dyn Session>, storage: Arc<dyn Storage>) -> Self {
        let state = match storage::load_json::<WishlistState>(storage.as_ref(), keys::WISHLIST) {
            Ok(state) => state.unwrap_or_default(),
            Err(e) => {
                warn!(error = %e, "Discarding unreadable wishlist record");
                WishlistState::default()
            }
        };

        Self {
            inner: Arc::new(WishlistStoreInner {
                api,
                session,
                storage,
                state: Mutex::new(state),
                ops: tokio::sync::Mutex::new(()),
            }),
        }
    }

    /// Snapshot of the saved entries, newest first.
    #[must_use]
    pub fn items(&self) -> Vec<WishlistItem> {
        self.lock_state().items.clone()
    }

    /// Whether a product is saved.
    #[must_use]
    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.lock_state().contains(product_id)
    }

    /// Number of saved entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock_state().items.len()
    }

    /// Whether nothing is saved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock_state().items.is_empty()
    }

    /// Replace the wishlist with the backend's copy.
    #[instrument(skip(self))]
    pub async fn fetch(&self) -> FetchOutcome {
        let _op = self.inner.ops.lock().await;
        self.sync_from_remote().await
    }

    /// Save a product.
    ///
    /// # Errors
    ///
    /// Returns the backend error when signed in, or when it is a stock error.
    /// Otherwise the product is saved locally.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn add(&self, product: &ProductSnapshot) -> Result<(), ApiError> {
        let _op = self.inner.ops.lock().await;
        self.add_locked(product).await
    }

    /// Unsave a product. Backend failures fall back to removing it locally.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn remove(&self, product_id: &ProductId) {
        let _op = self.inner.ops.lock().await;
        self.remove_locked(product_id).await;
    }

    /// Remove the product if saved, else save it. Returns whether it is saved
    /// afterwards.
    ///
    /// # Errors
    ///
    /// Same as [`add`](Self::add).
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn toggle(&self, product: &ProductSnapshot) -> Result<bool, ApiError> {
        let _op = self.inner.ops.lock().await;
        if self.lock_state().contains(&product.id) {
            self.remove_locked(&product.id).await;
        } else {
            self.add_locked(product).await?;
        }
        Ok(self.lock_state().contains(&product.id))
    }

    /// Forget every entry locally.
    #[instrument(skip(self))]
    pub async fn clear(&self) {
        let _op = self.inner.ops.lock().await;
        self.mutate(|state| state.items.clear());
    }

    async fn add_locked(&self, product: &ProductSnapshot) -> Result<(), ApiError> {
        match self.inner.api.add_to_wishlist(&product.id).await {
            Ok(()) => {
                self.sync_from_remote().await;
                Ok(())
            }
            Err(err) => {
                if err.kind() == ErrorKind::Business || self.inner.session.is_authenticated() {
                    return Err(err);
                }
                debug!(error = %err, "Signed out, saving locally");
                self.mutate(|state| {
                    if !state.contains(&product.id) {
                        state.items.insert(
                            0,
                            WishlistItem {
                                id: WishlistItemId::local(&product.id),
                                product_id: product.id.clone(),
                                product: product.clone(),
                                created_at: Some(Utc::now()),
                            },
                        );
                    }
                });
                Ok(())
            }
        }
    }

    async fn remove_locked(&self, product_id: &ProductId) {
        let local_only = self
            .lock_state()
            .items
            .iter()
            .any(|item| &item.product_id == product_id && item.id.is_local());

        if !local_only {
            match self.inner.api.remove_from_wishlist(product_id).await {
                Ok(()) => {
                    self.sync_from_remote().await;
                    return;
                }
                Err(err) => {
                    warn!(error = %err, "Remote wishlist remove failed, removing locally");
                }
            }
        }

        self.mutate(|state| state.items.retain(|item| &item.product_id != product_id));
    }

    async fn sync_from_remote(&self) -> FetchOutcome {
        match self.inner.api.fetch_wishlist().await {
            Ok(items) => {
                debug!(items = items.len(), "Wishlist synced from backend");
                self.mutate(|state| state.items = items);
                FetchOutcome::Synced
            }
            Err(err) if err.kind() == ErrorKind::SessionInvalid => {
                warn!("Wishlist fetch rejected session, logging out");
                self.inner.session.invalidate();
                self.mutate(|state| state.items.clear());
                info!("Wishlist cleared");
                FetchOutcome::SessionInvalidated
            }
            Err(err) => {
                warn!(error = %err, "Wishlist fetch failed, keeping current list");
                FetchOutcome::Stale(err)
            }
        }
    }

    fn mutate(&self, f: impl FnOnce(&mut WishlistState)) {
        let snapshot = {
            let mut state = self.lock_state();
            f(&mut state);
            state.clone()
        };
        if let Err(e) = storage::save_json(self.inner.storage.as_ref(), keys::WISHLIST, &snapshot)
        {
            warn!(error = %e, "Failed to persist wishlist");
        }
    }
}

impl<A> WishlistStore<A> {
    fn lock_state(&self) -> MutexGuard<'_, WishlistState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicBool, Ordering};

    use crate::storage::MemoryStorage;

    use super::*;

    #[derive(Default)]
    struct FakeWishlistApi {
        fetch: Mutex<VecDeque<Result<Vec<WishlistItem>, ApiError>>>,
        add: Mutex<VecDeque<Result<(), ApiError>>>,
        remove: Mutex<VecDeque<Result<(), ApiError>>>,
        calls: Mutex<Vec<String>>,
    }

    fn next<T>(queue: &Mutex<VecDeque<Result<T, ApiError>>>) -> Result<T, ApiError> {
        queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::from_response(503, "")))
    }

    impl WishlistApi for Arc<FakeWishlistApi> {
        async fn fetch_wishlist(&self) -> Result<Vec<WishlistItem>, ApiError> {
            self.calls.lock().unwrap().push("GET /wishlist".to_string());
            next(&self.fetch)
        }

        async fn add_to_wishlist(&self, product_id: &ProductId) -> Result<(), ApiError> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("POST /wishlist {product_id}"));
            next(&self.add)
        }

        async fn remove_from_wishlist(&self, product_id: &ProductId) -> Result<(), ApiError> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("DELETE /wishlist/{product_id}"));
            next(&self.remove)
        }
    }

    struct FakeSession(AtomicBool);

    impl Session for FakeSession {
        fn is_authenticated(&self) -> bool {
            self.0.load(Ordering::SeqCst)
        }

        fn invalidate(&self) {
            self.0.store(false, Ordering::SeqCst);
        }
    }

    fn store(signed_in: bool) -> (Arc<FakeWishlistApi>, Arc<FakeSession>, WishlistStore<Arc<FakeWishlistApi>>) {
        let api = Arc::new(FakeWishlistApi::default());
        let session = Arc::new(FakeSession(AtomicBool::new(signed_in)));
        let store = WishlistStore::new(
            Arc::clone(&api),
            Arc::clone(&session) as Arc<dyn Session>,
            Arc::new(MemoryStorage::new()),
        );
        (api, session, store)
    }

    fn product(id: &str) -> ProductSnapshot {
        ProductSnapshot {
            id: id.into(),
            name: format!("Product {id}"),
            slug: id.to_string(),
            price_usd: None,
            price_mns: None,
            images: Vec::new(),
        }
    }

    fn remote_entry(id: &str, product_id: &str) -> WishlistItem {
        WishlistItem {
            id: id.into(),
            product_id: product_id.into(),
            product: product(product_id),
            created_at: None,
        }
    }

    #[tokio::test]
    async fn test_anonymous_add_is_idempotent() {
        let (_api, _session, store) = store(false);

        store.add(&product("p1")).await.unwrap();
        store.add(&product("p1")).await.unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.items()[0].id.as_str(), "local-p1");
        assert!(store.contains(&"p1".into()));
    }

    #[tokio::test]
    async fn test_anonymous_add_prepends() {
        let (_api, _session, store) = store(false);
        store.add(&product("p1")).await.unwrap();
        store.add(&product("p2")).await.unwrap();

        let ids: Vec<_> = store.items().iter().map(|i| i.product_id.to_string()).collect();
        assert_eq!(ids, ["p2", "p1"]);
    }

    #[tokio::test]
    async fn test_clear_forgets_everything() {
        let (api, _session, store) = store(false);
        store.add(&product("p1")).await.unwrap();
        store.add(&product("p2")).await.unwrap();
        let calls_before = api.calls.lock().unwrap().len();

        store.clear().await;

        assert!(store.is_empty());
        assert!(!store.contains(&"p1".into()));
        assert_eq!(api.calls.lock().unwrap().len(), calls_before);
    }

    #[tokio::test]
    async fn test_authenticated_add_failure_propagates() {
        let (_api, _session, store) = store(true);
        assert!(store.add(&product("p1")).await.is_err());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_add_success_resyncs() {
        let (api, _session, store) = store(true);
        api.add.lock().unwrap().push_back(Ok(()));
        api.fetch
            .lock()
            .unwrap()
            .push_back(Ok(vec![remote_entry("w1", "p1")]));

        store.add(&product("p1")).await.unwrap();

        assert_eq!(
            *api.calls.lock().unwrap(),
            ["POST /wishlist p1", "GET /wishlist"]
        );
        assert_eq!(store.items()[0].id.as_str(), "w1");
    }

    #[tokio::test]
    async fn test_fetch_401_invalidates_and_clears() {
        let (api, session, store) = store(true);
        api.fetch
            .lock()
            .unwrap()
            .push_back(Ok(vec![remote_entry("w1", "p1")]));
        store.fetch().await;
        assert_eq!(store.len(), 1);

        api.fetch
            .lock()
            .unwrap()
            .push_back(Err(ApiError::from_response(401, "")));
        assert!(matches!(store.fetch().await, FetchOutcome::SessionInvalidated));

        assert!(store.is_empty());
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn test_remove_failure_falls_back_locally() {
        let (api, _session, store) = store(true);
        api.fetch
            .lock()
            .unwrap()
            .push_back(Ok(vec![remote_entry("w1", "p1"), remote_entry("w2", "p2")]));
        store.fetch().await;

        store.remove(&"p1".into()).await;

        assert!(!store.contains(&"p1".into()));
        assert!(store.contains(&"p2".into()));
    }

    #[tokio::test]
    async fn test_toggle_flips_membership() {
        let (api, _session, store) = store(false);

        assert!(store.toggle(&product("p1")).await.unwrap());
        assert!(!store.toggle(&product("p1")).await.unwrap());
        assert!(store.is_empty());

        // The local entry is removed without a DELETE
        assert_eq!(*api.calls.lock().unwrap(), ["POST /wishlist p1"]);
    }
}
