//! Cart synchronization store.
//!
//! Keeps the client-visible cart consistent with the backend `/cart` resource
//! when the user is signed in, and falls back to a cart kept purely on the
//! client when they are not (or the backend is unreachable).
//!
//! # Error policy
//!
//! | Failure                      | `fetch_cart`              | `add_to_cart` / `update_item_quantity` | `remove_item`  |
//! |------------------------------|---------------------------|----------------------------------------|----------------|
//! | session invalid (401)        | log out, clear cart       | propagate if signed in, else local     | local removal  |
//! | business (stock)             | keep state                | always propagate                       | local removal  |
//! | transient                    | keep state                | propagate if signed in, else local     | local removal  |
//!
//! # Concurrency
//!
//! Every operation that can change the cart holds a FIFO async mutex for its
//! whole duration (remote call, resync and local fallback), so calls on one
//! store apply in the order they were made. Reads take a short synchronous
//! lock and never wait on the network.

mod local;

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use habaluna_core::{CartItemId, Currency};
use rust_decimal::Decimal;
use tracing::{debug, info, instrument, warn};

use super::FetchOutcome;
use super::auth::Session;
use crate::api::{ApiClient, ApiError, ErrorKind};
use crate::models::{AddCartItem, CartItem, CartState, ProductSnapshot, VariantSnapshot};
use crate::storage::{self, Storage, keys};

/// Backend `/cart` endpoints.
pub trait CartApi: Send + Sync {
    /// `GET /cart`.
    fn fetch_cart(&self) -> impl Future<Output = Result<CartState, ApiError>> + Send;

    /// `POST /cart`.
    fn add_item(&self, item: &AddCartItem) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// `PATCH /cart/{id}`.
    fn update_item(
        &self,
        id: &CartItemId,
        quantity: u32,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// `DELETE /cart/{id}`.
    fn remove_item(&self, id: &CartItemId) -> impl Future<Output = Result<(), ApiError>> + Send;
}

/// Where the cart's contents currently live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartMode {
    /// No lines.
    Empty,
    /// Every line was issued by the backend.
    ServerBacked,
    /// At least one line exists only on the client.
    LocalOnly,
}

/// A local line the backend refused during a merge.
#[derive(Debug)]
pub struct RejectedItem {
    pub item: CartItem,
    /// Message from the backend, e.g. an out-of-stock notice.
    pub reason: String,
}

/// Summary of [`CartStore::merge_local_into_remote`].
#[derive(Debug, Default)]
pub struct MergeReport {
    /// Local lines accepted by the backend.
    pub merged: usize,
    /// Local lines dropped because the backend refused them (stock).
    pub rejected: Vec<RejectedItem>,
}

/// Cart store backed by the REST API, with a local-only fallback.
///
/// Cheap to clone; clones share state.
pub struct CartStore<A = ApiClient> {
    inner: Arc<CartStoreInner<A>>,
}

struct CartStoreInner<A> {
    api: A,
    session: Arc<dyn Session>,
    storage: Arc<dyn Storage>,
    currency: Currency,
    state: Mutex<CartState>,
    /// Serializes operations that can change `state`.
    ops: tokio::sync::Mutex<()>,
}

impl<A> Clone for CartStore<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A> std::fmt::Debug for CartStore<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock_state();
        f.debug_struct("CartStore")
            .field("items", &state.items.len())
            .field("currency", &self.inner.currency)
            .finish_non_exhaustive()
    }
}

impl<A: CartApi> CartStore<A> {
    /// Create the store and hydrate it from the `cart-storage` record.
    ///
    /// An unreadable record is logged and replaced by an empty cart.
    pub fn new(
        api: A,
        session: Arc<dyn Session>,
        storage: Arc<dyn Storage>,
        currency: Currency,
    ) -> Self {
        let state = match storage::load_json::<CartState>(storage.as_ref(), keys::CART) {
            Ok(state) => state.unwrap_or_default(),
            Err(e) => {
                warn!(error = %e, "Discarding unreadable cart record");
                CartState::default()
            }
        };
        debug!(items = state.items.len(), "Cart hydrated");

        Self {
            inner: Arc::new(CartStoreInner {
                api,
                session,
                storage,
                currency,
                state: Mutex::new(state),
                ops: tokio::sync::Mutex::new(()),
            }),
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Snapshot of the whole cart.
    #[must_use]
    pub fn state(&self) -> CartState {
        self.lock_state().clone()
    }

    /// Snapshot of the lines.
    #[must_use]
    pub fn items(&self) -> Vec<CartItem> {
        self.lock_state().items.clone()
    }

    /// Total units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.lock_state().item_count()
    }

    /// Cart subtotal.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.lock_state().subtotal
    }

    /// Cart total.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.lock_state().total
    }

    /// Currency used for local totals.
    #[must_use]
    pub fn currency(&self) -> Currency {
        self.inner.currency
    }

    /// Where the cart's lines currently live.
    #[must_use]
    pub fn mode(&self) -> CartMode {
        let state = self.lock_state();
        if state.is_empty() {
            CartMode::Empty
        } else if state.local_items().next().is_some() {
            CartMode::LocalOnly
        } else {
            CartMode::ServerBacked
        }
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Replace the cart with the backend's copy.
    ///
    /// A 401 invalidates the session and clears the cart. Any other failure
    /// keeps the current state.
    #[instrument(skip(self))]
    pub async fn fetch_cart(&self) -> FetchOutcome {
        let _op = self.inner.ops.lock().await;
        self.sync_from_remote().await
    }

    /// Add `quantity` units of a product (and optional variant).
    ///
    /// # Errors
    ///
    /// Returns the backend error when it is a stock error, or when the user is
    /// signed in. Otherwise the line is added locally.
    #[instrument(
        skip(self, product, variant),
        fields(product_id = %product.id, variant_id = ?variant.map(|v| v.id.as_str()))
    )]
    pub async fn add_to_cart(
        &self,
        product: &ProductSnapshot,
        variant: Option<&VariantSnapshot>,
        quantity: u32,
    ) -> Result<(), ApiError> {
        let _op = self.inner.ops.lock().await;

        let body = AddCartItem {
            product_id: product.id.clone(),
            product_variant_id: variant.map(|v| v.id.clone()),
            quantity,
        };
        match self.inner.api.add_item(&body).await {
            Ok(()) => {
                self.sync_from_remote().await;
                Ok(())
            }
            Err(err) => {
                self.fall_back_or_propagate(err)?;
                let id = self.mutate(|state, currency| {
                    local::add_line(state, product, variant, quantity, currency)
                });
                info!(item_id = %id, "Added line to local cart");
                Ok(())
            }
        }
    }

    /// Set a line's quantity. Quantities below 1 are ignored.
    ///
    /// # Errors
    ///
    /// Same policy as [`add_to_cart`](Self::add_to_cart) for backend-issued lines.
    /// Local lines never fail.
    #[instrument(skip(self), fields(item_id = %item_id))]
    pub async fn update_item_quantity(
        &self,
        item_id: &CartItemId,
        quantity: u32,
    ) -> Result<(), ApiError> {
        if quantity < 1 {
            debug!("Ignoring quantity below 1");
            return Ok(());
        }
        let _op = self.inner.ops.lock().await;

        if !item_id.is_local() {
            match self.inner.api.update_item(item_id, quantity).await {
                Ok(()) => {
                    self.sync_from_remote().await;
                    return Ok(());
                }
                Err(err) => self.fall_back_or_propagate(err)?,
            }
        }

        let found = self.mutate(|state, currency| {
            local::set_quantity(state, item_id, quantity, currency)
        });
        if !found {
            debug!("No such line in local cart");
        }
        Ok(())
    }

    /// Remove a line. Backend failures fall back to removing it locally.
    #[instrument(skip(self), fields(item_id = %item_id))]
    pub async fn remove_item(&self, item_id: &CartItemId) {
        let _op = self.inner.ops.lock().await;

        if !item_id.is_local() {
            match self.inner.api.remove_item(item_id).await {
                Ok(()) => {
                    self.sync_from_remote().await;
                    return;
                }
                Err(err) => {
                    warn!(error = %err, kind = ?err.kind(), "Remote remove failed, removing locally");
                }
            }
        }

        self.mutate(|state, currency| local::remove_line(state, item_id, currency));
    }

    /// Push local-only lines to the backend after sign-in.
    ///
    /// Each local line is posted once, oldest first. Accepted lines and lines
    /// refused for stock reasons leave the local cart; the refusals are
    /// reported. The cart is resynced once every line has been tried.
    /// Does nothing while signed out.
    ///
    /// # Errors
    ///
    /// A session or transient error stops the merge. Lines not yet merged stay
    /// in the local cart and the error is returned.
    #[instrument(skip(self))]
    pub async fn merge_local_into_remote(&self) -> Result<MergeReport, ApiError> {
        let _op = self.inner.ops.lock().await;
        let mut report = MergeReport::default();

        if !self.inner.session.is_authenticated() {
            debug!("Not signed in, nothing to merge");
            return Ok(report);
        }

        let mut pending: Vec<CartItem> = self.lock_state().local_items().cloned().collect();
        // Local lines are prepended, so oldest is last
        pending.reverse();
        if pending.is_empty() {
            return Ok(report);
        }
        info!(lines = pending.len(), "Merging local cart into remote cart");

        for item in pending {
            let body = AddCartItem {
                product_id: item.product.id.clone(),
                product_variant_id: item.product_variant.as_ref().map(|v| v.id.clone()),
                quantity: item.quantity,
            };
            match self.inner.api.add_item(&body).await {
                Ok(()) => report.merged += 1,
                Err(err) if err.kind() == ErrorKind::Business => {
                    warn!(item_id = %item.id, error = %err, "Backend refused local line");
                    report.rejected.push(RejectedItem {
                        reason: err.to_string(),
                        item: item.clone(),
                    });
                }
                Err(err) => {
                    warn!(error = %err, merged = report.merged, "Merge interrupted");
                    self.persist();
                    return Err(err);
                }
            }
            self.mutate(|state, currency| local::remove_line(state, &item.id, currency));
        }

        self.sync_from_remote().await;
        info!(
            merged = report.merged,
            rejected = report.rejected.len(),
            "Local cart merged"
        );
        Ok(report)
    }

    /// Empty the cart locally.
    #[instrument(skip(self))]
    pub async fn clear(&self) {
        let _op = self.inner.ops.lock().await;
        self.replace(CartState::default());
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// `GET /cart` and apply the result. Callers hold the op lock.
    async fn sync_from_remote(&self) -> FetchOutcome {
        match self.inner.api.fetch_cart().await {
            Ok(remote) => {
                debug!(items = remote.items.len(), "Cart synced from backend");
                self.replace(remote);
                FetchOutcome::Synced
            }
            Err(err) if err.kind() == ErrorKind::SessionInvalid => {
                warn!("Cart fetch rejected session, logging out");
                self.inner.session.invalidate();
                self.replace(CartState::default());
                FetchOutcome::SessionInvalidated
            }
            Err(err) => {
                warn!(error = %err, "Cart fetch failed, keeping current cart");
                FetchOutcome::Stale(err)
            }
        }
    }

    /// Decide what a failed remote mutation means. `Ok` means apply the change
    /// locally; `Err` hands the error back to the caller.
    fn fall_back_or_propagate(&self, err: ApiError) -> Result<(), ApiError> {
        if err.kind() == ErrorKind::Business {
            return Err(err);
        }
        if self.inner.session.is_authenticated() {
            return Err(err);
        }
        debug!(error = %err, "Signed out, applying change locally");
        Ok(())
    }

    fn mutate<T>(&self, f: impl FnOnce(&mut CartState, Currency) -> T) -> T {
        let out = f(&mut self.lock_state(), self.inner.currency);
        self.persist();
        out
    }

    fn replace(&self, state: CartState) {
        *self.lock_state() = state;
        self.persist();
    }

    fn persist(&self) {
        let snapshot = self.state();
        if let Err(e) = storage::save_json(self.inner.storage.as_ref(), keys::CART, &snapshot) {
            warn!(error = %e, "Failed to persist cart");
        }
    }
}

impl<A> CartStore<A> {
    fn lock_state(&self) -> MutexGuard<'_, CartState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
