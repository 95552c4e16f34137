//! Client-side state stores.
//!
//! Each store owns one slice of client state, persists it through a
//! [`Storage`](crate::storage::Storage) handle after every change, and talks to
//! the backend through a narrow trait it defines itself ([`cart::CartApi`],
//! [`wishlist::WishlistApi`], [`auth::AuthApi`]). The session is injected as a
//! [`Session`] rather than looked up globally.

pub mod auth;
pub mod cart;
pub mod wishlist;

pub use auth::{AuthError, AuthStore, Session};
pub use cart::{CartMode, CartStore, MergeReport};
pub use wishlist::WishlistStore;

use crate::api::ApiError;

/// Result of resyncing a store from the backend. Resyncs never fail
/// outright; the caller decides whether a stale copy is worth reporting.
#[derive(Debug)]
pub enum FetchOutcome {
    /// The store now mirrors the backend.
    Synced,
    /// The backend rejected the session; it was invalidated and the store cleared.
    SessionInvalidated,
    /// The fetch failed; the previous state was kept.
    Stale(ApiError),
}
