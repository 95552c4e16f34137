//! Integration tests for the Habaluna storefront client.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p habaluna-integration-tests
//! ```
//!
//! Every test drives the real [`ApiClient`] against a local `mockito` server
//! mounted at `/api`, with durable state in a temporary directory.
//!
//! # Test Categories
//!
//! - `cart_sync` - Cart store against the `/cart` endpoints
//! - `auth_session` - Login, refresh and persistence across restarts
//! - `wishlist` - Wishlist store against the `/wishlist` endpoints
//! - `catalog` - Product reads, caching and retries

use std::path::Path;
use std::sync::Arc;

use habaluna_storefront::Storefront;
use habaluna_storefront::api::ApiClient;
use habaluna_storefront::config::StorefrontConfig;
use habaluna_storefront::models::{AuthSession, PersistedSession, ProductSnapshot};
use habaluna_storefront::storage::FileStorage;
use mockito::ServerGuard;
use serde_json::{Value, json};

/// Access token used by signed-in tests.
pub const TOKEN: &str = "tok-test-1";

/// `Authorization` header value for [`TOKEN`].
pub const BEARER: &str = "Bearer tok-test-1";

/// Client configuration pointing at `server`, with state under `state_dir`.
///
/// # Panics
///
/// Panics if the mock server URL is not a valid base URL.
#[must_use]
pub fn config_for(server: &ServerGuard, state_dir: &Path) -> StorefrontConfig {
    let mut config = StorefrontConfig::with_api_url(&format!("{}/api", server.url()))
        .expect("mock server URL is valid");
    config.state_dir = state_dir.to_path_buf();
    config
}

/// A fully wired client over file storage in `state_dir`.
///
/// # Panics
///
/// Panics if the client cannot be built.
#[must_use]
pub fn storefront(server: &ServerGuard, state_dir: &Path) -> Storefront {
    let config = config_for(server, state_dir);
    Storefront::with_storage(config, Arc::new(FileStorage::new(state_dir)))
        .expect("storefront builds")
}

/// A bare API client with no token source.
///
/// # Panics
///
/// Panics if the client cannot be built.
#[must_use]
pub fn anonymous_client(server: &ServerGuard, state_dir: &Path) -> ApiClient {
    ApiClient::new(&config_for(server, state_dir), None).expect("client builds")
}

/// Sign `storefront` in with [`TOKEN`] without going through `/auth/login`.
pub fn sign_in(storefront: &Storefront) {
    storefront.auth().set_session(AuthSession::from(PersistedSession {
        access_token: TOKEN.to_string(),
        refresh_token: Some("refresh-test-1".to_string()),
        user: None,
    }));
}

/// Product snapshot with a USD price.
///
/// # Panics
///
/// Panics if the fixture does not decode.
#[must_use]
pub fn product(id: &str, price_usd: &str) -> ProductSnapshot {
    serde_json::from_value(json!({
        "id": id,
        "name": format!("Product {id}"),
        "slug": format!("product-{id}"),
        "priceUSD": price_usd,
    }))
    .expect("product fixture decodes")
}

/// Backend cart line as returned by `GET /cart`.
#[must_use]
pub fn cart_line(id: &str, product_id: &str, price_usd: f64, quantity: u32) -> Value {
    json!({
        "id": id,
        "quantity": quantity,
        "product": {
            "id": product_id,
            "name": format!("Product {product_id}"),
            "slug": format!("product-{product_id}"),
            "priceUSD": price_usd,
        },
    })
}

/// `GET /cart` body.
#[must_use]
pub fn cart_body(items: &[Value], subtotal: f64) -> String {
    json!({ "items": items, "subtotal": subtotal, "total": subtotal }).to_string()
}

/// Catalog product as returned by `/products`.
#[must_use]
pub fn catalog_product(id: &str, slug: &str) -> Value {
    json!({
        "id": id,
        "name": format!("Product {id}"),
        "slug": slug,
        "priceUSD": "49.90",
        "priceMNs": 170_000,
        "stock": 4,
        "variants": [
            { "id": format!("{id}-v1"), "name": "Red", "priceUSD": 55 }
        ],
    })
}
