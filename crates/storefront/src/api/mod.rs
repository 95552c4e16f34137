//! Backend REST API client.
//!
//! # Architecture
//!
//! - One `reqwest::Client` shared by all stores, cheap to clone
//! - Bearer token read from a [`TokenSource`] on every request, so a login or
//!   logout takes effect immediately
//! - Non-success responses are turned into a tagged [`ApiError`] here; nothing
//!   downstream looks at raw statuses or message strings
//!
//! The stores only see this client through the traits they define
//! ([`CartApi`](crate::stores::cart::CartApi),
//! [`WishlistApi`](crate::stores::wishlist::WishlistApi),
//! [`AuthApi`](crate::stores::auth::AuthApi)), so tests can swap in fakes.
//!
//! # Example
//!
//! ```rust,ignore
//! use habaluna_storefront::api::ApiClient;
//! use habaluna_storefront::stores::cart::CartApi;
//!
//! let client = ApiClient::new(&config, Some(auth.token_source()))?;
//! let cart = client.fetch_cart().await?;
//! ```

mod auth;
mod cart;
mod catalog;
pub mod error;
mod wishlist;

use std::sync::Arc;

use reqwest::{Method, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::config::StorefrontConfig;

pub use error::{ApiError, ErrorKind, STOCK_KEYWORDS};

/// Supplies the current access token, if any.
pub trait TokenSource: Send + Sync {
    /// The bearer token to attach, or `None` for anonymous calls.
    fn access_token(&self) -> Option<SecretString>;
}

/// Client for the Habaluna backend REST API.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    tokens: Option<Arc<dyn TokenSource>>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("authenticated", &self.inner.tokens.is_some())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(
        config: &StorefrontConfig,
        tokens: Option<Arc<dyn TokenSource>>,
    ) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .user_agent(concat!("habaluna-storefront/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.api_url.clone(),
                tokens,
            }),
        })
    }

    /// The API base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Build an endpoint URL from path segments. Segments are percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(self.inner.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Start a request, attaching the bearer token when one is held.
    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.inner.client.request(method, url);
        match self.inner.tokens.as_ref().and_then(|t| t.access_token()) {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        }
    }

    /// Send a request and return the body of a successful response.
    async fn execute(&self, builder: RequestBuilder) -> Result<String, ApiError> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let err = ApiError::from_response(status.as_u16(), &body);
            tracing::warn!(
                status = %status,
                kind = ?err.kind(),
                error = %err,
                "Backend returned non-success status"
            );
            return Err(err);
        }

        debug!(status = %status, bytes = body.len(), "Backend request succeeded");
        Ok(body)
    }

    /// Send a request and decode the JSON body.
    async fn execute_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, ApiError> {
        let body = self.execute(builder).await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse backend response"
            );
            ApiError::Parse(e)
        })
    }
}
