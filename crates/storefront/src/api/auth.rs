//! `/auth` endpoints.

use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use tracing::instrument;

use super::{ApiClient, ApiError};
use crate::models::{LoginRequest, PersistedSession, RefreshRequest};
use crate::stores::auth::AuthApi;

impl AuthApi for ApiClient {
    #[instrument(skip(self, password))]
    async fn login(&self, email: &str, password: &SecretString) -> Result<PersistedSession, ApiError> {
        let url = self.endpoint(&["auth", "login"])?;
        let body = LoginRequest {
            email,
            password: password.expose_secret(),
        };
        self.execute_json(self.request(Method::POST, url).json(&body))
            .await
    }

    #[instrument(skip(self, refresh_token))]
    async fn refresh(&self, refresh_token: &SecretString) -> Result<PersistedSession, ApiError> {
        let url = self.endpoint(&["auth", "refresh"])?;
        let body = RefreshRequest {
            refresh_token: refresh_token.expose_secret(),
        };
        self.execute_json(self.request(Method::POST, url).json(&body))
            .await
    }
}
