//! Authentication session types.
//!
//! [`PersistedSession`] is the wire/storage form (plain strings, camelCase).
//! [`AuthSession`] is the in-memory form with tokens wrapped in
//! [`SecretString`] so they never show up in `Debug` output or logs.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::user::User;

/// Token pair and user returned by `/auth/login` and `/auth/refresh`,
/// and stored under the `auth-storage` record.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSession {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

impl std::fmt::Debug for PersistedSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistedSession")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[REDACTED]"))
            .field("user", &self.user)
            .finish()
    }
}

/// An authenticated session held in memory.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub access_token: SecretString,
    pub refresh_token: Option<SecretString>,
    pub user: Option<User>,
}

impl From<PersistedSession> for AuthSession {
    fn from(session: PersistedSession) -> Self {
        Self {
            access_token: SecretString::from(session.access_token),
            refresh_token: session.refresh_token.map(SecretString::from),
            user: session.user,
        }
    }
}

impl From<&AuthSession> for PersistedSession {
    fn from(session: &AuthSession) -> Self {
        Self {
            access_token: session.access_token.expose_secret().to_string(),
            refresh_token: session
                .refresh_token
                .as_ref()
                .map(|token| token.expose_secret().to_string()),
            user: session.user.clone(),
        }
    }
}

/// Body of `POST /auth/login`.
#[derive(Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Body of `POST /auth/refresh`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest<'a> {
    pub refresh_token: &'a str,
}
