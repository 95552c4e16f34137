//! Authentication/session store.
//!
//! Holds the current token pair and user, persisted under the `auth-storage`
//! record so a session survives restarts. Other stores never reach for this
//! type directly: they receive it as a [`Session`], and the API client reads
//! tokens from it as a [`TokenSource`].

use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};

use secrecy::SecretString;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::api::{ApiError, TokenSource};
use crate::models::{AuthSession, PersistedSession, User};
use crate::storage::{self, Storage, keys};

/// The session facts a store needs: whether the user is signed in, and a way
/// to drop the session when the backend rejects it.
pub trait Session: Send + Sync {
    /// Whether the current session carries credentials.
    fn is_authenticated(&self) -> bool;

    /// Forget the current session (after a 401).
    fn invalidate(&self);
}

/// Backend auth endpoints.
pub trait AuthApi: Send + Sync {
    /// Exchange credentials for a token pair.
    fn login(
        &self,
        email: &str,
        password: &SecretString,
    ) -> impl Future<Output = Result<PersistedSession, ApiError>> + Send;

    /// Exchange a refresh token for a new token pair.
    fn refresh(
        &self,
        refresh_token: &SecretString,
    ) -> impl Future<Output = Result<PersistedSession, ApiError>> + Send;
}

/// Errors from auth store operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The backend call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Refresh was requested without a refresh token.
    #[error("no refresh token available, please log in again")]
    NoRefreshToken,

    /// Login was attempted with an empty email or password.
    #[error("email and password are required")]
    MissingCredentials,
}

/// Client-side session state.
///
/// Cheap to clone; clones share the same session.
#[derive(Clone)]
pub struct AuthStore {
    inner: Arc<AuthStoreInner>,
}

struct AuthStoreInner {
    session: RwLock<Option<AuthSession>>,
    storage: Arc<dyn Storage>,
}

impl std::fmt::Debug for AuthStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthStore")
            .field("authenticated", &self.is_authenticated())
            .finish_non_exhaustive()
    }
}

impl AuthStore {
    /// Create the store, hydrating any persisted session.
    ///
    /// An unreadable record is logged and treated as signed out.
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        let session = match storage::load_json::<PersistedSession>(storage.as_ref(), keys::AUTH) {
            Ok(persisted) => persisted.map(AuthSession::from),
            Err(e) => {
                warn!(error = %e, "Discarding unreadable auth record");
                None
            }
        };

        Self {
            inner: Arc::new(AuthStoreInner {
                session: RwLock::new(session),
                storage,
            }),
        }
    }

    /// Whether an access token is held.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.read(|session| session.is_some())
    }

    /// The signed-in user, if the backend returned one.
    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.read(|session| session.as_ref().and_then(|s| s.user.clone()))
    }

    /// Current access token.
    #[must_use]
    pub fn access_token(&self) -> Option<SecretString> {
        self.read(|session| session.as_ref().map(|s| s.access_token.clone()))
    }

    /// This store as the API client's token source.
    #[must_use]
    pub fn token_source(&self) -> Arc<dyn TokenSource> {
        Arc::new(self.clone())
    }

    /// Replace the session and persist it.
    pub fn set_session(&self, session: AuthSession) {
        let persisted = PersistedSession::from(&session);
        *self
            .inner
            .session
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(session);

        if let Err(e) = storage::save_json(self.inner.storage.as_ref(), keys::AUTH, &persisted) {
            warn!(error = %e, "Failed to persist auth session");
        }
    }

    /// Drop the session and its persisted record.
    ///
    /// Only touches the session. Use [`Storefront::logout`] to also forget
    /// the cart and wishlist.
    ///
    /// [`Storefront::logout`]: crate::Storefront::logout
    pub fn logout(&self) {
        let had_session = self
            .inner
            .session
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .is_some();

        if let Err(e) = self.inner.storage.remove(keys::AUTH) {
            warn!(error = %e, "Failed to remove persisted auth session");
        }
        if had_session {
            info!("Logged out");
        }
    }

    /// Log in with email and password.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are empty or the backend rejects them.
    #[instrument(skip(self, api, password))]
    pub async fn login<A: AuthApi>(
        &self,
        api: &A,
        email: &str,
        password: &SecretString,
    ) -> Result<Option<User>, AuthError> {
        use secrecy::ExposeSecret;

        let email = email.trim();
        if email.is_empty() || password.expose_secret().is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        let persisted = api.login(email, password).await?;
        let session = AuthSession::from(persisted);
        let user = session.user.clone();
        self.set_session(session);

        info!(user_id = ?user.as_ref().map(|u| u.id.as_str()), "Logged in");
        Ok(user)
    }

    /// Trade the refresh token for a new token pair.
    ///
    /// A rejected refresh (401) logs the session out.
    ///
    /// # Errors
    ///
    /// Returns an error if no refresh token is held or the backend call fails.
    #[instrument(skip(self, api))]
    pub async fn refresh<A: AuthApi>(&self, api: &A) -> Result<(), AuthError> {
        let refresh_token = self
            .read(|session| session.as_ref().and_then(|s| s.refresh_token.clone()))
            .ok_or(AuthError::NoRefreshToken)?;

        match api.refresh(&refresh_token).await {
            Ok(persisted) => {
                let mut session = AuthSession::from(persisted);
                // Keep the known user if the refresh response omits it
                if session.user.is_none() {
                    session.user = self.user();
                }
                // Some backends don't rotate refresh tokens
                if session.refresh_token.is_none() {
                    session.refresh_token = Some(refresh_token);
                }
                self.set_session(session);
                info!("Session refreshed");
                Ok(())
            }
            Err(e) => {
                if e.is_session_invalid() {
                    warn!("Refresh token rejected, logging out");
                    self.logout();
                }
                Err(e.into())
            }
        }
    }

    fn read<T>(&self, f: impl FnOnce(&Option<AuthSession>) -> T) -> T {
        f(&self
            .inner
            .session
            .read()
            .unwrap_or_else(PoisonError::into_inner))
    }
}

impl Session for AuthStore {
    fn is_authenticated(&self) -> bool {
        Self::is_authenticated(self)
    }

    fn invalidate(&self) {
        warn!("Session invalidated by backend");
        self.logout();
    }
}

impl TokenSource for AuthStore {
    fn access_token(&self) -> Option<SecretString> {
        Self::access_token(self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use secrecy::ExposeSecret;

    use super::*;
    use crate::storage::MemoryStorage;

    struct FakeAuthApi {
        login_result: Mutex<Option<Result<PersistedSession, ApiError>>>,
        refresh_result: Mutex<Option<Result<PersistedSession, ApiError>>>,
    }

    impl FakeAuthApi {
        fn new() -> Self {
            Self {
                login_result: Mutex::new(None),
                refresh_result: Mutex::new(None),
            }
        }
    }

    impl AuthApi for FakeAuthApi {
        async fn login(
            &self,
            _email: &str,
            _password: &SecretString,
        ) -> Result<PersistedSession, ApiError> {
            self.login_result.lock().unwrap().take().unwrap()
        }

        async fn refresh(
            &self,
            _refresh_token: &SecretString,
        ) -> Result<PersistedSession, ApiError> {
            self.refresh_result.lock().unwrap().take().unwrap()
        }
    }

    fn session_json(access: &str, refresh: Option<&str>) -> PersistedSession {
        PersistedSession {
            access_token: access.to_string(),
            refresh_token: refresh.map(str::to_string),
            user: Some(User {
                id: "u1".into(),
                email: "yanet@example.cu".to_string(),
                first_name: Some("Yanet".to_string()),
                last_name: None,
                role: None,
            }),
        }
    }

    #[tokio::test]
    async fn test_login_persists_session() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let store = AuthStore::new(Arc::clone(&storage));
        let api = FakeAuthApi::new();
        *api.login_result.lock().unwrap() = Some(Ok(session_json("a1", Some("r1"))));

        let user = store
            .login(&api, "yanet@example.cu", &SecretString::from("hunter2"))
            .await
            .unwrap();

        assert_eq!(user.unwrap().email, "yanet@example.cu");
        assert!(store.is_authenticated());
        assert_eq!(store.access_token().unwrap().expose_secret(), "a1");

        // A fresh store over the same storage sees the session
        let reloaded = AuthStore::new(storage);
        assert!(reloaded.is_authenticated());
        assert_eq!(reloaded.user().unwrap().display_name(), "Yanet");
    }

    #[tokio::test]
    async fn test_login_rejects_empty_credentials() {
        let store = AuthStore::new(Arc::new(MemoryStorage::new()));
        let api = FakeAuthApi::new();
        let result = store.login(&api, "  ", &SecretString::from("x")).await;
        assert!(matches!(result, Err(AuthError::MissingCredentials)));
    }

    #[tokio::test]
    async fn test_failed_login_keeps_signed_out() {
        let store = AuthStore::new(Arc::new(MemoryStorage::new()));
        let api = FakeAuthApi::new();
        *api.login_result.lock().unwrap() = Some(Err(ApiError::from_response(
            401,
            r#"{"message":"Invalid credentials"}"#,
        )));

        let result = store
            .login(&api, "a@b.cu", &SecretString::from("wrong"))
            .await;
        assert!(matches!(result, Err(AuthError::Api(_))));
        assert!(!store.is_authenticated());
    }

    #[test]
    fn test_invalidate_clears_persisted_record() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let store = AuthStore::new(Arc::clone(&storage));
        store.set_session(AuthSession::from(session_json("a1", None)));
        assert!(storage.load(keys::AUTH).unwrap().is_some());

        Session::invalidate(&store);

        assert!(!Session::is_authenticated(&store));
        assert!(storage.load(keys::AUTH).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_refresh_keeps_user_and_refresh_token() {
        let store = AuthStore::new(Arc::new(MemoryStorage::new()));
        store.set_session(AuthSession::from(session_json("old", Some("r1"))));

        let api = FakeAuthApi::new();
        *api.refresh_result.lock().unwrap() = Some(Ok(PersistedSession {
            access_token: "new".to_string(),
            refresh_token: None,
            user: None,
        }));

        store.refresh(&api).await.unwrap();

        assert_eq!(store.access_token().unwrap().expose_secret(), "new");
        assert!(store.user().is_some());
        let refresh = store
            .read(|s| s.as_ref().and_then(|s| s.refresh_token.clone()))
            .unwrap();
        assert_eq!(refresh.expose_secret(), "r1");
    }

    #[tokio::test]
    async fn test_rejected_refresh_logs_out() {
        let store = AuthStore::new(Arc::new(MemoryStorage::new()));
        store.set_session(AuthSession::from(session_json("old", Some("r1"))));

        let api = FakeAuthApi::new();
        *api.refresh_result.lock().unwrap() = Some(Err(ApiError::from_response(401, "")));

        assert!(store.refresh(&api).await.is_err());
        assert!(!store.is_authenticated());
    }

    #[tokio::test]
    async fn test_refresh_without_token() {
        let store = AuthStore::new(Arc::new(MemoryStorage::new()));
        let api = FakeAuthApi::new();
        assert!(matches!(
            store.refresh(&api).await,
            Err(AuthError::NoRefreshToken)
        ));
    }

    #[test]
    fn test_corrupt_record_is_signed_out() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        storage.save(keys::AUTH, "garbage").unwrap();
        let store = AuthStore::new(storage);
        assert!(!store.is_authenticated());
    }
}
