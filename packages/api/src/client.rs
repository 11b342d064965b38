//! # Supabase client
//!
//! [`SupabaseClient`] implements [`AuthBackend`] against GoTrue (`/auth/v1`) and
//! [`DataBackend`] against PostgREST (`/rest/v1`). It keeps the current
//! [`StoredSession`] in memory, mirrors it to [`SessionStorage`], and
//! broadcasts an [`AuthEvent`] whenever the signed-in principal changes.
//!
//! Every request carries the `apikey` header. Data requests additionally
//! carry `Authorization: Bearer <token>`, using the anon key when signed out,
//! so row-level policies see the right role.
//!
//! ## Session lifecycle
//!
//! | Call | On success | On failure |
//! |------|-----------|------------|
//! | `sign_in` / confirmed `sign_up` | store, persist, emit `SignedIn` | unchanged |
//! | `refresh_if_expiring` | store, persist, emit `TokenRefreshed` | rejected token: clear, emit `SignedOut` |
//! | `sign_out` | clear, emit `SignedOut` | network error: session kept |

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use store::backend::AUTH_EVENT_CAPACITY;
use store::{
    AuthBackend, AuthEvent, BackendError, Category, DataBackend, Listing, NewListing, Principal,
    Profile, ProfileUpdate, SignUpOutcome,
};
use tokio::sync::broadcast;

use crate::auth::{
    now_unix, PasswordGrant, RefreshGrant, SessionStorage, SignUpRequest, SignUpResponse,
    StoredSession, TokenResponse, UserMetadata,
};
use crate::config::BackendConfig;
use crate::error::ApiError;
use crate::rest::{self, Table, CATEGORY_COLUMNS, RETURN_REPRESENTATION};

/// Client for one Supabase project. Cheap to clone; clones share the session.
#[derive(Clone)]
pub struct SupabaseClient {
    http: reqwest::Client,
    config: BackendConfig,
    storage: SessionStorage,
    session: Arc<Mutex<Option<StoredSession>>>,
    events: broadcast::Sender<AuthEvent>,
}

impl std::fmt::Debug for SupabaseClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseClient")
            .field("storage", &self.storage)
            .field("session", &self.current())
            .finish_non_exhaustive()
    }
}

impl SupabaseClient {
    /// Client persisting sessions in the platform's default location.
    pub fn new(config: BackendConfig) -> Self {
        Self::with_storage(config, SessionStorage::platform_default())
    }

    pub fn with_storage(config: BackendConfig, storage: SessionStorage) -> Self {
        let restored = storage.load();
        if let Some(session) = &restored {
            tracing::debug!("restored session for {}", session.user_id);
        }
        let (events, _) = broadcast::channel(AUTH_EVENT_CAPACITY);
        Self {
            http: reqwest::Client::new(),
            config,
            storage,
            session: Arc::new(Mutex::new(restored)),
            events,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<StoredSession>> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The session currently held, if any.
    pub fn current(&self) -> Option<StoredSession> {
        self.lock().clone()
    }

    fn store_session(&self, session: StoredSession) {
        self.storage.save(&session);
        *self.lock() = Some(session);
    }

    fn clear_session(&self) {
        self.storage.clear();
        *self.lock() = None;
    }

    fn emit(&self, event: AuthEvent) {
        let _ = self.events.send(event);
    }

    // -- requests --

    fn auth_request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, self.config.endpoint(&format!("auth/v1/{path}")))
            .header("apikey", self.config.anon_key())
    }

    fn rest_request(&self, method: Method, table: Table) -> RequestBuilder {
        let bearer = self
            .current()
            .map(|s| s.access_token.as_str().to_string())
            .unwrap_or_else(|| self.config.anon_key().to_string());
        self.http
            .request(method, self.config.endpoint(table.path()))
            .header("apikey", self.config.anon_key())
            .bearer_auth(bearer)
    }

    async fn send_raw(request: RequestBuilder) -> Result<String, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ApiError::from_response_body(status.as_u16(), &body));
        }
        Ok(body)
    }

    async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ApiError> {
        let body = Self::send_raw(request).await?;
        serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn token_grant<B: Serialize>(
        &self,
        grant_type: &str,
        body: &B,
    ) -> Result<TokenResponse, ApiError> {
        let request = self
            .auth_request(Method::POST, "token")
            .query(&[("grant_type", grant_type)])
            .json(body);
        Self::send(request).await
    }

    /// Exchange the refresh token for a new session. A rejected token clears
    /// the session and signs the user out.
    async fn renew(&self, current: &StoredSession) -> Result<Principal, BackendError> {
        let grant = RefreshGrant {
            refresh_token: &current.refresh_token,
        };
        match self.token_grant("refresh_token", &grant).await {
            Ok(token) => {
                let session = token.into_stored(now_unix(), &current.email);
                let principal = session.principal();
                self.store_session(session);
                tracing::debug!("refreshed session for {}", principal.id);
                self.emit(AuthEvent::TokenRefreshed(principal.clone()));
                Ok(principal)
            }
            Err(ApiError::Status { status, .. }) if (400..500).contains(&status) => {
                tracing::warn!("refresh token rejected ({status}); signing out");
                self.clear_session();
                self.emit(AuthEvent::SignedOut);
                Err(BackendError::Unauthorized)
            }
            Err(e) => Err(e.into()),
        }
    }
}

impl AuthBackend for SupabaseClient {
    async fn get_session(&self) -> Result<Option<Principal>, BackendError> {
        let Some(current) = self.current() else {
            return Ok(None);
        };
        if !current.expires_within(now_unix(), 0) {
            return Ok(Some(current.principal()));
        }
        match self.renew(&current).await {
            Ok(principal) => Ok(Some(principal)),
            Err(BackendError::Unauthorized) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Principal, BackendError> {
        let token = self
            .token_grant("password", &PasswordGrant { email, password })
            .await?;
        let session = token.into_stored(now_unix(), email);
        let principal = session.principal();
        self.store_session(session);
        tracing::info!("signed in as {}", principal.id);
        self.emit(AuthEvent::SignedIn(principal.clone()));
        Ok(principal)
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: Option<&str>,
    ) -> Result<SignUpOutcome, BackendError> {
        let body = SignUpRequest {
            email,
            password,
            data: full_name.map(|full_name| UserMetadata { full_name }),
        };
        let response: SignUpResponse =
            Self::send(self.auth_request(Method::POST, "signup").json(&body)).await?;

        match response {
            SignUpResponse::Session(token) => {
                let session = token.into_stored(now_unix(), email);
                let principal = session.principal();
                self.store_session(session);
                tracing::info!("signed up and signed in as {}", principal.id);
                self.emit(AuthEvent::SignedIn(principal.clone()));
                Ok(SignUpOutcome::SignedIn(principal))
            }
            SignUpResponse::User(user) => {
                tracing::info!("sign-up for {} awaits email verification", user.id);
                Ok(SignUpOutcome::PendingVerification {
                    email: user.email.unwrap_or_else(|| email.to_string()),
                })
            }
        }
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        if let Some(current) = self.current() {
            let request = self
                .auth_request(Method::POST, "logout")
                .bearer_auth(current.access_token.as_str());
            match Self::send_raw(request).await {
                Ok(_) => {}
                // The server no longer knows this session; it is over either way.
                Err(ApiError::Status { status, .. }) if (400..500).contains(&status) => {
                    tracing::debug!("logout returned {status}; clearing local session");
                }
                Err(e) => return Err(e.into()),
            }
        }
        self.clear_session();
        tracing::info!("signed out");
        self.emit(AuthEvent::SignedOut);
        Ok(())
    }

    async fn refresh_if_expiring(
        &self,
        now: i64,
        margin_secs: i64,
    ) -> Result<Option<Principal>, BackendError> {
        let Some(current) = self.current() else {
            return Ok(None);
        };
        if !current.expires_within(now, margin_secs) {
            return Ok(None);
        }
        self.renew(&current).await.map(Some)
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }
}

impl DataBackend for SupabaseClient {
    async fn fetch_profile(&self, user_id: &str) -> Result<Option<Profile>, BackendError> {
        let request = self
            .rest_request(Method::GET, Table::UserProfiles)
            .query(&rest::profile_query(user_id));
        let mut rows: Vec<Profile> = Self::send(request).await?;
        Ok(if rows.is_empty() {
            None
        } else {
            Some(rows.swap_remove(0))
        })
    }

    async fn update_profile(
        &self,
        user_id: &str,
        update: &ProfileUpdate,
    ) -> Result<(), BackendError> {
        if update.is_empty() {
            return Ok(());
        }

        let request = self
            .rest_request(Method::PATCH, Table::UserProfiles)
            .query(&[("user_id", rest::eq(user_id))])
            .header("Prefer", RETURN_REPRESENTATION)
            .json(update);
        let updated: Vec<Profile> = Self::send(request).await?;
        if !updated.is_empty() {
            return Ok(());
        }

        // No row yet: profiles are created on first write.
        let mut row = serde_json::to_value(update)
            .map_err(|e| BackendError::Decode(e.to_string()))?;
        if let Some(fields) = row.as_object_mut() {
            fields.insert("user_id".to_string(), user_id.into());
        }
        let request = self
            .rest_request(Method::POST, Table::UserProfiles)
            .header("Prefer", RETURN_REPRESENTATION)
            .json(&row);
        let _: Vec<Profile> = Self::send(request).await?;
        tracing::debug!("created profile for {user_id}");
        Ok(())
    }

    async fn fetch_listings(&self) -> Result<Vec<Listing>, BackendError> {
        let request = self
            .rest_request(Method::GET, Table::Services)
            .query(&[("select", "*")]);
        Ok(Self::send(request).await?)
    }

    async fn fetch_categories(&self) -> Result<Vec<Category>, BackendError> {
        let request = self
            .rest_request(Method::GET, Table::Categories)
            .query(&[("select", CATEGORY_COLUMNS), ("order", "name.asc")]);
        Ok(Self::send(request).await?)
    }

    async fn create_listing(&self, listing: &NewListing) -> Result<Listing, BackendError> {
        let request = self
            .rest_request(Method::POST, Table::Services)
            .header("Prefer", RETURN_REPRESENTATION)
            .json(listing);
        let mut rows: Vec<Listing> = Self::send(request).await?;
        if rows.is_empty() {
            return Err(BackendError::Decode("insert returned no rows".to_string()));
        }
        Ok(rows.swap_remove(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use store::AccessToken;

    fn config() -> BackendConfig {
        // Port 9 (discard) on localhost; nothing in these tests reaches it.
        BackendConfig::new("http://127.0.0.1:9", "anon").unwrap()
    }

    fn stored(expires_at: i64) -> StoredSession {
        StoredSession {
            access_token: AccessToken::new("jwt"),
            refresh_token: "r1".to_string(),
            expires_at,
            user_id: "u1".to_string(),
            email: "ada@example.com".to_string(),
        }
    }

    fn client_with(session: Option<StoredSession>) -> (SupabaseClient, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let storage = SessionStorage::File(dir.path().join("session.json"));
        if let Some(session) = &session {
            storage.save(session);
        }
        (SupabaseClient::with_storage(config(), storage), dir)
    }

    #[tokio::test]
    async fn test_restores_persisted_session() {
        let far_future = now_unix() + 3600;
        let (client, _dir) = client_with(Some(stored(far_future)));

        let principal = client.get_session().await.unwrap().unwrap();
        assert_eq!(principal.id, "u1");
        assert_eq!(principal.token.as_str(), "jwt");
    }

    #[tokio::test]
    async fn test_no_session_means_signed_out() {
        let (client, _dir) = client_with(None);
        assert_eq!(client.get_session().await, Ok(None));
        assert_eq!(client.refresh_if_expiring(now_unix(), 60).await, Ok(None));
    }

    #[tokio::test]
    async fn test_refresh_not_due() {
        let (client, _dir) = client_with(Some(stored(10_000)));
        assert_eq!(client.refresh_if_expiring(1_000, 60).await, Ok(None));
        assert!(client.current().is_some());
    }

    #[tokio::test]
    async fn test_sign_out_without_session_emits_event() {
        let (client, _dir) = client_with(None);
        let mut events = client.subscribe();

        client.sign_out().await.unwrap();
        assert_eq!(events.try_recv().unwrap(), AuthEvent::SignedOut);
    }

    #[test]
    fn test_clones_share_session() {
        let (client, _dir) = client_with(None);
        let other = client.clone();
        client.store_session(stored(10_000));
        assert_eq!(other.current().map(|s| s.user_id), Some("u1".to_string()));

        other.clear_session();
        assert!(client.current().is_none());
    }
}
