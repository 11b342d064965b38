use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::broadcast;

use crate::backend::{
    AuthBackend, AuthEvent, BackendError, DataBackend, SignUpOutcome, AUTH_EVENT_CAPACITY,
};
use crate::models::{
    AccessToken, Category, Listing, NewListing, Principal, Profile, ProfileUpdate,
};

/// Lifetime of tokens minted by the memory backend, in seconds.
const TOKEN_TTL_SECS: i64 = 3600;

#[derive(Debug, Clone)]
struct Account {
    id: String,
    password: String,
    confirmed: bool,
}

#[derive(Debug, Clone)]
struct ActiveSession {
    principal: Principal,
    expires_at: i64,
}

#[derive(Debug, Default)]
struct Inner {
    accounts: HashMap<String, Account>,
    session: Option<ActiveSession>,
    profiles: HashMap<String, Profile>,
    listings: Vec<Listing>,
    categories: Vec<Category>,
    require_verification: bool,
    next_id: u64,
    clock: i64,
    fail_profile_reads: Option<BackendError>,
}

impl Inner {
    fn mint(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }

    fn start_session(&mut self, id: &str, email: &str) -> Principal {
        let token = AccessToken::new(self.mint("token"));
        let principal = Principal::new(id, email, token);
        self.session = Some(ActiveSession {
            principal: principal.clone(),
            expires_at: self.clock + TOKEN_TTL_SECS,
        });
        principal
    }
}

/// In-memory auth and data backend for tests and offline demos.
///
/// Behaves like the hosted service where it matters to the client: profiles
/// are created lazily, unverified sign-ups get no session, and every session
/// change is broadcast as an [`AuthEvent`].
#[derive(Clone, Debug)]
pub struct MemoryBackend {
    inner: Arc<Mutex<Inner>>,
    events: broadcast::Sender<AuthEvent>,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(AUTH_EVENT_CAPACITY);
        Self {
            inner: Arc::new(Mutex::new(Inner::default())),
            events,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: AuthEvent) {
        // No receivers is fine; nobody is listening yet.
        let _ = self.events.send(event);
    }

    /// Require email verification before sign-ups get a session.
    pub fn with_email_verification(self) -> Self {
        self.lock().require_verification = true;
        self
    }

    /// Register a confirmed account directly. Returns its id.
    pub fn add_account(&self, email: &str, password: &str) -> String {
        let mut inner = self.lock();
        let id = inner.mint("user");
        inner.accounts.insert(
            email.to_lowercase(),
            Account {
                id: id.clone(),
                password: password.to_string(),
                confirmed: true,
            },
        );
        id
    }

    /// Mark a pending account as verified.
    pub fn confirm_email(&self, email: &str) {
        if let Some(account) = self.lock().accounts.get_mut(&email.to_lowercase()) {
            account.confirmed = true;
        }
    }

    pub fn put_profile(&self, profile: Profile) {
        self.lock()
            .profiles
            .insert(profile.user_id.clone(), profile);
    }

    pub fn profile(&self, user_id: &str) -> Option<Profile> {
        self.lock().profiles.get(user_id).cloned()
    }

    pub fn put_listing(&self, listing: Listing) {
        self.lock().listings.push(listing);
    }

    pub fn put_category(&self, category: Category) {
        self.lock().categories.push(category);
    }

    /// Make every profile read fail with `error` until cleared with `None`.
    pub fn fail_profile_reads(&self, error: Option<BackendError>) {
        self.lock().fail_profile_reads = error;
    }

    /// Set the backend clock used for token expiry, in Unix seconds.
    pub fn set_clock(&self, now: i64) {
        self.lock().clock = now;
    }

    /// Principal of the active session, if any.
    pub fn current_principal(&self) -> Option<Principal> {
        self.lock().session.as_ref().map(|s| s.principal.clone())
    }
}

impl AuthBackend for MemoryBackend {
    async fn get_session(&self) -> Result<Option<Principal>, BackendError> {
        Ok(self.current_principal())
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Principal, BackendError> {
        let principal = {
            let mut inner = self.lock();
            let email = email.trim().to_lowercase();
            let Some(account) = inner.accounts.get(&email).cloned() else {
                return Err(BackendError::InvalidCredentials);
            };
            if account.password != password {
                return Err(BackendError::InvalidCredentials);
            }
            if !account.confirmed {
                return Err(BackendError::Http {
                    status: 400,
                    message: "Email not confirmed".to_string(),
                });
            }
            inner.start_session(&account.id, &email)
        };
        self.emit(AuthEvent::SignedIn(principal.clone()));
        Ok(principal)
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        _full_name: Option<&str>,
    ) -> Result<SignUpOutcome, BackendError> {
        let email = email.trim().to_lowercase();
        let outcome = {
            let mut inner = self.lock();
            if inner.accounts.contains_key(&email) {
                return Err(BackendError::Http {
                    status: 422,
                    message: "User already registered".to_string(),
                });
            }
            let id = inner.mint("user");
            let confirmed = !inner.require_verification;
            inner.accounts.insert(
                email.clone(),
                Account {
                    id: id.clone(),
                    password: password.to_string(),
                    confirmed,
                },
            );
            if confirmed {
                SignUpOutcome::SignedIn(inner.start_session(&id, &email))
            } else {
                SignUpOutcome::PendingVerification { email }
            }
        };
        if let SignUpOutcome::SignedIn(principal) = &outcome {
            self.emit(AuthEvent::SignedIn(principal.clone()));
        }
        Ok(outcome)
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        self.lock().session = None;
        self.emit(AuthEvent::SignedOut);
        Ok(())
    }

    async fn refresh_if_expiring(
        &self,
        now: i64,
        margin_secs: i64,
    ) -> Result<Option<Principal>, BackendError> {
        let refreshed = {
            let mut inner = self.lock();
            let Some(session) = inner.session.clone() else {
                return Ok(None);
            };
            if session.expires_at > now + margin_secs {
                return Ok(None);
            }
            inner.clock = now;
            let principal = session.principal;
            inner.start_session(&principal.id, &principal.email)
        };
        self.emit(AuthEvent::TokenRefreshed(refreshed.clone()));
        Ok(Some(refreshed))
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }
}

impl DataBackend for MemoryBackend {
    async fn fetch_profile(&self, user_id: &str) -> Result<Option<Profile>, BackendError> {
        let inner = self.lock();
        if let Some(err) = &inner.fail_profile_reads {
            return Err(err.clone());
        }
        Ok(inner.profiles.get(user_id).cloned())
    }

    async fn update_profile(
        &self,
        user_id: &str,
        update: &ProfileUpdate,
    ) -> Result<(), BackendError> {
        let mut inner = self.lock();
        let profile = inner
            .profiles
            .entry(user_id.to_string())
            .or_insert_with(|| Profile {
                user_id: user_id.to_string(),
                ..Profile::default()
            });
        update.apply_to(profile);
        Ok(())
    }

    async fn fetch_listings(&self) -> Result<Vec<Listing>, BackendError> {
        Ok(self.lock().listings.clone())
    }

    async fn fetch_categories(&self) -> Result<Vec<Category>, BackendError> {
        Ok(self.lock().categories.clone())
    }

    async fn create_listing(&self, listing: &NewListing) -> Result<Listing, BackendError> {
        let mut inner = self.lock();
        let created = Listing {
            id: inner.mint("listing"),
            title: listing.title.clone(),
            description: listing.description.clone(),
            category_id: listing.category_id.clone(),
            location: listing.location.clone(),
            availability: listing.availability.clone(),
            provider_id: listing.provider_id.clone(),
            status: listing.status,
            created_at: chrono::DateTime::<chrono::Utc>::from_timestamp(inner.clock, 0).unwrap_or_default(),
            images: listing.images.clone(),
        };
        inner.listings.push(created.clone());
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{filter_listings, ListingQuery, Selector};
    use crate::models::ListingStatus;
    use assert_matches::assert_matches;

    fn seeded_listing(id: &str, title: &str, category_id: &str, status: ListingStatus) -> Listing {
        Listing {
            id: id.to_string(),
            title: title.to_string(),
            description: String::new(),
            category_id: category_id.to_string(),
            location: "Springfield".to_string(),
            availability: "Weekends".to_string(),
            provider_id: "user-1".to_string(),
            status,
            created_at: chrono::DateTime::<chrono::Utc>::from_timestamp(0, 0).unwrap(),
            images: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_sign_in_broadcasts_event() {
        let backend = MemoryBackend::new();
        backend.add_account("ada@example.com", "pw123456");
        let mut events = backend.subscribe();

        let principal = backend.sign_in("Ada@Example.com", "pw123456").await.unwrap();
        assert_eq!(principal.email, "ada@example.com");
        assert_eq!(events.try_recv().unwrap(), AuthEvent::SignedIn(principal));
    }

    #[tokio::test]
    async fn test_sign_in_rejects_wrong_password() {
        let backend = MemoryBackend::new();
        backend.add_account("ada@example.com", "pw123456");

        let err = backend.sign_in("ada@example.com", "nope").await.unwrap_err();
        assert_eq!(err, BackendError::InvalidCredentials);
        assert!(backend.current_principal().is_none());
    }

    #[tokio::test]
    async fn test_sign_up_pending_until_confirmed() {
        let backend = MemoryBackend::new().with_email_verification();
        let mut events = backend.subscribe();

        let outcome = backend.sign_up("a@b.com", "pw123456", None).await.unwrap();
        assert_matches!(outcome, SignUpOutcome::PendingVerification { ref email } if email == "a@b.com");
        assert!(events.try_recv().is_err());

        assert_matches!(
            backend.sign_in("a@b.com", "pw123456").await,
            Err(BackendError::Http { status: 400, .. })
        );

        backend.confirm_email("a@b.com");
        assert!(backend.sign_in("a@b.com", "pw123456").await.is_ok());
    }

    #[tokio::test]
    async fn test_profiles_are_created_lazily() {
        let backend = MemoryBackend::new();
        assert_eq!(backend.fetch_profile("user-9").await, Ok(None));

        let update = ProfileUpdate {
            location: Some("Springfield".to_string()),
            ..ProfileUpdate::default()
        };
        backend.update_profile("user-9", &update).await.unwrap();

        let profile = backend.fetch_profile("user-9").await.unwrap().unwrap();
        assert_eq!(profile.location.as_deref(), Some("Springfield"));
        assert!(profile.phone.is_none());
    }

    #[tokio::test]
    async fn test_refresh_only_when_expiring() {
        let backend = MemoryBackend::new();
        backend.set_clock(1_000);
        backend.add_account("ada@example.com", "pw123456");
        let first = backend.sign_in("ada@example.com", "pw123456").await.unwrap();

        assert_eq!(backend.refresh_if_expiring(1_000, 60).await, Ok(None));

        let renewed = backend
            .refresh_if_expiring(1_000 + TOKEN_TTL_SECS - 30, 60)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(renewed.id, first.id);
        assert_ne!(renewed.token, first.token);
    }

    #[tokio::test]
    async fn test_create_listing_assigns_id() {
        let backend = MemoryBackend::new();
        let created = backend
            .create_listing(&NewListing {
                title: "Math tutoring".to_string(),
                description: "Algebra and calculus".to_string(),
                category_id: "cat-1".to_string(),
                location: "Springfield".to_string(),
                availability: "Weekends".to_string(),
                provider_id: "user-1".to_string(),
                status: ListingStatus::Active,
                images: Vec::new(),
            })
            .await
            .unwrap();
        assert!(created.id.starts_with("listing-"));
        assert_eq!(backend.fetch_listings().await.unwrap(), vec![created]);
    }

    #[tokio::test]
    async fn test_seeded_catalog_filters_by_category_name() {
        let backend = MemoryBackend::new();
        backend.put_category(Category {
            id: "cat-tutoring".to_string(),
            name: "Tutoring".to_string(),
            icon: None,
            description: None,
        });
        backend.put_category(Category {
            id: "cat-cleaning".to_string(),
            name: "Cleaning".to_string(),
            icon: None,
            description: None,
        });
        backend.put_listing(seeded_listing("s1", "Math tutoring", "cat-tutoring", ListingStatus::Active));
        backend.put_listing(seeded_listing("s2", "Deep cleaning", "cat-cleaning", ListingStatus::Active));
        backend.put_listing(seeded_listing("s3", "Piano tutoring", "cat-tutoring", ListingStatus::Inactive));

        let listings = backend.fetch_listings().await.unwrap();
        let categories = backend.fetch_categories().await.unwrap();
        assert_eq!(categories.len(), 2);

        let query = ListingQuery::default().category(Selector::parse("Tutoring"));
        let ids: Vec<&str> = filter_listings(&listings, &categories, &query)
            .iter()
            .map(|l| l.id.as_str())
            .collect();
        assert_eq!(ids, vec!["s1"]);
    }
}
