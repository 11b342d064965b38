//! # Session Store: the client's cached view of who is signed in
//!
//! [`Session`] is the single, process-wide owner of the cached [`Principal`].
//! Nothing else mutates it; components read snapshots through
//! [`Session::state`] or follow changes through [`Session::watch`].
//!
//! ## Lifecycle
//!
//! 1. [`Session::subscribe`]: take an auth-event receiver *before* starting
//!    the initial fetch so no event can slip past.
//! 2. [`Session::init`]: fetch the current session. Until it (or an event)
//!    resolves, [`SessionState::loading`] is `true`.
//! 3. [`Session::listen`]: apply events for the lifetime of the app.
//! 4. [`Session::teardown`]: stop accepting updates. Late results from
//!    in-flight requests are dropped.
//!
//! ## Ordering
//!
//! The initial fetch and the event subscription race. Every update carries a
//! [`Ticket`] drawn when the fetch was *issued* or the event was *received*;
//! [`SessionStore::apply`] ignores any ticket older than the last one
//! applied. A slow initial fetch therefore never overwrites a newer event.

use std::cell::RefCell;

use thiserror::Error;
use tokio::sync::{broadcast, watch};

use crate::backend::{AuthBackend, AuthEvent, BackendError, DataBackend, SignUpOutcome};
use crate::guard::GuardState;
use crate::models::{Principal, Profile, ProfileUpdate};

/// Snapshot of the session as seen by the UI.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub principal: Option<Principal>,
    pub loading: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            principal: None,
            loading: true,
        }
    }
}

impl SessionState {
    pub fn guard(&self) -> GuardState {
        GuardState::from(self)
    }
}

/// Ordering token for a session update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

/// Last-write-wins session state.
#[derive(Debug, Default)]
pub struct SessionStore {
    state: SessionState,
    issued: u64,
    applied: u64,
    torn_down: bool,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Draw the next ticket.
    pub fn issue(&mut self) -> Ticket {
        self.issued += 1;
        Ticket(self.issued)
    }

    /// Replace the cached principal and clear the loading flag, unless a
    /// newer update already landed or the store was torn down.
    pub fn apply(&mut self, ticket: Ticket, principal: Option<Principal>) -> bool {
        if self.torn_down || ticket.0 <= self.applied {
            return false;
        }
        self.applied = ticket.0;
        self.state = SessionState {
            principal,
            loading: false,
        };
        true
    }

    pub fn teardown(&mut self) {
        self.torn_down = true;
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }
}

/// Errors surfaced by session operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    #[error("no user is signed in")]
    NotSignedIn,
    #[error("authentication failed: {0}")]
    Authentication(#[source] BackendError),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl SessionError {
    /// Bad credentials and other client-side rejections from the auth
    /// service become [`SessionError::Authentication`].
    fn from_auth(err: BackendError) -> Self {
        match err {
            BackendError::InvalidCredentials
            | BackendError::Unauthorized
            | BackendError::Http {
                status: 400..=499, ..
            } => SessionError::Authentication(err),
            other => SessionError::Backend(other),
        }
    }
}

/// Owned session context wrapping an auth + data backend.
pub struct Session<B> {
    backend: B,
    store: RefCell<SessionStore>,
    changes: watch::Sender<SessionState>,
}

impl<B> Session<B>
where
    B: AuthBackend + DataBackend,
{
    pub fn new(backend: B) -> Self {
        let (changes, _) = watch::channel(SessionState::default());
        Self {
            backend,
            store: RefCell::new(SessionStore::new()),
            changes,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn state(&self) -> SessionState {
        self.store.borrow().state().clone()
    }

    pub fn principal(&self) -> Option<Principal> {
        self.store.borrow().state().principal.clone()
    }

    /// Follow state changes.
    pub fn watch(&self) -> watch::Receiver<SessionState> {
        self.changes.subscribe()
    }

    /// Receiver for backend auth events, to be passed to [`Session::listen`].
    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.backend.subscribe()
    }

    fn issue(&self) -> Ticket {
        self.store.borrow_mut().issue()
    }

    fn apply(&self, ticket: Ticket, principal: Option<Principal>) -> bool {
        let applied = self.store.borrow_mut().apply(ticket, principal);
        if applied {
            self.changes.send_replace(self.state());
        }
        applied
    }

    /// Fetch the current session. Failures are logged and resolve to
    /// signed-out so the UI never stays stuck on the loading view.
    pub async fn init(&self) {
        let ticket = self.issue();
        let principal = match self.backend.get_session().await {
            Ok(principal) => principal,
            Err(e) => {
                tracing::warn!("Session restore failed: {e}");
                None
            }
        };
        if !self.apply(ticket, principal) {
            tracing::debug!("Initial session fetch superseded by a newer update");
        }
    }

    /// Apply one auth event. Returns whether the state changed.
    pub fn handle_event(&self, event: &AuthEvent) -> bool {
        let ticket = self.issue();
        tracing::debug!(?event, "Auth event");
        self.apply(ticket, event.principal().cloned())
    }

    /// Apply every event already queued on `events` without waiting.
    pub fn drain(&self, events: &mut broadcast::Receiver<AuthEvent>) -> usize {
        let mut count = 0;
        loop {
            match events.try_recv() {
                Ok(event) => {
                    self.handle_event(&event);
                    count += 1;
                }
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    tracing::warn!("Dropped {skipped} auth events");
                }
                Err(_) => return count,
            }
        }
    }

    /// Apply events until the channel closes or the session is torn down.
    pub async fn listen(&self, mut events: broadcast::Receiver<AuthEvent>) {
        loop {
            match events.recv().await {
                Ok(event) => {
                    if self.store.borrow().is_torn_down() {
                        break;
                    }
                    self.handle_event(&event);
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!("Dropped {skipped} auth events");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    }

    pub fn teardown(&self) {
        self.store.borrow_mut().teardown();
    }

    /// Sign in. The principal arrives through the `SignedIn` event.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Principal, SessionError> {
        self.backend
            .sign_in(email.trim(), password)
            .await
            .map_err(SessionError::from_auth)
    }

    /// Create an account. A pending verification is a successful outcome.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: Option<&str>,
    ) -> Result<SignUpOutcome, SessionError> {
        self.backend
            .sign_up(email.trim(), password, full_name)
            .await
            .map_err(SessionError::from_auth)
    }

    /// Sign out. The cached principal is cleared before this returns.
    pub async fn sign_out(&self) -> Result<(), SessionError> {
        self.backend.sign_out().await?;
        let ticket = self.issue();
        self.apply(ticket, None);
        Ok(())
    }

    /// Apply a partial update to the signed-in user's profile.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<(), SessionError> {
        let principal = self.principal().ok_or(SessionError::NotSignedIn)?;
        self.backend.update_profile(&principal.id, update).await?;
        Ok(())
    }

    /// Read the signed-in user's profile; `None` if it was never created.
    pub async fn fetch_profile(&self) -> Result<Option<Profile>, SessionError> {
        let principal = self.principal().ok_or(SessionError::NotSignedIn)?;
        Ok(self.backend.fetch_profile(&principal.id).await?)
    }

    /// Renew the token when it expires within `margin_secs` of `now`.
    pub async fn refresh_if_expiring(&self, now: i64, margin_secs: i64) -> Result<bool, SessionError> {
        if self.principal().is_none() {
            return Ok(false);
        }
        Ok(self
            .backend
            .refresh_if_expiring(now, margin_secs)
            .await?
            .is_some())
    }
}
