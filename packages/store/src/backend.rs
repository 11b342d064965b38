//! # Backend traits: the seam to the hosted auth and data services
//!
//! Everything LocalHelp persists lives in a backend-as-a-service. This module
//! describes what the client needs from it as two async traits, so the session
//! logic can run against the real Supabase client (`api::SupabaseClient`) or
//! against [`crate::MemoryBackend`] in tests.
//!
//! ## [`AuthBackend`]
//!
//! Email/password sign-in, sign-up and sign-out, session restoration and token
//! renewal, plus [`AuthBackend::subscribe`] which hands out a receiver for
//! [`AuthEvent`]s. Implementations broadcast an event whenever the signed-in
//! principal changes.
//!
//! ## [`DataBackend`]
//!
//! Row reads and writes against `user_profiles`, `services` and `categories`.
//! Calls are subject to the backend's row-level policies; the client never
//! assumes it can bypass them. A profile that does not exist yet is
//! `Ok(None)`, not an error.

use std::future::Future;

use thiserror::Error;
use tokio::sync::broadcast;

use crate::models::{Category, Listing, NewListing, Principal, Profile, ProfileUpdate};

/// Capacity of the auth-event broadcast channel.
pub const AUTH_EVENT_CAPACITY: usize = 16;

/// Session change delivered by the auth backend.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthEvent {
    SignedIn(Principal),
    TokenRefreshed(Principal),
    SignedOut,
}

impl AuthEvent {
    /// The principal this event leaves behind, if any.
    pub fn principal(&self) -> Option<&Principal> {
        match self {
            AuthEvent::SignedIn(p) | AuthEvent::TokenRefreshed(p) => Some(p),
            AuthEvent::SignedOut => None,
        }
    }
}

/// Result of a sign-up request.
#[derive(Debug, Clone, PartialEq)]
pub enum SignUpOutcome {
    /// The account exists but the email must be verified before a session
    /// is issued.
    PendingVerification { email: String },
    /// The backend confirmed the account immediately and signed it in.
    SignedIn(Principal),
}

/// Failures reported by a backend.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BackendError {
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("record not found")]
    NotFound,
    #[error("not authorized")]
    Unauthorized,
    #[error("backend returned {status}: {message}")]
    Http { status: u16, message: String },
    #[error("network error: {0}")]
    Network(String),
    #[error("unexpected response: {0}")]
    Decode(String),
}

/// Auth operations keyed by email and password.
pub trait AuthBackend {
    /// Restore the current session, renewing it if it has expired.
    fn get_session(&self) -> impl Future<Output = Result<Option<Principal>, BackendError>>;

    fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<Principal, BackendError>>;

    fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: Option<&str>,
    ) -> impl Future<Output = Result<SignUpOutcome, BackendError>>;

    fn sign_out(&self) -> impl Future<Output = Result<(), BackendError>>;

    /// Renew the session when its token expires before `now + margin_secs`.
    /// Returns the refreshed principal, or `None` when no renewal was due.
    fn refresh_if_expiring(
        &self,
        now: i64,
        margin_secs: i64,
    ) -> impl Future<Output = Result<Option<Principal>, BackendError>>;

    /// Receiver for session changes.
    fn subscribe(&self) -> broadcast::Receiver<AuthEvent>;
}

/// Row-oriented data API.
pub trait DataBackend {
    fn fetch_profile(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<Option<Profile>, BackendError>>;

    fn update_profile(
        &self,
        user_id: &str,
        update: &ProfileUpdate,
    ) -> impl Future<Output = Result<(), BackendError>>;

    fn fetch_listings(&self) -> impl Future<Output = Result<Vec<Listing>, BackendError>>;

    fn fetch_categories(&self) -> impl Future<Output = Result<Vec<Category>, BackendError>>;

    fn create_listing(
        &self,
        listing: &NewListing,
    ) -> impl Future<Output = Result<Listing, BackendError>>;
}
