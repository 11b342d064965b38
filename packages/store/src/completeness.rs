//! # Profile-completeness gating after sign-in
//!
//! Once a principal enters the authenticated state the client reads its
//! profile and decides where to go:
//!
//! | Profile read | Destination |
//! |--------------|-------------|
//! | not found | [`Destination::CompleteProfile`] |
//! | phone or location empty | [`Destination::CompleteProfile`] |
//! | both populated | [`Destination::Home`] |
//! | any other failure | [`ProfileCheckError`] (caller notifies and offers retry) |
//!
//! The check is always run; [`navigation_after`] decides whether its result
//! moves the user. A fresh sign-in always navigates. A session restored on
//! startup only navigates when the profile still needs completing, so a
//! reload keeps the user on the page they were viewing.

use thiserror::Error;

use crate::backend::{BackendError, DataBackend};
use crate::destination::Destination;
use crate::guard::AuthEntry;
use crate::models::{Principal, Profile};

#[derive(Debug, Clone, PartialEq, Error)]
#[error("could not load profile: {0}")]
pub struct ProfileCheckError(#[from] pub BackendError);

/// Where a principal with this profile belongs.
pub fn destination_for(profile: Option<&Profile>) -> Destination {
    match profile {
        Some(p) if p.is_complete() => Destination::Home,
        _ => Destination::CompleteProfile,
    }
}

/// Read the principal's profile and pick a destination.
pub async fn check_profile<B: DataBackend>(
    backend: &B,
    principal: &Principal,
) -> Result<Destination, ProfileCheckError> {
    match backend.fetch_profile(&principal.id).await {
        Ok(profile) => Ok(destination_for(profile.as_ref())),
        // Some backends report a missing row as an error rather than empty.
        Err(BackendError::NotFound) => Ok(Destination::CompleteProfile),
        Err(e) => {
            tracing::error!(user_id = %principal.id, "Profile check failed: {e}");
            Err(ProfileCheckError(e))
        }
    }
}

/// Whether the result of a check should move the user.
pub fn navigation_after(entry: AuthEntry, destination: Destination) -> Option<Destination> {
    match (entry, destination) {
        (AuthEntry::SignedIn, dest) => Some(dest),
        (AuthEntry::Restored, Destination::CompleteProfile) => Some(Destination::CompleteProfile),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::AuthBackend;
    use crate::guard::AuthTransitions;
    use crate::memory::MemoryBackend;
    use crate::models::AccessToken;
    use crate::session::Session;

    fn principal(id: &str) -> Principal {
        Principal::new(id, "a@b.com", AccessToken::new("t"))
    }

    fn profile(phone: Option<&str>, location: Option<&str>) -> Profile {
        Profile {
            user_id: "u1".to_string(),
            phone: phone.map(str::to_string),
            location: location.map(str::to_string),
            ..Profile::default()
        }
    }

    #[test]
    fn test_incomplete_profiles_never_route_home() {
        let cases = [
            (None, None),
            (Some("555-0100"), None),
            (None, Some("Springfield")),
            (Some(""), Some("Springfield")),
            (Some("555-0100"), Some("  ")),
        ];
        for (phone, location) in cases {
            assert_eq!(
                destination_for(Some(&profile(phone, location))),
                Destination::CompleteProfile
            );
        }
        assert_eq!(destination_for(None), Destination::CompleteProfile);
    }

    #[test]
    fn test_complete_profile_routes_home() {
        assert_eq!(
            destination_for(Some(&profile(Some("555-0100"), Some("Springfield")))),
            Destination::Home
        );
    }

    #[tokio::test]
    async fn test_missing_record_routes_to_completion() {
        let backend = MemoryBackend::new();
        let dest = check_profile(&backend, &principal("u1")).await.unwrap();
        assert_eq!(dest, Destination::CompleteProfile);
    }

    #[tokio::test]
    async fn test_not_found_error_is_not_a_failure() {
        let backend = MemoryBackend::new();
        backend.fail_profile_reads(Some(BackendError::NotFound));
        let dest = check_profile(&backend, &principal("u1")).await.unwrap();
        assert_eq!(dest, Destination::CompleteProfile);
    }

    #[tokio::test]
    async fn test_other_failures_are_reported() {
        let backend = MemoryBackend::new();
        backend.fail_profile_reads(Some(BackendError::Network("offline".to_string())));
        let err = check_profile(&backend, &principal("u1")).await.unwrap_err();
        assert_eq!(err, ProfileCheckError(BackendError::Network("offline".to_string())));

        backend.fail_profile_reads(None);
        assert!(check_profile(&backend, &principal("u1")).await.is_ok());
    }

    #[test]
    fn test_navigation_policy() {
        assert_eq!(
            navigation_after(AuthEntry::SignedIn, Destination::Home),
            Some(Destination::Home)
        );
        assert_eq!(
            navigation_after(AuthEntry::SignedIn, Destination::CompleteProfile),
            Some(Destination::CompleteProfile)
        );
        assert_eq!(navigation_after(AuthEntry::Restored, Destination::Home), None);
        assert_eq!(
            navigation_after(AuthEntry::Restored, Destination::CompleteProfile),
            Some(Destination::CompleteProfile)
        );
        assert_eq!(navigation_after(AuthEntry::SignedOut, Destination::Home), None);
    }

    #[tokio::test]
    async fn test_pending_sign_up_does_not_trigger_check() {
        let backend = MemoryBackend::new().with_email_verification();
        let session = Session::new(backend.clone());
        let mut events = session.subscribe();
        let mut transitions = AuthTransitions::new();
        session.init().await;
        assert_eq!(transitions.observe(&session.state()), None);

        session.sign_up("a@b.com", "pw123456", None).await.unwrap();
        session.drain(&mut events);
        assert!(session.principal().is_none());
        assert_eq!(transitions.observe(&session.state()), None);

        backend.confirm_email("a@b.com");
        session.sign_in("a@b.com", "pw123456").await.unwrap();
        session.drain(&mut events);
        assert_eq!(
            transitions.observe(&session.state()),
            Some(AuthEntry::SignedIn)
        );

        let principal = session.principal().unwrap();
        let dest = check_profile(session.backend(), &principal).await.unwrap();
        assert_eq!(dest, Destination::CompleteProfile);
    }

    #[tokio::test]
    async fn test_sign_in_with_complete_profile_goes_home() {
        let backend = MemoryBackend::new();
        let id = backend.add_account("ada@example.com", "pw123456");
        backend.put_profile(Profile {
            user_id: id,
            phone: Some("555-0100".to_string()),
            location: Some("Springfield".to_string()),
            ..Profile::default()
        });
        let principal = backend.sign_in("ada@example.com", "pw123456").await.unwrap();
        assert_eq!(
            check_profile(&backend, &principal).await,
            Ok(Destination::Home)
        );
    }
}
