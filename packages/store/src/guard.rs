//! Route guard decisions derived from the session state.

use crate::destination::Destination;
use crate::session::SessionState;

/// Authorization state of the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    /// The first session check has not resolved yet.
    Loading,
    Unauthenticated,
    Authenticated,
}

impl From<&SessionState> for GuardState {
    fn from(state: &SessionState) -> Self {
        match (&state.principal, state.loading) {
            (Some(_), _) => GuardState::Authenticated,
            (None, true) => GuardState::Loading,
            (None, false) => GuardState::Unauthenticated,
        }
    }
}

/// What a protected route should do in a given state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardOutcome {
    /// Show a placeholder and do not navigate.
    Placeholder,
    /// Navigate away; `replace` keeps back-navigation from looping.
    Redirect { to: Destination, replace: bool },
    /// Render the guarded content unmodified.
    Render,
}

impl GuardState {
    pub fn outcome(self) -> GuardOutcome {
        match self {
            GuardState::Loading => GuardOutcome::Placeholder,
            GuardState::Unauthenticated => GuardOutcome::Redirect {
                to: Destination::SignIn,
                replace: true,
            },
            GuardState::Authenticated => GuardOutcome::Render,
        }
    }
}

/// A change of authorization worth reacting to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEntry {
    /// `Unauthenticated → Authenticated`, or a different principal took over.
    SignedIn,
    /// `Loading → Authenticated`: a stored session was restored on startup.
    Restored,
    /// `Authenticated → Unauthenticated`.
    SignedOut,
}

/// Tracks consecutive session states and reports entries into and out of
/// [`GuardState::Authenticated`].
#[derive(Debug, Clone)]
pub struct AuthTransitions {
    last: GuardState,
    principal_id: Option<String>,
}

impl Default for AuthTransitions {
    fn default() -> Self {
        Self {
            last: GuardState::Loading,
            principal_id: None,
        }
    }
}

impl AuthTransitions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> GuardState {
        self.last
    }

    /// Feed the next state. Token refreshes for the same principal report
    /// nothing.
    pub fn observe(&mut self, state: &SessionState) -> Option<AuthEntry> {
        let next = GuardState::from(state);
        let next_id = state.principal.as_ref().map(|p| p.id.clone());
        let entry = match (self.last, next) {
            (GuardState::Loading, GuardState::Authenticated) => Some(AuthEntry::Restored),
            (GuardState::Unauthenticated, GuardState::Authenticated) => Some(AuthEntry::SignedIn),
            (GuardState::Authenticated, GuardState::Authenticated)
                if next_id != self.principal_id =>
            {
                Some(AuthEntry::SignedIn)
            }
            (GuardState::Authenticated, GuardState::Unauthenticated) => Some(AuthEntry::SignedOut),
            _ => None,
        };
        self.last = next;
        self.principal_id = next_id;
        entry
    }
}
