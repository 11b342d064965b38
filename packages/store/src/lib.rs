//! Client-side state and decisions for LocalHelp, free of any UI framework.

pub mod backend;
pub mod completeness;
pub mod destination;
pub mod filter;
pub mod form;
pub mod guard;
pub mod models;
pub mod session;

mod memory;
pub use memory::MemoryBackend;

pub use backend::{AuthBackend, AuthEvent, BackendError, DataBackend, SignUpOutcome};
pub use completeness::{check_profile, navigation_after, ProfileCheckError};
pub use destination::Destination;
pub use filter::{filter_listings, ListingQuery, Selector};
pub use form::{FormError, FormFlow, ProfileCompletion, ServiceSubmission, StepForm};
pub use guard::{AuthEntry, AuthTransitions, GuardOutcome, GuardState};
pub use models::{
    AccessToken, Category, Listing, ListingStatus, NewListing, Principal, Profile, ProfileUpdate,
    UserRole,
};
pub use session::{Session, SessionError, SessionState};
