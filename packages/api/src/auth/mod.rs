//! Email/password authentication against GoTrue and session persistence.

mod gotrue;
mod session;

pub(crate) use gotrue::{
    PasswordGrant, RefreshGrant, SignUpRequest, SignUpResponse, TokenResponse, UserMetadata,
};
pub use session::{now_unix, SessionStorage, StoredSession};
