//! Wire types for the GoTrue auth endpoints under `/auth/v1`.

use serde::{Deserialize, Serialize};
use store::AccessToken;

use super::session::StoredSession;

/// Fallback lifetime when GoTrue omits both `expires_at` and `expires_in`.
const DEFAULT_TOKEN_TTL_SECS: i64 = 3600;

/// Body of `POST /token?grant_type=password`.
#[derive(Debug, Serialize)]
pub(crate) struct PasswordGrant<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Body of `POST /token?grant_type=refresh_token`.
#[derive(Debug, Serialize)]
pub(crate) struct RefreshGrant<'a> {
    pub refresh_token: &'a str,
}

/// Body of `POST /signup`. `data` becomes the user's metadata.
#[derive(Debug, Serialize)]
pub(crate) struct SignUpRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<UserMetadata<'a>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct UserMetadata<'a> {
    pub full_name: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct GoTrueUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// A granted session.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: AccessToken,
    pub refresh_token: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: GoTrueUser,
}

impl TokenResponse {
    /// Convert into the persisted form. `fallback_email` is used when the
    /// user object carries no email (phone-only accounts).
    pub fn into_stored(self, now: i64, fallback_email: &str) -> StoredSession {
        let expires_at = self
            .expires_at
            .unwrap_or_else(|| now + self.expires_in.unwrap_or(DEFAULT_TOKEN_TTL_SECS));
        StoredSession {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
            user_id: self.user.id,
            email: self.user.email.unwrap_or_else(|| fallback_email.to_string()),
        }
    }
}

/// `POST /signup` returns a session when the project auto-confirms emails,
/// and a bare user object when verification is pending.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum SignUpResponse {
    Session(TokenResponse),
    User(GoTrueUser),
}
