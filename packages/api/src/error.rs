//! HTTP-level errors and their translation into [`store::BackendError`].
//!
//! GoTrue answers failures in two shapes depending on its version:
//! `{"error": "invalid_grant", "error_description": "..."}` and
//! `{"code": 400, "error_code": "invalid_credentials", "msg": "..."}`.
//! PostgREST uses `{"code": "PGRST116", "message": "...", "details": ...}`.
//! [`ApiError::from_response_body`] reads all three.

use serde::Deserialize;
use store::BackendError;
use thiserror::Error;

/// PostgREST code for "the requested single row does not exist".
const PGRST_NO_ROWS: &str = "PGRST116";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("backend returned {status}: {message}")]
    Status {
        status: u16,
        code: Option<String>,
        message: String,
    },
    #[error("unexpected response: {0}")]
    Decode(String),
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    error_code: Option<String>,
    // A number in GoTrue bodies, a string in PostgREST bodies.
    #[serde(default)]
    code: Option<serde_json::Value>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl ApiError {
    /// Build a [`ApiError::Status`] from a non-success response body.
    pub fn from_response_body(status: u16, body: &str) -> Self {
        let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();

        let code = parsed
            .error_code
            .or_else(|| match parsed.code {
                Some(serde_json::Value::String(s)) => Some(s),
                _ => None,
            })
            .or_else(|| parsed.error.clone());

        let message = parsed
            .msg
            .or(parsed.message)
            .or(parsed.error_description)
            .or(parsed.error)
            .unwrap_or_else(|| {
                let text = body.trim();
                if text.is_empty() {
                    format!("HTTP {status}")
                } else {
                    text.to_string()
                }
            });

        ApiError::Status {
            status,
            code,
            message,
        }
    }
}

impl From<ApiError> for BackendError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Request(e) if e.is_decode() => BackendError::Decode(e.to_string()),
            ApiError::Request(e) => BackendError::Network(e.to_string()),
            ApiError::Decode(msg) => BackendError::Decode(msg),
            ApiError::Status {
                status,
                code,
                message,
            } => match code.as_deref() {
                Some("invalid_credentials" | "invalid_grant") => BackendError::InvalidCredentials,
                Some(PGRST_NO_ROWS) => BackendError::NotFound,
                _ if status == 401 || status == 403 => BackendError::Unauthorized,
                _ => BackendError::Http { status, message },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend(status: u16, body: &str) -> BackendError {
        ApiError::from_response_body(status, body).into()
    }

    #[test]
    fn test_gotrue_bad_credentials_both_shapes() {
        assert_eq!(
            backend(
                400,
                r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#
            ),
            BackendError::InvalidCredentials
        );
        assert_eq!(
            backend(
                400,
                r#"{"code":400,"error_code":"invalid_credentials","msg":"Invalid login credentials"}"#
            ),
            BackendError::InvalidCredentials
        );
    }

    #[test]
    fn test_gotrue_other_failures_keep_message() {
        assert_eq!(
            backend(
                400,
                r#"{"code":400,"error_code":"email_not_confirmed","msg":"Email not confirmed"}"#
            ),
            BackendError::Http {
                status: 400,
                message: "Email not confirmed".to_string()
            }
        );
    }

    #[test]
    fn test_postgrest_no_rows_is_not_found() {
        assert_eq!(
            backend(
                406,
                r#"{"code":"PGRST116","message":"JSON object requested, multiple (or no) rows returned","details":null,"hint":null}"#
            ),
            BackendError::NotFound
        );
    }

    #[test]
    fn test_auth_status_is_unauthorized() {
        assert_eq!(
            backend(401, r#"{"code":"PGRST301","message":"JWT expired"}"#),
            BackendError::Unauthorized
        );
        assert_eq!(backend(403, ""), BackendError::Unauthorized);
    }

    #[test]
    fn test_unparseable_body_becomes_message() {
        assert_eq!(
            backend(502, "Bad Gateway"),
            BackendError::Http {
                status: 502,
                message: "Bad Gateway".to_string()
            }
        );
        assert_eq!(
            backend(500, ""),
            BackendError::Http {
                status: 500,
                message: "HTTP 500".to_string()
            }
        );
    }
}
