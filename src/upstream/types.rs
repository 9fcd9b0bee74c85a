//! Wire types and error definitions for the managed backend.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors that can occur while talking to the managed backend.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The service answered but declined the operation (4xx).
    #[error("upstream rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The service could not be reached or failed internally (5xx).
    #[error("upstream unavailable: {0}")]
    Unavailable(String),

    /// The call exceeded the configured timeout.
    #[error("upstream timeout after {0} seconds")]
    Timeout(u64),

    /// The response body did not have the expected shape.
    #[error("unexpected upstream response: {0}")]
    Decode(String),
}

impl UpstreamError {
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }

    /// Message suitable for clients when the service declined the call.
    pub fn rejection_message(&self) -> Option<&str> {
        match self {
            Self::Rejected { message, .. } => Some(message),
            _ => None,
        }
    }
}

/// Result type for upstream operations.
pub type UpstreamResult<T> = Result<T, UpstreamError>;

/// An identity as returned by the auth API.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: Map<String, Value>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// A password-grant session.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AuthSession {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub expires_at: Option<u64>,
    #[serde(default)]
    pub token_type: Option<String>,
    pub user: AuthUser,
}

/// Account creation payload; `data` becomes the user's metadata.
#[derive(Debug, Clone, Serialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub data: Map<String, Value>,
}

/// Signup answers with a session when auto-confirm is on, or with the bare
/// user when the address still needs confirming.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum SignUpResponse {
    Session(AuthSession),
    User(AuthUser),
}

impl SignUpResponse {
    pub(crate) fn into_user(self) -> AuthUser {
        match self {
            Self::Session(session) => session.user,
            Self::User(user) => user,
        }
    }
}

/// Pull a human-readable message out of an upstream error body.
///
/// The data API uses `message`, the auth API `msg`, `error_description` or
/// `error` depending on the endpoint.
pub fn extract_error_message(body: &str) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        for key in ["msg", "message", "error_description", "error"] {
            if let Some(Value::String(text)) = map.get(key) {
                if !text.is_empty() {
                    return text.clone();
                }
            }
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "empty response".to_string()
    } else {
        trimmed.chars().take(200).collect()
    }
}
