//! Client-side failures.

use hazellab_auth::AuthzError;
use hazellab_core::{DomainError, FieldErrors};
use hazellab_sales::CheckoutError;

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Could not reach the backend (connection refused, timeout, TLS).
    #[error("network error: {0}")]
    Network(String),

    /// The backend rejected the session token; the local session was cleared.
    #[error("session expired, please log in again")]
    Unauthorized,

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("could not decode response: {0}")]
    Decode(String),

    #[error(transparent)]
    Validation(#[from] DomainError),

    #[error(transparent)]
    Forbidden(#[from] AuthzError),

    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    #[error("not logged in")]
    NoSession,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("session storage error: {0}")]
    Persistence(String),
}

impl ClientError {
    /// Field messages, when the failure is a form validation error.
    pub fn fields(&self) -> Option<&FieldErrors> {
        match self {
            Self::Validation(err) => err.fields(),
            _ => None,
        }
    }

    /// Whether the caller should send the user back to the login screen.
    pub fn needs_login(&self) -> bool {
        matches!(
            self,
            Self::Unauthorized
                | Self::NoSession
                | Self::Forbidden(AuthzError::Unauthenticated)
                | Self::Checkout(CheckoutError::NotLoggedIn)
        )
    }
}

/// Pull a human message out of an error body (`{"message": ..}`,
/// `{"error": ..}` or plain text).
pub(crate) fn error_message(body: &str, fallback: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "error", "mensaje"] {
            if let Some(msg) = value.get(key).and_then(|m| m.as_str()) {
                return msg.to_string();
            }
        }
        if let Some(msg) = value.as_str() {
            return msg.to_string();
        }
    }
    let body = body.trim();
    if body.is_empty() { fallback.to_string() } else { body.to_string() }
}
