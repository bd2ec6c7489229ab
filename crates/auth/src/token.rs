use serde::{Deserialize, Serialize};

use crate::user::User;

/// Opaque bearer token issued by the backend on login.
///
/// The client never inspects it; it is attached to every authenticated
/// request and thrown away on a 401. `Debug` and `Display` never reveal it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The raw secret, for the `Authorization` header only.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl core::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("SessionToken(***)")
    }
}

impl core::fmt::Display for SessionToken {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("***")
    }
}

/// `POST /auth/login` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// `POST /auth/login` response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoginResponse {
    pub token: Option<SessionToken>,
    pub usuario: Option<User>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_is_redacted() {
        let token = SessionToken::new("eyJhbGciOi.secret");
        assert_eq!(format!("{token:?}"), "SessionToken(***)");
        assert_eq!(token.to_string(), "***");
        assert_eq!(token.expose(), "eyJhbGciOi.secret");
    }

    #[test]
    fn login_response_tolerates_missing_parts() {
        let resp: LoginResponse = serde_json::from_str(r#"{"token":"abc"}"#).unwrap();
        assert!(resp.usuario.is_none());
        assert_eq!(resp.token.unwrap().expose(), "abc");
    }
}
