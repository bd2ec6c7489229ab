//! Email rules: basic shape plus the storefront's domain allow-list.

use core::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Domains accepted by login, registration and the admin user editor.
pub const ALLOWED_EMAIL_DOMAINS: &[&str] = &["duoc.cl", "profesor.duoc.cl", "gmail.com"];

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9._%+-]+@(duoc\.cl|profesor\.duoc\.cl|gmail\.com)$")
        .expect("static email pattern compiles")
});

static SHAPE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static email pattern compiles"));

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EmailError {
    #[error("email is required")]
    Empty,

    #[error("email is malformed")]
    Malformed,

    #[error("email must end in @duoc.cl, @profesor.duoc.cl or @gmail.com")]
    DomainNotAllowed,
}

/// Trim and lowercase, the form the backend stores.
pub fn normalize(input: &str) -> String {
    input.trim().to_lowercase()
}

/// Check shape and allow-list on the normalized address.
pub fn validate(input: &str) -> Result<(), EmailError> {
    let email = normalize(input);
    if email.is_empty() {
        return Err(EmailError::Empty);
    }
    if !SHAPE_RE.is_match(&email) {
        return Err(EmailError::Malformed);
    }
    if !EMAIL_RE.is_match(&email) {
        return Err(EmailError::DomainNotAllowed);
    }
    Ok(())
}

/// Shape only, no allow-list. Used when editing existing accounts, which
/// may predate the allow-list.
pub fn validate_shape(input: &str) -> Result<(), EmailError> {
    let email = normalize(input);
    if email.is_empty() {
        Err(EmailError::Empty)
    } else if SHAPE_RE.is_match(&email) {
        Ok(())
    } else {
        Err(EmailError::Malformed)
    }
}

/// An allow-listed, normalized email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Email {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        validate(s)?;
        Ok(Self(normalize(s)))
    }
}

impl TryFrom<String> for Email {
    type Error = EmailError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

impl core::fmt::Display for Email {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
