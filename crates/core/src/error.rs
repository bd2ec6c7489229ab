//! Domain error model.

use thiserror::Error;

use crate::fields::FieldErrors;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, client-side failures (malformed
/// identifiers, invalid forms). Transport concerns belong to the client
/// crate.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A form failed validation; one message per offending field.
    #[error("form has invalid fields: {0}")]
    Fields(FieldErrors),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    /// Field errors, if this is a form failure.
    pub fn fields(&self) -> Option<&FieldErrors> {
        match self {
            Self::Fields(f) => Some(f),
            _ => None,
        }
    }
}

impl From<FieldErrors> for DomainError {
    fn from(value: FieldErrors) -> Self {
        Self::Fields(value)
    }
}
