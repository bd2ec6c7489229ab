//! Password rules for account forms and the login form.

use thiserror::Error;

/// Minimum length when creating or changing a password.
pub const PASSWORD_MIN: usize = 6;

/// Minimum length the login form accepts before contacting the backend.
pub const LOGIN_PASSWORD_MIN: usize = 4;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PasswordError {
    #[error("password is required")]
    Empty,

    #[error("password must be at least {0} characters")]
    TooShort(usize),

    #[error("passwords do not match")]
    Mismatch,
}

fn min_length(password: &str, min: usize) -> Result<(), PasswordError> {
    if password.is_empty() {
        Err(PasswordError::Empty)
    } else if password.chars().count() < min {
        Err(PasswordError::TooShort(min))
    } else {
        Ok(())
    }
}

/// New password plus its confirmation.
pub fn validate_new(password: &str, confirmation: &str) -> Result<(), PasswordError> {
    min_length(password, PASSWORD_MIN)?;
    if password != confirmation {
        return Err(PasswordError::Mismatch);
    }
    Ok(())
}

/// Optional password on profile updates: empty means "keep the current one".
pub fn validate_change(password: Option<&str>) -> Result<(), PasswordError> {
    match password {
        None | Some("") => Ok(()),
        Some(p) => min_length(p, PASSWORD_MIN),
    }
}

pub fn validate_login(password: &str) -> Result<(), PasswordError> {
    min_length(password.trim(), LOGIN_PASSWORD_MIN)
}
