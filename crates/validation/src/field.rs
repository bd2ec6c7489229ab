//! One `{validate, format}` pair per field type.
//!
//! Forms call [`check_field`] for each input and get per-field messages in
//! a [`FieldErrors`] set.

use hazellab_core::FieldErrors;

use crate::{age, email, rut};

/// Validation and display normalization for one kind of form field.
pub trait FieldRule {
    /// Key used in [`FieldErrors`] (the backend's field name).
    const FIELD: &'static str;

    type Error: core::fmt::Display;

    fn validate(input: &str) -> Result<(), Self::Error>;

    /// Display/submission form of the raw input. Never fails.
    fn format(input: &str) -> String {
        input.trim().to_string()
    }
}

pub struct RutField;

impl FieldRule for RutField {
    const FIELD: &'static str = "rut";
    type Error = rut::RutError;

    fn validate(input: &str) -> Result<(), Self::Error> {
        input.parse::<rut::Rut>().map(|_| ())
    }

    fn format(input: &str) -> String {
        rut::format(input)
    }
}

pub struct EmailField;

impl FieldRule for EmailField {
    const FIELD: &'static str = "email";
    type Error = email::EmailError;

    fn validate(input: &str) -> Result<(), Self::Error> {
        input.parse::<email::Email>().map(|_| ())
    }

    fn format(input: &str) -> String {
        email::normalize(input)
    }
}

/// Birthdate shape only; the age gate needs "today" and lives in [`age`].
pub struct BirthdateField;

impl FieldRule for BirthdateField {
    const FIELD: &'static str = "fechaNacimiento";
    type Error = age::AgeError;

    fn validate(input: &str) -> Result<(), Self::Error> {
        if input.trim().is_empty() {
            return Ok(());
        }
        age::parse_birthdate(input).map(|_| ())
    }
}

/// Run `R` on `input`, recording a failure under `R::FIELD`.
pub fn check_field<R: FieldRule>(errors: &mut FieldErrors, input: &str) {
    errors.check(R::FIELD, R::validate(input));
}

/// Record `msg` under `field` when `value` is blank.
pub fn require(errors: &mut FieldErrors, field: &'static str, value: &str, msg: &str) {
    if value.trim().is_empty() {
        errors.add(field, msg);
    }
}
