//! `hazellab-validation`: the single home of form-field rules.
//!
//! Every form (registration, admin user editor, login, profile) imports its
//! checks from here. All functions are pure and never panic on user input.

pub mod age;
pub mod email;
pub mod field;
pub mod password;
pub mod rut;

pub use age::{ADULT_AGE, AgeError, age_on, is_adult, parse_birthdate};
pub use email::{ALLOWED_EMAIL_DOMAINS, Email, EmailError};
pub use field::{BirthdateField, EmailField, FieldRule, RutField, check_field, require};
pub use hazellab_core::FieldErrors;
pub use password::{LOGIN_PASSWORD_MIN, PASSWORD_MIN, PasswordError};
pub use rut::{Rut, RutError};
