//! Chilean RUT (national ID) check digit validation and display formatting.
//!
//! A RUT is a numeric body followed by a modulo-11 check digit (`0`-`9` or
//! `K`). The canonical display form is `12.345.678-5`.
//!
//! [`is_valid`] and [`format`] are deliberately lenient about separators:
//! anything that is not a digit or `k`/`K` is stripped first, so
//! `12.345.678-5`, `12345678-5` and `123456785` are the same RUT.

use core::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Longest body accepted by the [`Rut`] value object.
pub const MAX_BODY_DIGITS: usize = 8;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RutError {
    #[error("RUT is required")]
    Empty,

    #[error("RUT needs a body and a check digit")]
    TooShort,

    #[error("RUT body must be 1 to {MAX_BODY_DIGITS} digits")]
    BodyLength,

    #[error("RUT body must contain only digits")]
    NonDigitBody,

    #[error("RUT check digit does not match (expected {expected})")]
    CheckDigitMismatch { expected: char },
}

/// Keep only digits and `K`, uppercasing `k`.
pub fn clean(input: &str) -> String {
    input
        .chars()
        .filter_map(|c| match c {
            '0'..='9' => Some(c),
            'k' | 'K' => Some('K'),
            _ => None,
        })
        .collect()
}

/// Modulo-11 check digit of a numeric body.
///
/// Digits are weighted 2,3,4,5,6,7,2,3,… from the rightmost one. Returns
/// `None` for an empty body or one containing anything but ASCII digits.
pub fn check_digit(body: &str) -> Option<char> {
    if body.is_empty() {
        return None;
    }

    let mut sum: u64 = 0;
    let mut weight: u64 = 2;
    for c in body.chars().rev() {
        let digit = u64::from(c.to_digit(10)?);
        sum += digit * weight;
        weight = if weight == 7 { 2 } else { weight + 1 };
    }

    match 11 - (sum % 11) {
        11 => Some('0'),
        10 => Some('K'),
        r => char::from_digit(r as u32, 10),
    }
}

/// Split a cleaned RUT into `(body, check digit)`.
fn split(cleaned: &str) -> Option<(&str, char)> {
    if cleaned.len() < 2 {
        return None;
    }
    // `clean` only leaves ASCII, so byte slicing is safe.
    let (body, dv) = cleaned.split_at(cleaned.len() - 1);
    dv.chars().next().map(|dv| (body, dv))
}

/// Whether `input` carries a correct check digit.
///
/// Purely arithmetic: short bodies are checked mechanically, and no upper
/// bound on body length is enforced here (see [`Rut`] for that).
pub fn is_valid(input: &str) -> bool {
    let cleaned = clean(input);
    match split(&cleaned) {
        Some((body, dv)) => check_digit(body) == Some(dv),
        None => false,
    }
}

/// Reshape `input` into `12.345.678-K` display form.
///
/// Never rejects input and never recomputes the check digit: the last
/// surviving character is appended as-is. Input with fewer than two
/// significant characters is returned unchanged.
pub fn format(input: &str) -> String {
    let cleaned = clean(input);
    let Some((body, dv)) = split(&cleaned) else {
        return input.to_string();
    };

    let len = body.len();
    let mut out = String::with_capacity(len + len / 3 + 2);
    for (i, c) in body.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push('.');
        }
        out.push(c);
    }
    out.push('-');
    out.push(dv);
    out
}

/// A validated RUT (body of 1–8 digits with a matching check digit).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rut {
    body: u32,
    check_digit: char,
}

impl Rut {
    pub fn body(&self) -> u32 {
        self.body
    }

    pub fn check_digit(&self) -> char {
        self.check_digit
    }

    /// Compact form without thousands separators (`12345678-5`).
    pub fn compact(&self) -> String {
        format!("{}-{}", self.body, self.check_digit)
    }
}

impl FromStr for Rut {
    type Err = RutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(RutError::Empty);
        }

        let cleaned = clean(s);
        let (body, dv) = split(&cleaned).ok_or(RutError::TooShort)?;

        if body.len() > MAX_BODY_DIGITS {
            return Err(RutError::BodyLength);
        }
        let expected = check_digit(body).ok_or(RutError::NonDigitBody)?;
        if expected != dv {
            return Err(RutError::CheckDigitMismatch { expected });
        }

        let body = body.parse::<u32>().map_err(|_| RutError::NonDigitBody)?;
        Ok(Self {
            body,
            check_digit: dv,
        })
    }
}

impl core::fmt::Display for Rut {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&format(&self.compact()))
    }
}

impl Serialize for Rut {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Rut {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn check_digit_of_known_body() {
        assert_eq!(check_digit("12345678"), Some('5'));
        assert!(is_valid("12345678-5"));
        assert!(!is_valid("12345678-4"));
    }

    #[test]
    fn remainder_ten_maps_to_k_and_eleven_to_zero() {
        // 1*2 = 2, 11 - 2 = 9
        assert_eq!(check_digit("1"), Some('9'));
        // 6*2 = 12, 12 % 11 = 1, 11 - 1 = 10 → K
        assert_eq!(check_digit("6"), Some('K'));
        // 0 → sum 0, 11 - 0 = 11 → 0
        assert_eq!(check_digit("0"), Some('0'));
        assert!(is_valid("6-k"));
        assert!(is_valid("6-K"));
    }

    #[test]
    fn accepts_any_separator_style() {
        assert!(is_valid("12.345.678-5"));
        assert!(is_valid("123456785"));
        assert!(is_valid(" 12 345 678 / 5 "));
    }

    #[test]
    fn empty_and_single_character_inputs_are_invalid() {
        assert!(!is_valid(""));
        assert!(!is_valid("5"));
        assert!(!is_valid("-.-"));
    }

    #[test]
    fn k_inside_body_is_invalid() {
        assert!(!is_valid("1K3-4"));
        assert_eq!(check_digit("1K3"), None);
    }

    #[test]
    fn formats_cleaned_input() {
        assert_eq!(format("123456785"), "12.345.678-5");
        assert_eq!(format("12345678-5"), "12.345.678-5");
        assert_eq!(format("7654321k"), "7.654.321-K");
        assert_eq!(format("1-9"), "1-9");
    }

    #[test]
    fn format_keeps_wrong_check_digit_verbatim() {
        assert_eq!(format("12345678-4"), "12.345.678-4");
    }

    #[test]
    fn format_returns_short_input_unchanged() {
        assert_eq!(format(""), "");
        assert_eq!(format("a"), "a");
        assert_eq!(format("-7-"), "-7-");
    }

    #[test]
    fn value_object_parses_and_displays_canonical_form() {
        let rut: Rut = "12345678-5".parse().unwrap();
        assert_eq!(rut.body(), 12_345_678);
        assert_eq!(rut.check_digit(), '5');
        assert_eq!(rut.to_string(), "12.345.678-5");
        assert_eq!(rut.compact(), "12345678-5");
    }

    #[test]
    fn value_object_reports_why_it_failed() {
        assert_eq!("".parse::<Rut>(), Err(RutError::Empty));
        assert_eq!("9".parse::<Rut>(), Err(RutError::TooShort));
        assert_eq!("123456789-0".parse::<Rut>(), Err(RutError::BodyLength));
        assert_eq!(
            "12345678-4".parse::<Rut>(),
            Err(RutError::CheckDigitMismatch { expected: '5' })
        );
    }

    #[test]
    fn serde_uses_canonical_string() {
        let rut: Rut = "123456785".parse().unwrap();
        assert_eq!(serde_json::to_string(&rut).unwrap(), "\"12.345.678-5\"");
        let back: Rut = serde_json::from_str("\"12345678-5\"").unwrap();
        assert_eq!(back, rut);
        assert!(serde_json::from_str::<Rut>("\"12345678-4\"").is_err());
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 1000,
            ..ProptestConfig::default()
        })]

        /// Property: formatting never changes validity.
        #[test]
        fn format_preserves_validity(input in "[0-9kK.\\- a-z]{0,14}") {
            prop_assert_eq!(is_valid(&format(&input)), is_valid(&input));
        }

        /// Property: appending the computed digit always yields a valid RUT.
        #[test]
        fn computed_check_digit_validates(body in 1u32..100_000_000) {
            let body = body.to_string();
            let dv = check_digit(&body).unwrap();
            let rut = format!("{body}-{dv}");
            prop_assert!(is_valid(&rut));
            prop_assert!(rut.parse::<Rut>().is_ok());
        }

        /// Property: formatting is idempotent.
        #[test]
        fn format_is_idempotent(input in "[0-9kK.\\-]{0,12}") {
            let once = format(&input);
            prop_assert_eq!(format(&once), once);
        }
    }
}
