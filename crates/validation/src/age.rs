//! Age-from-birthdate gate used by account forms.

use chrono::{Datelike, NaiveDate};
use thiserror::Error;

/// Minimum age to hold an account.
pub const ADULT_AGE: i32 = 18;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AgeError {
    #[error("birthdate must be a YYYY-MM-DD date")]
    Malformed,

    #[error("user must be at least {ADULT_AGE} years old")]
    Underage,
}

/// Parse an ISO `YYYY-MM-DD` birthdate (the wire format of `fechaNacimiento`).
pub fn parse_birthdate(input: &str) -> Result<NaiveDate, AgeError> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|_| AgeError::Malformed)
}

/// Whole years between `birth` and `today`.
///
/// The year difference, minus one when `today`'s (month, day) precedes the
/// birthday's. Negative when `birth` is in the future.
pub fn age_on(birth: NaiveDate, today: NaiveDate) -> i32 {
    let years = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        years - 1
    } else {
        years
    }
}

/// ≥ 18 gate. An absent birthdate is "no constraint" and always passes.
pub fn is_adult(birth: Option<NaiveDate>, today: NaiveDate) -> bool {
    birth.is_none_or(|b| age_on(b, today) >= ADULT_AGE)
}

/// Form-level check on the raw field: blank passes, otherwise parse and gate.
pub fn validate_birthdate(input: Option<&str>, today: NaiveDate) -> Result<(), AgeError> {
    let Some(raw) = input.filter(|s| !s.trim().is_empty()) else {
        return Ok(());
    };
    let birth = parse_birthdate(raw)?;
    if is_adult(Some(birth), today) {
        Ok(())
    } else {
        Err(AgeError::Underage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        parse_birthdate(s).unwrap()
    }

    #[test]
    fn birthday_already_passed_this_year() {
        assert_eq!(age_on(date("2000-01-01"), date("2024-06-01")), 24);
    }

    #[test]
    fn birthday_still_ahead_this_year() {
        assert_eq!(age_on(date("2000-07-01"), date("2024-06-01")), 23);
    }

    #[test]
    fn birthday_today_counts() {
        assert_eq!(age_on(date("2006-06-01"), date("2024-06-01")), 18);
        assert!(is_adult(Some(date("2006-06-01")), date("2024-06-01")));
        assert!(!is_adult(Some(date("2006-06-02")), date("2024-06-01")));
    }

    #[test]
    fn leap_day_birthday() {
        assert_eq!(age_on(date("2004-02-29"), date("2022-02-28")), 17);
        assert_eq!(age_on(date("2004-02-29"), date("2022-03-01")), 18);
    }

    #[test]
    fn absent_birthdate_always_passes() {
        assert!(is_adult(None, date("2024-06-01")));
        assert_eq!(validate_birthdate(None, date("2024-06-01")), Ok(()));
        assert_eq!(validate_birthdate(Some(" "), date("2024-06-01")), Ok(()));
    }

    #[test]
    fn form_check_reports_underage_and_garbage() {
        let today = date("2024-06-01");
        assert_eq!(validate_birthdate(Some("2010-01-01"), today), Err(AgeError::Underage));
        assert_eq!(validate_birthdate(Some("01/01/2000"), today), Err(AgeError::Malformed));
    }
}
