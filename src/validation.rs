use chrono::{Datelike, NaiveDate, Utc};
use thiserror::Error;

/// Reasons a date of birth can be rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DobError {
    #[error("Date of birth is required")]
    Missing,
    #[error("Invalid date format")]
    Malformed,
    #[error("Date of birth cannot be in the future")]
    FutureDate,
    #[error("Date of birth cannot be more than 150 years ago")]
    TooOld,
}

/// Validate a date of birth against today's date.
///
/// Accepts any date from 150 calendar years ago up to today, inclusive.
pub fn validate_date_of_birth(input: &str) -> Result<(), DobError> {
    validate_date_of_birth_on(input, Utc::now().date_naive())
}

fn validate_date_of_birth_on(input: &str, today: NaiveDate) -> Result<(), DobError> {
    if input.is_empty() {
        return Err(DobError::Missing);
    }

    let date = NaiveDate::parse_from_str(input, "%Y-%m-%d").map_err(|_| DobError::Malformed)?;

    if date > today {
        return Err(DobError::FutureDate);
    }
    if date < years_ago(today, 150) {
        return Err(DobError::TooOld);
    }

    Ok(())
}

// Calendar-year subtraction, not a fixed day count. Feb 29 with no
// counterpart in the target year rolls forward to Mar 1.
fn years_ago(today: NaiveDate, years: i32) -> NaiveDate {
    today
        .with_year(today.year() - years)
        .or_else(|| NaiveDate::from_ymd_opt(today.year() - years, 3, 1))
        .unwrap_or(today)
}

/// Strict `YYYY-MM-DD` check: the string must parse as a calendar date and
/// round-trip back to the exact same text, so non-canonical forms like
/// `2024-2-1` are rejected.
pub fn is_valid_iso_date(input: &str) -> bool {
    match NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        Ok(date) => date.format("%Y-%m-%d").to_string() == input,
        Err(_) => false,
    }
}

/// Shape check only (`local@domain.tld`), not a deliverability check.
pub fn is_valid_email(input: &str) -> bool {
    if input.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = input.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 27).unwrap()
    }

    #[test]
    fn accepts_dates_within_range() {
        assert_eq!(validate_date_of_birth_on("1990-01-01", today()), Ok(()));
        assert_eq!(validate_date_of_birth_on("2026-08-27", today()), Ok(()));
        // Exactly 150 years ago is still allowed
        assert_eq!(validate_date_of_birth_on("1876-08-27", today()), Ok(()));
    }

    #[test]
    fn rejects_empty_input() {
        assert_eq!(
            validate_date_of_birth_on("", today()),
            Err(DobError::Missing)
        );
    }

    #[test]
    fn rejects_malformed_input() {
        assert_eq!(
            validate_date_of_birth_on("not-a-date", today()),
            Err(DobError::Malformed)
        );
        assert_eq!(
            validate_date_of_birth_on("2024-13-40", today()),
            Err(DobError::Malformed)
        );
    }

    #[test]
    fn rejects_future_dates() {
        assert_eq!(
            validate_date_of_birth_on("2026-08-28", today()),
            Err(DobError::FutureDate)
        );
        assert_eq!(
            validate_date_of_birth_on("2100-01-01", today()),
            Err(DobError::FutureDate)
        );
    }

    #[test]
    fn rejects_dates_over_150_years_old() {
        assert_eq!(
            validate_date_of_birth_on("1876-08-26", today()),
            Err(DobError::TooOld)
        );
        assert_eq!(
            validate_date_of_birth_on("1800-01-01", today()),
            Err(DobError::TooOld)
        );
    }

    #[test]
    fn leap_day_cutoff_rolls_to_march() {
        // 2024-02-29 minus 150 years lands in 1874, which has no Feb 29
        let leap = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(years_ago(leap, 150), NaiveDate::from_ymd_opt(1874, 3, 1).unwrap());
        assert_eq!(
            validate_date_of_birth_on("1874-03-01", leap),
            Ok(())
        );
        assert_eq!(
            validate_date_of_birth_on("1874-02-28", leap),
            Err(DobError::TooOld)
        );
    }

    #[test]
    fn iso_date_requires_canonical_form() {
        assert!(is_valid_iso_date("2024-02-01"));
        assert!(!is_valid_iso_date("2024-2-1"));
        assert!(!is_valid_iso_date("2024-02-30"));
        assert!(!is_valid_iso_date("02-01-2024"));
        assert!(!is_valid_iso_date(""));
    }

    #[test]
    fn email_shape() {
        assert!(is_valid_email("jane@example.com"));
        assert!(is_valid_email("j.doe+tag@mail.example.co"));
        assert!(!is_valid_email("janeexample.com"));
        assert!(!is_valid_email("jane@example"));
        assert!(!is_valid_email("jane@@example.com"));
        assert!(!is_valid_email("jane doe@example.com"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("jane@.com"));
        assert!(!is_valid_email("jane@example."));
    }
}
