//! User validation rules
//!
//! Field constraints run in a fixed order and stop at the first violation, so a
//! caller always receives exactly one message.

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use super::entity::{User, UserId};

/// Dot-separated local part, `@`, a domain label of two or more characters and a
/// lowercase TLD
static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_-]+(\.[A-Za-z0-9_-]+)*@[A-Za-z0-9]{2,}\.[a-z]{2,}$").unwrap()
});

const MAX_LOCAL_PART_LEN: usize = 64;

/// Errors produced by the user validation pipeline
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Email should be not null")]
    EmailMissing,

    #[error("Email should be valid")]
    EmailInvalid,

    #[error("Name should be not null")]
    NameMissing,

    #[error("Surname should be not null")]
    SurnameMissing,

    #[error("Date should be not null")]
    DateMissing,

    #[error("Date should be at past time")]
    DateNotInPast,

    #[error("Age should be {min_age}+")]
    Underage { min_age: u32 },

    #[error("User with id: {0} not found")]
    NotFound(UserId),

    #[error("Date 1 should be before Date 2")]
    InvalidDateRange,
}

/// Run the field constraints against a user payload
///
/// Order: email present, email well-formed, name present, surname present,
/// date present, date strictly before `today`.
pub fn validate(user: &User, today: NaiveDate) -> Result<(), ValidationError> {
    let email = user.email().ok_or(ValidationError::EmailMissing)?;

    if !is_valid_email(email) {
        return Err(ValidationError::EmailInvalid);
    }

    if is_blank(user.name()) {
        return Err(ValidationError::NameMissing);
    }

    if is_blank(user.surname()) {
        return Err(ValidationError::SurnameMissing);
    }

    let date = user.date().ok_or(ValidationError::DateMissing)?;

    if date >= today {
        return Err(ValidationError::DateNotInPast);
    }

    Ok(())
}

/// Check an email address against the accepted pattern
pub fn is_valid_email(email: &str) -> bool {
    let local_len = email.split_once('@').map_or(0, |(local, _)| local.len());

    local_len <= MAX_LOCAL_PART_LEN && EMAIL_PATTERN.is_match(email)
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

/// Whole calendar years between `birth` and `today`
///
/// A year only counts once its anniversary has been reached, so someone born on
/// Feb 29 turns a year older on Mar 1 in non-leap years.
pub fn age_in_years(birth: NaiveDate, today: NaiveDate) -> i32 {
    let mut years = today.year() - birth.year();

    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        years -= 1;
    }

    years
}

/// Enforce the registration age threshold
pub fn check_minimum_age(
    birth: NaiveDate,
    today: NaiveDate,
    min_age: u32,
) -> Result<(), ValidationError> {
    if i64::from(age_in_years(birth, today)) < i64::from(min_age) {
        return Err(ValidationError::Underage { min_age });
    }

    Ok(())
}

/// Reject a birthdate range whose lower bound is after its upper bound
pub fn check_date_range(date1: NaiveDate, date2: NaiveDate) -> Result<(), ValidationError> {
    if date1 > date2 {
        return Err(ValidationError::InvalidDateRange);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn today() -> NaiveDate {
        date(2024, 6, 15)
    }

    fn valid_user() -> User {
        User::new()
            .with_email("test.mail@gmail.com")
            .with_name("Viktor")
            .with_surname("Shelest")
            .with_date(date(1996, 6, 15))
            .with_address("Ukraine, Kyiv")
            .with_phone_number("+380991234567")
    }

    #[test]
    fn test_valid_user_passes() {
        assert_eq!(validate(&valid_user(), today()), Ok(()));
    }

    #[test]
    fn test_missing_email() {
        let mut user = valid_user();
        user.set_email(None);
        assert_eq!(validate(&user, today()), Err(ValidationError::EmailMissing));
    }

    #[test]
    fn test_invalid_email() {
        let user = valid_user().with_email("e@com");
        assert_eq!(validate(&user, today()), Err(ValidationError::EmailInvalid));
    }

    #[test]
    fn test_missing_name() {
        let mut user = valid_user();
        user.set_name(None);
        assert_eq!(validate(&user, today()), Err(ValidationError::NameMissing));
    }

    #[test]
    fn test_blank_name_counts_as_missing() {
        let user = valid_user().with_name("   ");
        assert_eq!(validate(&user, today()), Err(ValidationError::NameMissing));
    }

    #[test]
    fn test_missing_surname() {
        let mut user = valid_user();
        user.set_surname(None);
        assert_eq!(validate(&user, today()), Err(ValidationError::SurnameMissing));
    }

    #[test]
    fn test_missing_date() {
        let mut user = valid_user();
        user.set_date(None);
        assert_eq!(validate(&user, today()), Err(ValidationError::DateMissing));
    }

    #[test]
    fn test_future_date() {
        let user = valid_user().with_date(date(2024, 6, 20));
        assert_eq!(validate(&user, today()), Err(ValidationError::DateNotInPast));
    }

    #[test]
    fn test_today_is_not_past() {
        let user = valid_user().with_date(today());
        assert_eq!(validate(&user, today()), Err(ValidationError::DateNotInPast));
    }

    #[test]
    fn test_yesterday_is_past() {
        let user = valid_user().with_date(date(2024, 6, 14));
        assert_eq!(validate(&user, today()), Ok(()));
    }

    #[test]
    fn test_first_failure_wins() {
        // Everything is wrong: email is reported first
        let all_missing = User::new();
        assert_eq!(
            validate(&all_missing, today()),
            Err(ValidationError::EmailMissing)
        );

        // Bad email beats missing name and future date
        let bad_email = User::new()
            .with_email("not-an-email")
            .with_date(date(2030, 1, 1));
        assert_eq!(
            validate(&bad_email, today()),
            Err(ValidationError::EmailInvalid)
        );

        // Missing surname beats missing date
        let no_surname = User::new()
            .with_email("test.mail@gmail.com")
            .with_name("Viktor");
        assert_eq!(
            validate(&no_surname, today()),
            Err(ValidationError::SurnameMissing)
        );
    }

    #[test]
    fn test_email_pattern() {
        assert!(is_valid_email("test.mail@gmail.com"));
        assert!(is_valid_email("first-last_1@ukr.net"));
        assert!(is_valid_email("a@mail.ua"));

        assert!(!is_valid_email("e@com"));
        assert!(!is_valid_email("user@g.com"));
        assert!(!is_valid_email("user@gmail.c"));
        assert!(!is_valid_email("user@gmail.COM"));
        assert!(!is_valid_email("user name@gmail.com"));
        assert!(!is_valid_email("@gmail.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn test_email_local_part_dots() {
        assert!(!is_valid_email(".user@gmail.com"));
        assert!(!is_valid_email("user.@gmail.com"));
        assert!(!is_valid_email("a..b@gmail.com"));
        assert!(is_valid_email("a.b.c@gmail.com"));
    }

    #[test]
    fn test_email_local_part_length() {
        let at_limit = format!("{}@gmail.com", "a".repeat(64));
        let over_limit = format!("{}@gmail.com", "a".repeat(65));

        assert!(is_valid_email(&at_limit));
        assert!(!is_valid_email(&over_limit));
    }

    #[test]
    fn test_age_in_years() {
        assert_eq!(age_in_years(date(2000, 6, 15), today()), 24);
        assert_eq!(age_in_years(date(2000, 6, 16), today()), 23);
        assert_eq!(age_in_years(date(2000, 1, 1), today()), 24);
        assert_eq!(age_in_years(date(2000, 12, 31), today()), 23);
    }

    #[test]
    fn test_age_leap_day_birth() {
        let birth = date(2000, 2, 29);
        assert_eq!(age_in_years(birth, date(2018, 2, 28)), 17);
        assert_eq!(age_in_years(birth, date(2018, 3, 1)), 18);
        assert_eq!(age_in_years(birth, date(2020, 2, 29)), 20);
    }

    #[test]
    fn test_check_minimum_age() {
        assert_eq!(check_minimum_age(date(2006, 6, 15), today(), 18), Ok(()));
        assert_eq!(
            check_minimum_age(date(2006, 6, 16), today(), 18),
            Err(ValidationError::Underage { min_age: 18 })
        );
        assert_eq!(check_minimum_age(date(2024, 6, 14), today(), 0), Ok(()));
    }

    #[test]
    fn test_check_date_range() {
        assert_eq!(check_date_range(date(2000, 1, 1), date(2001, 1, 1)), Ok(()));
        assert_eq!(check_date_range(date(2000, 1, 1), date(2000, 1, 1)), Ok(()));
        assert_eq!(
            check_date_range(date(2001, 1, 1), date(2000, 1, 1)),
            Err(ValidationError::InvalidDateRange)
        );
    }

    #[test]
    fn test_messages() {
        assert_eq!(ValidationError::EmailMissing.to_string(), "Email should be not null");
        assert_eq!(ValidationError::EmailInvalid.to_string(), "Email should be valid");
        assert_eq!(ValidationError::NameMissing.to_string(), "Name should be not null");
        assert_eq!(ValidationError::SurnameMissing.to_string(), "Surname should be not null");
        assert_eq!(ValidationError::DateMissing.to_string(), "Date should be not null");
        assert_eq!(ValidationError::DateNotInPast.to_string(), "Date should be at past time");
        assert_eq!(
            ValidationError::Underage { min_age: 21 }.to_string(),
            "Age should be 21+"
        );
        assert_eq!(
            ValidationError::NotFound(UserId::new(1)).to_string(),
            "User with id: 1 not found"
        );
        assert_eq!(
            ValidationError::InvalidDateRange.to_string(),
            "Date 1 should be before Date 2"
        );
    }
}
