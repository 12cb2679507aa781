use chrono::{Datelike, NaiveDate};
use thiserror::Error;

/// Birthdate column format
pub const BIRTHDATE_FORMAT: &str = "%Y-%m-%d";

/// Age shown when the birthdate column is empty
pub const UNKNOWN_AGE: &str = "-";

/// Approximate age in whole years
///
/// Both dates are read as YYYYMMDD integers and the difference is divided by
/// 10000. This is not calendar arithmetic: 0229 birthdays and month-end dates
/// follow the digit difference, not the calendar.
#[inline]
pub fn approximate_age(birthdate: NaiveDate, today: NaiveDate) -> i64 {
    (date_digits(today) - date_digits(birthdate)) / 10_000
}

#[inline]
fn date_digits(date: NaiveDate) -> i64 {
    i64::from(date.year()) * 10_000 + i64::from(date.month()) * 100 + i64::from(date.day())
}

/// Errors raised for a birthdate that is not a strict `YYYY-MM-DD` date
#[derive(Debug, Error)]
pub enum BirthdateError {
    #[error("expected YYYY-MM-DD")]
    Shape,

    #[error("not a calendar date: {0}")]
    Date(#[from] chrono::ParseError),
}

/// True for exactly four digits, `-`, two digits, `-`, two digits
fn has_iso_shape(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

/// Display age for a raw birthdate column value
///
/// Empty input yields [`UNKNOWN_AGE`]. Anything else must be a zero-padded
/// `YYYY-MM-DD` calendar date; no signs, spaces or short fields.
pub fn derive_age(raw: &str, today: NaiveDate) -> Result<String, BirthdateError> {
    if raw.is_empty() {
        return Ok(UNKNOWN_AGE.to_string());
    }
    if !has_iso_shape(raw) {
        return Err(BirthdateError::Shape);
    }

    let birthdate = NaiveDate::parse_from_str(raw, BIRTHDATE_FORMAT)?;
    Ok(approximate_age(birthdate, today).to_string())
}
