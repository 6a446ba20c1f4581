//! Argument parsing helpers for user-supplied values.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

static DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[1-2][0-9]{3}-(0[1-9]|1[0-2])-([0-2][0-9]|3[0-1])$").expect("valid date regex")
});

/// Parses a `yyyy-mm-dd` date, rejecting other shapes and impossible days.
pub fn parse_date(value: &str) -> Result<NaiveDate, String> {
    let trimmed = value.trim();
    if !DATE_RE.is_match(trimmed) {
        return Err(format!("`{trimmed}` is not a yyyy-mm-dd date"));
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map_err(|err| format!("`{trimmed}` is not a valid date: {err}"))
}
