// Age in whole years relative to an explicit reference date.

use chrono::{Datelike, NaiveDate};

/// Whole years between `birth_date` and `now`.
///
/// The calendar-year difference is reduced by one while `now` still falls
/// before the birthday in its own year. A February 29 birthday is counted
/// from March 1 in non-leap years.
pub fn age(birth_date: NaiveDate, now: NaiveDate) -> i32 {
    let mut years = now.year() - birth_date.year();
    if (now.month(), now.day()) < (birth_date.month(), birth_date.day()) {
        years -= 1;
    }
    years
}

/// Parse a bio birth date. Accepts `YYYY-MM-DD`, optionally followed by a
/// time component (`2006-12-21T00:00:00`).
pub fn parse_birth_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let date_part = raw.get(..10)?;
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}
