//! Calendar-day keys and date arithmetic.
//!
//! Every date the ledger touches is a local calendar day with no time component.
//! Keys are the canonical ISO form `YYYY-MM-DD`; anything else is a [`FormatError`].

use chrono::{Datelike, Duration, NaiveDate, Weekday};

use crate::errors::FormatError;

const KEY_FORMAT: &str = "%Y-%m-%d";

/// Canonical ISO day string for `date`.
pub fn to_calendar_key(date: NaiveDate) -> String {
    date.format(KEY_FORMAT).to_string()
}

/// Parses a canonical key. Only input that formats back to itself is accepted,
/// so `2024-1-5` or `2024-01-05T00:00` are rejected.
pub fn parse_calendar_key(key: &str) -> Result<NaiveDate, FormatError> {
    let trimmed = key.trim();
    let date =
        NaiveDate::parse_from_str(trimmed, KEY_FORMAT).map_err(|_| FormatError::new(key))?;
    if to_calendar_key(date) != trimmed {
        return Err(FormatError::new(key));
    }
    Ok(date)
}

pub fn day_of_week(date: NaiveDate) -> Weekday {
    date.weekday()
}

/// Adds `days` (negative moves backwards). Saturates at the ends of the
/// representable range instead of panicking.
pub fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    date.checked_add_signed(Duration::days(days))
        .unwrap_or(if days < 0 {
            NaiveDate::MIN
        } else {
            NaiveDate::MAX
        })
}

/// `length` consecutive days starting at `start`.
pub fn date_range(start: NaiveDate, length: usize) -> Vec<NaiveDate> {
    start.iter_days().take(length).collect()
}

/// The Monday on or before `date`. Sundays belong to the week that started six days earlier.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = date.weekday().num_days_from_monday() as i64;
    add_days(date, -offset)
}

pub fn day_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

pub fn short_day_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Mon",
        Weekday::Tue => "Tue",
        Weekday::Wed => "Wed",
        Weekday::Thu => "Thu",
        Weekday::Fri => "Fri",
        Weekday::Sat => "Sat",
        Weekday::Sun => "Sun",
    }
}
