//! Parsing of the raw date/time fields collaborators hand us.
//!
//! ## Summary
//! All instants are naive wall-clock values. Parsing never prints; failures
//! come back as [`CoreError::InvalidDateTime`] for the caller to surface.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::constants::{
    DATE_INPUT_FORMAT, DATETIME_INPUT_FORMAT, RECURRENCE_UNTIL_HOUR, RECURRENCE_UNTIL_MINUTE,
};
use crate::error::{CoreError, CoreResult};

/// Parses a `YYYY-MM-DD` date.
///
/// ## Errors
/// Returns `InvalidDateTime` if the text is not a valid calendar date.
pub fn parse_date(date: &str) -> CoreResult<NaiveDate> {
    NaiveDate::parse_from_str(date.trim(), DATE_INPUT_FORMAT).map_err(|err| {
        CoreError::InvalidDateTime(format!("'{date}' is not a YYYY-MM-DD date: {err}"))
    })
}

/// Combines a `YYYY-MM-DD` date and an `HH:MM` time into one instant.
///
/// ## Errors
/// Returns `InvalidDateTime` if either part is malformed.
pub fn parse_datetime(date: &str, time: &str) -> CoreResult<NaiveDateTime> {
    let combined = format!("{} {}", date.trim(), time.trim());
    NaiveDateTime::parse_from_str(&combined, DATETIME_INPUT_FORMAT).map_err(|err| {
        CoreError::InvalidDateTime(format!(
            "'{combined}' is not a YYYY-MM-DD HH:MM instant: {err}"
        ))
    })
}

/// The last minute of `date` (23:59), used as a recurrence end.
#[must_use]
pub fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(
        NaiveTime::from_hms_opt(RECURRENCE_UNTIL_HOUR, RECURRENCE_UNTIL_MINUTE, 0)
            .unwrap_or(NaiveTime::MIN),
    )
}

/// Parses a recurrence end date and expands it to [`end_of_day`].
///
/// ## Errors
/// Returns `InvalidDateTime` if the date is malformed.
pub fn parse_until(date: &str) -> CoreResult<NaiveDateTime> {
    parse_date(date).map(end_of_day)
}
