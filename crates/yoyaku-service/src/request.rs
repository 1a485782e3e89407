//! Raw booking input as collaborators (CLI prompts, forms) collect it.

use chrono::{NaiveDateTime, TimeDelta};
use yoyaku_core::error::{CoreError, CoreResult};
use yoyaku_core::types::{Booking, Frequency, RecurrenceRule};
use yoyaku_core::util::datetime::{parse_datetime, parse_until};

/// How the end of a booking was given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndSpec {
    /// Minutes after the start.
    DurationMinutes(u32),
    /// `HH:MM` on the same date as the start.
    EndTime(String),
}

/// Recurrence selection: a frequency name and a `YYYY-MM-DD` end date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurrenceRequest {
    pub frequency: String,
    pub until_date: String,
}

/// ## Summary
/// Unvalidated booking fields.
///
/// Resolving checks the name, parses date and times, applies the default
/// duration when no end was given and turns the recurrence end date into
/// 23:59 of that day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingRequest {
    pub name: String,
    pub date: String,
    pub start_time: String,
    pub end: Option<EndSpec>,
    pub recurrence: Option<RecurrenceRequest>,
}

impl BookingRequest {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        date: impl Into<String>,
        start_time: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            date: date.into(),
            start_time: start_time.into(),
            end: None,
            recurrence: None,
        }
    }

    #[must_use]
    pub fn with_duration(mut self, minutes: u32) -> Self {
        self.end = Some(EndSpec::DurationMinutes(minutes));
        self
    }

    #[must_use]
    pub fn with_end_time(mut self, end_time: impl Into<String>) -> Self {
        self.end = Some(EndSpec::EndTime(end_time.into()));
        self
    }

    #[must_use]
    pub fn with_recurrence(
        mut self,
        frequency: impl Into<String>,
        until_date: impl Into<String>,
    ) -> Self {
        self.recurrence = Some(RecurrenceRequest {
            frequency: frequency.into(),
            until_date: until_date.into(),
        });
        self
    }

    /// ## Summary
    /// Turns the raw fields into a candidate [`Booking`].
    ///
    /// ## Errors
    /// - `MissingRequiredField` if the name is blank
    /// - `InvalidDateTime` if a date or time is malformed
    /// - `InvalidInput` if the booking would not end after it starts, or the
    ///   frequency is unknown
    pub fn resolve(&self, default_duration_minutes: u32) -> CoreResult<Booking> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(CoreError::MissingRequiredField("name"));
        }

        let start = parse_datetime(&self.date, &self.start_time)?;
        let end = match &self.end {
            None => after_minutes(start, default_duration_minutes)?,
            Some(EndSpec::DurationMinutes(minutes)) => after_minutes(start, *minutes)?,
            Some(EndSpec::EndTime(end_time)) => parse_datetime(&self.date, end_time)?,
        };
        if end <= start {
            return Err(CoreError::InvalidInput(format!(
                "booking must end after it starts ({start} .. {end})"
            )));
        }

        let mut booking = Booking::new(name, start, end);
        if let Some(recurrence) = &self.recurrence {
            let frequency: Frequency = recurrence.frequency.parse()?;
            let until = parse_until(&recurrence.until_date)?;
            booking = booking.with_recurrence(RecurrenceRule::new(frequency, until));
        }

        Ok(booking)
    }
}

fn after_minutes(start: NaiveDateTime, minutes: u32) -> CoreResult<NaiveDateTime> {
    start
        .checked_add_signed(TimeDelta::minutes(i64::from(minutes)))
        .ok_or_else(|| {
            CoreError::InvalidInput(format!("duration of {minutes} minutes is out of range"))
        })
}
