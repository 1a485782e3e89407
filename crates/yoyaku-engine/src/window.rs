//! Half-open time windows used by the read-side views.

use chrono::{Months, NaiveDate, NaiveDateTime, TimeDelta};
use yoyaku_core::error::{CoreError, CoreResult};

/// `[start, end)` range of wall-clock instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    /// Start of range (inclusive).
    pub start: NaiveDateTime,
    /// End of range (exclusive).
    pub end: NaiveDateTime,
}

impl TimeWindow {
    #[must_use]
    pub const fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    /// Midnight of `date` up to midnight of the following day.
    #[must_use]
    pub fn day(date: NaiveDate) -> Self {
        let start = date.and_time(chrono::NaiveTime::MIN);
        let end = start
            .checked_add_signed(TimeDelta::days(1))
            .unwrap_or(NaiveDateTime::MAX);
        Self { start, end }
    }

    /// The first instant of the month up to the first instant of the next one.
    ///
    /// ## Errors
    /// Returns `InvalidInput` if `year`/`month` do not name a calendar month.
    pub fn month(year: i32, month: u32) -> CoreResult<Self> {
        let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
            CoreError::InvalidInput(format!("no such month: {year}-{month:02}"))
        })?;
        let next = first.checked_add_months(Months::new(1)).ok_or_else(|| {
            CoreError::InvalidInput(format!("month out of range: {year}-{month:02}"))
        })?;
        Ok(Self {
            start: first.and_time(chrono::NaiveTime::MIN),
            end: next.and_time(chrono::NaiveTime::MIN),
        })
    }

    #[must_use]
    pub fn contains(&self, instant: NaiveDateTime) -> bool {
        self.start <= instant && instant < self.end
    }
}
