//! Day-grouped occurrences for calendar, day and list views.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use yoyaku_core::types::{Booking, Occurrence};

use crate::error::EngineResult;
use crate::expand::RecurrenceEngine;
use crate::window::TimeWindow;

/// One occurrence together with the booking it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgendaEntry<'a> {
    pub booking: &'a Booking,
    pub occurrence: Occurrence,
}

/// Occurrences grouped by the calendar date of their start.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Agenda<'a> {
    days: BTreeMap<NaiveDate, Vec<AgendaEntry<'a>>>,
}

impl<'a> Agenda<'a> {
    /// Entries starting on `date`, earliest first.
    #[must_use]
    pub fn on(&self, date: NaiveDate) -> &[AgendaEntry<'a>] {
        self.days.get(&date).map(Vec::as_slice).unwrap_or_default()
    }

    /// Days with at least one entry, in calendar order.
    pub fn booked_days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.days.keys().copied()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Total number of occurrences across all days.
    #[must_use]
    pub fn len(&self) -> usize {
        self.days.values().map(Vec::len).sum()
    }

    fn insert(&mut self, entry: AgendaEntry<'a>) {
        self.days
            .entry(entry.occurrence.start.date())
            .or_default()
            .push(entry);
    }
}

impl RecurrenceEngine {
    /// ## Summary
    /// Expands every booking over `window` and groups the occurrences whose
    /// start lies inside it by calendar date.
    ///
    /// Within a day entries are ordered by start; equal starts keep the order
    /// of `bookings`.
    ///
    /// ## Errors
    /// Returns an error if expanding a booking fails.
    pub fn expand_all_for_window<'a>(
        &self,
        bookings: &'a [Booking],
        window: TimeWindow,
    ) -> EngineResult<Agenda<'a>> {
        let mut agenda = Agenda::default();

        for booking in bookings {
            for occurrence in self.expand(booking, window.start, window.end)? {
                // Single bookings come back regardless of the window.
                if window.contains(occurrence.start) {
                    agenda.insert(AgendaEntry {
                        booking,
                        occurrence,
                    });
                }
            }
        }

        for entries in agenda.days.values_mut() {
            entries.sort_by_key(|entry| entry.occurrence.start);
        }

        tracing::trace!(
            window_start = %window.start,
            window_end = %window.end,
            days = agenda.days.len(),
            occurrences = agenda.len(),
            "Built agenda"
        );
        Ok(agenda)
    }
}
