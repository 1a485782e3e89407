//! Conflict detection between a candidate booking and the stored ones.

use chrono::{NaiveDateTime, TimeDelta};
use yoyaku_core::config::ConflictScope;
use yoyaku_core::types::{Booking, Occurrence, Recurrence};

use crate::error::EngineResult;
use crate::expand::RecurrenceEngine;

impl RecurrenceEngine {
    /// ## Summary
    /// Returns the first existing booking (in slice order) with an occurrence
    /// overlapping the candidate, or `None`.
    ///
    /// Overlap is half-open: an existing booking ending exactly when the
    /// candidate starts is not a conflict. Which candidate occurrences are
    /// compared depends on the configured [`ConflictScope`].
    ///
    /// ## Errors
    /// Returns an error if expanding a booking fails.
    pub fn has_conflict<'a>(
        &self,
        existing: &'a [Booking],
        new_start: NaiveDateTime,
        new_end: NaiveDateTime,
        new_recurrence: &Recurrence,
    ) -> EngineResult<Option<&'a Booking>> {
        match self.conflict_scope {
            ConflictScope::FirstOccurrence => {
                self.first_occurrence_conflict(existing, new_start, new_end, new_recurrence)
            }
            ConflictScope::EveryOccurrence => {
                self.every_occurrence_conflict(existing, new_start, new_end, new_recurrence)
            }
        }
    }

    /// ## Summary
    /// Finds two consecutive occurrences of the candidate series that overlap
    /// each other, e.g. a weekly booking lasting more than seven days.
    ///
    /// ## Errors
    /// Returns an error if expanding the candidate fails.
    pub fn self_overlap(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
        recurrence: &Recurrence,
    ) -> EngineResult<Option<(Occurrence, Occurrence)>> {
        let Some(rule) = recurrence.rule() else {
            return Ok(None);
        };

        let occurrences = self.expand_interval(start, end, recurrence, start, rule.until)?;
        Ok(occurrences
            .windows(2)
            .find(|pair| pair[0].overlaps_occurrence(&pair[1]))
            .map(|pair| (pair[0], pair[1])))
    }

    /// Only the candidate's own interval is compared, against existing
    /// occurrences starting in `[new_start, horizon]` where the horizon is the
    /// candidate's `until` (or its end when it does not repeat).
    fn first_occurrence_conflict<'a>(
        &self,
        existing: &'a [Booking],
        new_start: NaiveDateTime,
        new_end: NaiveDateTime,
        new_recurrence: &Recurrence,
    ) -> EngineResult<Option<&'a Booking>> {
        let horizon = new_recurrence.rule().map_or(new_end, |rule| rule.until);

        for booking in existing {
            for occurrence in self.expand(booking, new_start, horizon)? {
                if occurrence.overlaps(new_start, new_end) {
                    tracing::debug!(
                        conflict = %booking.name,
                        occurrence_start = %occurrence.start,
                        "Candidate overlaps existing booking"
                    );
                    return Ok(Some(booking));
                }
            }
        }

        Ok(None)
    }

    /// Every occurrence of the candidate up to its `until` is compared with
    /// every existing occurrence that could reach it.
    fn every_occurrence_conflict<'a>(
        &self,
        existing: &'a [Booking],
        new_start: NaiveDateTime,
        new_end: NaiveDateTime,
        new_recurrence: &Recurrence,
    ) -> EngineResult<Option<&'a Booking>> {
        let candidate = match new_recurrence.rule() {
            Some(rule) => {
                self.expand_interval(new_start, new_end, new_recurrence, new_start, rule.until)?
            }
            None => vec![Occurrence::new(new_start, new_end)],
        };

        let (Some(first), Some(horizon)) = (
            candidate.first(),
            candidate.iter().map(|occurrence| occurrence.end).max(),
        ) else {
            tracing::trace!(%new_start, "Candidate series is empty, nothing to check");
            return Ok(None);
        };

        for booking in existing {
            // Occurrences starting earlier than this cannot reach the first candidate.
            let reach = booking.duration().max(TimeDelta::zero());
            let window_start = first
                .start
                .checked_sub_signed(reach)
                .unwrap_or(NaiveDateTime::MIN);

            for occurrence in self.expand(booking, window_start, horizon)? {
                if let Some(hit) = first_overlap(&candidate, &occurrence) {
                    tracing::debug!(
                        conflict = %booking.name,
                        occurrence_start = %occurrence.start,
                        candidate_start = %hit.start,
                        "Candidate overlaps existing booking"
                    );
                    return Ok(Some(booking));
                }
            }
        }

        Ok(None)
    }
}

/// The earliest occurrence in `series` overlapping `other`.
///
/// All occurrences of one series share a duration, so `series` is ordered by
/// end as well as by start and the search is a bisection.
fn first_overlap<'s>(series: &'s [Occurrence], other: &Occurrence) -> Option<&'s Occurrence> {
    let next = series.partition_point(|occurrence| occurrence.end <= other.start);
    series
        .get(next)
        .filter(|occurrence| occurrence.overlaps_occurrence(other))
}
