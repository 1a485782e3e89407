//! Recurrence expansion.
//!
//! Turns a booking into the concrete occurrences that fall inside a window.
//! Every occurrence keeps the booking's duration; only the start moves.

use chrono::{DateTime, Datelike, Months, NaiveDateTime, TimeDelta};
use rrule::{RRuleSet, Tz};
use yoyaku_core::config::{ConflictScope, MonthOverflow, SchedulingConfig};
use yoyaku_core::constants::ICAL_DATETIME_FORMAT;
use yoyaku_core::types::{Booking, Frequency, Occurrence, Recurrence};

use crate::error::EngineResult;

/// Dates requested from `rrule` per call; its limit type is `u16`.
const RRULE_BATCH: u16 = u16::MAX;

/// ## Summary
/// Expands bookings and checks candidates for conflicts.
///
/// Holds only policy; bookings are passed in on every call, so one engine can
/// serve any number of stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecurrenceEngine {
    pub(crate) month_overflow: MonthOverflow,
    pub(crate) conflict_scope: ConflictScope,
}

impl Default for RecurrenceEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RecurrenceEngine {
    /// Creates an engine with clamping month steps and full-series conflict checks.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            month_overflow: MonthOverflow::Clamp,
            conflict_scope: ConflictScope::EveryOccurrence,
        }
    }

    /// Creates an engine from the `[scheduling]` configuration section.
    #[must_use]
    pub const fn from_config(config: &SchedulingConfig) -> Self {
        Self::new()
            .with_month_overflow(config.month_overflow)
            .with_conflict_scope(config.conflict_scope)
    }

    /// Sets how monthly/yearly steps handle missing days.
    #[must_use]
    pub const fn with_month_overflow(mut self, month_overflow: MonthOverflow) -> Self {
        self.month_overflow = month_overflow;
        self
    }

    /// Sets which candidate occurrences are conflict-checked.
    #[must_use]
    pub const fn with_conflict_scope(mut self, conflict_scope: ConflictScope) -> Self {
        self.conflict_scope = conflict_scope;
        self
    }

    #[must_use]
    pub const fn month_overflow(&self) -> MonthOverflow {
        self.month_overflow
    }

    #[must_use]
    pub const fn conflict_scope(&self) -> ConflictScope {
        self.conflict_scope
    }

    /// ## Summary
    /// Expands `booking` into its occurrences.
    ///
    /// A non-recurring booking yields its own interval unconditionally, whatever
    /// the window. A recurring booking yields every start in
    /// `[booking.start, min(until, window_end)]` that is `>= window_start`,
    /// each paired with `start + duration`.
    ///
    /// ## Errors
    /// Returns an error if the `skip` month policy is active and the rule
    /// cannot be built by the `rrule` crate.
    pub fn expand(
        &self,
        booking: &Booking,
        window_start: NaiveDateTime,
        window_end: NaiveDateTime,
    ) -> EngineResult<Vec<Occurrence>> {
        self.expand_interval(
            booking.start,
            booking.end,
            &booking.recurrence,
            window_start,
            window_end,
        )
    }

    pub(crate) fn expand_interval(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
        recurrence: &Recurrence,
        window_start: NaiveDateTime,
        window_end: NaiveDateTime,
    ) -> EngineResult<Vec<Occurrence>> {
        let Some(rule) = recurrence.rule() else {
            return Ok(vec![Occurrence::new(start, end)]);
        };

        let duration = end - start;
        let cutoff = rule.until.min(window_end);
        if cutoff < start || cutoff < window_start {
            tracing::trace!(%start, %cutoff, %window_start, "Nothing to expand before cutoff");
            return Ok(Vec::new());
        }

        let starts = match (rule.frequency, self.month_overflow) {
            (Frequency::Weekly, _) | (_, MonthOverflow::Clamp) => {
                stepped_starts(start, rule.frequency, window_start, cutoff)
            }
            (_, MonthOverflow::Skip) => rrule_starts(start, rule.frequency, window_start, cutoff)?,
        };

        let occurrences: Vec<Occurrence> = starts
            .into_iter()
            .filter(|dt| *dt >= window_start)
            .filter_map(|dt| Some(Occurrence::new(dt, dt.checked_add_signed(duration)?)))
            .collect();

        tracing::trace!(
            frequency = %rule.frequency,
            %cutoff,
            count = occurrences.len(),
            "Expanded recurring interval"
        );
        Ok(occurrences)
    }
}

/// Starts produced by stepping `n` calendar units from the anchor, clamping
/// to the end of short months. Always anchored on `anchor` so a clamped
/// February does not drag later months back to the 29th. Stepping begins at
/// the first index not before `from`.
fn stepped_starts(
    anchor: NaiveDateTime,
    frequency: Frequency,
    from: NaiveDateTime,
    cutoff: NaiveDateTime,
) -> Vec<NaiveDateTime> {
    let Some(first) = first_index_at_or_after(anchor, frequency, from) else {
        return Vec::new();
    };

    (first..)
        .map_while(|n| step_from(anchor, frequency, n))
        .take_while(|dt| *dt <= cutoff)
        .collect()
}

/// Smallest `n` whose start is `>= from`, or `None` if the series runs out
/// of representable dates first.
fn first_index_at_or_after(
    anchor: NaiveDateTime,
    frequency: Frequency,
    from: NaiveDateTime,
) -> Option<u32> {
    if from <= anchor {
        return Some(0);
    }

    // Lower bound: a clamped month end only ever moves a start earlier.
    let estimate = match frequency {
        Frequency::Weekly => (from - anchor).num_weeks(),
        Frequency::Monthly => months_between(anchor, from) - 1,
        Frequency::Yearly => i64::from(from.year() - anchor.year()) - 1,
    };

    let mut n = u32::try_from(estimate.max(0)).ok()?;
    while step_from(anchor, frequency, n)? < from {
        n = n.checked_add(1)?;
    }
    Some(n)
}

fn months_between(from: NaiveDateTime, to: NaiveDateTime) -> i64 {
    i64::from(to.year() - from.year()) * 12 + i64::from(to.month()) - i64::from(from.month())
}

/// Starts produced by RFC 5545 expansion, which drops dates that do not
/// exist in the target month (Jan 31 monthly skips February).
///
/// `rrule` caps each call, so dates are fetched in batches, each resuming
/// after the last date returned.
fn rrule_starts(
    anchor: NaiveDateTime,
    frequency: Frequency,
    from: NaiveDateTime,
    cutoff: NaiveDateTime,
) -> EngineResult<Vec<NaiveDateTime>> {
    let rule_text = format!(
        "DTSTART:{}Z\nRRULE:FREQ={};UNTIL={}Z",
        anchor.format(ICAL_DATETIME_FORMAT),
        frequency.as_rrule_freq(),
        cutoff.format(ICAL_DATETIME_FORMAT),
    );
    tracing::trace!(rrule = %rule_text, %from, "Expanding with rrule");

    let one_second = TimeDelta::seconds(1);
    let mut after = from
        .max(anchor)
        .checked_sub_signed(one_second)
        .unwrap_or(NaiveDateTime::MIN);
    let mut starts = Vec::new();

    loop {
        let rrule_set: RRuleSet = rule_text.parse()?;
        let batch = rrule_set
            .after(after.and_utc().with_timezone(&Tz::UTC))
            .all(RRULE_BATCH);

        let dates: Vec<NaiveDateTime> = batch
            .dates
            .iter()
            .map(DateTime::naive_utc)
            .filter(|dt| *dt > after)
            .collect();
        let Some(&last) = dates.last() else {
            break;
        };
        starts.extend(dates);

        if !batch.limited {
            break;
        }
        tracing::trace!(%last, fetched = starts.len(), "rrule batch full, continuing");
        after = last;
    }

    Ok(starts)
}

/// The `n`th start of a series anchored at `anchor`, or `None` on overflow.
fn step_from(anchor: NaiveDateTime, frequency: Frequency, n: u32) -> Option<NaiveDateTime> {
    match frequency {
        Frequency::Weekly => anchor.checked_add_signed(TimeDelta::try_weeks(i64::from(n))?),
        Frequency::Monthly => anchor.checked_add_months(Months::new(n)),
        Frequency::Yearly => anchor.checked_add_months(Months::new(n.checked_mul(12)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use yoyaku_core::types::RecurrenceRule;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|date| date.and_hms_opt(h, min, 0))
            .expect("valid test datetime")
    }

    fn starts(occurrences: &[Occurrence]) -> Vec<NaiveDate> {
        occurrences.iter().map(|occ| occ.start.date()).collect()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
    }

    #[test]
    fn test_step_from_weekly() {
        let anchor = at(2024, 1, 1, 9, 0);
        assert_eq!(step_from(anchor, Frequency::Weekly, 0), Some(anchor));
        assert_eq!(
            step_from(anchor, Frequency::Weekly, 3),
            Some(at(2024, 1, 22, 9, 0))
        );
    }

    #[test]
    fn test_step_from_monthly_clamps_from_anchor() {
        let anchor = at(2024, 1, 31, 9, 0);
        assert_eq!(
            step_from(anchor, Frequency::Monthly, 1),
            Some(at(2024, 2, 29, 9, 0))
        );
        assert_eq!(
            step_from(anchor, Frequency::Monthly, 2),
            Some(at(2024, 3, 31, 9, 0))
        );
        assert_eq!(
            step_from(anchor, Frequency::Monthly, 3),
            Some(at(2024, 4, 30, 9, 0))
        );
    }

    #[test]
    fn test_step_from_yearly_leap_day() {
        let anchor = at(2024, 2, 29, 9, 0);
        assert_eq!(
            step_from(anchor, Frequency::Yearly, 1),
            Some(at(2025, 2, 28, 9, 0))
        );
        assert_eq!(
            step_from(anchor, Frequency::Yearly, 4),
            Some(at(2028, 2, 29, 9, 0))
        );
    }

    #[test]
    fn test_rrule_skip_policy_drops_short_months() {
        let engine = RecurrenceEngine::new().with_month_overflow(MonthOverflow::Skip);
        let booking = Booking::new("Rent", at(2024, 1, 31, 12, 0), at(2024, 1, 31, 12, 30))
            .with_recurrence(RecurrenceRule::new(
                Frequency::Monthly,
                at(2024, 6, 30, 23, 59),
            ));

        let occurrences = engine
            .expand(&booking, booking.start, at(2025, 1, 1, 0, 0))
            .expect("expand");

        assert_eq!(
            starts(&occurrences),
            vec![date(2024, 1, 31), date(2024, 3, 31), date(2024, 5, 31)]
        );
    }

    #[test]
    fn test_first_index_lands_on_or_after_window_start() {
        let anchor = at(2024, 1, 31, 9, 0);

        assert_eq!(
            first_index_at_or_after(anchor, Frequency::Weekly, at(2024, 2, 14, 9, 0)),
            Some(2)
        );
        assert_eq!(
            first_index_at_or_after(anchor, Frequency::Weekly, at(2024, 2, 14, 9, 1)),
            Some(3)
        );
        // Feb 29 is the clamped step 1; anything after it moves on to Mar 31.
        assert_eq!(
            first_index_at_or_after(anchor, Frequency::Monthly, at(2024, 2, 29, 10, 0)),
            Some(2)
        );
        assert_eq!(
            first_index_at_or_after(anchor, Frequency::Yearly, at(2030, 1, 1, 0, 0)),
            Some(6)
        );
        assert_eq!(
            first_index_at_or_after(anchor, Frequency::Monthly, at(2000, 1, 1, 0, 0)),
            Some(0)
        );
    }

    #[test]
    fn test_far_window_of_long_weekly_series() {
        let booking = Booking::new("Standup", at(2024, 1, 1, 9, 0), at(2024, 1, 1, 9, 15))
            .with_recurrence(RecurrenceRule::new(
                Frequency::Weekly,
                at(9999, 12, 31, 23, 59),
            ));

        let occurrences = RecurrenceEngine::new()
            .expand(&booking, at(3500, 1, 1, 0, 0), at(3500, 2, 1, 0, 0))
            .expect("expand");

        // 3500-01-01 falls on a Monday, like the anchor.
        assert_eq!(
            starts(&occurrences),
            vec![
                date(3500, 1, 1),
                date(3500, 1, 8),
                date(3500, 1, 15),
                date(3500, 1, 22),
                date(3500, 1, 29)
            ]
        );
        assert!(occurrences.iter().all(|occ| occ.duration() == booking.duration()));
    }

    #[test]
    fn test_far_window_of_long_monthly_skip_series() {
        let engine = RecurrenceEngine::new().with_month_overflow(MonthOverflow::Skip);
        let booking = Booking::new("Rent", at(2024, 1, 31, 12, 0), at(2024, 1, 31, 12, 30))
            .with_recurrence(RecurrenceRule::new(
                Frequency::Monthly,
                at(9999, 12, 31, 23, 59),
            ));

        let occurrences = engine
            .expand(&booking, at(3500, 1, 1, 0, 0), at(3500, 6, 1, 0, 0))
            .expect("expand");

        assert_eq!(
            starts(&occurrences),
            vec![date(3500, 1, 31), date(3500, 3, 31), date(3500, 5, 31)]
        );
    }
}
