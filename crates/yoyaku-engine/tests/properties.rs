//! Behavioural properties of expansion and conflict checking.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use yoyaku_core::config::{ConflictScope, MonthOverflow};
use yoyaku_core::types::{Booking, Frequency, Occurrence, Recurrence, RecurrenceRule};
use yoyaku_engine::{RecurrenceEngine, TimeWindow};

fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .and_then(|date| date.and_hms_opt(h, min, 0))
        .expect("valid test datetime")
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
}

fn start_dates(occurrences: &[Occurrence]) -> Vec<NaiveDate> {
    occurrences.iter().map(|occ| occ.start.date()).collect()
}

fn recurring(
    name: &str,
    start: NaiveDateTime,
    end: NaiveDateTime,
    frequency: Frequency,
    until: NaiveDateTime,
) -> Booking {
    Booking::new(name, start, end).with_recurrence(RecurrenceRule::new(frequency, until))
}

#[test_log::test]
fn single_booking_expands_to_itself_regardless_of_window() {
    let engine = RecurrenceEngine::new();
    let booking = Booking::new("Dentist", at(2024, 3, 5, 14, 0), at(2024, 3, 5, 15, 0));

    let windows = [
        (at(2024, 3, 1, 0, 0), at(2024, 4, 1, 0, 0)),
        (at(2030, 1, 1, 0, 0), at(2030, 2, 1, 0, 0)),
        (at(2000, 1, 1, 0, 0), at(2000, 1, 2, 0, 0)),
    ];

    for (window_start, window_end) in windows {
        let occurrences = engine
            .expand(&booking, window_start, window_end)
            .expect("expand");
        assert_eq!(occurrences, vec![booking.nominal()]);
    }
}

#[test]
fn weekly_until_stops_before_exceeding_until() {
    let engine = RecurrenceEngine::new();
    let booking = recurring(
        "Standup",
        at(2024, 1, 1, 9, 0),
        at(2024, 1, 1, 10, 0),
        Frequency::Weekly,
        at(2024, 1, 22, 0, 0),
    );

    let occurrences = engine
        .expand(&booking, at(2024, 1, 1, 0, 0), at(2024, 2, 1, 0, 0))
        .expect("expand");

    // until = 01-22 00:00, so the 09:00 occurrence that day is already past it.
    assert_eq!(
        start_dates(&occurrences),
        vec![date(2024, 1, 1), date(2024, 1, 8), date(2024, 1, 15)]
    );

    let through_day = recurring(
        "Standup",
        at(2024, 1, 1, 9, 0),
        at(2024, 1, 1, 10, 0),
        Frequency::Weekly,
        at(2024, 1, 22, 23, 59),
    );
    let occurrences = engine
        .expand(&through_day, at(2024, 1, 1, 0, 0), at(2024, 2, 1, 0, 0))
        .expect("expand");
    assert_eq!(
        start_dates(&occurrences),
        vec![
            date(2024, 1, 1),
            date(2024, 1, 8),
            date(2024, 1, 15),
            date(2024, 1, 22)
        ]
    );
}

#[test]
fn window_end_caps_expansion_before_until() {
    let engine = RecurrenceEngine::new();
    let booking = recurring(
        "Standup",
        at(2024, 1, 1, 9, 0),
        at(2024, 1, 1, 10, 0),
        Frequency::Weekly,
        at(2024, 12, 31, 23, 59),
    );

    let occurrences = engine
        .expand(&booking, at(2024, 1, 1, 0, 0), at(2024, 1, 15, 9, 0))
        .expect("expand");

    // The cutoff is inclusive: an occurrence starting exactly at window_end is kept.
    assert_eq!(
        start_dates(&occurrences),
        vec![date(2024, 1, 1), date(2024, 1, 8), date(2024, 1, 15)]
    );
}

#[test]
fn window_start_drops_earlier_occurrences() {
    let engine = RecurrenceEngine::new();
    let booking = recurring(
        "Standup",
        at(2024, 1, 1, 9, 0),
        at(2024, 1, 1, 10, 0),
        Frequency::Weekly,
        at(2024, 2, 29, 23, 59),
    );

    let occurrences = engine
        .expand(&booking, at(2024, 2, 1, 0, 0), at(2024, 3, 1, 0, 0))
        .expect("expand");

    assert_eq!(
        start_dates(&occurrences),
        vec![
            date(2024, 2, 5),
            date(2024, 2, 12),
            date(2024, 2, 19),
            date(2024, 2, 26)
        ]
    );
}

#[test]
fn every_occurrence_keeps_the_booking_duration() {
    let booking_duration = TimeDelta::minutes(95);
    for frequency in [Frequency::Weekly, Frequency::Monthly, Frequency::Yearly] {
        for overflow in [MonthOverflow::Clamp, MonthOverflow::Skip] {
            let engine = RecurrenceEngine::new().with_month_overflow(overflow);
            let start = at(2024, 1, 31, 22, 30);
            let booking = recurring(
                "Night shift",
                start,
                start + booking_duration,
                frequency,
                at(2030, 12, 31, 23, 59),
            );

            let occurrences = engine
                .expand(&booking, start, at(2031, 1, 1, 0, 0))
                .expect("expand");

            assert!(!occurrences.is_empty());
            assert!(
                occurrences
                    .iter()
                    .all(|occ| occ.duration() == booking_duration),
                "{frequency} / {overflow:?} changed an occurrence duration"
            );
        }
    }
}

#[test]
fn monthly_from_31st_clamps_to_end_of_short_months() {
    let engine = RecurrenceEngine::new().with_month_overflow(MonthOverflow::Clamp);
    let booking = recurring(
        "Invoice run",
        at(2024, 1, 31, 9, 0),
        at(2024, 1, 31, 10, 0),
        Frequency::Monthly,
        at(2024, 5, 31, 23, 59),
    );

    let occurrences = engine
        .expand(&booking, booking.start, at(2025, 1, 1, 0, 0))
        .expect("expand");

    assert_eq!(
        start_dates(&occurrences),
        vec![
            date(2024, 1, 31),
            date(2024, 2, 29),
            date(2024, 3, 31),
            date(2024, 4, 30),
            date(2024, 5, 31)
        ]
    );
}

#[test]
fn monthly_from_31st_skips_short_months_under_rfc_policy() {
    let engine = RecurrenceEngine::new().with_month_overflow(MonthOverflow::Skip);
    let booking = recurring(
        "Invoice run",
        at(2024, 1, 31, 9, 0),
        at(2024, 1, 31, 10, 0),
        Frequency::Monthly,
        at(2024, 5, 31, 23, 59),
    );

    let occurrences = engine
        .expand(&booking, booking.start, at(2025, 1, 1, 0, 0))
        .expect("expand");

    assert_eq!(
        start_dates(&occurrences),
        vec![date(2024, 1, 31), date(2024, 3, 31), date(2024, 5, 31)]
    );
}

#[test]
fn until_before_start_yields_nothing() {
    for overflow in [MonthOverflow::Clamp, MonthOverflow::Skip] {
        let engine = RecurrenceEngine::new().with_month_overflow(overflow);
        let booking = recurring(
            "Backwards",
            at(2024, 6, 1, 9, 0),
            at(2024, 6, 1, 10, 0),
            Frequency::Monthly,
            at(2024, 5, 1, 23, 59),
        );

        let occurrences = engine
            .expand(&booking, at(2024, 1, 1, 0, 0), at(2025, 1, 1, 0, 0))
            .expect("expand");

        assert!(occurrences.is_empty());
    }
}

#[test]
fn overlapping_single_bookings_conflict() {
    let engine = RecurrenceEngine::new();
    let existing = vec![Booking::new(
        "Meeting",
        at(2024, 1, 1, 10, 0),
        at(2024, 1, 1, 11, 0),
    )];

    let hit = engine
        .has_conflict(
            &existing,
            at(2024, 1, 1, 10, 30),
            at(2024, 1, 1, 11, 30),
            &Recurrence::None,
        )
        .expect("check");

    assert_eq!(hit.map(|booking| booking.name.as_str()), Some("Meeting"));
}

#[test]
fn touching_intervals_never_conflict() {
    for scope in [ConflictScope::EveryOccurrence, ConflictScope::FirstOccurrence] {
        let engine = RecurrenceEngine::new().with_conflict_scope(scope);
        let existing = vec![
            Booking::new("Before", at(2024, 1, 1, 9, 0), at(2024, 1, 1, 10, 0)),
            Booking::new("After", at(2024, 1, 1, 11, 0), at(2024, 1, 1, 12, 0)),
        ];

        let hit = engine
            .has_conflict(
                &existing,
                at(2024, 1, 1, 10, 0),
                at(2024, 1, 1, 11, 0),
                &Recurrence::None,
            )
            .expect("check");

        assert!(hit.is_none(), "{scope:?} reported a touching interval");
    }
}

#[test]
fn first_conflict_in_store_order_is_reported() {
    let engine = RecurrenceEngine::new();
    let existing = vec![
        Booking::new("Unrelated", at(2024, 1, 2, 9, 0), at(2024, 1, 2, 10, 0)),
        Booking::new("First", at(2024, 1, 1, 9, 0), at(2024, 1, 1, 12, 0)),
        Booking::new("Second", at(2024, 1, 1, 10, 0), at(2024, 1, 1, 11, 0)),
    ];

    let hit = engine
        .has_conflict(
            &existing,
            at(2024, 1, 1, 10, 0),
            at(2024, 1, 1, 10, 30),
            &Recurrence::None,
        )
        .expect("check");

    assert_eq!(hit.map(|booking| booking.name.as_str()), Some("First"));
}

#[test]
fn recurring_existing_booking_conflicts_on_later_occurrence() {
    for scope in [ConflictScope::EveryOccurrence, ConflictScope::FirstOccurrence] {
        let engine = RecurrenceEngine::new().with_conflict_scope(scope);
        let existing = vec![recurring(
            "Standup",
            at(2024, 1, 1, 9, 0),
            at(2024, 1, 1, 10, 0),
            Frequency::Weekly,
            at(2024, 3, 1, 23, 59),
        )];

        let hit = engine
            .has_conflict(
                &existing,
                at(2024, 1, 15, 9, 30),
                at(2024, 1, 15, 10, 30),
                &Recurrence::None,
            )
            .expect("check");

        assert_eq!(
            hit.map(|booking| booking.name.as_str()),
            Some("Standup"),
            "{scope:?}"
        );
    }
}

#[test]
fn conflict_is_symmetric_between_candidate_and_existing() {
    let engine = RecurrenceEngine::new();
    let weekly = recurring(
        "Weekly sync",
        at(2024, 1, 1, 14, 0),
        at(2024, 1, 1, 15, 0),
        Frequency::Weekly,
        at(2024, 2, 28, 23, 59),
    );
    let single = Booking::new("Interview", at(2024, 1, 22, 14, 30), at(2024, 1, 22, 15, 30));
    let monthly = recurring(
        "Board",
        at(2024, 1, 8, 13, 0),
        at(2024, 1, 8, 14, 30),
        Frequency::Monthly,
        at(2024, 6, 30, 23, 59),
    );
    let elsewhere = Booking::new("Dinner", at(2024, 1, 22, 19, 0), at(2024, 1, 22, 21, 0));

    let pairs = [
        (&weekly, &single, true),
        (&weekly, &monthly, true),
        (&single, &monthly, false),
        (&weekly, &elsewhere, false),
    ];

    for (a, b, expected) in pairs {
        let a_then_b = engine
            .has_conflict(std::slice::from_ref(a), b.start, b.end, &b.recurrence)
            .expect("check")
            .is_some();
        let b_then_a = engine
            .has_conflict(std::slice::from_ref(b), a.start, a.end, &a.recurrence)
            .expect("check")
            .is_some();

        assert_eq!(a_then_b, b_then_a, "{} vs {}", a.name, b.name);
        assert_eq!(a_then_b, expected, "{} vs {}", a.name, b.name);
    }
}

#[test]
fn far_future_month_of_long_series_is_fully_booked() {
    let bookings = vec![recurring(
        "Standup",
        at(2024, 1, 1, 9, 0),
        at(2024, 1, 1, 9, 15),
        Frequency::Weekly,
        at(9999, 12, 31, 23, 59),
    )];
    let window = TimeWindow::month(3500, 1).expect("month");

    let agenda = RecurrenceEngine::new()
        .expand_all_for_window(&bookings, window)
        .expect("agenda");

    assert_eq!(
        agenda.booked_days().collect::<Vec<_>>(),
        vec![
            date(3500, 1, 1),
            date(3500, 1, 8),
            date(3500, 1, 15),
            date(3500, 1, 22),
            date(3500, 1, 29)
        ]
    );
}
