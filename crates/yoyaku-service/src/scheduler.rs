//! ## Summary
//! The booking workflow: conflict-check a candidate, append it, persist.
//!
//! A failed check leaves the store untouched. Read views expand the stored
//! bookings through the engine without side effects.

use chrono::{NaiveDate, NaiveDateTime};
use yoyaku_core::config::{ConflictScope, Settings};
use yoyaku_core::constants::DEFAULT_DURATION_MINUTES;
use yoyaku_core::types::{Booking, Recurrence, RecurrenceRule};
use yoyaku_engine::{Agenda, RecurrenceEngine, TimeWindow};
use yoyaku_store::BookingStore;

use crate::error::{ServiceError, ServiceResult};
use crate::request::BookingRequest;

#[derive(Debug)]
pub struct Scheduler {
    store: BookingStore,
    engine: RecurrenceEngine,
    default_duration_minutes: u32,
}

impl Scheduler {
    #[must_use]
    pub fn new(store: BookingStore, engine: RecurrenceEngine) -> Self {
        Self {
            store,
            engine,
            default_duration_minutes: DEFAULT_DURATION_MINUTES,
        }
    }

    /// Sets the duration used when a request gives no end.
    #[must_use]
    pub fn with_default_duration(mut self, minutes: u32) -> Self {
        self.default_duration_minutes = minutes;
        self
    }

    /// ## Summary
    /// Opens the configured store and builds the engine from `[scheduling]`.
    ///
    /// ## Errors
    /// Returns an error if the booking file exists but cannot be loaded.
    pub fn open(settings: &Settings) -> ServiceResult<Self> {
        let store = BookingStore::open(&settings.storage.path)?;
        let engine = RecurrenceEngine::from_config(&settings.scheduling);
        tracing::debug!(
            path = %store.path().display(),
            bookings = store.len(),
            month_overflow = ?engine.month_overflow(),
            conflict_scope = ?engine.conflict_scope(),
            "Scheduler opened"
        );
        Ok(Self::new(store, engine)
            .with_default_duration(settings.scheduling.default_duration_minutes))
    }

    /// Stored bookings in insertion order.
    #[must_use]
    pub fn bookings(&self) -> &[Booking] {
        self.store.bookings()
    }

    #[must_use]
    pub fn engine(&self) -> &RecurrenceEngine {
        &self.engine
    }

    /// ## Summary
    /// Checks a candidate interval against the stored bookings.
    ///
    /// ## Errors
    /// - `SchedulingConflict` carrying the first stored booking it overlaps
    /// - `SelfOverlappingSeries` if, when whole series are checked, the
    ///   candidate's own occurrences overlap each other
    /// - `EngineError` if expansion fails
    pub fn check_conflict(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
        recurrence: &Recurrence,
    ) -> ServiceResult<()> {
        if self.engine.conflict_scope() == ConflictScope::EveryOccurrence {
            if let Some((first, second)) = self.engine.self_overlap(start, end, recurrence)? {
                return Err(ServiceError::SelfOverlappingSeries { first, second });
            }
        }

        match self
            .engine
            .has_conflict(self.store.bookings(), start, end, recurrence)?
        {
            Some(existing) => Err(ServiceError::SchedulingConflict(Box::new(existing.clone()))),
            None => Ok(()),
        }
    }

    /// ## Summary
    /// Adds a booking if it does not conflict, then persists the store.
    ///
    /// ## Errors
    /// Returns the conflict (see [`Self::check_conflict`]) without touching
    /// the store, or a storage error if persisting fails, in which case the
    /// booking is not kept in memory either.
    pub fn add_booking(
        &mut self,
        name: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
        recurrence: Option<RecurrenceRule>,
    ) -> ServiceResult<&Booking> {
        let recurrence = Recurrence::from(recurrence);
        if let Err(err) = self.check_conflict(start, end, &recurrence) {
            tracing::info!(%name, %start, %end, error = %err, "Booking rejected");
            return Err(err);
        }

        let booking = self.store.append_and_persist(Booking {
            name: name.to_string(),
            start,
            end,
            recurrence,
        })?;
        tracing::info!(%name, %start, %end, "Booking added");
        Ok(booking)
    }

    /// ## Summary
    /// Resolves raw request fields and adds the resulting booking.
    ///
    /// ## Errors
    /// Returns a `CoreError` for invalid input, otherwise as
    /// [`Self::add_booking`].
    pub fn submit(&mut self, request: &BookingRequest) -> ServiceResult<&Booking> {
        let candidate = request.resolve(self.default_duration_minutes)?;
        self.add_booking(
            &candidate.name,
            candidate.start,
            candidate.end,
            candidate.recurrence.rule().cloned(),
        )
    }

    /// ## Summary
    /// Occurrences of every stored booking starting inside `window`, by day.
    ///
    /// ## Errors
    /// Returns an error if expansion fails.
    pub fn agenda(&self, window: TimeWindow) -> ServiceResult<Agenda<'_>> {
        Ok(self
            .engine
            .expand_all_for_window(self.store.bookings(), window)?)
    }

    /// ## Summary
    /// Agenda for one calendar month.
    ///
    /// ## Errors
    /// Returns `InvalidInput` for a month outside 1-12, or an expansion error.
    pub fn month_agenda(&self, year: i32, month: u32) -> ServiceResult<Agenda<'_>> {
        self.agenda(TimeWindow::month(year, month)?)
    }

    /// ## Summary
    /// Agenda for a single day.
    ///
    /// ## Errors
    /// Returns an error if expansion fails.
    pub fn day_agenda(&self, date: NaiveDate) -> ServiceResult<Agenda<'_>> {
        self.agenda(TimeWindow::day(date))
    }
}
