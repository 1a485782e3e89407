//! Booking records as they are persisted, plus the occurrences derived from them.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Calendar step between two occurrences of a recurring booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }

    /// Name of the frequency in RFC 5545 `FREQ=` syntax.
    #[must_use]
    pub const fn as_rrule_freq(self) -> &'static str {
        match self {
            Self::Weekly => "WEEKLY",
            Self::Monthly => "MONTHLY",
            Self::Yearly => "YEARLY",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            other => Err(CoreError::InvalidInput(format!(
                "unknown recurrence frequency '{other}' (expected weekly, monthly or yearly)"
            ))),
        }
    }
}

/// Fixed-interval repetition with a mandatory end.
///
/// No occurrence starts strictly after `until`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrenceRule {
    #[serde(rename = "type")]
    pub frequency: Frequency,
    pub until: NaiveDateTime,
}

impl RecurrenceRule {
    #[must_use]
    pub fn new(frequency: Frequency, until: NaiveDateTime) -> Self {
        Self { frequency, until }
    }
}

/// Whether a booking repeats.
///
/// Persisted as `null` or a rule object; records written before recurrence
/// existed have no field at all and load as [`Recurrence::None`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<RecurrenceRule>", into = "Option<RecurrenceRule>")]
pub enum Recurrence {
    #[default]
    None,
    Rule(RecurrenceRule),
}

impl Recurrence {
    #[must_use]
    pub fn rule(&self) -> Option<&RecurrenceRule> {
        match self {
            Self::None => None,
            Self::Rule(rule) => Some(rule),
        }
    }

    #[must_use]
    pub fn is_recurring(&self) -> bool {
        matches!(self, Self::Rule(_))
    }
}

impl From<Option<RecurrenceRule>> for Recurrence {
    fn from(value: Option<RecurrenceRule>) -> Self {
        value.map_or(Self::None, Self::Rule)
    }
}

impl From<Recurrence> for Option<RecurrenceRule> {
    fn from(value: Recurrence) -> Self {
        match value {
            Recurrence::None => None,
            Recurrence::Rule(rule) => Some(rule),
        }
    }
}

impl From<RecurrenceRule> for Recurrence {
    fn from(rule: RecurrenceRule) -> Self {
        Self::Rule(rule)
    }
}

/// A persisted booking.
///
/// `end > start` is the caller's responsibility; nothing downstream re-checks it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub name: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    #[serde(default)]
    pub recurrence: Recurrence,
}

impl Booking {
    #[must_use]
    pub fn new(name: impl Into<String>, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            name: name.into(),
            start,
            end,
            recurrence: Recurrence::None,
        }
    }

    /// Attaches a recurrence rule.
    #[must_use]
    pub fn with_recurrence(mut self, rule: RecurrenceRule) -> Self {
        self.recurrence = Recurrence::Rule(rule);
        self
    }

    /// Length shared by every occurrence of this booking.
    #[must_use]
    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }

    /// The booking's own interval, i.e. its first occurrence.
    #[must_use]
    pub fn nominal(&self) -> Occurrence {
        Occurrence::new(self.start, self.end)
    }
}

/// One concrete start/end pair produced by expanding a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Occurrence {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl Occurrence {
    #[must_use]
    pub const fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }

    /// Half-open overlap test: touching boundaries do not overlap.
    #[must_use]
    pub fn overlaps(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        start < self.end && end > self.start
    }

    #[must_use]
    pub fn overlaps_occurrence(&self, other: &Self) -> bool {
        self.overlaps(other.start, other.end)
    }
}
