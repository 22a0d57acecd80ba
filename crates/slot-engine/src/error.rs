//! Error types for slot-engine operations.

use std::fmt;

use chrono::{DateTime, Utc, Weekday};
use thiserror::Error;

use crate::time::{TimeInterval, TimeOfDay};

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid time '{0}': expected HH:MM")]
    Format(String),

    #[error("Inverted interval: {start} is not before {end}")]
    InvertedInterval { start: TimeOfDay, end: TimeOfDay },

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    /// Non-positive slot or booking length. A caller bug, never user input.
    #[error("Invalid duration: {0} minutes")]
    InvalidDuration(i64),

    #[error("Invalid session price: {0}")]
    InvalidPrice(i64),

    #[error(transparent)]
    Schedule(#[from] ScheduleErrors),

    #[error("No slot starts at {0}")]
    SlotNotOffered(DateTime<Utc>),

    #[error("Slot at {0} overlaps an existing booking")]
    SlotTaken(DateTime<Utc>),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;

/// What went wrong with one part of a schedule draft.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleErrorKind {
    #[error("timezone is missing")]
    MissingTimezone,

    #[error("unknown timezone '{0}'")]
    UnknownTimezone(String),

    #[error("schedule has no intervals on any day")]
    EmptySchedule,

    #[error("'{0}' is not a valid HH:MM time")]
    Format(String),

    #[error("interval starts at {start} but ends at {end}")]
    InvertedInterval { start: TimeOfDay, end: TimeOfDay },

    #[error("intervals {first} and {second} overlap")]
    Overlap {
        first: TimeInterval,
        second: TimeInterval,
    },
}

impl ScheduleErrorKind {
    /// Stable machine-readable tag, e.g. for a UI to pick a message.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingTimezone => "missing_timezone",
            Self::UnknownTimezone(_) => "unknown_timezone",
            Self::EmptySchedule => "empty_schedule",
            Self::Format(_) => "format",
            Self::InvertedInterval { .. } => "inverted_interval",
            Self::Overlap { .. } => "overlap",
        }
    }
}

/// A single validation failure. `day` is `None` for week-level problems
/// (timezone, empty schedule).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleError {
    pub day: Option<Weekday>,
    pub kind: ScheduleErrorKind,
}

impl ScheduleError {
    pub fn week(kind: ScheduleErrorKind) -> Self {
        Self { day: None, kind }
    }

    pub fn on(day: Weekday, kind: ScheduleErrorKind) -> Self {
        Self {
            day: Some(day),
            kind,
        }
    }
}

impl fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.day {
            Some(day) => write!(f, "{}: {}", day, self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl std::error::Error for ScheduleError {}

/// Every failure found in a schedule draft, in check order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleErrors(pub Vec<ScheduleError>);

impl ScheduleErrors {
    pub fn iter(&self) -> impl Iterator<Item = &ScheduleError> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Errors reported against a given weekday.
    pub fn for_day(&self, day: Weekday) -> impl Iterator<Item = &ScheduleError> {
        self.0.iter().filter(move |e| e.day == Some(day))
    }
}

impl fmt::Display for ScheduleErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} schedule error(s)", self.0.len())?;
        for (i, err) in self.0.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{}{}", sep, err)?;
        }
        Ok(())
    }
}

impl std::error::Error for ScheduleErrors {}

impl IntoIterator for ScheduleErrors {
    type Item = ScheduleError;
    type IntoIter = std::vec::IntoIter<ScheduleError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
