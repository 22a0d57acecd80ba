//! Clock times with minute resolution and half-open intervals between them.
//!
//! Two intervals overlap when `a.start < b.end && b.start < a.end`. Intervals
//! that merely touch (`a.end == b.start`) do NOT overlap.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;

use crate::dst::{resolve_local, DstPolicy};
use crate::error::{EngineError, Result};

pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// A wall-clock time `HH:MM` with hour in 0..=23 and minute in 0..=59.
///
/// Ordering is lexicographic on (hour, minute).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay {
    hour: u8,
    minute: u8,
}

impl TimeOfDay {
    pub fn new(hour: u32, minute: u32) -> Result<Self> {
        match (u8::try_from(hour), u8::try_from(minute)) {
            (Ok(h), Ok(m)) if h < 24 && m < 60 => Ok(Self { hour: h, minute: m }),
            _ => Err(EngineError::Format(format!("{}:{}", hour, minute))),
        }
    }

    /// Parse a strict `HH:MM` string. Both fields must be exactly two digits.
    pub fn parse(s: &str) -> Result<Self> {
        let invalid = || EngineError::Format(s.to_string());
        let [h1, h2, b':', m1, m2] = s.as_bytes() else {
            return Err(invalid());
        };
        let digits = [*h1, *h2, *m1, *m2];
        if !digits.iter().all(u8::is_ascii_digit) {
            return Err(invalid());
        }
        let hour = u32::from((h1 - b'0') * 10 + (h2 - b'0'));
        let minute = u32::from((m1 - b'0') * 10 + (m2 - b'0'));
        Self::new(hour, minute).map_err(|_| invalid())
    }

    pub fn hour(self) -> u32 {
        u32::from(self.hour)
    }

    pub fn minute(self) -> u32 {
        u32::from(self.minute)
    }

    pub fn minutes_from_midnight(self) -> u32 {
        self.hour() * 60 + self.minute()
    }

    /// Inverse of [`minutes_from_midnight`](Self::minutes_from_midnight).
    pub fn from_minutes(minutes: u32) -> Result<Self> {
        if minutes >= MINUTES_PER_DAY {
            return Err(EngineError::Format(format!("{} minutes", minutes)));
        }
        Self::new(minutes / 60, minutes % 60)
    }

    pub fn to_naive_time(self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.hour(), self.minute(), 0).unwrap_or(NaiveTime::MIN)
    }
}

impl FromStr for TimeOfDay {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// A half-open `[start, end)` range of clock time within one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeInterval {
    start: TimeOfDay,
    end: TimeOfDay,
}

impl TimeInterval {
    /// Build an interval. `start` must be strictly before `end`.
    pub fn new(start: TimeOfDay, end: TimeOfDay) -> Result<Self> {
        if start >= end {
            return Err(EngineError::InvertedInterval { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn parse(start: &str, end: &str) -> Result<Self> {
        Self::new(start.parse()?, end.parse()?)
    }

    pub fn start(&self) -> TimeOfDay {
        self.start
    }

    pub fn end(&self) -> TimeOfDay {
        self.end
    }

    pub fn duration_minutes(&self) -> u32 {
        self.end.minutes_from_midnight() - self.start.minutes_from_midnight()
    }

    pub fn overlaps(&self, other: &TimeInterval) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn contains(&self, time: TimeOfDay) -> bool {
        self.start <= time && time < self.end
    }

    /// The instants this interval covers on a local `date` in `timezone`.
    ///
    /// A bound inside a DST gap moves to the first instant after the gap, and an
    /// ambiguous bound takes the earlier instant. On transition days the result
    /// can be shorter or longer than [`duration_minutes`](Self::duration_minutes).
    pub fn instants_on(
        &self,
        date: NaiveDate,
        timezone: Tz,
    ) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let resolve = |time: TimeOfDay| {
            resolve_local(timezone, date.and_time(time.to_naive_time()), DstPolicy::ShiftForward)
        };
        Some((resolve(self.start)?, resolve(self.end)?))
    }
}

impl fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}
