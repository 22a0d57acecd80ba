//! Weekly availability: the raw draft a mentor submits and the validated form.
//!
//! A [`ScheduleDraft`] carries strings exactly as the editor sent them. The only
//! way to get a [`WeeklyAvailability`] with intervals in it is
//! [`validate`](crate::validator::validate), so every value of that type has
//! sorted, conflict-free days and a real IANA timezone.

use std::collections::HashMap;

use chrono::Weekday;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::time::TimeInterval;

/// Monday-first week order used for every per-day iteration.
pub const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// One interval as typed into the editor, not yet checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftInterval {
    pub start: String,
    pub end: String,
}

impl DraftInterval {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }
}

/// An unvalidated weekly schedule.
///
/// JSON shape: `{"timezone": "Asia/Tbilisi", "days": {"monday": [{"start": "09:00", "end": "12:00"}]}}`.
/// Day keys accept any form chrono's `Weekday` parses (`"mon"`, `"Monday"`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleDraft {
    #[serde(default)]
    pub timezone: String,
    #[serde(default)]
    pub days: HashMap<Weekday, Vec<DraftInterval>>,
}

impl ScheduleDraft {
    pub fn new(timezone: impl Into<String>) -> Self {
        Self {
            timezone: timezone.into(),
            days: HashMap::new(),
        }
    }

    /// Builder-style helper for appending an interval to a day.
    pub fn with_interval(mut self, day: Weekday, start: &str, end: &str) -> Self {
        self.days
            .entry(day)
            .or_default()
            .push(DraftInterval::new(start, end));
        self
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn day(&self, day: Weekday) -> &[DraftInterval] {
        self.days.get(&day).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn interval_count(&self) -> usize {
        self.days.values().map(Vec::len).sum()
    }
}

/// A mentor's validated recurring schedule, anchored to their home timezone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeeklyAvailability {
    timezone: Tz,
    days: [Vec<TimeInterval>; 7],
}

impl WeeklyAvailability {
    /// The schedule a mentor profile starts with: a timezone and no intervals.
    pub fn empty(timezone: Tz) -> Self {
        Self {
            timezone,
            days: Default::default(),
        }
    }

    /// Caller guarantees every day is sorted and conflict-free.
    pub(crate) fn from_validated(timezone: Tz, days: [Vec<TimeInterval>; 7]) -> Self {
        Self { timezone, days }
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Intervals for a weekday, sorted by start.
    pub fn day(&self, day: Weekday) -> &[TimeInterval] {
        self.days
            .get(day.num_days_from_monday() as usize)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.days.iter().all(Vec::is_empty)
    }

    /// Convert back into the editor's draft form, e.g. to pre-fill an edit.
    pub fn to_draft(&self) -> ScheduleDraft {
        let days = WEEK
            .iter()
            .filter(|day| !self.day(**day).is_empty())
            .map(|day| {
                let intervals = self
                    .day(*day)
                    .iter()
                    .map(|i| DraftInterval::new(i.start().to_string(), i.end().to_string()))
                    .collect();
                (*day, intervals)
            })
            .collect();
        ScheduleDraft {
            timezone: self.timezone.name().to_string(),
            days,
        }
    }
}
