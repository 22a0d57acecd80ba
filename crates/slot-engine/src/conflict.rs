//! Confirmed bookings and the conflict index used to exclude taken slots.
//!
//! A proposed slot is covered when any booking `b` satisfies
//! `proposed.start < b.end && b.start < proposed.end`. Adjacent sessions (one
//! ends exactly when the next starts) are NOT conflicts.

use std::fmt;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::dst::{resolve_local, DstPolicy};
use crate::error::{EngineError, Result};

/// Opaque mentor identifier issued by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MentorId(pub String);

impl MentorId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for MentorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A confirmed session with a mentor. Deserializing goes through
/// [`Booking::new`], so a zero-length booking is rejected there too.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BookingRecord")]
pub struct Booking {
    pub mentor_id: MentorId,
    pub start: DateTime<Utc>,
    pub duration_minutes: u32,
}

#[derive(Deserialize)]
struct BookingRecord {
    mentor_id: MentorId,
    start: DateTime<Utc>,
    duration_minutes: u32,
}

impl TryFrom<BookingRecord> for Booking {
    type Error = EngineError;

    fn try_from(record: BookingRecord) -> Result<Self> {
        Booking::new(record.mentor_id, record.start, record.duration_minutes)
    }
}

impl Booking {
    pub fn new(mentor_id: MentorId, start: DateTime<Utc>, duration_minutes: u32) -> Result<Self> {
        if duration_minutes == 0 {
            return Err(EngineError::InvalidDuration(0));
        }
        Ok(Self {
            mentor_id,
            start,
            duration_minutes,
        })
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.start + Duration::minutes(i64::from(self.duration_minutes))
    }

    /// Half-open overlap against `[start, end)`.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        start < self.end() && self.start < end
    }
}

/// Read-only view of existing bookings consulted by the slot generator.
pub trait ConflictIndex {
    /// True if `[start, start + duration_minutes)` intersects a booking.
    fn is_covered(&self, start: DateTime<Utc>, duration_minutes: u32) -> bool;
}

impl ConflictIndex for [Booking] {
    fn is_covered(&self, start: DateTime<Utc>, duration_minutes: u32) -> bool {
        let end = start + Duration::minutes(i64::from(duration_minutes));
        self.iter().any(|b| b.overlaps(start, end))
    }
}

impl ConflictIndex for Vec<Booking> {
    fn is_covered(&self, start: DateTime<Utc>, duration_minutes: u32) -> bool {
        self.as_slice().is_covered(start, duration_minutes)
    }
}

/// The bookings for one mentor on one mentor-local date.
///
/// Bookings are merged into sorted, non-overlapping busy periods on
/// construction so [`ConflictIndex::is_covered`] is a binary search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayBookings {
    date: NaiveDate,
    bookings: Vec<Booking>,
    busy: Vec<(DateTime<Utc>, DateTime<Utc>)>,
}

impl DayBookings {
    /// Keep the bookings that intersect `date` as observed in `timezone`.
    ///
    /// Bookings for other mentors are ignored.
    pub fn collect<'a>(
        bookings: impl IntoIterator<Item = &'a Booking>,
        mentor_id: &MentorId,
        date: NaiveDate,
        timezone: Tz,
    ) -> Self {
        let (day_start, day_end) = day_bounds(date, timezone);
        let mut kept: Vec<Booking> = bookings
            .into_iter()
            .filter(|b| &b.mentor_id == mentor_id && b.overlaps(day_start, day_end))
            .cloned()
            .collect();
        kept.sort_by_key(|b| (b.start, b.duration_minutes));
        let busy = merge_busy_periods(&kept);
        Self {
            date,
            bookings: kept,
            busy,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// The collected bookings, sorted by start.
    pub fn bookings(&self) -> &[Booking] {
        &self.bookings
    }

    /// Merged busy periods, sorted and non-overlapping.
    pub fn busy_periods(&self) -> &[(DateTime<Utc>, DateTime<Utc>)] {
        &self.busy
    }

    pub fn is_empty(&self) -> bool {
        self.bookings.is_empty()
    }
}

impl ConflictIndex for DayBookings {
    fn is_covered(&self, start: DateTime<Utc>, duration_minutes: u32) -> bool {
        let end = start + Duration::minutes(i64::from(duration_minutes));
        // First busy period that ends after the proposal starts.
        let idx = self.busy.partition_point(|(_, busy_end)| *busy_end <= start);
        self.busy
            .get(idx)
            .is_some_and(|(busy_start, _)| *busy_start < end)
    }
}

/// Merge overlapping or adjacent bookings into busy periods.
///
/// Input must be sorted by start.
fn merge_busy_periods(bookings: &[Booking]) -> Vec<(DateTime<Utc>, DateTime<Utc>)> {
    let mut merged: Vec<(DateTime<Utc>, DateTime<Utc>)> = Vec::new();
    for booking in bookings {
        let (start, end) = (booking.start, booking.end());
        if let Some(last) = merged.last_mut() {
            if start <= last.1 {
                last.1 = last.1.max(end);
                continue;
            }
        }
        merged.push((start, end));
    }
    merged
}

/// UTC bounds of a local calendar day. Days that begin inside a DST gap start
/// at the first instant that exists.
pub(crate) fn day_bounds(date: NaiveDate, timezone: Tz) -> (DateTime<Utc>, DateTime<Utc>) {
    let start_of = |d: NaiveDate| {
        let midnight = d.and_time(NaiveTime::MIN);
        resolve_local(timezone, midnight, DstPolicy::ShiftForward)
            .unwrap_or_else(|| midnight.and_utc())
    };
    let next = date.succ_opt().unwrap_or(date);
    (start_of(date), start_of(next))
}
