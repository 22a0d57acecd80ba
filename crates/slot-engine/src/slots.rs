//! Turn a weekly availability pattern into bookable slots on a calendar date.
//!
//! The target date is a mentor-local date: its weekday indexes the mentor's
//! weekly pattern, and each `HH:MM` is converted to an absolute instant using
//! the mentor's zone rules for that exact date. Slots are then displayed in the
//! viewer's zone.
//!
//! For each interval of the day, candidates start at `interval.start` and step
//! forward by the slot duration on the mentor's wall clock. A candidate is
//! emitted only if the whole slot fits between the interval's absolute start
//! and end instants and no booking covers it. On DST transition days those
//! instants are closer together or further apart than the wall clock says.
//! Generation keeps no state between calls, so identical inputs yield
//! identical output.

use chrono::{DateTime, Datelike, Days, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::conflict::ConflictIndex;
use crate::dst::{resolve_local, DstPolicy};
use crate::error::{EngineError, Result};
use crate::schedule::WeeklyAvailability;
use crate::time::TimeOfDay;

/// Slot length used across the marketplace unless a caller overrides it.
pub const DEFAULT_SLOT_MINUTES: u32 = 60;

/// A concrete, conflict-free window offered to a viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookableSlot {
    pub start: DateTime<Utc>,
    /// Start time on the viewer's 24-hour clock (`HH:MM`).
    pub display_time: String,
    pub duration_minutes: u32,
}

impl BookableSlot {
    pub fn end(&self) -> DateTime<Utc> {
        self.start + Duration::minutes(i64::from(self.duration_minutes))
    }
}

/// Slots for one mentor-local date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySlots {
    pub date: NaiveDate,
    pub slots: Vec<BookableSlot>,
}

/// Fixed-duration slot generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotGenerator {
    duration_minutes: u32,
    dst_policy: DstPolicy,
}

impl Default for SlotGenerator {
    fn default() -> Self {
        Self {
            duration_minutes: DEFAULT_SLOT_MINUTES,
            dst_policy: DstPolicy::default(),
        }
    }
}

impl SlotGenerator {
    /// Any positive length is accepted. One longer than every interval simply
    /// produces no slots.
    ///
    /// # Errors
    /// Returns `EngineError::InvalidDuration` if `duration_minutes <= 0`.
    pub fn new(duration_minutes: i64) -> Result<Self> {
        if duration_minutes <= 0 {
            return Err(EngineError::InvalidDuration(duration_minutes));
        }
        Ok(Self {
            duration_minutes: u32::try_from(duration_minutes).unwrap_or(u32::MAX),
            dst_policy: DstPolicy::default(),
        })
    }

    pub fn with_dst_policy(mut self, policy: DstPolicy) -> Self {
        self.dst_policy = policy;
        self
    }

    pub fn duration_minutes(&self) -> u32 {
        self.duration_minutes
    }

    pub fn dst_policy(&self) -> DstPolicy {
        self.dst_policy
    }

    /// Bookable slots on `date`, in chronological order.
    ///
    /// An empty result means the mentor is off that day or fully booked;
    /// neither is an error.
    pub fn generate<C>(
        &self,
        availability: &WeeklyAvailability,
        date: NaiveDate,
        viewer_timezone: Tz,
        conflicts: &C,
    ) -> Vec<BookableSlot>
    where
        C: ConflictIndex + ?Sized,
    {
        let mentor_tz = availability.timezone();
        let intervals = availability.day(date.weekday());
        if intervals.is_empty() {
            debug!(%date, weekday = %date.weekday(), "no availability declared");
            return Vec::new();
        }

        let step = self.duration_minutes;
        let slot_length = Duration::minutes(i64::from(step));
        let mut slots = Vec::new();
        let mut last_end: Option<DateTime<Utc>> = None;
        let mut booked = 0usize;
        let mut unresolved = 0usize;

        for interval in intervals {
            let Some((opens, closes)) = interval.instants_on(date, mentor_tz) else {
                unresolved += 1;
                continue;
            };
            let end = interval.end().minutes_from_midnight();
            let mut cursor = interval.start().minutes_from_midnight();

            while cursor < end {
                let candidate = self.resolve(mentor_tz, date, cursor);
                cursor = cursor.saturating_add(step);

                let Some(start) = candidate else {
                    unresolved += 1;
                    continue;
                };
                let Some(slot_end) = start.checked_add_signed(slot_length) else {
                    break;
                };
                // Resolved starts only move forward, so no later candidate fits either.
                if slot_end > closes {
                    break;
                }
                // A shifted start can land before the interval or inside the previous slot.
                if start < opens || last_end.is_some_and(|prev| start < prev) {
                    unresolved += 1;
                    continue;
                }
                if conflicts.is_covered(start, step) {
                    booked += 1;
                    continue;
                }

                last_end = Some(slot_end);
                slots.push(BookableSlot {
                    start,
                    display_time: start.with_timezone(&viewer_timezone).format("%H:%M").to_string(),
                    duration_minutes: step,
                });
            }
        }

        debug!(
            %date,
            mentor_tz = mentor_tz.name(),
            viewer_tz = viewer_timezone.name(),
            emitted = slots.len(),
            booked,
            unresolved,
            "generated slots"
        );
        slots
    }

    /// Slots for `days` consecutive mentor-local dates, starting with the
    /// date `from` falls on. Slots that start before `from` are dropped.
    pub fn generate_upcoming<C>(
        &self,
        availability: &WeeklyAvailability,
        from: DateTime<Utc>,
        days: u32,
        viewer_timezone: Tz,
        conflicts: &C,
    ) -> Vec<DaySlots>
    where
        C: ConflictIndex + ?Sized,
    {
        let first = from.with_timezone(&availability.timezone()).date_naive();
        (0..days)
            .map_while(|offset| first.checked_add_days(Days::new(u64::from(offset))))
            .map(|date| {
                let mut slots = self.generate(availability, date, viewer_timezone, conflicts);
                slots.retain(|slot| slot.start >= from);
                DaySlots { date, slots }
            })
            .collect()
    }

    /// Whether `start` is a slot start this schedule produces, ignoring bookings.
    pub fn offers(&self, availability: &WeeklyAvailability, start: DateTime<Utc>) -> bool {
        let date = start.with_timezone(&availability.timezone()).date_naive();
        let none: &[crate::conflict::Booking] = &[];
        self.generate(availability, date, chrono_tz::UTC, none)
            .iter()
            .any(|slot| slot.start == start)
    }

    fn resolve(&self, timezone: Tz, date: NaiveDate, minutes: u32) -> Option<DateTime<Utc>> {
        let time = TimeOfDay::from_minutes(minutes).ok()?;
        resolve_local(timezone, date.and_time(time.to_naive_time()), self.dst_policy)
    }
}

/// Generate slots with the default DST policy.
///
/// # Errors
/// Returns `EngineError::InvalidDuration` if `slot_duration_minutes <= 0`.
pub fn generate_slots<C>(
    availability: &WeeklyAvailability,
    date: NaiveDate,
    viewer_timezone: Tz,
    slot_duration_minutes: i64,
    conflicts: &C,
) -> Result<Vec<BookableSlot>>
where
    C: ConflictIndex + ?Sized,
{
    let generator = SlotGenerator::new(slot_duration_minutes)?;
    Ok(generator.generate(availability, date, viewer_timezone, conflicts))
}
