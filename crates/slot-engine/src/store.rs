//! Store seams for availability and bookings, with in-memory implementations.
//!
//! The engine itself is pure; these traits are where the backend plugs in.
//! Availability is only ever written whole, and only after validation.
//! Bookings are inserted through an atomic check-and-insert so two students
//! confirming the same slot cannot both succeed, even if both saw it offered.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError, RwLock};

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use tracing::{debug, warn};

use crate::conflict::{Booking, DayBookings, MentorId};
use crate::error::{EngineError, Result};
use crate::schedule::{ScheduleDraft, WeeklyAvailability};
use crate::slots::SlotGenerator;
use crate::validator::validate;

pub trait AvailabilityStore {
    fn load(&self, mentor_id: &MentorId) -> Option<WeeklyAvailability>;

    /// Create the empty schedule a new mentor profile starts with.
    fn create(&self, mentor_id: &MentorId, timezone: Tz) -> WeeklyAvailability;

    /// Validate `draft` and replace the mentor's whole schedule with it.
    ///
    /// # Errors
    /// Returns `EngineError::Schedule` with every validation error; nothing is
    /// written in that case.
    fn save(&self, mentor_id: &MentorId, draft: &ScheduleDraft) -> Result<WeeklyAvailability>;
}

pub trait BookingStore {
    /// Confirmed bookings intersecting `date` as observed in `timezone`.
    fn bookings_on(&self, mentor_id: &MentorId, date: NaiveDate, timezone: Tz) -> DayBookings;

    /// Insert `booking` unless it overlaps an existing one, as one atomic step.
    ///
    /// # Errors
    /// Returns `EngineError::SlotTaken` on overlap.
    fn confirm(&self, booking: Booking) -> Result<()> {
        self.confirm_if(booking, &|_| true)
    }

    /// Like [`confirm`](Self::confirm), but `offered` is evaluated inside the
    /// same critical section as the overlap check and the insert.
    ///
    /// # Errors
    /// - `EngineError::SlotNotOffered` if `offered` returns false.
    /// - `EngineError::SlotTaken` on overlap.
    fn confirm_if(&self, booking: Booking, offered: &dyn Fn(&Booking) -> bool) -> Result<()>;

    /// Remove the booking starting at `start`. Returns whether one was removed.
    fn cancel(&self, mentor_id: &MentorId, start: DateTime<Utc>) -> bool;
}

#[derive(Debug, Default)]
pub struct InMemoryAvailabilityStore {
    schedules: RwLock<HashMap<MentorId, WeeklyAvailability>>,
}

impl InMemoryAvailabilityStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AvailabilityStore for InMemoryAvailabilityStore {
    fn load(&self, mentor_id: &MentorId) -> Option<WeeklyAvailability> {
        let schedules = self.schedules.read().unwrap_or_else(PoisonError::into_inner);
        schedules.get(mentor_id).cloned()
    }

    fn create(&self, mentor_id: &MentorId, timezone: Tz) -> WeeklyAvailability {
        let mut schedules = self.schedules.write().unwrap_or_else(PoisonError::into_inner);
        schedules
            .entry(mentor_id.clone())
            .or_insert_with(|| WeeklyAvailability::empty(timezone))
            .clone()
    }

    fn save(&self, mentor_id: &MentorId, draft: &ScheduleDraft) -> Result<WeeklyAvailability> {
        let availability = validate(draft)?;
        let mut schedules = self.schedules.write().unwrap_or_else(PoisonError::into_inner);
        schedules.insert(mentor_id.clone(), availability.clone());
        debug!(mentor = %mentor_id, "availability replaced");
        Ok(availability)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryBookingStore {
    bookings: Mutex<HashMap<MentorId, Vec<Booking>>>,
}

impl InMemoryBookingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        let bookings = self.bookings.lock().unwrap_or_else(PoisonError::into_inner);
        bookings.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl BookingStore for InMemoryBookingStore {
    fn bookings_on(&self, mentor_id: &MentorId, date: NaiveDate, timezone: Tz) -> DayBookings {
        let bookings = self.bookings.lock().unwrap_or_else(PoisonError::into_inner);
        let mentor_bookings = bookings.get(mentor_id).map(Vec::as_slice).unwrap_or_default();
        DayBookings::collect(mentor_bookings, mentor_id, date, timezone)
    }

    fn confirm_if(&self, booking: Booking, offered: &dyn Fn(&Booking) -> bool) -> Result<()> {
        let mut bookings = self.bookings.lock().unwrap_or_else(PoisonError::into_inner);
        if !offered(&booking) {
            warn!(
                mentor = %booking.mentor_id,
                start = %booking.start,
                "booking refused: slot not offered"
            );
            return Err(EngineError::SlotNotOffered(booking.start));
        }
        let existing = bookings.entry(booking.mentor_id.clone()).or_default();
        let end = booking.end();
        if existing.iter().any(|b| b.overlaps(booking.start, end)) {
            warn!(
                mentor = %booking.mentor_id,
                start = %booking.start,
                "booking refused: slot already taken"
            );
            return Err(EngineError::SlotTaken(booking.start));
        }
        debug!(mentor = %booking.mentor_id, start = %booking.start, "booking confirmed");
        existing.push(booking);
        Ok(())
    }

    fn cancel(&self, mentor_id: &MentorId, start: DateTime<Utc>) -> bool {
        let mut bookings = self.bookings.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(existing) = bookings.get_mut(mentor_id) else {
            return false;
        };
        let before = existing.len();
        existing.retain(|b| b.start != start);
        existing.len() != before
    }
}

/// Confirm a student's chosen slot.
///
/// Checks that the mentor's current schedule offers a slot starting at
/// `booking.start` with the generator's duration, then inserts. The schedule is
/// read inside the booking store's critical section, so a schedule saved
/// concurrently is ordered either wholly before or wholly after the booking.
///
/// # Errors
/// - `EngineError::SlotNotOffered` if the mentor has no schedule, the duration
///   differs, or the schedule does not produce that start.
/// - `EngineError::SlotTaken` if another booking got there first.
pub fn confirm_slot<A, B>(
    generator: &SlotGenerator,
    availability: &A,
    bookings: &B,
    booking: Booking,
) -> Result<()>
where
    A: AvailabilityStore + ?Sized,
    B: BookingStore + ?Sized,
{
    bookings.confirm_if(booking, &|booking: &Booking| {
        booking.duration_minutes == generator.duration_minutes()
            && availability
                .load(&booking.mentor_id)
                .is_some_and(|schedule| generator.offers(&schedule, booking.start))
    })
}
