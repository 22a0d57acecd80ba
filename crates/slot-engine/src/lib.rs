//! # slot-engine
//!
//! Availability-to-bookable-slot resolution for a mentorship marketplace.
//!
//! A mentor declares a recurring weekly schedule in their own timezone. The
//! engine validates that schedule before it is saved, turns it into concrete
//! fixed-duration slots for a calendar date (shown in the viewer's timezone),
//! drops slots that collide with confirmed bookings, and prices sessions.
//! Everything here is a pure function over immutable values; the only shared
//! state lives behind the [`store`] traits.
//!
//! ## Modules
//!
//! - [`time`]: `HH:MM` clock times and half-open intervals
//! - [`schedule`]: editor drafts and validated weekly availability
//! - [`validator`]: accumulate every schedule error before a save
//! - [`conflict`]: bookings and the conflict index used to exclude taken slots
//! - [`dst`]: policies for local times that fall in DST transitions
//! - [`slots`]: the slot generator
//! - [`pricing`]: platform fee, tax and total for a session price
//! - [`store`]: availability and booking store seams with in-memory impls
//! - [`error`]: Error types

pub mod conflict;
pub mod dst;
pub mod error;
pub mod pricing;
pub mod schedule;
pub mod slots;
pub mod store;
pub mod time;
pub mod validator;

pub use conflict::{Booking, ConflictIndex, DayBookings, MentorId};
pub use dst::DstPolicy;
pub use error::{EngineError, ScheduleError, ScheduleErrorKind, ScheduleErrors};
pub use pricing::{compute, price_offer, FeeSchedule, FeeTable, LegalStatus, PriceBreakdown};
pub use schedule::{DraftInterval, ScheduleDraft, WeeklyAvailability};
pub use slots::{generate_slots, BookableSlot, DaySlots, SlotGenerator};
pub use time::{TimeInterval, TimeOfDay};
pub use validator::validate;
