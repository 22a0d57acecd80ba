//! Tests for the availability and booking stores, including the write-time
//! conflict re-check.

use std::sync::Arc;
use std::thread;

use chrono::{DateTime, NaiveDate, TimeZone, Utc, Weekday};
use slot_engine::store::{
    confirm_slot, AvailabilityStore, BookingStore, InMemoryAvailabilityStore, InMemoryBookingStore,
};
use slot_engine::{Booking, EngineError, MentorId, ScheduleDraft, SlotGenerator};

fn mentor() -> MentorId {
    MentorId::new("mentor-1")
}

fn utc(h: u32, m: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 16, h, m, 0).unwrap()
}

fn booking(start: DateTime<Utc>, minutes: u32) -> Booking {
    Booking::new(mentor(), start, minutes).unwrap()
}

fn monday_draft() -> ScheduleDraft {
    ScheduleDraft::new("Asia/Tbilisi").with_interval(Weekday::Mon, "09:00", "12:00")
}

#[test]
fn new_profile_starts_empty() {
    let store = InMemoryAvailabilityStore::new();

    let created = store.create(&mentor(), chrono_tz::Asia::Tbilisi);

    assert!(created.is_empty());
    assert_eq!(store.load(&mentor()), Some(created));
}

#[test]
fn invalid_draft_is_not_written() {
    let store = InMemoryAvailabilityStore::new();
    store.save(&mentor(), &monday_draft()).unwrap();

    let bad = ScheduleDraft::new("Asia/Tbilisi")
        .with_interval(Weekday::Tue, "09:00", "10:00")
        .with_interval(Weekday::Tue, "09:30", "11:00");
    let result = store.save(&mentor(), &bad);

    assert!(matches!(result, Err(EngineError::Schedule(ref e)) if e.len() == 1));
    // Previous schedule untouched
    let kept = store.load(&mentor()).unwrap();
    assert_eq!(kept.day(Weekday::Mon).len(), 1);
    assert!(kept.day(Weekday::Tue).is_empty());
}

#[test]
fn save_replaces_the_whole_schedule() {
    let store = InMemoryAvailabilityStore::new();
    store.save(&mentor(), &monday_draft()).unwrap();

    let replacement = ScheduleDraft::new("Asia/Tbilisi").with_interval(Weekday::Fri, "10:00", "11:00");
    store.save(&mentor(), &replacement).unwrap();

    let saved = store.load(&mentor()).unwrap();
    assert!(saved.day(Weekday::Mon).is_empty());
    assert_eq!(saved.day(Weekday::Fri).len(), 1);
}

#[test]
fn confirm_rejects_overlapping_booking() {
    let store = InMemoryBookingStore::new();
    store.confirm(booking(utc(6, 0), 60)).unwrap();

    let result = store.confirm(booking(utc(6, 30), 60));

    assert!(matches!(result, Err(EngineError::SlotTaken(t)) if t == utc(6, 30)));
    assert_eq!(store.len(), 1);
}

#[test]
fn confirm_accepts_adjacent_booking() {
    let store = InMemoryBookingStore::new();
    store.confirm(booking(utc(6, 0), 60)).unwrap();
    store.confirm(booking(utc(7, 0), 60)).unwrap();
    assert_eq!(store.len(), 2);
}

#[test]
fn bookings_on_date_feed_the_generator() {
    let availability = InMemoryAvailabilityStore::new();
    let bookings = InMemoryBookingStore::new();
    let schedule = availability.save(&mentor(), &monday_draft()).unwrap();
    bookings.confirm(booking(utc(6, 0), 60)).unwrap();

    let date = NaiveDate::from_ymd_opt(2026, 3, 16).unwrap();
    let day = bookings.bookings_on(&mentor(), date, schedule.timezone());
    let slots = SlotGenerator::default().generate(&schedule, date, schedule.timezone(), &day);

    let shown: Vec<_> = slots.iter().map(|s| s.display_time.as_str()).collect();
    assert_eq!(shown, vec!["09:00", "11:00"]);
}

#[test]
fn cancel_frees_the_slot() {
    let store = InMemoryBookingStore::new();
    store.confirm(booking(utc(6, 0), 60)).unwrap();

    assert!(store.cancel(&mentor(), utc(6, 0)));
    assert!(!store.cancel(&mentor(), utc(6, 0)));
    assert!(store.is_empty());
    store.confirm(booking(utc(6, 0), 60)).unwrap();
}

#[test]
fn confirm_slot_checks_the_schedule_offers_it() {
    let availability = InMemoryAvailabilityStore::new();
    let bookings = InMemoryBookingStore::new();
    availability.save(&mentor(), &monday_draft()).unwrap();
    let generator = SlotGenerator::default();

    // 09:00 Tbilisi is offered.
    confirm_slot(&generator, &availability, &bookings, booking(utc(5, 0), 60)).unwrap();

    // 12:00 Tbilisi is past the interval.
    let late = confirm_slot(&generator, &availability, &bookings, booking(utc(8, 0), 60));
    assert!(matches!(late, Err(EngineError::SlotNotOffered(_))));

    // Wrong duration.
    let long = confirm_slot(&generator, &availability, &bookings, booking(utc(6, 0), 90));
    assert!(matches!(long, Err(EngineError::SlotNotOffered(_))));

    // Unknown mentor.
    let stranger = Booking::new(MentorId::new("nobody"), utc(5, 0), 60).unwrap();
    let unknown = confirm_slot(&generator, &availability, &bookings, stranger);
    assert!(matches!(unknown, Err(EngineError::SlotNotOffered(_))));

    // Same slot twice.
    let again = confirm_slot(&generator, &availability, &bookings, booking(utc(5, 0), 60));
    assert!(matches!(again, Err(EngineError::SlotTaken(_))));
}

#[test]
fn refused_check_inserts_nothing() {
    let store = InMemoryBookingStore::new();

    let result = store.confirm_if(booking(utc(6, 0), 60), &|b: &Booking| {
        b.duration_minutes == 30
    });

    assert!(matches!(result, Err(EngineError::SlotNotOffered(_))));
    assert!(store.is_empty());
}

#[test]
fn confirm_slot_uses_the_schedule_current_at_insert() {
    let availability = InMemoryAvailabilityStore::new();
    let bookings = InMemoryBookingStore::new();
    let generator = SlotGenerator::default();
    availability.save(&mentor(), &monday_draft()).unwrap();
    // The student saw 09:00 offered, then the mentor moved to Fridays.
    assert!(generator.offers(&availability.load(&mentor()).unwrap(), utc(5, 0)));
    let friday = ScheduleDraft::new("Asia/Tbilisi").with_interval(Weekday::Fri, "09:00", "12:00");
    availability.save(&mentor(), &friday).unwrap();

    let result = confirm_slot(&generator, &availability, &bookings, booking(utc(5, 0), 60));

    assert!(matches!(result, Err(EngineError::SlotNotOffered(_))));
    assert!(bookings.is_empty());
}

#[test]
fn concurrent_confirmations_book_a_slot_once() {
    let availability = Arc::new(InMemoryAvailabilityStore::new());
    let bookings = Arc::new(InMemoryBookingStore::new());
    availability.save(&mentor(), &monday_draft()).unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let availability = Arc::clone(&availability);
            let bookings = Arc::clone(&bookings);
            thread::spawn(move || {
                confirm_slot(
                    &SlotGenerator::default(),
                    availability.as_ref(),
                    bookings.as_ref(),
                    booking(utc(5, 0), 60),
                )
                .is_ok()
            })
        })
        .collect();

    let successes = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|ok| *ok)
        .count();

    assert_eq!(successes, 1);
    assert_eq!(bookings.len(), 1);
}
