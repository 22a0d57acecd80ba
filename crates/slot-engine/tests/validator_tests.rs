//! Tests for schedule validation: every violation is reported, none short-circuit.

use chrono::Weekday;
use slot_engine::{validate, ScheduleDraft, ScheduleErrorKind, TimeInterval};

fn iv(start: &str, end: &str) -> TimeInterval {
    TimeInterval::parse(start, end).unwrap()
}

#[test]
fn valid_schedule_is_normalized() {
    let draft = ScheduleDraft::new("Asia/Tbilisi")
        .with_interval(Weekday::Mon, "14:00", "16:00")
        .with_interval(Weekday::Mon, "09:00", "12:00")
        .with_interval(Weekday::Thu, "10:00", "11:00");

    let schedule = validate(&draft).unwrap();

    assert_eq!(schedule.timezone(), chrono_tz::Asia::Tbilisi);
    // Sorted by start regardless of input order
    assert_eq!(
        schedule.day(Weekday::Mon),
        &[iv("09:00", "12:00"), iv("14:00", "16:00")]
    );
    assert_eq!(schedule.day(Weekday::Thu), &[iv("10:00", "11:00")]);
    assert!(schedule.day(Weekday::Sun).is_empty());
}

#[test]
fn touching_intervals_are_valid() {
    let draft = ScheduleDraft::new("UTC")
        .with_interval(Weekday::Wed, "09:00", "10:00")
        .with_interval(Weekday::Wed, "10:00", "11:00");

    assert!(validate(&draft).is_ok());
}

#[test]
fn overlap_reported_once_naming_both_intervals() {
    let draft = ScheduleDraft::new("Asia/Tbilisi")
        .with_interval(Weekday::Tue, "09:30", "11:00")
        .with_interval(Weekday::Tue, "09:00", "10:00");

    let errors = validate(&draft).unwrap_err();

    assert_eq!(errors.len(), 1);
    let err = &errors.0[0];
    assert_eq!(err.day, Some(Weekday::Tue));
    assert_eq!(
        err.kind,
        ScheduleErrorKind::Overlap {
            first: iv("09:00", "10:00"),
            second: iv("09:30", "11:00"),
        }
    );
}

#[test]
fn missing_timezone_reported() {
    let draft = ScheduleDraft::new("  ").with_interval(Weekday::Mon, "09:00", "10:00");

    let errors = validate(&draft).unwrap_err();

    assert_eq!(errors.len(), 1);
    assert_eq!(errors.0[0].day, None);
    assert_eq!(errors.0[0].kind, ScheduleErrorKind::MissingTimezone);
}

#[test]
fn unknown_timezone_reported() {
    let draft = ScheduleDraft::new("Mars/Olympus").with_interval(Weekday::Mon, "09:00", "10:00");

    let errors = validate(&draft).unwrap_err();

    assert_eq!(
        errors.0[0].kind,
        ScheduleErrorKind::UnknownTimezone("Mars/Olympus".to_string())
    );
}

#[test]
fn empty_schedule_is_a_week_level_error() {
    let errors = validate(&ScheduleDraft::new("UTC")).unwrap_err();

    assert_eq!(errors.len(), 1);
    assert_eq!(errors.0[0].day, None);
    assert_eq!(errors.0[0].kind, ScheduleErrorKind::EmptySchedule);
}

#[test]
fn format_errors_reported_for_each_bad_end() {
    let draft = ScheduleDraft::new("UTC").with_interval(Weekday::Fri, "9am", "25:00");

    let errors = validate(&draft).unwrap_err();

    let kinds: Vec<_> = errors.for_day(Weekday::Fri).map(|e| e.kind.clone()).collect();
    assert_eq!(
        kinds,
        vec![
            ScheduleErrorKind::Format("9am".to_string()),
            ScheduleErrorKind::Format("25:00".to_string()),
        ]
    );
}

#[test]
fn inverted_interval_reported() {
    let draft = ScheduleDraft::new("UTC").with_interval(Weekday::Sat, "12:00", "12:00");

    let errors = validate(&draft).unwrap_err();

    assert_eq!(errors.len(), 1);
    assert!(matches!(
        errors.0[0].kind,
        ScheduleErrorKind::InvertedInterval { .. }
    ));
    assert_eq!(errors.0[0].day, Some(Weekday::Sat));
}

#[test]
fn all_violations_accumulate_in_check_order() {
    // Missing timezone, a format error on Monday, an inverted interval on
    // Wednesday and an overlap on Friday: four errors, none hidden.
    let draft = ScheduleDraft::new("")
        .with_interval(Weekday::Mon, "9:00", "10:00")
        .with_interval(Weekday::Wed, "15:00", "14:00")
        .with_interval(Weekday::Fri, "08:00", "12:00")
        .with_interval(Weekday::Fri, "11:00", "13:00");

    let errors = validate(&draft).unwrap_err();

    assert_eq!(errors.len(), 4);
    assert_eq!(errors.0[0].kind, ScheduleErrorKind::MissingTimezone);
    assert_eq!(errors.0[1].day, Some(Weekday::Mon));
    assert!(matches!(errors.0[1].kind, ScheduleErrorKind::Format(_)));
    assert_eq!(errors.0[2].day, Some(Weekday::Wed));
    assert!(matches!(
        errors.0[2].kind,
        ScheduleErrorKind::InvertedInterval { .. }
    ));
    assert_eq!(errors.0[3].day, Some(Weekday::Fri));
    assert!(matches!(errors.0[3].kind, ScheduleErrorKind::Overlap { .. }));
}

#[test]
fn invalid_intervals_are_left_out_of_overlap_check() {
    // The inverted 10:30-09:30 would "overlap" nothing meaningful; only the
    // inverted error is reported.
    let draft = ScheduleDraft::new("UTC")
        .with_interval(Weekday::Mon, "09:00", "10:00")
        .with_interval(Weekday::Mon, "10:30", "09:30");

    let errors = validate(&draft).unwrap_err();

    assert_eq!(errors.len(), 1);
    assert!(matches!(
        errors.0[0].kind,
        ScheduleErrorKind::InvertedInterval { .. }
    ));
}

#[test]
fn draft_parses_from_json() {
    let json = r#"{
        "timezone": "Europe/Berlin",
        "days": {
            "monday": [{"start": "09:00", "end": "12:00"}],
            "Fri": [{"start": "13:00", "end": "15:00"}]
        }
    }"#;

    let draft = ScheduleDraft::from_json(json).unwrap();
    let schedule = validate(&draft).unwrap();

    assert_eq!(schedule.day(Weekday::Mon), &[iv("09:00", "12:00")]);
    assert_eq!(schedule.day(Weekday::Fri), &[iv("13:00", "15:00")]);
}

#[test]
fn validated_schedule_converts_back_to_draft() {
    let draft = ScheduleDraft::new("Asia/Tbilisi")
        .with_interval(Weekday::Mon, "09:00", "12:00")
        .with_interval(Weekday::Tue, "10:00", "11:00");

    let schedule = validate(&draft).unwrap();

    assert_eq!(schedule.to_draft(), draft);
}

#[test]
fn error_messages_name_the_day() {
    let draft = ScheduleDraft::new("UTC").with_interval(Weekday::Tue, "xx", "10:00");

    let message = validate(&draft).unwrap_err().to_string();

    assert!(message.contains("Tue"), "got: {}", message);
    assert!(message.contains("'xx'"), "got: {}", message);
}
