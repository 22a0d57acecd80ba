//! Schedule validation run before a mentor's availability is saved.
//!
//! Checks run in a fixed order and never short-circuit: the editor must be able
//! to show every problem at once.
//!
//! 1. timezone present (and a known IANA zone)
//! 2. at least one interval somewhere in the week
//! 3. each interval end is a valid `HH:MM`
//! 4. each interval starts strictly before it ends
//! 5. per day, sorted intervals do not overlap their neighbour

use chrono::Weekday;
use chrono_tz::Tz;
use tracing::debug;

use crate::error::{ScheduleError, ScheduleErrorKind, ScheduleErrors};
use crate::schedule::{DraftInterval, ScheduleDraft, WeeklyAvailability, WEEK};
use crate::time::{TimeInterval, TimeOfDay};

/// Validate a draft, returning the normalized schedule or every error found.
pub fn validate(draft: &ScheduleDraft) -> Result<WeeklyAvailability, ScheduleErrors> {
    let mut errors = Vec::new();

    let timezone = check_timezone(&draft.timezone, &mut errors);

    if draft.interval_count() == 0 {
        errors.push(ScheduleError::week(ScheduleErrorKind::EmptySchedule));
    }

    let mut days: [Vec<TimeInterval>; 7] = Default::default();
    for (slot, day) in days.iter_mut().zip(WEEK) {
        *slot = check_day(day, draft.day(day), &mut errors);
    }

    match timezone {
        Some(tz) if errors.is_empty() => Ok(WeeklyAvailability::from_validated(tz, days)),
        _ => {
            debug!(
                errors = errors.len(),
                timezone = %draft.timezone,
                "schedule draft rejected"
            );
            Err(ScheduleErrors(errors))
        }
    }
}

fn check_timezone(raw: &str, errors: &mut Vec<ScheduleError>) -> Option<Tz> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        errors.push(ScheduleError::week(ScheduleErrorKind::MissingTimezone));
        return None;
    }
    match trimmed.parse::<Tz>() {
        Ok(tz) => Some(tz),
        Err(_) => {
            errors.push(ScheduleError::week(ScheduleErrorKind::UnknownTimezone(
                raw.to_string(),
            )));
            None
        }
    }
}

/// Run checks 3-5 for one day and return the intervals that passed 3 and 4,
/// sorted by start.
fn check_day(
    day: Weekday,
    drafts: &[DraftInterval],
    errors: &mut Vec<ScheduleError>,
) -> Vec<TimeInterval> {
    let mut intervals = Vec::with_capacity(drafts.len());

    for draft in drafts {
        let start = parse_time(day, &draft.start, errors);
        let end = parse_time(day, &draft.end, errors);
        let (Some(start), Some(end)) = (start, end) else {
            continue;
        };
        match TimeInterval::new(start, end) {
            Ok(interval) => intervals.push(interval),
            Err(_) => errors.push(ScheduleError::on(
                day,
                ScheduleErrorKind::InvertedInterval { start, end },
            )),
        }
    }

    intervals.sort_by_key(|i| (i.start(), i.end()));

    for pair in intervals.windows(2) {
        if let [first, second] = pair {
            if first.overlaps(second) {
                errors.push(ScheduleError::on(
                    day,
                    ScheduleErrorKind::Overlap {
                        first: *first,
                        second: *second,
                    },
                ));
            }
        }
    }

    intervals
}

fn parse_time(day: Weekday, raw: &str, errors: &mut Vec<ScheduleError>) -> Option<TimeOfDay> {
    match TimeOfDay::parse(raw) {
        Ok(time) => Some(time),
        Err(_) => {
            errors.push(ScheduleError::on(
                day,
                ScheduleErrorKind::Format(raw.to_string()),
            ));
            None
        }
    }
}
