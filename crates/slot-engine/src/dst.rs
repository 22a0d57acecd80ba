//! DST transition policies for resolving mentor-local clock times.
//!
//! The same `HH:MM` maps to a different UTC offset depending on the date, so
//! every conversion goes through the IANA rules for that exact local datetime.
//! Ambiguous times (clocks fall back) always resolve to the earlier instant.

use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Longest gap searched when shifting forward. Zones have skipped whole days.
const MAX_GAP_MINUTES: i64 = 24 * 60;

/// Policy for local times that fall in a DST gap (e.g. 02:30 during spring forward).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DstPolicy {
    /// Drop the time; no slot is offered there.
    #[default]
    Skip,
    /// Move to the first valid instant after the gap.
    ShiftForward,
}

/// Convert a local datetime in `timezone` to UTC under `policy`.
///
/// Returns `None` when the local time does not exist and the policy skips it.
pub fn resolve_local(
    timezone: Tz,
    local: NaiveDateTime,
    policy: DstPolicy,
) -> Option<DateTime<Utc>> {
    if let Some(dt) = timezone.from_local_datetime(&local).earliest() {
        return Some(dt.with_timezone(&Utc));
    }
    match policy {
        DstPolicy::Skip => None,
        DstPolicy::ShiftForward => (1..=MAX_GAP_MINUTES).find_map(|m| {
            timezone
                .from_local_datetime(&(local + Duration::minutes(m)))
                .earliest()
                .map(|dt| dt.with_timezone(&Utc))
        }),
    }
}

