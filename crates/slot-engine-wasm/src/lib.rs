//! WASM bindings for slot-engine.
//!
//! Exposes schedule validation, slot generation and session pricing to the
//! booking UI via `wasm-bindgen`. All complex types are passed as JSON strings.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p slot-engine-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target web --out-dir pkg/ \
//!   target/wasm32-unknown-unknown/release/slot_engine_wasm.wasm
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use slot_engine::{
    price_offer, validate, Booking, DayBookings, FeeTable, LegalStatus, MentorId, ScheduleDraft,
    ScheduleError, SlotGenerator,
};
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// Serde-friendly DTOs for crossing the WASM boundary as JSON
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct ValidationDto {
    ok: bool,
    errors: Vec<ScheduleErrorDto>,
}

#[derive(Serialize)]
struct ScheduleErrorDto {
    /// Short lowercase day (`"tue"`), absent for week-level errors.
    day: Option<String>,
    kind: &'static str,
    message: String,
}

impl From<&ScheduleError> for ScheduleErrorDto {
    fn from(e: &ScheduleError) -> Self {
        Self {
            day: e.day.map(|d| format!("{:?}", d).to_lowercase()),
            kind: e.kind.code(),
            message: e.kind.to_string(),
        }
    }
}

/// Input format for bookings passed from JavaScript. The mentor is implied.
#[derive(Deserialize)]
struct BookingInput {
    start: DateTime<Utc>,
    duration_minutes: u32,
}

// ---------------------------------------------------------------------------
// JSON-level implementations (testable without a JS host)
// ---------------------------------------------------------------------------

fn validate_schedule_json(draft_json: &str) -> Result<String, String> {
    let draft = ScheduleDraft::from_json(draft_json).map_err(|e| e.to_string())?;
    let dto = match validate(&draft) {
        Ok(_) => ValidationDto {
            ok: true,
            errors: Vec::new(),
        },
        Err(errors) => ValidationDto {
            ok: false,
            errors: errors.iter().map(ScheduleErrorDto::from).collect(),
        },
    };
    to_json(&dto)
}

fn generate_slots_json(
    schedule_json: &str,
    date: &str,
    viewer_timezone: &str,
    duration_minutes: i32,
    bookings_json: &str,
) -> Result<String, String> {
    let draft = ScheduleDraft::from_json(schedule_json).map_err(|e| e.to_string())?;
    let availability = validate(&draft).map_err(|e| e.to_string())?;
    let date: NaiveDate = date
        .parse()
        .map_err(|e| format!("Invalid date '{}': {}", date, e))?;
    let viewer_tz: Tz = viewer_timezone
        .parse()
        .map_err(|_| format!("Invalid timezone: {}", viewer_timezone))?;
    let generator = SlotGenerator::new(i64::from(duration_minutes)).map_err(|e| e.to_string())?;

    let mentor = MentorId::new("viewer");
    let inputs: Vec<BookingInput> = serde_json::from_str(bookings_json)
        .map_err(|e| format!("Invalid bookings JSON: {}", e))?;
    let bookings = inputs
        .into_iter()
        .map(|b| Booking::new(mentor.clone(), b.start, b.duration_minutes))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| e.to_string())?;
    let day = DayBookings::collect(&bookings, &mentor, date, availability.timezone());

    to_json(&generator.generate(&availability, date, viewer_tz, &day))
}

fn compute_price_json(
    price: i32,
    status: &str,
    fee_table_json: Option<&str>,
) -> Result<String, String> {
    let status: LegalStatus = serde_json::from_value(serde_json::Value::String(status.to_string()))
        .map_err(|_| format!("Unknown legal status: {}", status))?;
    let table = match fee_table_json {
        Some(json) => FeeTable::from_json(json).map_err(|e| e.to_string())?,
        None => FeeTable::default(),
    };
    let breakdown = price_offer(i64::from(price), status, &table).map_err(|e| e.to_string())?;
    to_json(&breakdown)
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("Serialization error: {}", e))
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

/// Validate a schedule draft.
///
/// Returns `{"ok": bool, "errors": [{day, kind, message}]}`. Validation
/// failures are data, not exceptions; only malformed JSON throws.
#[wasm_bindgen(js_name = "validateSchedule")]
pub fn validate_schedule(draft_json: &str) -> Result<String, JsValue> {
    validate_schedule_json(draft_json).map_err(|e| JsValue::from_str(&e))
}

/// Bookable slots for a mentor-local date.
///
/// # Arguments
/// - `schedule_json` -- schedule draft (validated here)
/// - `date` -- mentor-local date, `YYYY-MM-DD`
/// - `viewer_timezone` -- IANA zone for `display_time`
/// - `duration_minutes` -- slot length, must be positive
/// - `bookings_json` -- JSON array of `{start, duration_minutes}`
#[wasm_bindgen(js_name = "generateSlots")]
pub fn generate_slots(
    schedule_json: &str,
    date: &str,
    viewer_timezone: &str,
    duration_minutes: i32,
    bookings_json: &str,
) -> Result<String, JsValue> {
    generate_slots_json(
        schedule_json,
        date,
        viewer_timezone,
        duration_minutes,
        bookings_json,
    )
    .map_err(|e| JsValue::from_str(&e))
}

/// Price a session. `status` is `"individual_entrepreneur"` or
/// `"private_individual"`; `fee_table_json` optionally overrides the defaults.
#[wasm_bindgen(js_name = "computePrice")]
pub fn compute_price(
    price: i32,
    status: &str,
    fee_table_json: Option<String>,
) -> Result<String, JsValue> {
    compute_price_json(price, status, fee_table_json.as_deref()).map_err(|e| JsValue::from_str(&e))
}
