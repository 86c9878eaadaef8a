pub mod list_event_logs;
pub mod save_option_event;
pub mod save_question_event;

use chrono::{DateTime, TimeZone, Utc};

use crate::application::dto::events::Lenient;
use crate::application::errors::FieldErrors;

const INVALID_FIELDS: &str = "Missing or invalid fields";

/// Positive database id taken from a loosely typed payload field.
fn check_id(
    errors: &mut FieldErrors,
    field: &str,
    label: &str,
    value: Option<&Lenient<i64>>,
) -> Option<u32> {
    let Some(value) = value else {
        errors.push(field, format!("{label} is required"));
        return None;
    };
    let id = value
        .valid()
        .and_then(|v| u32::try_from(*v).ok())
        .filter(|id| *id >= 1);
    if id.is_none() {
        errors.push(field, format!("{label} must be a positive integer"));
    }
    id
}

fn check_timestamp(errors: &mut FieldErrors, value: Option<&Lenient<i64>>) -> Option<DateTime<Utc>> {
    let Some(value) = value else {
        errors.push("timestamp", "Timestamp is required");
        return None;
    };
    let ts = value
        .valid()
        .filter(|ms| **ms > 0)
        .and_then(|ms| Utc.timestamp_millis_opt(*ms).single());
    if ts.is_none() {
        errors.push("timestamp", "Timestamp must be a positive integer");
    }
    ts
}
