//! Validation helpers for DTOs.

use validator::ValidationError;

use crate::dao::models::{parse_date, parse_time};

/// Validates a local calendar date written as `YYYY-MM-DD`.
///
/// # Examples
///
/// ```ignore
/// validate_event_date("2026-10-18") // Ok
/// validate_event_date("18/10/2026") // Err - wrong layout
/// validate_event_date("2026-02-30") // Err - no such day
/// ```
pub fn validate_event_date(value: &str) -> Result<(), ValidationError> {
    parse_date(value).map(|_| ()).map_err(|err| {
        let mut error = ValidationError::new("event_date_format");
        error.message = Some(format!("Date must be written as YYYY-MM-DD ({err})").into());
        error
    })
}

/// Validates a local kick-off time written as `HH:MM` on a 24-hour clock.
pub fn validate_start_time(value: &str) -> Result<(), ValidationError> {
    parse_time(value).map(|_| ()).map_err(|err| {
        let mut error = ValidationError::new("start_time_format");
        error.message = Some(format!("Start time must be written as HH:MM ({err})").into());
        error
    })
}
