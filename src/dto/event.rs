use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::models::{EventEntity, ReminderThreshold, format_date, format_time},
    dto::{
        format_instant,
        validation::{validate_event_date, validate_start_time},
    },
    state::windows::EventWindows,
};

/// Payload used to schedule a new event.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateEventRequest {
    #[validate(length(min = 1, max = 80))]
    pub name: String,
    /// Local calendar date (`YYYY-MM-DD`). Without it the event is never scheduled.
    #[serde(default)]
    #[validate(custom(function = "validate_event_date"))]
    pub date: Option<String>,
    /// Local kick-off time (`HH:MM`). Without it the event is never scheduled.
    #[serde(default)]
    #[validate(custom(function = "validate_start_time"))]
    pub start_time: Option<String>,
    #[validate(range(min = 1, max = 1440))]
    pub duration_minutes: u32,
}

/// New schedule for the current roster generation.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct RescheduleRequest {
    /// Local calendar date (`YYYY-MM-DD`); omit to unschedule.
    #[serde(default)]
    #[validate(custom(function = "validate_event_date"))]
    pub date: Option<String>,
    /// Local kick-off time (`HH:MM`); omit to unschedule.
    #[serde(default)]
    #[validate(custom(function = "validate_start_time"))]
    pub start_time: Option<String>,
}

/// Instants derived from the event schedule.
#[derive(Debug, Serialize, ToSchema)]
pub struct EventWindowsView {
    pub starts_at: String,
    pub ends_at: String,
    pub poll_opens_at: String,
    pub poll_closes_at: String,
}

impl From<EventWindows> for EventWindowsView {
    fn from(windows: EventWindows) -> Self {
        Self {
            starts_at: format_instant(windows.start),
            ends_at: format_instant(windows.end),
            poll_opens_at: format_instant(windows.poll_opens_at),
            poll_closes_at: format_instant(windows.poll_closes_at),
        }
    }
}

/// Event as exposed to clients.
#[derive(Debug, Serialize, ToSchema)]
pub struct EventView {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub date: Option<String>,
    pub start_time: Option<String>,
    pub duration_minutes: u32,
    /// `open` or `finished`.
    pub status: String,
    pub roster_locked: bool,
    pub lineup_locked: bool,
    /// Hour marks whose reminder already went out in this roster generation.
    pub reminders_sent: Vec<i64>,
    /// Absent while the event has no date or start time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub windows: Option<EventWindowsView>,
    pub created_at: String,
}

impl EventView {
    pub fn new(event: &EventEntity, windows: Option<EventWindows>) -> Self {
        Self {
            id: event.id,
            code: event.code.clone(),
            name: event.name.clone(),
            date: event.date.map(format_date),
            start_time: event.start_time.map(format_time),
            duration_minutes: event.duration_minutes,
            status: event.status.as_str().to_owned(),
            roster_locked: event.roster_locked,
            lineup_locked: event.lineup_locked,
            reminders_sent: ReminderThreshold::ALL
                .into_iter()
                .filter(|threshold| event.reminder_sent(*threshold))
                .map(|threshold| threshold.hours())
                .collect(),
            windows: windows.map(Into::into),
            created_at: format_instant(event.created_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(date: Option<&str>, start_time: Option<&str>) -> CreateEventRequest {
        CreateEventRequest {
            name: "Sunday league".into(),
            date: date.map(str::to_owned),
            start_time: start_time.map(str::to_owned),
            duration_minutes: 90,
        }
    }

    #[test]
    fn unscheduled_request_is_valid() {
        assert!(request(None, None).validate().is_ok());
    }

    #[test]
    fn malformed_schedule_is_rejected() {
        assert!(request(Some("2026-13-01"), None).validate().is_err());
        assert!(request(None, Some("25:00")).validate().is_err());
        assert!(request(Some("2026-10-18"), Some("19:30")).validate().is_ok());
    }

    #[test]
    fn zero_duration_is_rejected() {
        let mut payload = request(None, None);
        payload.duration_minutes = 0;
        assert!(payload.validate().is_err());
    }
}
