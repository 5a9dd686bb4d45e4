use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Clone, Debug)]
/// Dispatched payload carried across SSE channels.
pub struct ServerEvent {
    pub event: Option<String>,
    pub data: String,
}

impl ServerEvent {
    /// Convenience wrapper that serialises `payload` into the SSE data field.
    pub fn json<E, T>(event: E, payload: &T) -> serde_json::Result<Self>
    where
        E: Into<Option<String>>,
        T: Serialize,
    {
        Ok(Self {
            event: event.into(),
            data: serde_json::to_string(payload)?,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
/// Initial metadata sent to an SSE client when it connects.
pub struct Handshake {
    /// Identifier of the SSE stream.
    pub stream: String,
    /// Whether the backend is running without a storage backend connection.
    pub degraded: bool,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when the backend enters or leaves degraded mode.
pub struct SystemStatus {
    pub degraded: bool,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when an open event passes its scheduled end.
pub struct EventFinishedEvent {
    pub event_id: Uuid,
    pub code: String,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast after a pre-match reminder was claimed and dispatched.
pub struct ReminderSentEvent {
    pub event_id: Uuid,
    /// Hour mark of the reminder (3, 2 or 1).
    pub hours: i64,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast once the award poll starts accepting votes.
pub struct PollOpenedEvent {
    pub event_id: Uuid,
    pub poll_id: Uuid,
    pub ends_at: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when an award poll has been finalized.
pub struct PollFinalizedEvent {
    pub event_id: Uuid,
    pub poll_id: Uuid,
    pub winner_participant_id: Option<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast after an event was recycled for its next roster generation.
pub struct EventResetEvent {
    pub event_id: Uuid,
    pub code: String,
}
