use serde::Serialize;
use tracing::warn;

use crate::{
    dao::models::{AwardPollEntity, EventEntity, ReminderThreshold},
    dto::{
        format_instant,
        sse::{
            EventFinishedEvent, EventResetEvent, PollFinalizedEvent, PollOpenedEvent,
            ReminderSentEvent, ServerEvent, SystemStatus,
        },
    },
    state::SharedState,
};

const EVENT_FINISHED: &str = "event.finished";
const EVENT_REMINDER_SENT: &str = "reminder.sent";
const EVENT_POLL_OPENED: &str = "poll.opened";
const EVENT_POLL_FINALIZED: &str = "poll.finalized";
const EVENT_RESET: &str = "event.reset";
const EVENT_SYSTEM_STATUS: &str = "system.status";

/// Broadcast that an event passed its scheduled end.
pub fn broadcast_event_finished(state: &SharedState, event: &EventEntity) {
    let payload = EventFinishedEvent {
        event_id: event.id,
        code: event.code.clone(),
    };
    send_lifecycle_event(state, EVENT_FINISHED, &payload);
}

/// Broadcast that a pre-match reminder went out.
pub fn broadcast_reminder_sent(
    state: &SharedState,
    event: &EventEntity,
    threshold: ReminderThreshold,
) {
    let payload = ReminderSentEvent {
        event_id: event.id,
        hours: threshold.hours(),
    };
    send_lifecycle_event(state, EVENT_REMINDER_SENT, &payload);
}

/// Broadcast that the award poll opened.
pub fn broadcast_poll_opened(state: &SharedState, poll: &AwardPollEntity) {
    let payload = PollOpenedEvent {
        event_id: poll.event_id,
        poll_id: poll.id,
        ends_at: poll.ends_at.map(format_instant),
    };
    send_lifecycle_event(state, EVENT_POLL_OPENED, &payload);
}

/// Broadcast a finalized poll and its winner.
pub fn broadcast_poll_finalized(state: &SharedState, poll: &AwardPollEntity) {
    let payload = PollFinalizedEvent {
        event_id: poll.event_id,
        poll_id: poll.id,
        winner_participant_id: poll.winner_participant_id,
    };
    send_lifecycle_event(state, EVENT_POLL_FINALIZED, &payload);
}

/// Broadcast that an event was recycled.
pub fn broadcast_event_reset(state: &SharedState, event: &EventEntity) {
    let payload = EventResetEvent {
        event_id: event.id,
        code: event.code.clone(),
    };
    send_lifecycle_event(state, EVENT_RESET, &payload);
}

/// Broadcast the degraded flag.
pub fn broadcast_system_status(state: &SharedState, degraded: bool) {
    send_lifecycle_event(state, EVENT_SYSTEM_STATUS, &SystemStatus { degraded });
}

fn send_lifecycle_event(state: &SharedState, event: &str, payload: &impl Serialize) {
    match ServerEvent::json(Some(event.to_string()), payload) {
        Ok(event) => state.lifecycle_sse().broadcast(event),
        Err(err) => warn!(event, error = %err, "failed to serialize lifecycle SSE payload"),
    }
}
