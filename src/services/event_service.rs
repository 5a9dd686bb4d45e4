use rand::Rng;
use time::{Date, Time};
use tracing::info;
use uuid::Uuid;

use crate::{
    dao::models::{EventEntity, SubscriptionEntity, parse_date, parse_time},
    dto::{
        event::{CreateEventRequest, EventView, RescheduleRequest},
        subscription::{SubscriptionRequest, SubscriptionView},
    },
    error::ServiceError,
    state::{SharedState, windows::EventWindows},
};

/// Characters used for shareable codes; look-alikes (0/O, 1/I) are left out.
const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
const CODE_LENGTH: usize = 6;
const CODE_ATTEMPTS: usize = 8;

/// Create an open event with a fresh shareable code.
pub async fn create_event(
    state: &SharedState,
    request: CreateEventRequest,
) -> Result<EventView, ServiceError> {
    let store = state.require_event_store().await?;
    let (date, start_time) =
        parse_schedule(request.date.as_deref(), request.start_time.as_deref())?;

    let mut code = None;
    for _ in 0..CODE_ATTEMPTS {
        let candidate = generate_code();
        if store.find_event_by_code(candidate.clone()).await?.is_none() {
            code = Some(candidate);
            break;
        }
    }
    let code = code.ok_or_else(|| {
        ServiceError::InvalidState("could not allocate a unique event code".into())
    })?;

    let event = EventEntity::new(
        code,
        request.name,
        date,
        start_time,
        request.duration_minutes,
        state.now(),
    );
    store.save_event(event.clone()).await?;
    info!(event_id = %event.id, code = %event.code, "event created");

    Ok(view(state, &event))
}

/// Look an event up by its shareable code.
pub async fn get_event(state: &SharedState, code: String) -> Result<EventView, ServiceError> {
    let store = state.require_event_store().await?;
    let event = store
        .find_event_by_code(code.clone())
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("event `{code}`")))?;
    Ok(view(state, &event))
}

/// Set the schedule of the current roster generation.
///
/// Only open events can be rescheduled; pending reminders are re-armed.
pub async fn reschedule_event(
    state: &SharedState,
    code: String,
    request: RescheduleRequest,
) -> Result<EventView, ServiceError> {
    let store = state.require_event_store().await?;
    let (date, start_time) =
        parse_schedule(request.date.as_deref(), request.start_time.as_deref())?;
    let event = store
        .find_event_by_code(code.clone())
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("event `{code}`")))?;

    if !store.reschedule_event(event.id, date, start_time).await? {
        return Err(ServiceError::InvalidState(format!(
            "event `{code}` has finished; wait for the next roster generation"
        )));
    }
    info!(event_id = %event.id, code = %event.code, "event rescheduled");

    let event = store
        .find_event(event.id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("event `{code}`")))?;
    Ok(view(state, &event))
}

/// Register a push delivery target.
pub async fn register_subscription(
    state: &SharedState,
    request: SubscriptionRequest,
) -> Result<SubscriptionView, ServiceError> {
    let store = state.require_event_store().await?;
    let subscription = SubscriptionEntity {
        id: Uuid::new_v4(),
        user_id: request.user_id,
        endpoint: request.endpoint,
        created_at: state.now(),
    };
    store.save_subscription(subscription.clone()).await?;
    Ok(subscription.into())
}

fn view(state: &SharedState, event: &EventEntity) -> EventView {
    EventView::new(event, EventWindows::compute(event, state.window_settings()))
}

fn parse_schedule(
    date: Option<&str>,
    start_time: Option<&str>,
) -> Result<(Option<Date>, Option<Time>), ServiceError> {
    let date = date
        .map(parse_date)
        .transpose()
        .map_err(|err| ServiceError::InvalidInput(format!("invalid date: {err}")))?;
    let start_time = start_time
        .map(parse_time)
        .transpose()
        .map_err(|err| ServiceError::InvalidInput(format!("invalid start time: {err}")))?;
    Ok((date, start_time))
}

fn generate_code() -> String {
    let mut rng = rand::rng();
    (0..CODE_LENGTH)
        .map(|_| char::from(CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())]))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use time::macros::{date, datetime, time};

    use super::*;
    use crate::{
        config::AppConfig,
        dao::{
            event_store::{EventStore, MemoryEventStore},
            models::EventStatus,
        },
        services::notification_service::NotificationDispatcher,
        state::{AppState, clock::FixedClock},
    };

    async fn state_with_store() -> (SharedState, MemoryEventStore) {
        let state = AppState::with_clock(
            AppConfig::default(),
            NotificationDispatcher::disabled(),
            Arc::new(FixedClock::new(datetime!(2026-10-18 09:00 UTC))),
        );
        let store = MemoryEventStore::new();
        state.set_event_store(Arc::new(store.clone())).await;
        (state, store)
    }

    fn request(date: Option<&str>, start_time: Option<&str>) -> CreateEventRequest {
        CreateEventRequest {
            name: "Sunday league".into(),
            date: date.map(str::to_owned),
            start_time: start_time.map(str::to_owned),
            duration_minutes: 90,
        }
    }

    #[test]
    fn generated_codes_use_the_alphabet() {
        let code = generate_code();
        assert_eq!(code.len(), CODE_LENGTH);
        assert!(code.bytes().all(|byte| CODE_ALPHABET.contains(&byte)));
    }

    #[tokio::test]
    async fn created_event_exposes_its_windows() {
        let (state, _) = state_with_store().await;

        let view = create_event(&state, request(Some("2026-10-18"), Some("19:30")))
            .await
            .unwrap();

        assert_eq!(view.status, "open");
        let windows = view.windows.expect("scheduled event has windows");
        assert_eq!(windows.starts_at, "2026-10-18T19:30:00Z");
        assert_eq!(windows.poll_closes_at, "2026-10-18T21:40:00Z");

        let fetched = get_event(&state, view.code.clone()).await.unwrap();
        assert_eq!(fetched.id, view.id);
    }

    #[tokio::test]
    async fn unscheduled_event_has_no_windows() {
        let (state, _) = state_with_store().await;
        let view = create_event(&state, request(None, None)).await.unwrap();
        assert!(view.windows.is_none());
    }

    #[tokio::test]
    async fn reschedule_rearms_reminders() {
        let (state, store) = state_with_store().await;
        let view = create_event(&state, request(None, None)).await.unwrap();
        store
            .mark_reminder_sent(view.id, crate::dao::models::ReminderThreshold::OneHour)
            .await
            .unwrap();

        let updated = reschedule_event(
            &state,
            view.code.clone(),
            RescheduleRequest {
                date: Some("2026-10-25".into()),
                start_time: Some("18:00".into()),
            },
        )
        .await
        .unwrap();

        assert!(updated.reminders_sent.is_empty());
        let stored = store.find_event(view.id).await.unwrap().unwrap();
        assert_eq!(stored.date, Some(date!(2026 - 10 - 25)));
        assert_eq!(stored.start_time, Some(time!(18:00)));
    }

    #[tokio::test]
    async fn finished_event_cannot_be_rescheduled() {
        let (state, store) = state_with_store().await;
        let view = create_event(&state, request(None, None)).await.unwrap();
        let mut event = store.find_event(view.id).await.unwrap().unwrap();
        event.status = EventStatus::Finished;
        store.save_event(event).await.unwrap();

        let result = reschedule_event(
            &state,
            view.code,
            RescheduleRequest {
                date: Some("2026-10-25".into()),
                start_time: Some("18:00".into()),
            },
        )
        .await;

        assert!(matches!(result, Err(ServiceError::InvalidState(_))));
    }

    #[tokio::test]
    async fn unknown_code_is_not_found() {
        let (state, _) = state_with_store().await;
        assert!(matches!(
            get_event(&state, "NOPE42".into()).await,
            Err(ServiceError::NotFound(_))
        ));
    }
}
