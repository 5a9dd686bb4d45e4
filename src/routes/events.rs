use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
};
use axum_valid::Valid;

use crate::{
    dto::{
        event::{CreateEventRequest, EventView, RescheduleRequest},
        poll::AwardPollView,
    },
    error::AppError,
    services::{award_service, event_service},
    state::SharedState,
};

/// Event creation, lookup and scheduling routes.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/events", post(create_event))
        .route("/events/{code}", get(get_event))
        .route("/events/{code}/schedule", put(reschedule_event))
        .route("/events/{code}/award-poll", get(get_event_poll))
}

/// Create an open event with a generated shareable code.
#[utoipa::path(
    post,
    path = "/events",
    tag = "events",
    request_body = CreateEventRequest,
    responses(
        (status = 201, description = "Event created", body = EventView),
        (status = 400, description = "Invalid payload")
    )
)]
pub async fn create_event(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<CreateEventRequest>>,
) -> Result<(StatusCode, Json<EventView>), AppError> {
    let event = event_service::create_event(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// Fetch an event and its computed windows.
#[utoipa::path(
    get,
    path = "/events/{code}",
    tag = "events",
    params(("code" = String, Path, description = "Shareable event code")),
    responses(
        (status = 200, description = "Event", body = EventView),
        (status = 404, description = "Unknown code")
    )
)]
pub async fn get_event(
    State(state): State<SharedState>,
    Path(code): Path<String>,
) -> Result<Json<EventView>, AppError> {
    Ok(Json(event_service::get_event(&state, code).await?))
}

/// Replace the schedule of an open event and re-arm its reminders.
#[utoipa::path(
    put,
    path = "/events/{code}/schedule",
    tag = "events",
    params(("code" = String, Path, description = "Shareable event code")),
    request_body = RescheduleRequest,
    responses(
        (status = 200, description = "Event rescheduled", body = EventView),
        (status = 404, description = "Unknown code"),
        (status = 409, description = "Event already finished")
    )
)]
pub async fn reschedule_event(
    State(state): State<SharedState>,
    Path(code): Path<String>,
    Valid(Json(payload)): Valid<Json<RescheduleRequest>>,
) -> Result<Json<EventView>, AppError> {
    Ok(Json(
        event_service::reschedule_event(&state, code, payload).await?,
    ))
}

/// Read the award poll of an event, finalizing it when its window has closed.
#[utoipa::path(
    get,
    path = "/events/{code}/award-poll",
    tag = "polls",
    params(("code" = String, Path, description = "Shareable event code")),
    responses(
        (status = 200, description = "Award poll with votes and tallies", body = AwardPollView),
        (status = 404, description = "Unknown code or poll not opened yet")
    )
)]
pub async fn get_event_poll(
    State(state): State<SharedState>,
    Path(code): Path<String>,
) -> Result<Json<AwardPollView>, AppError> {
    Ok(Json(award_service::get_event_poll(&state, code).await?))
}
