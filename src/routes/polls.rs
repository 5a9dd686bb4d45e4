use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    dto::poll::{AwardView, VoteRequest, VoteView},
    error::AppError,
    services::award_service,
    state::SharedState,
};

/// Voting and award lookup routes.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/award-polls/{poll_id}/votes", post(submit_vote))
        .route("/users/{user_id}/award", get(get_award))
}

/// Cast or replace a ballot in an open award poll.
#[utoipa::path(
    post,
    path = "/award-polls/{poll_id}/votes",
    tag = "polls",
    params(("poll_id" = String, Path, description = "Identifier of the award poll")),
    request_body = VoteRequest,
    responses(
        (status = 200, description = "Vote recorded", body = VoteView),
        (status = 400, description = "Voter or target is not a participant"),
        (status = 404, description = "Unknown poll"),
        (status = 409, description = "Poll not active")
    )
)]
pub async fn submit_vote(
    State(state): State<SharedState>,
    Path(poll_id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<VoteRequest>>,
) -> Result<Json<VoteView>, AppError> {
    Ok(Json(
        award_service::submit_vote(&state, poll_id, payload).await?,
    ))
}

/// Player of the match tally for a registered user.
#[utoipa::path(
    get,
    path = "/users/{user_id}/award",
    tag = "polls",
    params(("user_id" = String, Path, description = "Identifier of the user")),
    responses(
        (status = 200, description = "Award accumulator", body = AwardView),
        (status = 404, description = "User never won")
    )
)]
pub async fn get_award(
    State(state): State<SharedState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<AwardView>, AppError> {
    Ok(Json(award_service::get_award(&state, user_id).await?))
}
