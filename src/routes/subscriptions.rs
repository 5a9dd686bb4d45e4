use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use axum_valid::Valid;

use crate::{
    dto::subscription::{SubscriptionRequest, SubscriptionView},
    error::AppError,
    services::event_service,
    state::SharedState,
};

/// Push subscription routes.
pub fn router() -> Router<SharedState> {
    Router::new().route("/subscriptions", post(register_subscription))
}

/// Register an endpoint that receives lifecycle push notifications.
#[utoipa::path(
    post,
    path = "/subscriptions",
    tag = "subscriptions",
    request_body = SubscriptionRequest,
    responses(
        (status = 201, description = "Subscription stored", body = SubscriptionView),
        (status = 400, description = "Invalid endpoint")
    )
)]
pub async fn register_subscription(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<SubscriptionRequest>>,
) -> Result<(StatusCode, Json<SubscriptionView>), AppError> {
    let subscription = event_service::register_subscription(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(subscription)))
}
