use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::lifecycle::TickResponse, error::AppError, services::lifecycle_service,
    state::SharedState,
};

/// Run one lifecycle pass over every event.
///
/// Meant to be hit by an external scheduler; overlapping or retried calls are safe.
#[utoipa::path(
    method(get, post),
    path = "/lifecycle/tick",
    tag = "lifecycle",
    responses(
        (status = 200, description = "Pass completed", body = TickResponse),
        (status = 503, description = "Storage unavailable")
    )
)]
pub async fn tick(State(state): State<SharedState>) -> Result<Json<TickResponse>, AppError> {
    let report = lifecycle_service::run_tick(&state).await?;
    Ok(Json(report.into()))
}

/// Configure the lifecycle trigger routes.
pub fn router() -> Router<SharedState> {
    Router::new().route("/lifecycle/tick", get(tick).post(tick))
}
