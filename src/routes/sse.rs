use std::convert::Infallible;

use axum::{Router, extract::State, response::sse::Sse, routing::get};
use futures::Stream;
use tracing::info;

use crate::{services::sse_service, state::SharedState};

#[utoipa::path(
    get,
    path = "/sse/lifecycle",
    tag = "sse",
    responses((status = 200, description = "Lifecycle SSE stream", content_type = "text/event-stream", body = String))
)]
/// Stream lifecycle transitions to connected frontends, starting with a handshake.
pub async fn lifecycle_stream(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<axum::response::sse::Event, Infallible>>> {
    let receiver = sse_service::subscribe_lifecycle(&state);
    info!("New lifecycle SSE connection");
    sse_service::to_sse_stream(receiver, sse_service::handshake(&state))
}

/// Configure the SSE endpoints.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/sse/lifecycle", get(lifecycle_stream))
}
