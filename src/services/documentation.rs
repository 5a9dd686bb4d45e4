use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Matchday Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::sse::lifecycle_stream,
        crate::routes::lifecycle::tick,
        crate::routes::events::create_event,
        crate::routes::events::get_event,
        crate::routes::events::reschedule_event,
        crate::routes::events::get_event_poll,
        crate::routes::polls::submit_vote,
        crate::routes::polls::get_award,
        crate::routes::subscriptions::register_subscription,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::lifecycle::TickResponse,
            crate::dto::event::CreateEventRequest,
            crate::dto::event::RescheduleRequest,
            crate::dto::event::EventView,
            crate::dto::event::EventWindowsView,
            crate::dto::poll::VoteRequest,
            crate::dto::poll::VoteView,
            crate::dto::poll::TallyEntry,
            crate::dto::poll::AwardPollView,
            crate::dto::poll::AwardView,
            crate::dto::subscription::SubscriptionRequest,
            crate::dto::subscription::SubscriptionView,
            crate::dto::sse::Handshake,
            crate::dto::sse::SystemStatus,
            crate::dto::sse::EventFinishedEvent,
            crate::dto::sse::ReminderSentEvent,
            crate::dto::sse::PollOpenedEvent,
            crate::dto::sse::PollFinalizedEvent,
            crate::dto::sse::EventResetEvent,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "lifecycle", description = "Lifecycle driver passes"),
        (name = "events", description = "Event scheduling and lookup"),
        (name = "polls", description = "Player of the match voting and awards"),
        (name = "subscriptions", description = "Push notification targets"),
        (name = "sse", description = "Server-sent events streams"),
    )
)]
pub struct ApiDoc;
