/// Award poll finalization, voting and award lookups.
pub mod award_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Event creation, lookup and scheduling.
pub mod event_service;
/// Health check service.
pub mod health_service;
/// Time-driven lifecycle passes over every event.
pub mod lifecycle_service;
/// Push notification fan-out.
pub mod notification_service;
/// Push delivery providers.
pub mod push;
/// Server-Sent Events message generation.
pub mod sse_events;
/// Server-Sent Events broadcasting service.
pub mod sse_service;
/// Storage connection supervisor toggling degraded mode.
pub mod storage_supervisor;
