use time::{OffsetDateTime, format_description::well_known::Rfc3339};

pub mod event;
pub mod health;
pub mod lifecycle;
pub mod poll;
pub mod sse;
pub mod subscription;
pub mod validation;

/// Render an instant as RFC 3339 for API payloads.
pub fn format_instant(instant: OffsetDateTime) -> String {
    instant
        .format(&Rfc3339)
        .unwrap_or_else(|_| "invalid-timestamp".into())
}
