use serde::Serialize;
use utoipa::ToSchema;

use crate::services::lifecycle_service::TickReport;

/// Counters describing what a lifecycle tick did.
#[derive(Debug, Serialize, ToSchema)]
pub struct TickResponse {
    /// Notifications claimed and dispatched (reminders, poll opened, results).
    pub notifications: usize,
    /// Events recycled for their next roster generation.
    pub resets: usize,
    /// Events moved from open to finished.
    pub finished: usize,
    /// Polls finalized by this tick.
    pub finalized: usize,
    /// Events whose processing failed and will be retried next tick.
    pub failed_events: usize,
}

impl From<TickReport> for TickResponse {
    fn from(report: TickReport) -> Self {
        Self {
            notifications: report.notifications,
            resets: report.resets,
            finished: report.finished,
            finalized: report.finalized,
            failed_events: report.failed_events,
        }
    }
}
