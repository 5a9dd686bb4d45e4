pub mod memory;
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use crate::dao::models::{
    AwardEntity, AwardPollEntity, EventEntity, EventStatus, ParticipantEntity, PollResult,
    ReminderThreshold, SubscriptionEntity, VoteEntity,
};
use crate::dao::storage::StorageResult;
use futures::future::BoxFuture;
use time::{Date, Time};
use uuid::Uuid;

pub use memory::MemoryEventStore;

/// Abstraction over the persistence layer for events, polls and their roster data.
///
/// Methods returning `bool` are conditional writes: `true` means this call
/// applied the change, `false` means the guarded condition no longer held
/// (another writer got there first or the row is gone).
pub trait EventStore: Send + Sync {
    fn save_event(&self, event: EventEntity) -> BoxFuture<'static, StorageResult<()>>;
    fn find_event(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<EventEntity>>>;
    fn find_event_by_code(
        &self,
        code: String,
    ) -> BoxFuture<'static, StorageResult<Option<EventEntity>>>;
    fn list_events_by_status(
        &self,
        status: EventStatus,
    ) -> BoxFuture<'static, StorageResult<Vec<EventEntity>>>;
    /// Set the reminder flag for `threshold` where it is still false.
    fn mark_reminder_sent(
        &self,
        event_id: Uuid,
        threshold: ReminderThreshold,
    ) -> BoxFuture<'static, StorageResult<bool>>;
    /// Move an open event to finished.
    fn mark_event_finished(&self, event_id: Uuid) -> BoxFuture<'static, StorageResult<bool>>;
    /// Replace the schedule of an open event and clear its reminder flags.
    fn reschedule_event(
        &self,
        event_id: Uuid,
        date: Option<Date>,
        start_time: Option<Time>,
    ) -> BoxFuture<'static, StorageResult<bool>>;
    /// Wipe the roster and poll of a finished event and reopen it, in one transaction.
    fn reset_event(&self, event_id: Uuid) -> BoxFuture<'static, StorageResult<bool>>;
    /// Insert `poll` unless the event already has one; returns the stored row.
    ///
    /// Applies only while the event is finished in roster `generation`; `None`
    /// means the event moved on (reset or reopened) and no poll was touched.
    fn ensure_award_poll(
        &self,
        poll: AwardPollEntity,
        generation: u32,
    ) -> BoxFuture<'static, StorageResult<Option<AwardPollEntity>>>;
    fn find_award_poll(
        &self,
        event_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<AwardPollEntity>>>;
    fn find_award_poll_by_id(
        &self,
        poll_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<AwardPollEntity>>>;
    /// Set `notif_sent` where it is still false.
    fn mark_poll_notified(&self, poll_id: Uuid) -> BoxFuture<'static, StorageResult<bool>>;
    /// Set `finalized` where it is still false and grant the award, in one transaction.
    fn finalize_award_poll(
        &self,
        poll_id: Uuid,
        result: PollResult,
    ) -> BoxFuture<'static, StorageResult<bool>>;
    fn list_votes(&self, poll_id: Uuid) -> BoxFuture<'static, StorageResult<Vec<VoteEntity>>>;
    /// Store a ballot, replacing any previous ballot from the same voter.
    fn save_vote(&self, vote: VoteEntity) -> BoxFuture<'static, StorageResult<()>>;
    fn list_participants(
        &self,
        event_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<ParticipantEntity>>>;
    fn find_award(&self, user_id: Uuid) -> BoxFuture<'static, StorageResult<Option<AwardEntity>>>;
    fn list_subscriptions(&self) -> BoxFuture<'static, StorageResult<Vec<SubscriptionEntity>>>;
    fn save_subscription(
        &self,
        subscription: SubscriptionEntity,
    ) -> BoxFuture<'static, StorageResult<()>>;
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
