//! Lifecycle driver: one pass over every event applying reminders, the finish
//! transition, poll opening, finalization and the post-grace reset.
//!
//! Each step is guarded by a conditional write in the store, so a pass can be
//! triggered any number of times, from any number of places, without repeating
//! a side effect.

use std::{sync::Arc, time::Duration};

use time::OffsetDateTime;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info, warn};

use crate::{
    dao::{
        event_store::EventStore,
        models::{AwardPollEntity, EventEntity, EventStatus},
    },
    error::ServiceError,
    services::{award_service, notification_service, sse_events},
    state::{
        SharedState,
        windows::{EventWindows, WindowSettings},
    },
};

/// Counters accumulated over one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Notifications claimed and dispatched.
    pub notifications: usize,
    /// Events recycled for their next roster generation.
    pub resets: usize,
    /// Events moved from open to finished.
    pub finished: usize,
    /// Award polls finalized by this pass.
    pub finalized: usize,
    /// Events skipped because a step failed; retried on the next pass.
    pub failed_events: usize,
}

/// Run one pass at the state's current instant.
pub async fn run_tick(state: &SharedState) -> Result<TickReport, ServiceError> {
    let now = state.now();
    run_tick_at(state, now).await
}

/// Run one pass as of `now`.
///
/// A failure while listing events aborts the pass; a failure on one event is
/// logged and counted, and the pass moves on to the next event.
pub async fn run_tick_at(
    state: &SharedState,
    now: OffsetDateTime,
) -> Result<TickReport, ServiceError> {
    let store = state.require_event_store().await?;
    let settings = *state.window_settings();
    let mut report = TickReport::default();

    for event in store.list_events_by_status(EventStatus::Open).await? {
        if let Err(err) =
            process_open_event(state, &store, &settings, &event, now, &mut report).await
        {
            report.failed_events += 1;
            warn!(event_id = %event.id, error = %err, "lifecycle pass failed for open event");
        }
    }

    for event in store.list_events_by_status(EventStatus::Finished).await? {
        if let Err(err) =
            process_finished_event(state, &store, &settings, &event, now, &mut report).await
        {
            report.failed_events += 1;
            warn!(
                event_id = %event.id,
                error = %err,
                "lifecycle pass failed for finished event"
            );
        }
    }

    debug!(
        notifications = report.notifications,
        finished = report.finished,
        finalized = report.finalized,
        resets = report.resets,
        failed_events = report.failed_events,
        "lifecycle pass complete"
    );
    Ok(report)
}

/// Drive [`run_tick`] forever on a fixed period; a zero period returns at once.
pub async fn run_ticker(state: SharedState, period: Duration) {
    if period.is_zero() {
        warn!("lifecycle ticker needs a non-zero period; not starting");
        return;
    }
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    info!(?period, "in-process lifecycle ticker started");

    loop {
        ticker.tick().await;
        match run_tick(&state).await {
            Ok(report) if report != TickReport::default() => {
                info!(?report, "lifecycle tick applied changes");
            }
            Ok(_) => {}
            Err(ServiceError::Degraded) => debug!("lifecycle tick skipped; degraded mode"),
            Err(err) => warn!(error = %err, "lifecycle tick failed"),
        }
    }
}

async fn process_open_event(
    state: &SharedState,
    store: &Arc<dyn EventStore>,
    settings: &WindowSettings,
    event: &EventEntity,
    now: OffsetDateTime,
    report: &mut TickReport,
) -> Result<(), ServiceError> {
    let Some(windows) = EventWindows::compute(event, settings) else {
        return Ok(());
    };

    if let Some(threshold) = windows.due_reminder(now) {
        if !event.reminder_sent(threshold)
            && store.mark_reminder_sent(event.id, threshold).await?
        {
            let message = notification_service::reminder_message(event, threshold);
            state.notifier().dispatch(store, message).await;
            report.notifications += 1;
            sse_events::broadcast_reminder_sent(state, event, threshold);
        }
    }

    if now >= windows.end && store.mark_event_finished(event.id).await? {
        info!(event_id = %event.id, code = %event.code, "event finished");
        report.finished += 1;
        sse_events::broadcast_event_finished(state, event);
    }

    ensure_poll_open(state, store, event, &windows, now, report).await
}

async fn process_finished_event(
    state: &SharedState,
    store: &Arc<dyn EventStore>,
    settings: &WindowSettings,
    listed: &EventEntity,
    now: OffsetDateTime,
    report: &mut TickReport,
) -> Result<(), ServiceError> {
    // The listing may be stale; a concurrent pass could have recycled the event since.
    let Some(event) = store.find_event(listed.id).await? else {
        return Ok(());
    };
    if event.status != EventStatus::Finished {
        return Ok(());
    }
    let event = &event;

    if let Some(windows) = EventWindows::compute(event, settings) {
        ensure_poll_open(state, store, event, &windows, now, report).await?;
    }

    let Some(mut poll) = store.find_award_poll(event.id).await? else {
        return Ok(());
    };

    if poll.awaiting_finalization(now) {
        let outcome = award_service::finalize_poll(state, store, event, &poll, now).await?;
        if outcome.applied {
            report.finalized += 1;
        }
        if outcome.notified {
            report.notifications += 1;
        }
        match store.find_award_poll(event.id).await? {
            Some(current) => poll = current,
            None => return Ok(()),
        }
    }

    let Some(ends_at) = poll.ends_at else {
        return Ok(());
    };
    let Some(deadline) = settings.reset_deadline(ends_at) else {
        return Ok(());
    };
    if !poll.finalized || now < deadline {
        return Ok(());
    }

    if store.reset_event(event.id).await? {
        info!(event_id = %event.id, code = %event.code, "event recycled for next roster");
        report.resets += 1;
        sse_events::broadcast_event_reset(state, event);
    }
    Ok(())
}

/// Create the award poll once its opening instant has passed and announce it.
///
/// Shared by open and finished events. The announcement is skipped once voting
/// has closed; the results notification then claims the flag instead.
async fn ensure_poll_open(
    state: &SharedState,
    store: &Arc<dyn EventStore>,
    event: &EventEntity,
    windows: &EventWindows,
    now: OffsetDateTime,
    report: &mut TickReport,
) -> Result<(), ServiceError> {
    if now < windows.poll_opens_at {
        return Ok(());
    }

    let candidate = AwardPollEntity::open(event.id, windows.poll_opens_at, windows.poll_closes_at);
    let Some(poll) = store.ensure_award_poll(candidate, event.generation).await? else {
        debug!(event_id = %event.id, "event moved on before its poll opened");
        return Ok(());
    };
    if poll.finalized || poll.notif_sent || !poll.accepts_votes(now) {
        return Ok(());
    }

    if store.mark_poll_notified(poll.id).await? {
        info!(event_id = %event.id, poll_id = %poll.id, "award poll opened");
        let message = notification_service::poll_opened_message(event);
        state.notifier().dispatch(store, message).await;
        report.notifications += 1;
        sse_events::broadcast_poll_opened(state, &poll);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use futures::{FutureExt, future::BoxFuture};
    use time::{
        Date, Duration, Time,
        macros::{date, datetime, time},
    };
    use uuid::Uuid;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::{
            event_store::MemoryEventStore,
            models::{
                AssignmentEntity, AwardEntity, LineupPositionEntity, ParticipantEntity,
                PollResult, ReminderThreshold, SubscriptionEntity, TeamEntity, VoteEntity,
            },
            storage::{StorageError, StorageResult},
        },
        services::{
            notification_service::NotificationDispatcher, push::testing::RecordingPushProvider,
        },
        state::{AppState, clock::FixedClock},
    };

    const NOW: OffsetDateTime = datetime!(2026-10-18 12:00 UTC);

    struct Harness {
        state: SharedState,
        store: MemoryEventStore,
        push: RecordingPushProvider,
    }

    impl Harness {
        async fn new() -> Self {
            Self::with_store(MemoryEventStore::new(), None).await
        }

        async fn with_store(
            store: MemoryEventStore,
            installed: Option<Arc<dyn EventStore>>,
        ) -> Self {
            let push = RecordingPushProvider::default();
            let notifier = NotificationDispatcher::new(
                Arc::new(push.clone()),
                std::time::Duration::from_secs(1),
            );
            let clock = Arc::new(FixedClock::new(NOW));
            let state = AppState::with_clock(AppConfig::default(), notifier, clock);
            let installed = installed.unwrap_or_else(|| Arc::new(store.clone()));
            state.set_event_store(installed).await;
            store
                .save_subscription(SubscriptionEntity {
                    id: Uuid::new_v4(),
                    user_id: None,
                    endpoint: "https://push.example/a".into(),
                    created_at: NOW,
                })
                .await
                .unwrap();
            Self { state, store, push }
        }

        /// Save an open event kicking off at `start` for 90 minutes.
        async fn event_starting_at(&self, code: &str, start: OffsetDateTime) -> EventEntity {
            let event = EventEntity::new(
                code.into(),
                format!("Match {code}"),
                Some(start.date()),
                Some(start.time()),
                90,
                NOW - Duration::days(7),
            );
            self.store.save_event(event.clone()).await.unwrap();
            event
        }

        async fn event(&self, id: Uuid) -> EventEntity {
            self.store.find_event(id).await.unwrap().unwrap()
        }

        async fn tick(&self, now: OffsetDateTime) -> TickReport {
            run_tick_at(&self.state, now).await.unwrap()
        }
    }

    #[tokio::test]
    async fn reminder_fires_once_per_threshold() {
        let h = Harness::new().await;
        let event = h.event_starting_at("REMIND", NOW + Duration::hours(3)).await;

        let first = h.tick(NOW).await;
        let second = h.tick(NOW + Duration::seconds(1)).await;

        assert_eq!(first.notifications, 1);
        assert_eq!(second.notifications, 0);
        assert_eq!(h.push.titles(), vec!["Kick-off in 3 hours".to_string()]);

        let stored = h.event(event.id).await;
        assert!(stored.reminder_3h_sent);
        assert!(!stored.reminder_2h_sent);

        let later = h.tick(NOW + Duration::hours(1)).await;
        assert_eq!(later.notifications, 1);
        assert!(h.event(event.id).await.reminder_2h_sent);
    }

    #[tokio::test]
    async fn unscheduled_event_is_left_alone() {
        let h = Harness::new().await;
        let event = EventEntity::new("TBD".into(), "Unscheduled".into(), None, None, 90, NOW);
        h.store.save_event(event.clone()).await.unwrap();

        let report = h.tick(NOW).await;

        assert_eq!(report, TickReport::default());
        assert_eq!(h.event(event.id).await.status, EventStatus::Open);
    }

    #[tokio::test]
    async fn event_finishes_exactly_once() {
        let h = Harness::new().await;
        let event = h.event_starting_at("FINISH", NOW - Duration::minutes(95)).await;

        let first = h.tick(NOW).await;
        let second = h.tick(NOW + Duration::seconds(30)).await;

        assert_eq!(first.finished, 1);
        assert_eq!(second.finished, 0);
        assert_eq!(h.event(event.id).await.status, EventStatus::Finished);
    }

    #[tokio::test]
    async fn poll_opens_once_and_is_announced_once() {
        let h = Harness::new().await;
        let start = NOW - Duration::minutes(100);
        let event = h.event_starting_at("POLL", start).await;

        let first = h.tick(NOW).await;
        let second = h.tick(NOW + Duration::minutes(1)).await;

        assert_eq!(first.finished, 1);
        assert_eq!(first.notifications, 1);
        assert_eq!(second.notifications, 0);

        let poll = h.store.find_award_poll(event.id).await.unwrap().unwrap();
        assert_eq!(poll.starts_at, Some(start + Duration::minutes(100)));
        assert_eq!(poll.ends_at, Some(start + Duration::minutes(130)));
        assert!(poll.notif_sent);
        assert_eq!(
            h.push.titles(),
            vec!["Vote for the player of the match".to_string()]
        );
    }

    #[tokio::test]
    async fn late_first_pass_skips_announcement_and_sends_results() {
        let h = Harness::new().await;
        let start = NOW - Duration::hours(3);
        let event = h.event_starting_at("LATE", start).await;

        let report = h.tick(NOW).await;

        assert_eq!(report.finished, 1);
        assert_eq!(report.finalized, 1);
        assert_eq!(report.notifications, 1);
        assert_eq!(
            h.push.titles(),
            vec!["Player of the match results".to_string()]
        );
        let poll = h.store.find_award_poll(event.id).await.unwrap().unwrap();
        assert!(poll.finalized);
    }

    #[tokio::test]
    async fn reset_waits_for_grace_then_runs_once() {
        let h = Harness::new().await;
        let start = NOW - Duration::minutes(100);
        let event = h.event_starting_at("RESET", start).await;
        let poll_end = start + Duration::minutes(130);

        let participant = ParticipantEntity {
            id: Uuid::new_v4(),
            event_id: event.id,
            user_id: Some(Uuid::new_v4()),
            display_name: "keeper".into(),
        };
        let team = TeamEntity {
            id: Uuid::new_v4(),
            event_id: event.id,
            name: "Bibs".into(),
        };
        h.store.insert_participant(participant.clone()).await;
        h.store.insert_team(team.clone()).await;
        h.store
            .insert_assignment(AssignmentEntity {
                team_id: team.id,
                participant_id: participant.id,
            })
            .await;
        h.store
            .insert_lineup_position(LineupPositionEntity {
                team_id: team.id,
                participant_id: participant.id,
                x: 0.5,
                y: 0.25,
            })
            .await;

        h.tick(NOW).await;
        let poll = h.store.find_award_poll(event.id).await.unwrap().unwrap();
        h.store
            .save_vote(VoteEntity {
                poll_id: poll.id,
                voter_participant_id: participant.id,
                target_participant_id: participant.id,
                cast_at: NOW,
            })
            .await
            .unwrap();
        let closing = h.tick(poll_end + Duration::minutes(1)).await;
        assert_eq!(closing.finalized, 1);

        let early = h.tick(poll_end + Duration::minutes(59)).await;
        assert_eq!(early.resets, 0);
        assert_eq!(h.event(event.id).await.status, EventStatus::Finished);

        let due = h.tick(poll_end + Duration::minutes(61)).await;
        assert_eq!(due.resets, 1);

        let again = h.tick(poll_end + Duration::minutes(62)).await;
        assert_eq!(again.resets, 0);

        let recycled = h.event(event.id).await;
        assert_eq!(recycled.status, EventStatus::Open);
        assert_eq!(recycled.code, "RESET");
        assert!(!recycled.reminder_3h_sent);
        assert_eq!(recycled.date, None);
        assert_eq!(h.store.roster_footprint(event.id).await, Default::default());

        let user_id = participant.user_id.unwrap();
        let award = h.store.find_award(user_id).await.unwrap().unwrap();
        assert_eq!((award.count, award.level), (1, 1));
    }

    #[tokio::test]
    async fn stale_listing_cannot_revive_a_recycled_event() {
        let h = Harness::new().await;
        let start = NOW - Duration::minutes(100);
        let event = h.event_starting_at("STALE", start).await;
        let poll_end = start + Duration::minutes(130);

        h.tick(NOW).await;
        h.tick(poll_end + Duration::minutes(1)).await;
        let stale = h
            .store
            .list_events_by_status(EventStatus::Finished)
            .await
            .unwrap();
        assert_eq!(stale.len(), 1);
        assert_eq!(h.tick(poll_end + Duration::minutes(61)).await.resets, 1);
        let sent = h.push.titles().len();

        // A pass that listed the event before the reset resumes afterwards.
        let store: Arc<dyn EventStore> = Arc::new(h.store.clone());
        let settings = *h.state.window_settings();
        let late = poll_end + Duration::minutes(62);
        let mut report = TickReport::default();
        process_finished_event(&h.state, &store, &settings, &stale[0], late, &mut report)
            .await
            .unwrap();
        let windows = EventWindows::compute(&stale[0], &settings).unwrap();
        ensure_poll_open(&h.state, &store, &stale[0], &windows, late, &mut report)
            .await
            .unwrap();

        assert_eq!(report, TickReport::default());
        assert!(h.store.find_award_poll(event.id).await.unwrap().is_none());
        assert_eq!(h.push.titles().len(), sent);

        // The next generation still gets a fresh poll of its own.
        let next_start = late + Duration::days(7);
        assert!(
            h.store
                .reschedule_event(event.id, Some(next_start.date()), Some(next_start.time()))
                .await
                .unwrap()
        );
        let next = h.tick(next_start + Duration::minutes(100)).await;
        assert_eq!(next.finished, 1);
        let poll = h.store.find_award_poll(event.id).await.unwrap().unwrap();
        assert_eq!(poll.starts_at, Some(next_start + Duration::minutes(100)));
        assert!(!poll.finalized);
    }

    #[tokio::test]
    async fn edge_of_calendar_schedule_does_not_stall_the_pass() {
        let h = Harness::new().await;
        let edge = EventEntity::new(
            "EDGE".into(),
            "Last match".into(),
            Some(date!(9999 - 12 - 31)),
            Some(time!(23:30)),
            90,
            NOW,
        );
        h.store.save_event(edge.clone()).await.unwrap();
        h.event_starting_at("NEXT", NOW + Duration::hours(3)).await;

        let report = h.tick(NOW).await;

        assert_eq!(report.notifications, 1);
        assert_eq!(report.failed_events, 0);
        assert_eq!(h.event(edge.id).await.status, EventStatus::Open);
    }

    #[tokio::test]
    async fn degraded_state_reports_error() {
        let state = AppState::with_clock(
            AppConfig::default(),
            NotificationDispatcher::disabled(),
            Arc::new(FixedClock::new(NOW)),
        );

        assert!(matches!(
            run_tick_at(&state, NOW).await,
            Err(ServiceError::Degraded)
        ));
    }

    /// Store that fails `mark_event_finished` for selected events.
    struct FlakyStore {
        inner: MemoryEventStore,
        broken: HashSet<Uuid>,
    }

    impl EventStore for FlakyStore {
        fn save_event(&self, event: EventEntity) -> BoxFuture<'static, StorageResult<()>> {
            self.inner.save_event(event)
        }
        fn find_event(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<EventEntity>>> {
            self.inner.find_event(id)
        }
        fn find_event_by_code(
            &self,
            code: String,
        ) -> BoxFuture<'static, StorageResult<Option<EventEntity>>> {
            self.inner.find_event_by_code(code)
        }
        fn list_events_by_status(
            &self,
            status: EventStatus,
        ) -> BoxFuture<'static, StorageResult<Vec<EventEntity>>> {
            self.inner.list_events_by_status(status)
        }
        fn mark_reminder_sent(
            &self,
            event_id: Uuid,
            threshold: ReminderThreshold,
        ) -> BoxFuture<'static, StorageResult<bool>> {
            self.inner.mark_reminder_sent(event_id, threshold)
        }
        fn mark_event_finished(&self, event_id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
            if self.broken.contains(&event_id) {
                return async { Err(StorageError::invalid_data("simulated write failure")) }
                    .boxed();
            }
            self.inner.mark_event_finished(event_id)
        }
        fn reschedule_event(
            &self,
            event_id: Uuid,
            date: Option<Date>,
            start_time: Option<Time>,
        ) -> BoxFuture<'static, StorageResult<bool>> {
            self.inner.reschedule_event(event_id, date, start_time)
        }
        fn reset_event(&self, event_id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
            self.inner.reset_event(event_id)
        }
        fn ensure_award_poll(
            &self,
            poll: AwardPollEntity,
            generation: u32,
        ) -> BoxFuture<'static, StorageResult<Option<AwardPollEntity>>> {
            self.inner.ensure_award_poll(poll, generation)
        }
        fn find_award_poll(
            &self,
            event_id: Uuid,
        ) -> BoxFuture<'static, StorageResult<Option<AwardPollEntity>>> {
            self.inner.find_award_poll(event_id)
        }
        fn find_award_poll_by_id(
            &self,
            poll_id: Uuid,
        ) -> BoxFuture<'static, StorageResult<Option<AwardPollEntity>>> {
            self.inner.find_award_poll_by_id(poll_id)
        }
        fn mark_poll_notified(&self, poll_id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
            self.inner.mark_poll_notified(poll_id)
        }
        fn finalize_award_poll(
            &self,
            poll_id: Uuid,
            result: PollResult,
        ) -> BoxFuture<'static, StorageResult<bool>> {
            self.inner.finalize_award_poll(poll_id, result)
        }
        fn list_votes(&self, poll_id: Uuid) -> BoxFuture<'static, StorageResult<Vec<VoteEntity>>> {
            self.inner.list_votes(poll_id)
        }
        fn save_vote(&self, vote: VoteEntity) -> BoxFuture<'static, StorageResult<()>> {
            self.inner.save_vote(vote)
        }
        fn list_participants(
            &self,
            event_id: Uuid,
        ) -> BoxFuture<'static, StorageResult<Vec<ParticipantEntity>>> {
            self.inner.list_participants(event_id)
        }
        fn find_award(
            &self,
            user_id: Uuid,
        ) -> BoxFuture<'static, StorageResult<Option<AwardEntity>>> {
            self.inner.find_award(user_id)
        }
        fn list_subscriptions(
            &self,
        ) -> BoxFuture<'static, StorageResult<Vec<SubscriptionEntity>>> {
            self.inner.list_subscriptions()
        }
        fn save_subscription(
            &self,
            subscription: SubscriptionEntity,
        ) -> BoxFuture<'static, StorageResult<()>> {
            self.inner.save_subscription(subscription)
        }
        fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
            self.inner.health_check()
        }
        fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
            self.inner.try_reconnect()
        }
    }

    #[tokio::test]
    async fn failing_event_does_not_block_the_others() {
        let memory = MemoryEventStore::new();
        let seed = Harness::with_store(memory.clone(), None).await;
        let broken = seed
            .event_starting_at("BROKEN", NOW - Duration::minutes(95))
            .await;
        let healthy = seed
            .event_starting_at("HEALTHY", NOW - Duration::minutes(95))
            .await;

        let flaky = FlakyStore {
            inner: memory.clone(),
            broken: HashSet::from([broken.id]),
        };
        let h = Harness::with_store(memory, Some(Arc::new(flaky))).await;

        let report = h.tick(NOW).await;

        assert_eq!(report.failed_events, 1);
        assert_eq!(report.finished, 1);
        assert_eq!(h.event(healthy.id).await.status, EventStatus::Finished);
        assert_eq!(h.event(broken.id).await.status, EventStatus::Open);
    }
}
