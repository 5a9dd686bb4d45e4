//! In-process store used when no database is configured and throughout the tests.
//!
//! Every table sits behind one mutex, so each trait call observes and mutates a
//! consistent snapshot, which gives the same all-or-nothing behaviour the
//! database transactions provide.

use std::{collections::HashMap, sync::Arc};

use futures::future::BoxFuture;
use indexmap::IndexMap;
use time::{Date, Time};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::dao::{
    event_store::EventStore,
    models::{
        AssignmentEntity, AwardEntity, AwardPollEntity, EventEntity, EventStatus,
        LineupPositionEntity, ParticipantEntity, PollResult, ReminderThreshold,
        SubscriptionEntity, TeamEntity, VoteEntity,
    },
    storage::StorageResult,
};

#[derive(Default)]
struct Tables {
    events: IndexMap<Uuid, EventEntity>,
    polls: IndexMap<Uuid, AwardPollEntity>,
    votes: IndexMap<(Uuid, Uuid), VoteEntity>,
    awards: HashMap<Uuid, AwardEntity>,
    subscriptions: Vec<SubscriptionEntity>,
    participants: IndexMap<Uuid, ParticipantEntity>,
    teams: IndexMap<Uuid, TeamEntity>,
    assignments: Vec<AssignmentEntity>,
    lineup_positions: Vec<LineupPositionEntity>,
}

/// Row counts describing what an event still owns, used to verify resets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RosterFootprint {
    /// Roster members.
    pub participants: usize,
    /// Teams formed in the roster.
    pub teams: usize,
    /// Participant-to-team placements.
    pub assignments: usize,
    /// Lineup board tokens.
    pub lineup_positions: usize,
    /// Award polls, together with their votes.
    pub polls: usize,
}

/// Process-local event store; every operation runs under a single lock.
#[derive(Clone, Default)]
pub struct MemoryEventStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryEventStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a participant to an event roster.
    pub async fn insert_participant(&self, participant: ParticipantEntity) {
        let mut tables = self.tables.lock().await;
        tables.participants.insert(participant.id, participant);
    }

    /// Add a team to an event roster.
    pub async fn insert_team(&self, team: TeamEntity) {
        let mut tables = self.tables.lock().await;
        tables.teams.insert(team.id, team);
    }

    /// Place a participant on a team.
    pub async fn insert_assignment(&self, assignment: AssignmentEntity) {
        let mut tables = self.tables.lock().await;
        tables.assignments.push(assignment);
    }

    /// Put a lineup token on a team board.
    pub async fn insert_lineup_position(&self, position: LineupPositionEntity) {
        let mut tables = self.tables.lock().await;
        tables.lineup_positions.push(position);
    }

    /// Count the transient rows still attached to `event_id`.
    pub async fn roster_footprint(&self, event_id: Uuid) -> RosterFootprint {
        let tables = self.tables.lock().await;
        let team_ids: Vec<Uuid> = tables
            .teams
            .values()
            .filter(|team| team.event_id == event_id)
            .map(|team| team.id)
            .collect();

        RosterFootprint {
            participants: tables
                .participants
                .values()
                .filter(|participant| participant.event_id == event_id)
                .count(),
            teams: team_ids.len(),
            assignments: tables
                .assignments
                .iter()
                .filter(|assignment| team_ids.contains(&assignment.team_id))
                .count(),
            lineup_positions: tables
                .lineup_positions
                .iter()
                .filter(|position| team_ids.contains(&position.team_id))
                .count(),
            polls: tables
                .polls
                .values()
                .filter(|poll| poll.event_id == event_id)
                .count(),
        }
    }
}

impl Tables {
    fn reset_event(&mut self, event_id: Uuid) -> bool {
        let Some(event) = self.events.get_mut(&event_id) else {
            return false;
        };
        if event.status != EventStatus::Finished {
            return false;
        }
        event.recycle();

        let team_ids: Vec<Uuid> = self
            .teams
            .values()
            .filter(|team| team.event_id == event_id)
            .map(|team| team.id)
            .collect();

        self.lineup_positions
            .retain(|position| !team_ids.contains(&position.team_id));
        self.assignments
            .retain(|assignment| !team_ids.contains(&assignment.team_id));
        self.teams.retain(|_, team| team.event_id != event_id);
        self.participants
            .retain(|_, participant| participant.event_id != event_id);

        let poll_ids: Vec<Uuid> = self
            .polls
            .values()
            .filter(|poll| poll.event_id == event_id)
            .map(|poll| poll.id)
            .collect();
        self.votes
            .retain(|(poll_id, _), _| !poll_ids.contains(poll_id));
        self.polls.retain(|_, poll| poll.event_id != event_id);

        true
    }

    fn finalize_award_poll(&mut self, poll_id: Uuid, result: PollResult) -> bool {
        let Some(poll) = self.polls.get_mut(&poll_id) else {
            return false;
        };
        if poll.finalized {
            return false;
        }
        poll.finalized = true;
        poll.winner_participant_id = result.winner_participant_id;
        poll.finalized_at = Some(result.finalized_at);

        if let Some(user_id) = result.award_user_id {
            self.awards
                .entry(user_id)
                .and_modify(|award| {
                    award.count += 1;
                    award.level += 1;
                })
                .or_insert(AwardEntity {
                    user_id,
                    count: 1,
                    level: 1,
                });
        }

        true
    }
}

impl EventStore for MemoryEventStore {
    fn save_event(&self, event: EventEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let mut tables = store.tables.lock().await;
            tables.events.insert(event.id, event);
            Ok(())
        })
    }

    fn find_event(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<EventEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let tables = store.tables.lock().await;
            Ok(tables.events.get(&id).cloned())
        })
    }

    fn find_event_by_code(
        &self,
        code: String,
    ) -> BoxFuture<'static, StorageResult<Option<EventEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let tables = store.tables.lock().await;
            Ok(tables
                .events
                .values()
                .find(|event| event.code == code)
                .cloned())
        })
    }

    fn list_events_by_status(
        &self,
        status: EventStatus,
    ) -> BoxFuture<'static, StorageResult<Vec<EventEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let tables = store.tables.lock().await;
            Ok(tables
                .events
                .values()
                .filter(|event| event.status == status)
                .cloned()
                .collect())
        })
    }

    fn mark_reminder_sent(
        &self,
        event_id: Uuid,
        threshold: ReminderThreshold,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            let mut tables = store.tables.lock().await;
            let Some(event) = tables.events.get_mut(&event_id) else {
                return Ok(false);
            };
            let flag = event.reminder_flag_mut(threshold);
            if *flag {
                return Ok(false);
            }
            *flag = true;
            Ok(true)
        })
    }

    fn mark_event_finished(&self, event_id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            let mut tables = store.tables.lock().await;
            match tables.events.get_mut(&event_id) {
                Some(event) if event.status == EventStatus::Open => {
                    event.status = EventStatus::Finished;
                    Ok(true)
                }
                _ => Ok(false),
            }
        })
    }

    fn reschedule_event(
        &self,
        event_id: Uuid,
        date: Option<Date>,
        start_time: Option<Time>,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            let mut tables = store.tables.lock().await;
            match tables.events.get_mut(&event_id) {
                Some(event) if event.status == EventStatus::Open => {
                    event.date = date;
                    event.start_time = start_time;
                    for threshold in ReminderThreshold::ALL {
                        *event.reminder_flag_mut(threshold) = false;
                    }
                    Ok(true)
                }
                _ => Ok(false),
            }
        })
    }

    fn reset_event(&self, event_id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            let mut tables = store.tables.lock().await;
            Ok(tables.reset_event(event_id))
        })
    }

    fn ensure_award_poll(
        &self,
        poll: AwardPollEntity,
        generation: u32,
    ) -> BoxFuture<'static, StorageResult<Option<AwardPollEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let mut tables = store.tables.lock().await;
            let current = tables.events.get(&poll.event_id).is_some_and(|event| {
                event.status == EventStatus::Finished && event.generation == generation
            });
            if !current {
                return Ok(None);
            }
            if let Some(existing) = tables
                .polls
                .values()
                .find(|existing| existing.event_id == poll.event_id)
            {
                return Ok(Some(existing.clone()));
            }
            tables.polls.insert(poll.id, poll.clone());
            Ok(Some(poll))
        })
    }

    fn find_award_poll(
        &self,
        event_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<AwardPollEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let tables = store.tables.lock().await;
            Ok(tables
                .polls
                .values()
                .find(|poll| poll.event_id == event_id)
                .cloned())
        })
    }

    fn find_award_poll_by_id(
        &self,
        poll_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<AwardPollEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let tables = store.tables.lock().await;
            Ok(tables.polls.get(&poll_id).cloned())
        })
    }

    fn mark_poll_notified(&self, poll_id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            let mut tables = store.tables.lock().await;
            match tables.polls.get_mut(&poll_id) {
                Some(poll) if !poll.notif_sent => {
                    poll.notif_sent = true;
                    Ok(true)
                }
                _ => Ok(false),
            }
        })
    }

    fn finalize_award_poll(
        &self,
        poll_id: Uuid,
        result: PollResult,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            let mut tables = store.tables.lock().await;
            Ok(tables.finalize_award_poll(poll_id, result))
        })
    }

    fn list_votes(&self, poll_id: Uuid) -> BoxFuture<'static, StorageResult<Vec<VoteEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let tables = store.tables.lock().await;
            Ok(tables
                .votes
                .values()
                .filter(|vote| vote.poll_id == poll_id)
                .cloned()
                .collect())
        })
    }

    fn save_vote(&self, vote: VoteEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let mut tables = store.tables.lock().await;
            tables
                .votes
                .insert((vote.poll_id, vote.voter_participant_id), vote);
            Ok(())
        })
    }

    fn list_participants(
        &self,
        event_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<ParticipantEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let tables = store.tables.lock().await;
            Ok(tables
                .participants
                .values()
                .filter(|participant| participant.event_id == event_id)
                .cloned()
                .collect())
        })
    }

    fn find_award(&self, user_id: Uuid) -> BoxFuture<'static, StorageResult<Option<AwardEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let tables = store.tables.lock().await;
            Ok(tables.awards.get(&user_id).cloned())
        })
    }

    fn list_subscriptions(&self) -> BoxFuture<'static, StorageResult<Vec<SubscriptionEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let tables = store.tables.lock().await;
            Ok(tables.subscriptions.clone())
        })
    }

    fn save_subscription(
        &self,
        subscription: SubscriptionEntity,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let mut tables = store.tables.lock().await;
            tables
                .subscriptions
                .retain(|existing| existing.endpoint != subscription.endpoint);
            tables.subscriptions.push(subscription);
            Ok(())
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}
