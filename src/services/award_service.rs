//! Award poll reads, voting and the finalizer shared by the lazy read path and the
//! lifecycle driver.

use std::sync::Arc;

use time::OffsetDateTime;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    dao::{
        event_store::EventStore,
        models::{AwardPollEntity, EventEntity, PollResult, VoteEntity},
    },
    dto::poll::{AwardPollView, AwardView, VoteRequest, VoteView},
    error::ServiceError,
    services::{notification_service, sse_events},
    state::{SharedState, tally::Tally},
};

/// What a call to [`finalize_poll`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FinalizeOutcome {
    /// This call flipped `finalized`; `false` when another caller won or nothing was due.
    pub applied: bool,
    pub winner_participant_id: Option<Uuid>,
    /// Registered user credited with the award.
    pub awarded_user_id: Option<Uuid>,
    /// This call claimed and dispatched the results notification.
    pub notified: bool,
}

/// Finalize `poll` if its window has closed.
///
/// Safe to call concurrently: the store applies the result only while the poll
/// is still unfinalized, so exactly one caller grants the award.
pub async fn finalize_poll(
    state: &SharedState,
    store: &Arc<dyn EventStore>,
    event: &EventEntity,
    poll: &AwardPollEntity,
    now: OffsetDateTime,
) -> Result<FinalizeOutcome, ServiceError> {
    if !poll.awaiting_finalization(now) {
        return Ok(FinalizeOutcome::default());
    }

    let votes = store.list_votes(poll.id).await?;
    let winner_participant_id = Tally::from_votes(&votes).winner();
    let awarded_user_id = match winner_participant_id {
        Some(winner) => store
            .list_participants(poll.event_id)
            .await?
            .into_iter()
            .find(|participant| participant.id == winner)
            .and_then(|participant| participant.user_id),
        None => None,
    };

    let result = PollResult {
        winner_participant_id,
        award_user_id: awarded_user_id,
        finalized_at: now,
    };
    if !store.finalize_award_poll(poll.id, result).await? {
        debug!(poll_id = %poll.id, "poll already finalized by another caller");
        return Ok(FinalizeOutcome::default());
    }

    info!(
        event_id = %event.id,
        poll_id = %poll.id,
        votes = votes.len(),
        winner = ?winner_participant_id,
        awarded_user = ?awarded_user_id,
        "award poll finalized"
    );

    let finalized = AwardPollEntity {
        finalized: true,
        winner_participant_id,
        finalized_at: Some(now),
        ..poll.clone()
    };
    sse_events::broadcast_poll_finalized(state, &finalized);

    let notified = if poll.notif_sent {
        false
    } else {
        match store.mark_poll_notified(poll.id).await {
            Ok(true) => {
                let message = notification_service::poll_results_message(event);
                state.notifier().dispatch(store, message).await;
                true
            }
            Ok(false) => false,
            Err(err) => {
                warn!(poll_id = %poll.id, error = %err, "failed to claim results notification");
                false
            }
        }
    };

    Ok(FinalizeOutcome {
        applied: true,
        winner_participant_id,
        awarded_user_id,
        notified,
    })
}

/// Read the award poll of the event identified by `code`, finalizing it first
/// when its window has closed.
pub async fn get_event_poll(
    state: &SharedState,
    code: String,
) -> Result<AwardPollView, ServiceError> {
    let store = state.require_event_store().await?;
    let now = state.now();

    let event = store
        .find_event_by_code(code.clone())
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("event `{code}`")))?;
    let mut poll = store
        .find_award_poll(event.id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("award poll for event `{code}`")))?;

    if poll.awaiting_finalization(now) {
        finalize_poll(state, &store, &event, &poll, now).await?;
        poll = store
            .find_award_poll(event.id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("award poll for event `{code}`")))?;
    }

    let votes = store.list_votes(poll.id).await?;
    Ok(AwardPollView::new(&poll, &votes, poll.accepts_votes(now)))
}

/// Record a ballot; a later ballot from the same voter replaces the earlier one.
pub async fn submit_vote(
    state: &SharedState,
    poll_id: Uuid,
    request: VoteRequest,
) -> Result<VoteView, ServiceError> {
    let store = state.require_event_store().await?;
    let now = state.now();

    let poll = store
        .find_award_poll_by_id(poll_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("award poll `{poll_id}`")))?;
    if !poll.accepts_votes(now) {
        return Err(ServiceError::PollNotActive);
    }

    let participants = store.list_participants(poll.event_id).await?;
    for (role, id) in [
        ("voter", request.voter_participant_id),
        ("target", request.target_participant_id),
    ] {
        if !participants.iter().any(|participant| participant.id == id) {
            return Err(ServiceError::InvalidInput(format!(
                "{role} `{id}` is not a participant of this event"
            )));
        }
    }

    let vote = VoteEntity {
        poll_id,
        voter_participant_id: request.voter_participant_id,
        target_participant_id: request.target_participant_id,
        cast_at: now,
    };
    store.save_vote(vote.clone()).await?;
    debug!(poll_id = %poll_id, voter = %vote.voter_participant_id, "vote recorded");

    Ok(VoteView::from(&vote))
}

/// Award accumulator of `user_id`.
pub async fn get_award(state: &SharedState, user_id: Uuid) -> Result<AwardView, ServiceError> {
    let store = state.require_event_store().await?;
    store
        .find_award(user_id)
        .await?
        .map(AwardView::from)
        .ok_or_else(|| ServiceError::NotFound(format!("award for user `{user_id}`")))
}
