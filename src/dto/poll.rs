use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::models::{AwardEntity, AwardPollEntity, VoteEntity},
    dto::format_instant,
    state::tally::Tally,
};

/// Ballot submitted by a participant.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct VoteRequest {
    pub voter_participant_id: Uuid,
    pub target_participant_id: Uuid,
}

/// Stored ballot.
#[derive(Debug, Serialize, ToSchema)]
pub struct VoteView {
    pub voter_participant_id: Uuid,
    pub target_participant_id: Uuid,
    pub cast_at: String,
}

impl From<&VoteEntity> for VoteView {
    fn from(vote: &VoteEntity) -> Self {
        Self {
            voter_participant_id: vote.voter_participant_id,
            target_participant_id: vote.target_participant_id,
            cast_at: format_instant(vote.cast_at),
        }
    }
}

/// Votes received by one participant.
#[derive(Debug, Serialize, ToSchema)]
pub struct TallyEntry {
    pub participant_id: Uuid,
    pub votes: u32,
}

/// Award poll with its ballots and current counts.
#[derive(Debug, Serialize, ToSchema)]
pub struct AwardPollView {
    pub id: Uuid,
    pub event_id: Uuid,
    pub starts_at: Option<String>,
    pub ends_at: Option<String>,
    /// Whether a vote submitted now would be accepted.
    pub accepting_votes: bool,
    pub finalized: bool,
    /// Recorded at finalization; absent when nobody voted.
    pub winner_participant_id: Option<Uuid>,
    pub finalized_at: Option<String>,
    pub votes: Vec<VoteView>,
    pub tallies: Vec<TallyEntry>,
}

impl AwardPollView {
    pub fn new(poll: &AwardPollEntity, votes: &[VoteEntity], accepting_votes: bool) -> Self {
        let tally = Tally::from_votes(votes);
        Self {
            id: poll.id,
            event_id: poll.event_id,
            starts_at: poll.starts_at.map(format_instant),
            ends_at: poll.ends_at.map(format_instant),
            accepting_votes,
            finalized: poll.finalized,
            winner_participant_id: poll.winner_participant_id,
            finalized_at: poll.finalized_at.map(format_instant),
            votes: votes.iter().map(VoteView::from).collect(),
            tallies: tally
                .iter()
                .map(|(participant_id, votes)| TallyEntry {
                    participant_id,
                    votes,
                })
                .collect(),
        }
    }
}

/// Award accumulator of a registered user.
#[derive(Debug, Serialize, ToSchema)]
pub struct AwardView {
    pub user_id: Uuid,
    pub count: u32,
    pub level: u32,
}

impl From<AwardEntity> for AwardView {
    fn from(award: AwardEntity) -> Self {
        Self {
            user_id: award.user_id,
            count: award.count,
            level: award.level,
        }
    }
}
