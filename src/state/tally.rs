//! Vote counting for award polls.

use std::collections::HashMap;

use indexmap::IndexMap;
use uuid::Uuid;

use crate::dao::models::VoteEntity;

/// Per-target vote counts of a single poll.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tally {
    counts: IndexMap<Uuid, u32>,
}

impl Tally {
    /// Count `votes`, keeping only the latest ballot of each voter.
    pub fn from_votes(votes: &[VoteEntity]) -> Self {
        let mut latest: HashMap<Uuid, &VoteEntity> = HashMap::new();
        for vote in votes {
            latest
                .entry(vote.voter_participant_id)
                .and_modify(|current| {
                    if vote.cast_at >= current.cast_at {
                        *current = vote;
                    }
                })
                .or_insert(vote);
        }

        let mut ballots: Vec<&VoteEntity> = latest.into_values().collect();
        ballots.sort_by_key(|vote| vote.cast_at);

        let mut counts = IndexMap::new();
        for vote in ballots {
            *counts.entry(vote.target_participant_id).or_insert(0) += 1;
        }
        Self { counts }
    }

    /// Participant with the most votes. Ties go to the lowest participant id.
    pub fn winner(&self) -> Option<Uuid> {
        self.counts
            .iter()
            .max_by(|(left_id, left), (right_id, right)| {
                left.cmp(right).then_with(|| right_id.cmp(left_id))
            })
            .map(|(id, _)| *id)
    }

    /// Votes received by `participant_id`.
    pub fn count_for(&self, participant_id: Uuid) -> u32 {
        self.counts.get(&participant_id).copied().unwrap_or(0)
    }

    /// Number of ballots counted.
    pub fn total(&self) -> u32 {
        self.counts.values().sum()
    }

    /// Counts in order of first appearance.
    pub fn iter(&self) -> impl Iterator<Item = (Uuid, u32)> + '_ {
        self.counts.iter().map(|(id, count)| (*id, *count))
    }
}

#[cfg(test)]
mod tests {
    use time::{Duration, macros::datetime};

    use super::*;

    fn vote(voter: Uuid, target: Uuid, minute: i64) -> VoteEntity {
        VoteEntity {
            poll_id: Uuid::nil(),
            voter_participant_id: voter,
            target_participant_id: target,
            cast_at: datetime!(2026-10-18 21:10 UTC) + Duration::minutes(minute),
        }
    }

    #[test]
    fn majority_target_wins() {
        let (a, b, c, x, y) = (
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
        );
        let tally = Tally::from_votes(&[vote(a, x, 1), vote(b, x, 2), vote(c, y, 3)]);

        assert_eq!(tally.winner(), Some(x));
        assert_eq!(tally.count_for(x), 2);
        assert_eq!(tally.count_for(y), 1);
        assert_eq!(tally.total(), 3);
    }

    #[test]
    fn no_votes_means_no_winner() {
        let tally = Tally::from_votes(&[]);
        assert_eq!(tally.winner(), None);
        assert_eq!(tally.total(), 0);
    }

    #[test]
    fn tie_goes_to_lowest_participant_id() {
        let low = Uuid::from_u128(1);
        let high = Uuid::from_u128(2);
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

        let tally = Tally::from_votes(&[vote(a, high, 1), vote(b, low, 2)]);
        assert_eq!(tally.winner(), Some(low));

        let reversed = Tally::from_votes(&[vote(b, low, 1), vote(a, high, 2)]);
        assert_eq!(reversed.winner(), Some(low));
    }

    #[test]
    fn later_ballot_replaces_earlier_one() {
        let (a, x, y) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let tally = Tally::from_votes(&[vote(a, y, 5), vote(a, x, 1)]);

        assert_eq!(tally.total(), 1);
        assert_eq!(tally.winner(), Some(y));
    }
}
