use mongodb::bson::{DateTime, Document, doc, serialize_to_document};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::error::{MongoDaoError, MongoResult};
use crate::dao::models::{
    AwardEntity, AwardPollEntity, EventEntity, EventStatus, ParticipantEntity,
    SubscriptionEntity, VoteEntity, format_date, format_time, parse_date, parse_time,
};

pub const EVENT_COLLECTION: &str = "events";
pub const POLL_COLLECTION: &str = "award_polls";
pub const VOTE_COLLECTION: &str = "votes";
pub const AWARD_COLLECTION: &str = "awards";
pub const SUBSCRIPTION_COLLECTION: &str = "subscriptions";
pub const PARTICIPANT_COLLECTION: &str = "participants";
pub const TEAM_COLLECTION: &str = "teams";
pub const ASSIGNMENT_COLLECTION: &str = "assignments";
pub const LINEUP_COLLECTION: &str = "lineup_positions";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoEventDocument {
    #[serde(rename = "_id")]
    pub id: String,
    pub code: String,
    pub name: String,
    pub date: Option<String>,
    pub start_time: Option<String>,
    pub duration_minutes: u32,
    pub status: String,
    #[serde(default)]
    pub generation: u32,
    #[serde(default)]
    pub roster_locked: bool,
    #[serde(default)]
    pub lineup_locked: bool,
    #[serde(default)]
    pub reminder_3h_sent: bool,
    #[serde(default)]
    pub reminder_2h_sent: bool,
    #[serde(default)]
    pub reminder_1h_sent: bool,
    pub created_at: DateTime,
}

impl From<EventEntity> for MongoEventDocument {
    fn from(value: EventEntity) -> Self {
        Self {
            id: value.id.to_string(),
            code: value.code,
            name: value.name,
            date: value.date.map(format_date),
            start_time: value.start_time.map(format_time),
            duration_minutes: value.duration_minutes,
            status: value.status.as_str().to_owned(),
            generation: value.generation,
            roster_locked: value.roster_locked,
            lineup_locked: value.lineup_locked,
            reminder_3h_sent: value.reminder_3h_sent,
            reminder_2h_sent: value.reminder_2h_sent,
            reminder_1h_sent: value.reminder_1h_sent,
            created_at: to_bson_datetime(value.created_at),
        }
    }
}

impl TryFrom<MongoEventDocument> for EventEntity {
    type Error = MongoDaoError;

    fn try_from(value: MongoEventDocument) -> MongoResult<Self> {
        let invalid = |reason: String| MongoDaoError::InvalidDocument {
            collection: EVENT_COLLECTION,
            id: value.id.clone(),
            reason,
        };

        let date = value
            .date
            .as_deref()
            .map(parse_date)
            .transpose()
            .map_err(|err| invalid(format!("bad date: {err}")))?;
        let start_time = value
            .start_time
            .as_deref()
            .map(parse_time)
            .transpose()
            .map_err(|err| invalid(format!("bad start time: {err}")))?;
        let status = EventStatus::parse(&value.status)
            .ok_or_else(|| invalid(format!("unknown status `{}`", value.status)))?;

        Ok(Self {
            id: parse_uuid(EVENT_COLLECTION, &value.id)?,
            date,
            start_time,
            status,
            created_at: from_bson_datetime(EVENT_COLLECTION, &value.id, value.created_at)?,
            code: value.code,
            name: value.name,
            duration_minutes: value.duration_minutes,
            generation: value.generation,
            roster_locked: value.roster_locked,
            lineup_locked: value.lineup_locked,
            reminder_3h_sent: value.reminder_3h_sent,
            reminder_2h_sent: value.reminder_2h_sent,
            reminder_1h_sent: value.reminder_1h_sent,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoPollDocument {
    #[serde(rename = "_id")]
    pub id: String,
    pub event_id: String,
    pub starts_at: Option<DateTime>,
    pub ends_at: Option<DateTime>,
    #[serde(default)]
    pub finalized: bool,
    #[serde(default)]
    pub notif_sent: bool,
    pub winner_participant_id: Option<String>,
    pub finalized_at: Option<DateTime>,
}

impl From<AwardPollEntity> for MongoPollDocument {
    fn from(value: AwardPollEntity) -> Self {
        Self {
            id: value.id.to_string(),
            event_id: value.event_id.to_string(),
            starts_at: value.starts_at.map(to_bson_datetime),
            ends_at: value.ends_at.map(to_bson_datetime),
            finalized: value.finalized,
            notif_sent: value.notif_sent,
            winner_participant_id: value.winner_participant_id.map(|id| id.to_string()),
            finalized_at: value.finalized_at.map(to_bson_datetime),
        }
    }
}

impl TryFrom<MongoPollDocument> for AwardPollEntity {
    type Error = MongoDaoError;

    fn try_from(value: MongoPollDocument) -> MongoResult<Self> {
        let instant = |dt: Option<DateTime>| {
            dt.map(|dt| from_bson_datetime(POLL_COLLECTION, &value.id, dt))
                .transpose()
        };

        Ok(Self {
            id: parse_uuid(POLL_COLLECTION, &value.id)?,
            event_id: parse_uuid(POLL_COLLECTION, &value.event_id)?,
            starts_at: instant(value.starts_at)?,
            ends_at: instant(value.ends_at)?,
            finalized: value.finalized,
            notif_sent: value.notif_sent,
            winner_participant_id: value
                .winner_participant_id
                .as_deref()
                .map(|id| parse_uuid(POLL_COLLECTION, id))
                .transpose()?,
            finalized_at: instant(value.finalized_at)?,
        })
    }
}

/// Fields written only when the poll row is first inserted.
pub fn poll_insert_fields(poll: AwardPollEntity) -> MongoResult<Document> {
    let document = MongoPollDocument::from(poll);
    serialize_to_document(&document).map_err(|err| MongoDaoError::InvalidDocument {
        collection: POLL_COLLECTION,
        id: document.id.clone(),
        reason: err.to_string(),
    })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoVoteDocument {
    pub poll_id: String,
    pub voter_participant_id: String,
    pub target_participant_id: String,
    pub cast_at: DateTime,
}

impl From<VoteEntity> for MongoVoteDocument {
    fn from(value: VoteEntity) -> Self {
        Self {
            poll_id: value.poll_id.to_string(),
            voter_participant_id: value.voter_participant_id.to_string(),
            target_participant_id: value.target_participant_id.to_string(),
            cast_at: to_bson_datetime(value.cast_at),
        }
    }
}

impl TryFrom<MongoVoteDocument> for VoteEntity {
    type Error = MongoDaoError;

    fn try_from(value: MongoVoteDocument) -> MongoResult<Self> {
        Ok(Self {
            poll_id: parse_uuid(VOTE_COLLECTION, &value.poll_id)?,
            voter_participant_id: parse_uuid(VOTE_COLLECTION, &value.voter_participant_id)?,
            target_participant_id: parse_uuid(VOTE_COLLECTION, &value.target_participant_id)?,
            cast_at: from_bson_datetime(VOTE_COLLECTION, &value.poll_id, value.cast_at)?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoAwardDocument {
    #[serde(rename = "_id")]
    pub user_id: String,
    pub count: u32,
    pub level: u32,
}

impl TryFrom<MongoAwardDocument> for AwardEntity {
    type Error = MongoDaoError;

    fn try_from(value: MongoAwardDocument) -> MongoResult<Self> {
        Ok(Self {
            user_id: parse_uuid(AWARD_COLLECTION, &value.user_id)?,
            count: value.count,
            level: value.level,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoSubscriptionDocument {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: Option<String>,
    pub endpoint: String,
    pub created_at: DateTime,
}

impl From<SubscriptionEntity> for MongoSubscriptionDocument {
    fn from(value: SubscriptionEntity) -> Self {
        Self {
            id: value.id.to_string(),
            user_id: value.user_id.map(|id| id.to_string()),
            endpoint: value.endpoint,
            created_at: to_bson_datetime(value.created_at),
        }
    }
}

impl TryFrom<MongoSubscriptionDocument> for SubscriptionEntity {
    type Error = MongoDaoError;

    fn try_from(value: MongoSubscriptionDocument) -> MongoResult<Self> {
        Ok(Self {
            id: parse_uuid(SUBSCRIPTION_COLLECTION, &value.id)?,
            user_id: value
                .user_id
                .as_deref()
                .map(|id| parse_uuid(SUBSCRIPTION_COLLECTION, id))
                .transpose()?,
            created_at: from_bson_datetime(SUBSCRIPTION_COLLECTION, &value.id, value.created_at)?,
            endpoint: value.endpoint,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoParticipantDocument {
    #[serde(rename = "_id")]
    pub id: String,
    pub event_id: String,
    pub user_id: Option<String>,
    pub display_name: String,
}

impl TryFrom<MongoParticipantDocument> for ParticipantEntity {
    type Error = MongoDaoError;

    fn try_from(value: MongoParticipantDocument) -> MongoResult<Self> {
        Ok(Self {
            id: parse_uuid(PARTICIPANT_COLLECTION, &value.id)?,
            event_id: parse_uuid(PARTICIPANT_COLLECTION, &value.event_id)?,
            user_id: value
                .user_id
                .as_deref()
                .map(|id| parse_uuid(PARTICIPANT_COLLECTION, id))
                .transpose()?,
            display_name: value.display_name,
        })
    }
}

/// Only the key is needed to cascade a reset from teams to their children.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoTeamKey {
    #[serde(rename = "_id")]
    pub id: String,
}

pub fn doc_id(id: Uuid) -> Document {
    doc! {"_id": id.to_string()}
}

pub fn to_bson_datetime(value: OffsetDateTime) -> DateTime {
    DateTime::from_millis((value.unix_timestamp_nanos() / 1_000_000) as i64)
}

fn from_bson_datetime(
    collection: &'static str,
    id: &str,
    value: DateTime,
) -> MongoResult<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(value.timestamp_millis()) * 1_000_000)
        .map_err(|err| MongoDaoError::InvalidDocument {
            collection,
            id: id.to_owned(),
            reason: err.to_string(),
        })
}

fn parse_uuid(collection: &'static str, value: &str) -> MongoResult<Uuid> {
    Uuid::parse_str(value).map_err(|err| MongoDaoError::InvalidDocument {
        collection,
        id: value.to_owned(),
        reason: err.to_string(),
    })
}
