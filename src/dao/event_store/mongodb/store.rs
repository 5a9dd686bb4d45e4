use std::sync::Arc;

use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{
    ClientSession, Collection, IndexModel,
    bson::{Document, deserialize_from_document, doc},
    options::IndexOptions,
};
use time::{Date, Time};
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

use super::{
    config::MongoConfig,
    connection::establish_connection,
    error::{MongoDaoError, MongoResult},
    models::{
        ASSIGNMENT_COLLECTION, AWARD_COLLECTION, EVENT_COLLECTION, LINEUP_COLLECTION,
        MongoAwardDocument, MongoEventDocument, MongoParticipantDocument, MongoPollDocument,
        MongoSubscriptionDocument, MongoTeamKey, MongoVoteDocument, PARTICIPANT_COLLECTION,
        POLL_COLLECTION, SUBSCRIPTION_COLLECTION, TEAM_COLLECTION, VOTE_COLLECTION, doc_id,
        poll_insert_fields, to_bson_datetime,
    },
};
use crate::dao::{
    event_store::EventStore,
    models::{
        AwardEntity, AwardPollEntity, EventEntity, EventStatus, ParticipantEntity, PollResult,
        ReminderThreshold, SubscriptionEntity, VoteEntity, format_date, format_time,
    },
    storage::StorageResult,
};

#[derive(Clone)]
pub struct MongoEventStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    state: RwLock<MongoState>,
    config: MongoConfig,
}

struct MongoState {
    client: mongodb::Client,
    database: mongodb::Database,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = {
            let guard = self.state.read().await;
            guard.database.clone()
        };

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let (client, database) =
            establish_connection(&self.config.options, &self.config.database_name).await?;
        let mut guard = self.state.write().await;
        guard.client = client;
        guard.database = database;
        info!("reconnected to MongoDB");
        Ok(())
    }
}

impl MongoEventStore {
    /// Establish a connection to MongoDB and ensure indexes are present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let (client, database) =
            establish_connection(&config.options, &config.database_name).await?;

        let inner = Arc::new(MongoInner {
            state: RwLock::new(MongoState { client, database }),
            config,
        });

        let store = Self { inner };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        let indexes: [(&'static str, &'static str, Document, bool); 6] = [
            (EVENT_COLLECTION, "event_code_idx", doc! {"code": 1}, true),
            (EVENT_COLLECTION, "event_status_idx", doc! {"status": 1}, false),
            (POLL_COLLECTION, "poll_event_idx", doc! {"event_id": 1}, true),
            (
                VOTE_COLLECTION,
                "vote_voter_idx",
                doc! {"poll_id": 1, "voter_participant_id": 1},
                true,
            ),
            (
                PARTICIPANT_COLLECTION,
                "participant_event_idx",
                doc! {"event_id": 1},
                false,
            ),
            (TEAM_COLLECTION, "team_event_idx", doc! {"event_id": 1}, false),
        ];

        for (collection, name, keys, unique) in indexes {
            let model = IndexModel::builder()
                .keys(keys)
                .options(
                    IndexOptions::builder()
                        .name(Some(name.to_owned()))
                        .unique(Some(unique))
                        .build(),
                )
                .build();

            self.collection::<Document>(collection)
                .await
                .create_index(model)
                .await
                .map_err(|source| MongoDaoError::EnsureIndex {
                    collection,
                    index: name,
                    source,
                })?;
        }

        Ok(())
    }

    async fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        let guard = self.inner.state.read().await;
        guard.database.collection::<T>(name)
    }

    async fn start_transaction(&self, id: Uuid) -> MongoResult<ClientSession> {
        let client = {
            let guard = self.inner.state.read().await;
            guard.client.clone()
        };
        let mut session = client
            .start_session()
            .await
            .map_err(MongoDaoError::transaction(id, "start session"))?;
        session
            .start_transaction()
            .await
            .map_err(MongoDaoError::transaction(id, "start transaction"))?;
        Ok(session)
    }

    async fn save_event(&self, event: EventEntity) -> MongoResult<()> {
        let id = event.id;
        let document: MongoEventDocument = event.into();
        self.collection::<MongoEventDocument>(EVENT_COLLECTION)
            .await
            .replace_one(doc_id(id), &document)
            .upsert(true)
            .await
            .map_err(MongoDaoError::query(EVENT_COLLECTION, "save event"))?;
        Ok(())
    }

    async fn find_event_where(&self, filter: Document) -> MongoResult<Option<EventEntity>> {
        self.collection::<MongoEventDocument>(EVENT_COLLECTION)
            .await
            .find_one(filter)
            .await
            .map_err(MongoDaoError::query(EVENT_COLLECTION, "load event"))?
            .map(EventEntity::try_from)
            .transpose()
    }

    /// Decode every event with `status`; rows that fail to decode are skipped
    /// with a warning so one bad document cannot stall the whole pass.
    async fn list_events_by_status(&self, status: EventStatus) -> MongoResult<Vec<EventEntity>> {
        let documents: Vec<Document> = self
            .collection::<Document>(EVENT_COLLECTION)
            .await
            .find(doc! {"status": status.as_str()})
            .await
            .map_err(MongoDaoError::query(EVENT_COLLECTION, "list events"))?
            .try_collect()
            .await
            .map_err(MongoDaoError::query(EVENT_COLLECTION, "list events"))?;

        Ok(decode_listed_events(documents))
    }

    async fn update_flag(
        &self,
        collection: &'static str,
        filter: Document,
        set: Document,
    ) -> MongoResult<bool> {
        let result = self
            .collection::<Document>(collection)
            .await
            .update_one(filter, doc! {"$set": set})
            .await
            .map_err(MongoDaoError::query(collection, "conditional update"))?;
        Ok(result.modified_count == 1)
    }

    async fn reset_event(&self, event_id: Uuid) -> MongoResult<bool> {
        let mut session = self.start_transaction(event_id).await?;
        match self.reset_event_in(&mut session, event_id).await {
            Ok(true) => {
                session
                    .commit_transaction()
                    .await
                    .map_err(MongoDaoError::transaction(event_id, "commit reset"))?;
                Ok(true)
            }
            Ok(false) => {
                abort_quietly(&mut session, event_id).await;
                Ok(false)
            }
            Err(err) => {
                abort_quietly(&mut session, event_id).await;
                Err(err)
            }
        }
    }

    async fn reset_event_in(
        &self,
        session: &mut ClientSession,
        event_id: Uuid,
    ) -> MongoResult<bool> {
        let reopened = self
            .collection::<Document>(EVENT_COLLECTION)
            .await
            .update_one(
                doc! {"_id": event_id.to_string(), "status": EventStatus::Finished.as_str()},
                doc! {
                    "$inc": {"generation": 1},
                    "$set": {
                        "status": EventStatus::Open.as_str(),
                        "date": null,
                        "start_time": null,
                        "roster_locked": false,
                        "lineup_locked": false,
                        "reminder_3h_sent": false,
                        "reminder_2h_sent": false,
                        "reminder_1h_sent": false,
                    },
                },
            )
            .session(&mut *session)
            .await
            .map_err(MongoDaoError::transaction(event_id, "reopen event"))?;
        if reopened.modified_count == 0 {
            return Ok(false);
        }

        let event_key = event_id.to_string();
        let mut cursor = self
            .collection::<MongoTeamKey>(TEAM_COLLECTION)
            .await
            .find(doc! {"event_id": event_key.as_str()})
            .session(&mut *session)
            .await
            .map_err(MongoDaoError::transaction(event_id, "list teams"))?;
        let team_ids: Vec<String> = cursor
            .stream(&mut *session)
            .map_ok(|team| team.id)
            .try_collect()
            .await
            .map_err(MongoDaoError::transaction(event_id, "list teams"))?;

        let by_team = doc! {"team_id": {"$in": team_ids}};
        let by_event = doc! {"event_id": event_key.as_str()};
        let steps = [
            (LINEUP_COLLECTION, by_team.clone(), "delete lineup positions"),
            (ASSIGNMENT_COLLECTION, by_team, "delete assignments"),
            (TEAM_COLLECTION, by_event.clone(), "delete teams"),
            (PARTICIPANT_COLLECTION, by_event.clone(), "delete participants"),
        ];
        for (collection, filter, step) in steps {
            self.collection::<Document>(collection)
                .await
                .delete_many(filter)
                .session(&mut *session)
                .await
                .map_err(MongoDaoError::transaction(event_id, step))?;
        }

        let poll = self
            .collection::<MongoPollDocument>(POLL_COLLECTION)
            .await
            .find_one_and_delete(by_event)
            .session(&mut *session)
            .await
            .map_err(MongoDaoError::transaction(event_id, "delete award poll"))?;
        if let Some(poll) = poll {
            self.collection::<Document>(VOTE_COLLECTION)
                .await
                .delete_many(doc! {"poll_id": poll.id})
                .session(&mut *session)
                .await
                .map_err(MongoDaoError::transaction(event_id, "delete votes"))?;
        }

        Ok(true)
    }

    async fn ensure_award_poll(
        &self,
        poll: AwardPollEntity,
        generation: u32,
    ) -> MongoResult<Option<AwardPollEntity>> {
        let event_id = poll.event_id;
        let mut session = self.start_transaction(event_id).await?;
        match self.ensure_award_poll_in(&mut session, poll, generation).await {
            Ok(Some(stored)) => {
                session
                    .commit_transaction()
                    .await
                    .map_err(MongoDaoError::transaction(event_id, "commit award poll"))?;
                Ok(Some(stored))
            }
            Ok(None) => {
                abort_quietly(&mut session, event_id).await;
                Ok(None)
            }
            Err(err) => {
                abort_quietly(&mut session, event_id).await;
                Err(err)
            }
        }
    }

    async fn ensure_award_poll_in(
        &self,
        session: &mut ClientSession,
        poll: AwardPollEntity,
        generation: u32,
    ) -> MongoResult<Option<AwardPollEntity>> {
        let event_id = poll.event_id;
        let event_key = event_id.to_string();

        // Writing the event row makes a concurrent reset conflict with this transaction.
        let current = self
            .collection::<Document>(EVENT_COLLECTION)
            .await
            .update_one(
                doc! {
                    "_id": event_key.as_str(),
                    "status": EventStatus::Finished.as_str(),
                    "generation": i64::from(generation),
                },
                doc! {"$currentDate": {"poll_checked_at": true}},
            )
            .session(&mut *session)
            .await
            .map_err(MongoDaoError::transaction(event_id, "check event generation"))?;
        if current.matched_count == 0 {
            return Ok(None);
        }

        let insert = poll_insert_fields(poll)?;
        let collection = self
            .collection::<MongoPollDocument>(POLL_COLLECTION)
            .await;
        collection
            .update_one(doc! {"event_id": event_key.as_str()}, doc! {"$setOnInsert": insert})
            .upsert(true)
            .session(&mut *session)
            .await
            .map_err(MongoDaoError::transaction(event_id, "upsert award poll"))?;

        collection
            .find_one(doc! {"event_id": event_key.as_str()})
            .session(&mut *session)
            .await
            .map_err(MongoDaoError::transaction(event_id, "load award poll"))?
            .map(AwardPollEntity::try_from)
            .transpose()
    }

    async fn find_poll_where(&self, filter: Document) -> MongoResult<Option<AwardPollEntity>> {
        self.collection::<MongoPollDocument>(POLL_COLLECTION)
            .await
            .find_one(filter)
            .await
            .map_err(MongoDaoError::query(POLL_COLLECTION, "load award poll"))?
            .map(AwardPollEntity::try_from)
            .transpose()
    }

    async fn finalize_award_poll(&self, poll_id: Uuid, result: PollResult) -> MongoResult<bool> {
        let mut session = self.start_transaction(poll_id).await?;
        match self.finalize_in(&mut session, poll_id, result).await {
            Ok(true) => {
                session
                    .commit_transaction()
                    .await
                    .map_err(MongoDaoError::transaction(poll_id, "commit finalize"))?;
                Ok(true)
            }
            Ok(false) => {
                abort_quietly(&mut session, poll_id).await;
                Ok(false)
            }
            Err(err) => {
                abort_quietly(&mut session, poll_id).await;
                Err(err)
            }
        }
    }

    async fn finalize_in(
        &self,
        session: &mut ClientSession,
        poll_id: Uuid,
        result: PollResult,
    ) -> MongoResult<bool> {
        let finalized = self
            .collection::<Document>(POLL_COLLECTION)
            .await
            .update_one(
                doc! {"_id": poll_id.to_string(), "finalized": false},
                doc! {"$set": {
                    "finalized": true,
                    "winner_participant_id": result.winner_participant_id.map(|id| id.to_string()),
                    "finalized_at": to_bson_datetime(result.finalized_at),
                }},
            )
            .session(&mut *session)
            .await
            .map_err(MongoDaoError::transaction(poll_id, "mark poll finalized"))?;
        if finalized.modified_count == 0 {
            return Ok(false);
        }

        if let Some(user_id) = result.award_user_id {
            self.collection::<Document>(AWARD_COLLECTION)
                .await
                .update_one(
                    doc_id(user_id),
                    doc! {"$inc": {"count": 1, "level": 1}},
                )
                .upsert(true)
                .session(&mut *session)
                .await
                .map_err(MongoDaoError::transaction(poll_id, "grant award"))?;
        }

        Ok(true)
    }

    async fn list_votes(&self, poll_id: Uuid) -> MongoResult<Vec<VoteEntity>> {
        let documents: Vec<MongoVoteDocument> = self
            .collection::<MongoVoteDocument>(VOTE_COLLECTION)
            .await
            .find(doc! {"poll_id": poll_id.to_string()})
            .sort(doc! {"cast_at": 1})
            .await
            .map_err(MongoDaoError::query(VOTE_COLLECTION, "list votes"))?
            .try_collect()
            .await
            .map_err(MongoDaoError::query(VOTE_COLLECTION, "list votes"))?;

        documents.into_iter().map(VoteEntity::try_from).collect()
    }

    async fn save_vote(&self, vote: VoteEntity) -> MongoResult<()> {
        let document: MongoVoteDocument = vote.into();
        self.collection::<MongoVoteDocument>(VOTE_COLLECTION)
            .await
            .replace_one(
                doc! {
                    "poll_id": document.poll_id.as_str(),
                    "voter_participant_id": document.voter_participant_id.as_str(),
                },
                &document,
            )
            .upsert(true)
            .await
            .map_err(MongoDaoError::query(VOTE_COLLECTION, "save vote"))?;
        Ok(())
    }

    async fn list_participants(&self, event_id: Uuid) -> MongoResult<Vec<ParticipantEntity>> {
        let documents: Vec<MongoParticipantDocument> = self
            .collection::<MongoParticipantDocument>(PARTICIPANT_COLLECTION)
            .await
            .find(doc! {"event_id": event_id.to_string()})
            .await
            .map_err(MongoDaoError::query(PARTICIPANT_COLLECTION, "list participants"))?
            .try_collect()
            .await
            .map_err(MongoDaoError::query(PARTICIPANT_COLLECTION, "list participants"))?;

        documents
            .into_iter()
            .map(ParticipantEntity::try_from)
            .collect()
    }

    async fn find_award(&self, user_id: Uuid) -> MongoResult<Option<AwardEntity>> {
        self.collection::<MongoAwardDocument>(AWARD_COLLECTION)
            .await
            .find_one(doc_id(user_id))
            .await
            .map_err(MongoDaoError::query(AWARD_COLLECTION, "load award"))?
            .map(AwardEntity::try_from)
            .transpose()
    }

    async fn list_subscriptions(&self) -> MongoResult<Vec<SubscriptionEntity>> {
        let documents: Vec<MongoSubscriptionDocument> = self
            .collection::<MongoSubscriptionDocument>(SUBSCRIPTION_COLLECTION)
            .await
            .find(doc! {})
            .await
            .map_err(MongoDaoError::query(SUBSCRIPTION_COLLECTION, "list subscriptions"))?
            .try_collect()
            .await
            .map_err(MongoDaoError::query(SUBSCRIPTION_COLLECTION, "list subscriptions"))?;

        documents
            .into_iter()
            .map(SubscriptionEntity::try_from)
            .collect()
    }

    async fn save_subscription(&self, subscription: SubscriptionEntity) -> MongoResult<()> {
        let document: MongoSubscriptionDocument = subscription.into();
        self.collection::<MongoSubscriptionDocument>(SUBSCRIPTION_COLLECTION)
            .await
            .replace_one(doc! {"endpoint": document.endpoint.as_str()}, &document)
            .upsert(true)
            .await
            .map_err(MongoDaoError::query(
                SUBSCRIPTION_COLLECTION,
                "save subscription",
            ))?;
        Ok(())
    }
}

async fn abort_quietly(session: &mut ClientSession, id: Uuid) {
    if let Err(err) = session.abort_transaction().await {
        warn!(%id, error = %err, "failed to abort MongoDB transaction");
    }
}

impl EventStore for MongoEventStore {
    fn save_event(&self, event: EventEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.save_event(event).await.map_err(Into::into) })
    }

    fn find_event(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<EventEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_event_where(doc_id(id)).await.map_err(Into::into) })
    }

    fn find_event_by_code(
        &self,
        code: String,
    ) -> BoxFuture<'static, StorageResult<Option<EventEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_event_where(doc! {"code": code})
                .await
                .map_err(Into::into)
        })
    }

    fn list_events_by_status(
        &self,
        status: EventStatus,
    ) -> BoxFuture<'static, StorageResult<Vec<EventEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_events_by_status(status).await.map_err(Into::into) })
    }

    fn mark_reminder_sent(
        &self,
        event_id: Uuid,
        threshold: ReminderThreshold,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            let flag = threshold.flag_name();
            let mut filter = doc_id(event_id);
            filter.insert(flag, doc! {"$ne": true});
            let mut set = Document::new();
            set.insert(flag, true);
            store
                .update_flag(EVENT_COLLECTION, filter, set)
                .await
                .map_err(Into::into)
        })
    }

    fn mark_event_finished(&self, event_id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .update_flag(
                    EVENT_COLLECTION,
                    doc! {"_id": event_id.to_string(), "status": EventStatus::Open.as_str()},
                    doc! {"status": EventStatus::Finished.as_str()},
                )
                .await
                .map_err(Into::into)
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
            let result = store
                .collection::<Document>(EVENT_COLLECTION)
                .await
                .update_one(
                    doc! {"_id": event_id.to_string(), "status": EventStatus::Open.as_str()},
                    doc! {"$set": {
                        "date": date.map(format_date),
                        "start_time": start_time.map(format_time),
                        "reminder_3h_sent": false,
                        "reminder_2h_sent": false,
                        "reminder_1h_sent": false,
                    }},
                )
                .await
                .map_err(MongoDaoError::query(EVENT_COLLECTION, "reschedule event"))?;
            Ok(result.matched_count == 1)
        })
    }

    fn reset_event(&self, event_id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.reset_event(event_id).await.map_err(Into::into) })
    }

    fn ensure_award_poll(
        &self,
        poll: AwardPollEntity,
        generation: u32,
    ) -> BoxFuture<'static, StorageResult<Option<AwardPollEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .ensure_award_poll(poll, generation)
                .await
                .map_err(Into::into)
        })
    }

    fn find_award_poll(
        &self,
        event_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<AwardPollEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_poll_where(doc! {"event_id": event_id.to_string()})
                .await
                .map_err(Into::into)
        })
    }

    fn find_award_poll_by_id(
        &self,
        poll_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<AwardPollEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_poll_where(doc_id(poll_id)).await.map_err(Into::into) })
    }

    fn mark_poll_notified(&self, poll_id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .update_flag(
                    POLL_COLLECTION,
                    doc! {"_id": poll_id.to_string(), "notif_sent": {"$ne": true}},
                    doc! {"notif_sent": true},
                )
                .await
                .map_err(Into::into)
        })
    }

    fn finalize_award_poll(
        &self,
        poll_id: Uuid,
        result: PollResult,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .finalize_award_poll(poll_id, result)
                .await
                .map_err(Into::into)
        })
    }

    fn list_votes(&self, poll_id: Uuid) -> BoxFuture<'static, StorageResult<Vec<VoteEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_votes(poll_id).await.map_err(Into::into) })
    }

    fn save_vote(&self, vote: VoteEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.save_vote(vote).await.map_err(Into::into) })
    }

    fn list_participants(
        &self,
        event_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<ParticipantEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_participants(event_id).await.map_err(Into::into) })
    }

    fn find_award(&self, user_id: Uuid) -> BoxFuture<'static, StorageResult<Option<AwardEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_award(user_id).await.map_err(Into::into) })
    }

    fn list_subscriptions(&self) -> BoxFuture<'static, StorageResult<Vec<SubscriptionEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_subscriptions().await.map_err(Into::into) })
    }

    fn save_subscription(
        &self,
        subscription: SubscriptionEntity,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .save_subscription(subscription)
                .await
                .map_err(Into::into)
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.reconnect().await.map_err(Into::into) })
    }
}

/// Decode listed event rows, logging and dropping any that do not decode.
fn decode_listed_events(documents: Vec<Document>) -> Vec<EventEntity> {
    documents
        .into_iter()
        .filter_map(|document| {
            let id = document.get_str("_id").unwrap_or("<missing>").to_owned();
            let decoded = deserialize_from_document::<MongoEventDocument>(document)
                .map_err(|err| MongoDaoError::InvalidDocument {
                    collection: EVENT_COLLECTION,
                    id: id.clone(),
                    reason: err.to_string(),
                })
                .and_then(EventEntity::try_from);
            match decoded {
                Ok(event) => Some(event),
                Err(err) => {
                    warn!(event_id = %id, error = %err, "skipping undecodable event");
                    None
                }
            }
        })
        .collect()
}
