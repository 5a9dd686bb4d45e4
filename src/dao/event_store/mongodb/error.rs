use mongodb::error::Error as MongoError;
use thiserror::Error;
use uuid::Uuid;

pub type MongoResult<T> = std::result::Result<T, MongoDaoError>;

#[derive(Debug, Error)]
pub enum MongoDaoError {
    #[error("failed to parse MongoDB connection URI `{uri}`")]
    InvalidUri {
        uri: String,
        #[source]
        source: MongoError,
    },
    #[error("failed to build MongoDB client from options")]
    ClientConstruction {
        #[source]
        source: MongoError,
    },
    #[error("MongoDB ping failed during initial connection after {attempts} attempt(s)")]
    InitialPing {
        attempts: u32,
        #[source]
        source: MongoError,
    },
    #[error("MongoDB ping health check failed")]
    HealthPing {
        #[source]
        source: MongoError,
    },
    #[error("failed to ensure index `{index}` on collection `{collection}`")]
    EnsureIndex {
        collection: &'static str,
        index: &'static str,
        #[source]
        source: MongoError,
    },
    #[error("failed to {action} in collection `{collection}`")]
    Query {
        collection: &'static str,
        action: &'static str,
        #[source]
        source: MongoError,
    },
    #[error("transaction on `{id}` failed during {step}")]
    Transaction {
        id: Uuid,
        step: &'static str,
        #[source]
        source: MongoError,
    },
    #[error("invalid document `{id}` in collection `{collection}`: {reason}")]
    InvalidDocument {
        collection: &'static str,
        id: String,
        reason: String,
    },
}

impl MongoDaoError {
    pub fn query(
        collection: &'static str,
        action: &'static str,
    ) -> impl FnOnce(MongoError) -> Self {
        move |source| MongoDaoError::Query {
            collection,
            action,
            source,
        }
    }

    pub fn transaction(id: Uuid, step: &'static str) -> impl FnOnce(MongoError) -> Self {
        move |source| MongoDaoError::Transaction {
            id,
            step,
            source,
        }
    }
}
