//! Error types raised by the MongoDB roster backend.

use thiserror::Error;
use uuid::Uuid;

/// Convenient result alias returning [`MongoDaoError`] failures.
pub type MongoResult<T> = Result<T, MongoDaoError>;

/// Failures that can occur while interacting with MongoDB.
#[derive(Debug, Error)]
pub enum MongoDaoError {
    #[error("invalid MongoDB connection string `{uri}`")]
    InvalidUri {
        uri: String,
        #[source]
        source: mongodb::error::Error,
    },
    #[error("failed to build MongoDB client")]
    ClientConstruction {
        #[source]
        source: mongodb::error::Error,
    },
    #[error("MongoDB ping failed")]
    Ping {
        #[source]
        source: mongodb::error::Error,
    },
    #[error("failed to ensure index `{index}` on `{collection}`")]
    EnsureIndex {
        collection: &'static str,
        index: &'static str,
        #[source]
        source: mongodb::error::Error,
    },
    #[error("failed to list players")]
    ListPlayers {
        #[source]
        source: mongodb::error::Error,
    },
    #[error("failed to insert player `{name}`")]
    InsertPlayer {
        name: String,
        #[source]
        source: mongodb::error::Error,
    },
    #[error("failed to update player `{id}`")]
    UpdatePlayer {
        id: Uuid,
        #[source]
        source: mongodb::error::Error,
    },
    #[error("failed to delete player `{id}`")]
    DeletePlayer {
        id: Uuid,
        #[source]
        source: mongodb::error::Error,
    },
    /// A stored document does not map onto a player row.
    #[error("invalid player document `{id}`: {reason}")]
    InvalidDocument { id: String, reason: &'static str },
}
