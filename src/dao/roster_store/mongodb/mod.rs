mod config;
mod error;
mod models;
mod store;

pub use config::MongoConfig;
pub use error::MongoDaoError;
pub use store::MongoRosterStore;

use crate::dao::storage::StorageError;

impl From<MongoDaoError> for StorageError {
    fn from(err: MongoDaoError) -> Self {
        match err {
            MongoDaoError::InvalidUri { .. }
            | MongoDaoError::ClientConstruction { .. }
            | MongoDaoError::Ping { .. }
            | MongoDaoError::EnsureIndex { .. } => StorageError::unavailable(err.to_string(), err),
            _ => StorageError::query(err.to_string(), err),
        }
    }
}
