mod config;
mod error;
mod models;
mod store;

pub use config::CouchConfig;
pub use error::CouchDaoError;
pub use store::CouchRosterStore;

use crate::dao::storage::StorageError;

impl From<CouchDaoError> for StorageError {
    fn from(err: CouchDaoError) -> Self {
        match err {
            CouchDaoError::ClientBuilder { .. }
            | CouchDaoError::DatabaseQuery { .. }
            | CouchDaoError::DatabaseCreate { .. }
            | CouchDaoError::DatabaseStatus { .. } => StorageError::unavailable(err.to_string(), err),
            _ => StorageError::query(err.to_string(), err),
        }
    }
}
