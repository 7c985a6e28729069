#[cfg(feature = "couch-store")]
pub mod couchdb;
pub mod memory;
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use std::sync::Arc;

use futures::future::BoxFuture;
use tracing::warn;
use uuid::Uuid;

use crate::config::StoreBackend;
use crate::dao::models::{NewPlayerEntity, PlayerEntity};
use crate::dao::storage::StorageResult;

pub use self::memory::MemoryRosterStore;

/// Abstraction over the remote roster table.
pub trait RosterStore: Send + Sync {
    /// Check out a connection for a single request.
    fn acquire(&self) -> BoxFuture<'static, StorageResult<Box<dyn RosterConnection>>>;
    /// Cheap liveness probe used by the supervisor and `/healthcheck`.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
}

/// Connection scoped to one request; must be handed back through [`RosterConnection::release`].
pub trait RosterConnection: Send {
    /// Every player, ordered by tier then name.
    fn list_players(&self) -> BoxFuture<'static, StorageResult<Vec<PlayerEntity>>>;
    /// Insert `player` under a freshly generated id.
    fn insert_player(&self, player: NewPlayerEntity) -> BoxFuture<'static, StorageResult<PlayerEntity>>;
    /// Change the tier of `id`, returning `None` when no row matched.
    fn update_tier(&self, id: Uuid, tier: u8) -> BoxFuture<'static, StorageResult<Option<PlayerEntity>>>;
    /// Remove `id`, returning whether a row was deleted.
    fn delete_player(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>>;
    /// Hand the connection back to its store.
    fn release(self: Box<Self>) -> BoxFuture<'static, StorageResult<()>>;
}

/// Acquire a connection, run `work` on it and release it on every exit path.
///
/// A failing release is logged and swallowed so it never masks the outcome of
/// `work`. If the returned future is dropped before `work` completes (client
/// disconnect, timeout, panic), the release is spawned onto the runtime.
pub async fn with_connection<T, F>(store: &dyn RosterStore, work: F) -> StorageResult<T>
where
    F: FnOnce(&dyn RosterConnection) -> BoxFuture<'static, StorageResult<T>>,
{
    let connection = store.acquire().await?;
    let pending = work(connection.as_ref());
    let guard = ReleaseGuard(Some(connection));

    let outcome = pending.await;
    guard.release().await;
    outcome
}

/// Owns a checked-out connection until it has been released.
struct ReleaseGuard(Option<Box<dyn RosterConnection>>);

impl ReleaseGuard {
    async fn release(mut self) {
        if let Some(connection) = self.0.take() {
            log_release_failure(connection.release().await);
        }
    }
}

impl Drop for ReleaseGuard {
    fn drop(&mut self) {
        let Some(connection) = self.0.take() else {
            return;
        };

        let release = connection.release();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move { log_release_failure(release.await) });
            }
            Err(_) => warn!("roster store connection abandoned outside of a runtime"),
        }
    }
}

fn log_release_failure(result: StorageResult<()>) {
    if let Err(err) = result {
        warn!(error = %err, "failed to release roster store connection");
    }
}

/// Open the backend described by `backend`.
pub async fn connect(backend: StoreBackend) -> StorageResult<Arc<dyn RosterStore>> {
    match backend {
        StoreBackend::Memory => Ok(Arc::new(MemoryRosterStore::new())),
        #[cfg(feature = "mongo-store")]
        StoreBackend::Mongo { uri, database } => {
            let config = self::mongodb::MongoConfig::from_uri(&uri, &database).await?;
            let store = self::mongodb::MongoRosterStore::connect(config).await?;
            Ok(Arc::new(store))
        }
        #[cfg(feature = "couch-store")]
        StoreBackend::Couch { base_url, database } => {
            let config = self::couchdb::CouchConfig::from_env(base_url, database);
            let store = self::couchdb::CouchRosterStore::connect(config).await?;
            Ok(Arc::new(store))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::atomic::{AtomicUsize, Ordering},
        time::Duration,
    };

    use thiserror::Error;

    use super::*;
    use crate::dao::storage::StorageError;

    #[derive(Debug, Error)]
    #[error("boom")]
    struct Boom;

    #[derive(Default)]
    struct FlakyStore {
        released: Arc<AtomicUsize>,
    }

    struct FlakyConnection {
        released: Arc<AtomicUsize>,
    }

    impl RosterStore for FlakyStore {
        fn acquire(&self) -> BoxFuture<'static, StorageResult<Box<dyn RosterConnection>>> {
            let released = self.released.clone();
            Box::pin(async move { Ok(Box::new(FlakyConnection { released }) as Box<dyn RosterConnection>) })
        }

        fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
            Box::pin(async { Ok(()) })
        }
    }

    impl RosterConnection for FlakyConnection {
        fn list_players(&self) -> BoxFuture<'static, StorageResult<Vec<PlayerEntity>>> {
            Box::pin(async { Err(StorageError::query("list failed".into(), Boom)) })
        }

        fn insert_player(&self, player: NewPlayerEntity) -> BoxFuture<'static, StorageResult<PlayerEntity>> {
            Box::pin(async move { Ok(player.into_entity()) })
        }

        fn update_tier(&self, _id: Uuid, _tier: u8) -> BoxFuture<'static, StorageResult<Option<PlayerEntity>>> {
            Box::pin(async { Ok(None) })
        }

        fn delete_player(&self, _id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
            Box::pin(async { Ok(false) })
        }

        fn release(self: Box<Self>) -> BoxFuture<'static, StorageResult<()>> {
            self.released.fetch_add(1, Ordering::SeqCst);
            Box::pin(async { Err(StorageError::unavailable("close failed".into(), Boom)) })
        }
    }

    #[tokio::test]
    async fn releases_after_success_and_hides_release_error() {
        let store = FlakyStore::default();
        let created = with_connection(&store, |conn| {
            conn.insert_player(NewPlayerEntity {
                name: "Anka".into(),
                tier: 1,
            })
        })
        .await
        .unwrap();

        assert_eq!(created.name, "Anka");
        assert_eq!(store.released.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn releases_after_failed_work_and_keeps_primary_error() {
        let store = FlakyStore::default();
        let err = with_connection(&store, |conn| conn.list_players())
            .await
            .unwrap_err();

        assert!(matches!(err, StorageError::Query { .. }));
        assert_eq!(store.released.load(Ordering::SeqCst), 1);
    }

    #[derive(Default)]
    struct StalledStore {
        acquired: Arc<AtomicUsize>,
        released: Arc<AtomicUsize>,
    }

    struct StalledConnection {
        released: Arc<AtomicUsize>,
    }

    impl RosterStore for StalledStore {
        fn acquire(&self) -> BoxFuture<'static, StorageResult<Box<dyn RosterConnection>>> {
            self.acquired.fetch_add(1, Ordering::SeqCst);
            let released = self.released.clone();
            Box::pin(async move { Ok(Box::new(StalledConnection { released }) as Box<dyn RosterConnection>) })
        }

        fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
            Box::pin(async { Ok(()) })
        }
    }

    impl RosterConnection for StalledConnection {
        fn list_players(&self) -> BoxFuture<'static, StorageResult<Vec<PlayerEntity>>> {
            Box::pin(async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(Vec::new())
            })
        }

        fn insert_player(&self, player: NewPlayerEntity) -> BoxFuture<'static, StorageResult<PlayerEntity>> {
            Box::pin(async move { Ok(player.into_entity()) })
        }

        fn update_tier(&self, _id: Uuid, _tier: u8) -> BoxFuture<'static, StorageResult<Option<PlayerEntity>>> {
            Box::pin(async { Ok(None) })
        }

        fn delete_player(&self, _id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
            Box::pin(async { Ok(false) })
        }

        fn release(self: Box<Self>) -> BoxFuture<'static, StorageResult<()>> {
            self.released.fetch_add(1, Ordering::SeqCst);
            Box::pin(async { Ok(()) })
        }
    }

    #[tokio::test]
    async fn releases_when_the_scope_is_cancelled() {
        let store = StalledStore::default();

        let result = tokio::time::timeout(
            Duration::from_millis(50),
            with_connection(&store, |conn| conn.list_players()),
        )
        .await;

        assert!(result.is_err());
        assert_eq!(store.acquired.load(Ordering::SeqCst), 1);
        assert_eq!(store.released.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn memory_backend_connects() {
        let store = connect(StoreBackend::Memory).await.unwrap();
        let players = with_connection(store.as_ref(), |conn| conn.list_players())
            .await
            .unwrap();
        assert!(players.is_empty());
    }
}
