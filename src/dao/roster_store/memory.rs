//! Process-local roster table used for `memory://` deployments and tests.

use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};

use futures::future::BoxFuture;
use thiserror::Error;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::dao::{
    models::{NewPlayerEntity, PlayerEntity, sort_roster},
    roster_store::{RosterConnection, RosterStore},
    storage::{StorageError, StorageResult},
};

#[derive(Debug, Error)]
#[error("in-memory roster store is offline")]
struct Offline;

/// Roster table held in memory.
#[derive(Clone, Default)]
pub struct MemoryRosterStore {
    inner: Arc<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    players: Mutex<Vec<PlayerEntity>>,
    offline: AtomicBool,
    acquired: AtomicUsize,
    released: AtomicUsize,
}

impl MemoryRosterStore {
    /// Empty, online table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate an outage: acquisitions and health checks fail while offline.
    pub fn set_offline(&self, offline: bool) {
        self.inner.offline.store(offline, Ordering::SeqCst);
    }

    /// Copy of the stored rows in insertion order.
    pub async fn snapshot(&self) -> Vec<PlayerEntity> {
        self.inner.players.lock().await.clone()
    }

    /// Number of connections handed out so far.
    pub fn acquired_connections(&self) -> usize {
        self.inner.acquired.load(Ordering::SeqCst)
    }

    /// Number of connections given back so far.
    pub fn released_connections(&self) -> usize {
        self.inner.released.load(Ordering::SeqCst)
    }

    fn ensure_online(&self) -> StorageResult<()> {
        if self.inner.offline.load(Ordering::SeqCst) {
            Err(StorageError::unavailable(Offline.to_string(), Offline))
        } else {
            Ok(())
        }
    }
}

impl RosterStore for MemoryRosterStore {
    fn acquire(&self) -> BoxFuture<'static, StorageResult<Box<dyn RosterConnection>>> {
        let store = self.clone();
        Box::pin(async move {
            store.ensure_online()?;
            store.inner.acquired.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(MemoryConnection { store }) as Box<dyn RosterConnection>)
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ensure_online() })
    }
}

struct MemoryConnection {
    store: MemoryRosterStore,
}

impl RosterConnection for MemoryConnection {
    fn list_players(&self) -> BoxFuture<'static, StorageResult<Vec<PlayerEntity>>> {
        let store = self.store.clone();
        Box::pin(async move {
            let mut players = store.snapshot().await;
            sort_roster(&mut players);
            Ok(players)
        })
    }

    fn insert_player(&self, player: NewPlayerEntity) -> BoxFuture<'static, StorageResult<PlayerEntity>> {
        let store = self.store.clone();
        Box::pin(async move {
            let entity = player.into_entity();
            store.inner.players.lock().await.push(entity.clone());
            Ok(entity)
        })
    }

    fn update_tier(&self, id: Uuid, tier: u8) -> BoxFuture<'static, StorageResult<Option<PlayerEntity>>> {
        let store = self.store.clone();
        Box::pin(async move {
            let mut players = store.inner.players.lock().await;
            Ok(players.iter_mut().find(|player| player.id == id).map(|player| {
                player.tier = tier;
                player.clone()
            }))
        })
    }

    fn delete_player(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.store.clone();
        Box::pin(async move {
            let mut players = store.inner.players.lock().await;
            let before = players.len();
            players.retain(|player| player.id != id);
            Ok(players.len() != before)
        })
    }

    fn release(self: Box<Self>) -> BoxFuture<'static, StorageResult<()>> {
        self.store.inner.released.fetch_add(1, Ordering::SeqCst);
        Box::pin(async { Ok(()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::roster_store::with_connection;

    async fn insert(store: &MemoryRosterStore, name: &str, tier: u8) -> PlayerEntity {
        let player = NewPlayerEntity {
            name: name.into(),
            tier,
        };
        with_connection(store, move |conn| conn.insert_player(player))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn update_and_delete_only_touch_matching_rows() {
        let store = MemoryRosterStore::new();
        let anka = insert(&store, "Anka", 1).await;
        let netto = insert(&store, "Netto", 2).await;

        let updated = with_connection(&store, move |conn| conn.update_tier(anka.id, 3))
            .await
            .unwrap();
        assert_eq!(updated.map(|p| p.tier), Some(3));

        let missing = Uuid::new_v4();
        assert_eq!(
            with_connection(&store, move |conn| conn.update_tier(missing, 5))
                .await
                .unwrap(),
            None
        );
        assert!(
            !with_connection(&store, move |conn| conn.delete_player(missing))
                .await
                .unwrap()
        );
        assert!(
            with_connection(&store, move |conn| conn.delete_player(netto.id))
                .await
                .unwrap()
        );

        let rows = store.snapshot().await;
        assert_eq!(rows.len(), 1);
        assert_eq!((rows[0].name.as_str(), rows[0].tier), ("Anka", 3));
        assert_eq!(store.acquired_connections(), store.released_connections());
    }

    #[tokio::test]
    async fn offline_store_refuses_connections() {
        let store = MemoryRosterStore::new();
        store.set_offline(true);

        let err = with_connection(&store, |conn| conn.list_players())
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Unavailable { .. }));
        assert!(store.health_check().await.is_err());
        assert_eq!(store.acquired_connections(), 0);
    }
}
