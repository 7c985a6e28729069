use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{
    Client, Collection, Database,
    bson::doc,
    options::{IndexOptions, ReturnDocument},
};
use tracing::debug;
use uuid::Uuid;

use super::{
    config::MongoConfig,
    error::{MongoDaoError, MongoResult},
    models::{MongoPlayerDocument, doc_id},
};
use crate::dao::{
    models::{NewPlayerEntity, PlayerEntity},
    roster_store::{RosterConnection, RosterStore},
    storage::StorageResult,
};

const PLAYER_COLLECTION_NAME: &str = "players";

/// Roster table stored in a MongoDB collection.
///
/// The driver pools sockets internally; a [`RosterConnection`] is a
/// liveness-checked handle on the collection.
#[derive(Clone)]
pub struct MongoRosterStore {
    database: Database,
}

impl MongoRosterStore {
    /// Build the client, verify the server answers and ensure indexes are present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let client = Client::with_options(config.options)
            .map_err(|source| MongoDaoError::ClientConstruction { source })?;
        let store = Self {
            database: client.database(&config.database_name),
        };

        store.ping().await?;
        store.ensure_indexes().await?;
        debug!(database = %config.database_name, "MongoDB roster store ready");
        Ok(store)
    }

    async fn ping(&self) -> MongoResult<()> {
        self.database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::Ping { source })?;
        Ok(())
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        let index = mongodb::IndexModel::builder()
            .keys(doc! {"tier": 1, "name": 1})
            .options(
                IndexOptions::builder()
                    .name(Some("player_tier_name_idx".to_owned()))
                    .build(),
            )
            .build();

        self.collection()
            .create_index(index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: PLAYER_COLLECTION_NAME,
                index: "tier,name",
                source,
            })?;
        Ok(())
    }

    fn collection(&self) -> Collection<MongoPlayerDocument> {
        self.database
            .collection::<MongoPlayerDocument>(PLAYER_COLLECTION_NAME)
    }
}

impl RosterStore for MongoRosterStore {
    fn acquire(&self) -> BoxFuture<'static, StorageResult<Box<dyn RosterConnection>>> {
        let store = self.clone();
        Box::pin(async move {
            store.ping().await?;
            Ok(Box::new(MongoConnection {
                collection: store.collection(),
            }) as Box<dyn RosterConnection>)
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ping().await.map_err(Into::into) })
    }
}

struct MongoConnection {
    collection: Collection<MongoPlayerDocument>,
}

impl MongoConnection {
    async fn fetch_players(collection: Collection<MongoPlayerDocument>) -> MongoResult<Vec<PlayerEntity>> {
        let documents: Vec<MongoPlayerDocument> = collection
            .find(doc! {})
            .sort(doc! {"tier": 1, "name": 1})
            .await
            .map_err(|source| MongoDaoError::ListPlayers { source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::ListPlayers { source })?;

        documents.into_iter().map(PlayerEntity::try_from).collect()
    }

    async fn insert_document(
        collection: Collection<MongoPlayerDocument>,
        player: NewPlayerEntity,
    ) -> MongoResult<PlayerEntity> {
        let entity = player.into_entity();
        collection
            .insert_one(MongoPlayerDocument::from(&entity))
            .await
            .map_err(|source| MongoDaoError::InsertPlayer {
                name: entity.name.clone(),
                source,
            })?;
        Ok(entity)
    }

    async fn set_tier(
        collection: Collection<MongoPlayerDocument>,
        id: Uuid,
        tier: u8,
    ) -> MongoResult<Option<PlayerEntity>> {
        let updated = collection
            .find_one_and_update(doc_id(id), doc! {"$set": {"tier": i32::from(tier)}})
            .return_document(ReturnDocument::After)
            .await
            .map_err(|source| MongoDaoError::UpdatePlayer { id, source })?;

        updated.map(PlayerEntity::try_from).transpose()
    }

    async fn remove_document(collection: Collection<MongoPlayerDocument>, id: Uuid) -> MongoResult<bool> {
        let result = collection
            .delete_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::DeletePlayer { id, source })?;
        Ok(result.deleted_count > 0)
    }
}

impl RosterConnection for MongoConnection {
    fn list_players(&self) -> BoxFuture<'static, StorageResult<Vec<PlayerEntity>>> {
        let collection = self.collection.clone();
        Box::pin(async move { Self::fetch_players(collection).await.map_err(Into::into) })
    }

    fn insert_player(&self, player: NewPlayerEntity) -> BoxFuture<'static, StorageResult<PlayerEntity>> {
        let collection = self.collection.clone();
        Box::pin(async move {
            Self::insert_document(collection, player)
                .await
                .map_err(Into::into)
        })
    }

    fn update_tier(&self, id: Uuid, tier: u8) -> BoxFuture<'static, StorageResult<Option<PlayerEntity>>> {
        let collection = self.collection.clone();
        Box::pin(async move {
            Self::set_tier(collection, id, tier)
                .await
                .map_err(Into::into)
        })
    }

    fn delete_player(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let collection = self.collection.clone();
        Box::pin(async move { Self::remove_document(collection, id).await.map_err(Into::into) })
    }

    fn release(self: Box<Self>) -> BoxFuture<'static, StorageResult<()>> {
        // Dropping the handle returns the socket to the driver pool.
        drop(self);
        Box::pin(async { Ok(()) })
    }
}
