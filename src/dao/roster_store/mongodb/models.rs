use mongodb::bson::{Document, doc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::MongoDaoError;
use crate::dao::models::PlayerEntity;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoPlayerDocument {
    #[serde(rename = "_id")]
    id: String,
    name: String,
    tier: i32,
}

impl From<&PlayerEntity> for MongoPlayerDocument {
    fn from(value: &PlayerEntity) -> Self {
        Self {
            id: value.id.to_string(),
            name: value.name.clone(),
            tier: i32::from(value.tier),
        }
    }
}

impl TryFrom<MongoPlayerDocument> for PlayerEntity {
    type Error = MongoDaoError;

    fn try_from(value: MongoPlayerDocument) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&value.id).map_err(|_| MongoDaoError::InvalidDocument {
            id: value.id.clone(),
            reason: "identifier is not a UUID",
        })?;
        let tier = u8::try_from(value.tier).map_err(|_| MongoDaoError::InvalidDocument {
            id: value.id.clone(),
            reason: "tier does not fit a tier number",
        })?;

        Ok(Self {
            id,
            name: value.name,
            tier,
        })
    }
}

/// Filter selecting a single player by identifier.
pub fn doc_id(id: Uuid) -> Document {
    doc! {"_id": id.to_string()}
}
