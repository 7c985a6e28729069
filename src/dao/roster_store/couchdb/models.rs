use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::error::CouchDaoError;
use crate::dao::models::PlayerEntity;

/// Prefix of every player document id.
pub const PLAYER_PREFIX: &str = "player::";
pub const END_SUFFIX: &str = "\u{ffff}";

#[derive(Debug, Deserialize)]
pub struct AllDocsResponse {
    pub rows: Vec<AllDocsRow>,
}

#[derive(Debug, Deserialize)]
pub struct AllDocsRow {
    #[serde(default)]
    pub doc: Option<Value>,
}

/// Player stored as one CouchDB document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouchPlayerDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev", skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    pub name: String,
    pub tier: u8,
}

impl From<&PlayerEntity> for CouchPlayerDocument {
    fn from(player: &PlayerEntity) -> Self {
        Self {
            id: player_doc_id(player.id),
            rev: None,
            name: player.name.clone(),
            tier: player.tier,
        }
    }
}

impl TryFrom<CouchPlayerDocument> for PlayerEntity {
    type Error = CouchDaoError;

    fn try_from(doc: CouchPlayerDocument) -> Result<Self, Self::Error> {
        let id = doc
            .id
            .strip_prefix(PLAYER_PREFIX)
            .and_then(|raw| Uuid::parse_str(raw).ok())
            .ok_or_else(|| CouchDaoError::InvalidDocId {
                doc_id: doc.id.clone(),
            })?;

        Ok(Self {
            id,
            name: doc.name,
            tier: doc.tier,
        })
    }
}

/// Document id of player `id`.
pub fn player_doc_id(id: Uuid) -> String {
    format!("{PLAYER_PREFIX}{id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_ids_carry_the_player_prefix() {
        let player = PlayerEntity {
            id: Uuid::new_v4(),
            name: "Wes".into(),
            tier: 2,
        };
        let doc = CouchPlayerDocument::from(&player);
        assert!(doc.id.starts_with(PLAYER_PREFIX));
        assert_eq!(PlayerEntity::try_from(doc).unwrap(), player);
    }

    #[test]
    fn foreign_document_ids_are_rejected() {
        let doc = CouchPlayerDocument {
            id: "other::1".into(),
            rev: None,
            name: "x".into(),
            tier: 1,
        };
        assert!(matches!(
            PlayerEntity::try_from(doc),
            Err(CouchDaoError::InvalidDocId { .. })
        ));
    }
}
