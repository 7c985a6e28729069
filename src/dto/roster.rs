//! Payloads exchanged on the roster endpoint.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::dao::models::PlayerEntity;

/// Player row as returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct PlayerRecord {
    pub id: Uuid,
    pub name: String,
    /// Tier number, `1` being the best.
    pub tier: u8,
}

impl From<PlayerEntity> for PlayerRecord {
    fn from(player: PlayerEntity) -> Self {
        Self {
            id: player.id,
            name: player.name,
            tier: player.tier,
        }
    }
}

/// Body of a `POST`: both fields are required.
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub struct CreatePlayerRequest {
    #[validate(length(max = 64, message = "name must be at most 64 characters"))]
    pub name: Option<String>,
    #[validate(range(min = 1, max = 5, message = "tier must be between 1 and 5"))]
    pub tier: Option<i64>,
}

/// Body of a `PUT`: only the tier of `id` changes.
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub struct UpdateTierRequest {
    pub id: Option<Uuid>,
    #[validate(range(min = 1, max = 5, message = "tier must be between 1 and 5"))]
    pub tier: Option<i64>,
}

/// Body of a `DELETE`.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct DeletePlayerRequest {
    pub id: Option<Uuid>,
}

/// Generic acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct ActionResponse {
    pub message: String,
}

impl ActionResponse {
    /// Acknowledgement sent after a `DELETE`.
    pub fn deleted() -> Self {
        Self {
            message: "Deleted".into(),
        }
    }
}
