//! Roster endpoint logic: a request is classified by method, authorized,
//! validated and then executed against exactly one store connection.

use axum::http::Method;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::{
        models::{NewPlayerEntity, sort_roster},
        roster_store::{RosterStore, with_connection},
    },
    dto::roster::{
        ActionResponse, CreatePlayerRequest, DeletePlayerRequest, PlayerRecord, UpdateTierRequest,
    },
    error::ServiceError,
    state::SharedState,
};

/// Operation selected by the HTTP method, before the body is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RosterOperation {
    /// `OPTIONS`: CORS preflight.
    Preflight,
    /// `GET`: list the roster.
    List,
    /// `POST`: insert a player.
    Create,
    /// `PUT`: change the tier of a player.
    UpdateTier,
    /// `DELETE`: remove a player.
    Delete,
}

impl RosterOperation {
    /// Map an HTTP method onto an operation; `None` for unsupported methods.
    pub fn from_method(method: &Method) -> Option<Self> {
        match *method {
            Method::OPTIONS => Some(Self::Preflight),
            Method::GET => Some(Self::List),
            Method::POST => Some(Self::Create),
            Method::PUT => Some(Self::UpdateTier),
            Method::DELETE => Some(Self::Delete),
            _ => None,
        }
    }

    /// Writes need the shared secret; reads and preflights do not.
    pub fn requires_auth(self) -> bool {
        matches!(self, Self::Create | Self::UpdateTier | Self::Delete)
    }
}

/// Fully validated roster request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RosterRequest {
    /// Every player, sorted.
    List,
    /// Insert `name` into `tier`.
    Create { name: String, tier: u8 },
    /// Move player `id` to `tier`.
    UpdateTier { id: Uuid, tier: u8 },
    /// Remove player `id`, whether or not it exists.
    Delete { id: Uuid },
}

impl RosterRequest {
    /// Decode and validate the body expected by `operation`.
    ///
    /// An empty body is read as `{}` so missing fields are reported uniformly.
    pub fn parse(operation: RosterOperation, body: &[u8]) -> Result<Option<Self>, ServiceError> {
        let request = match operation {
            RosterOperation::Preflight => return Ok(None),
            RosterOperation::List => RosterRequest::List,
            RosterOperation::Create => {
                let payload: CreatePlayerRequest = decode(body)?;
                payload.validate()?;
                let name = payload.name.as_deref().map(str::trim).unwrap_or_default();
                match (name, payload.tier) {
                    (name, Some(tier)) if !name.is_empty() => RosterRequest::Create {
                        name: name.to_owned(),
                        tier: tier_number(tier)?,
                    },
                    _ => return Err(ServiceError::InvalidInput("Missing name or tier".into())),
                }
            }
            RosterOperation::UpdateTier => {
                let payload: UpdateTierRequest = decode(body)?;
                payload.validate()?;
                match (payload.id, payload.tier) {
                    (Some(id), Some(tier)) => RosterRequest::UpdateTier {
                        id,
                        tier: tier_number(tier)?,
                    },
                    _ => return Err(ServiceError::InvalidInput("Missing id or tier".into())),
                }
            }
            RosterOperation::Delete => {
                let payload: DeletePlayerRequest = decode(body)?;
                let id = payload
                    .id
                    .ok_or_else(|| ServiceError::InvalidInput("Missing id".into()))?;
                RosterRequest::Delete { id }
            }
        };
        Ok(Some(request))
    }
}

/// Successful outcome of a roster request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RosterReply {
    /// Preflight acknowledgement with an empty body.
    Empty,
    /// Sorted roster.
    Players(Vec<PlayerRecord>),
    /// Newly inserted player.
    Created(PlayerRecord),
    /// Player after its tier changed.
    Updated(PlayerRecord),
    /// Deletion acknowledgement.
    Deleted(ActionResponse),
    /// The method is not served by the endpoint.
    MethodNotAllowed,
}

/// Run the full request pipeline: classify, check configuration, authorize,
/// validate, execute.
pub async fn dispatch(
    state: &SharedState,
    method: &Method,
    password: Option<&str>,
    body: &[u8],
) -> Result<RosterReply, ServiceError> {
    let Some(operation) = RosterOperation::from_method(method) else {
        debug!(%method, "unsupported roster method");
        return Ok(RosterReply::MethodNotAllowed);
    };
    if operation == RosterOperation::Preflight {
        return Ok(RosterReply::Empty);
    }

    let store = state.require_roster_store().await?;

    if operation.requires_auth() {
        authorize(state.admin_password(), password)?;
    }

    match RosterRequest::parse(operation, body)? {
        Some(request) => execute(store.as_ref(), request).await,
        None => Ok(RosterReply::Empty),
    }
}

/// Check the supplied secret against the configured one.
///
/// Without a configured secret every write is refused.
pub fn authorize(expected: Option<&str>, provided: Option<&str>) -> Result<(), ServiceError> {
    match (expected, provided) {
        (Some(expected), Some(provided)) if expected == provided => Ok(()),
        (None, _) => {
            warn!("write rejected: no admin password configured");
            Err(ServiceError::Unauthorized(
                "Incorrect or missing password".into(),
            ))
        }
        _ => {
            warn!("write rejected: incorrect or missing admin password");
            Err(ServiceError::Unauthorized(
                "Incorrect or missing password".into(),
            ))
        }
    }
}

/// Execute one validated request inside a single connection scope.
pub async fn execute(
    store: &dyn RosterStore,
    request: RosterRequest,
) -> Result<RosterReply, ServiceError> {
    match request {
        RosterRequest::List => {
            let mut players = with_connection(store, |conn| conn.list_players()).await?;
            sort_roster(&mut players);
            Ok(RosterReply::Players(
                players.into_iter().map(PlayerRecord::from).collect(),
            ))
        }
        RosterRequest::Create { name, tier } => {
            let player = NewPlayerEntity { name, tier };
            let created = with_connection(store, move |conn| conn.insert_player(player)).await?;
            debug!(id = %created.id, tier, "player created");
            Ok(RosterReply::Created(created.into()))
        }
        RosterRequest::UpdateTier { id, tier } => {
            let updated = with_connection(store, move |conn| conn.update_tier(id, tier)).await?;
            match updated {
                Some(player) => Ok(RosterReply::Updated(player.into())),
                None => Err(ServiceError::NotFound(format!("player `{id}` not found"))),
            }
        }
        RosterRequest::Delete { id } => {
            let deleted = with_connection(store, move |conn| conn.delete_player(id)).await?;
            debug!(%id, deleted, "player delete processed");
            Ok(RosterReply::Deleted(ActionResponse::deleted()))
        }
    }
}

fn decode<T>(body: &[u8]) -> Result<T, ServiceError>
where
    T: DeserializeOwned + Default,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body)
        .map_err(|err| ServiceError::InvalidInput(format!("invalid request body: {err}")))
}

fn tier_number(tier: i64) -> Result<u8, ServiceError> {
    u8::try_from(tier)
        .map_err(|_| ServiceError::InvalidInput("tier must be between 1 and 5".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(operation: RosterOperation, body: &str) -> Result<Option<RosterRequest>, ServiceError> {
        RosterRequest::parse(operation, body.as_bytes())
    }

    #[test]
    fn methods_map_to_operations() {
        assert_eq!(
            RosterOperation::from_method(&Method::OPTIONS),
            Some(RosterOperation::Preflight)
        );
        assert_eq!(RosterOperation::from_method(&Method::PATCH), None);
        assert!(!RosterOperation::List.requires_auth());
        assert!(!RosterOperation::Preflight.requires_auth());
        assert!(RosterOperation::Delete.requires_auth());
    }

    #[test]
    fn create_requires_name_and_tier() {
        assert!(matches!(
            parse(RosterOperation::Create, r#"{"tier":2}"#),
            Err(ServiceError::InvalidInput(message)) if message == "Missing name or tier"
        ));
        assert!(parse(RosterOperation::Create, r#"{"name":"Anka"}"#).is_err());
        assert!(parse(RosterOperation::Create, r#"{"name":"  ","tier":2}"#).is_err());
        assert!(parse(RosterOperation::Create, "").is_err());

        assert_eq!(
            parse(RosterOperation::Create, r#"{"name":" Anka ","tier":2}"#).unwrap(),
            Some(RosterRequest::Create {
                name: "Anka".into(),
                tier: 2
            })
        );
    }

    #[test]
    fn tier_outside_range_is_rejected() {
        assert!(parse(RosterOperation::Create, r#"{"name":"Anka","tier":0}"#).is_err());
        assert!(parse(RosterOperation::Create, r#"{"name":"Anka","tier":6}"#).is_err());
        assert!(parse(RosterOperation::UpdateTier, r#"{"id":"00000000-0000-0000-0000-000000000001","tier":-1}"#).is_err());
    }

    #[test]
    fn update_and_delete_require_an_id() {
        assert!(parse(RosterOperation::UpdateTier, r#"{"tier":3}"#).is_err());
        assert!(parse(RosterOperation::Delete, "{}").is_err());
        assert!(parse(RosterOperation::Delete, r#"{"id":"not-a-uuid"}"#).is_err());

        let id = Uuid::new_v4();
        assert_eq!(
            parse(RosterOperation::Delete, &format!(r#"{{"id":"{id}"}}"#)).unwrap(),
            Some(RosterRequest::Delete { id })
        );
    }

    #[test]
    fn authorization_fails_closed() {
        assert!(authorize(Some("pw"), Some("pw")).is_ok());
        assert!(authorize(Some("pw"), Some("PW")).is_err());
        assert!(authorize(Some("pw"), None).is_err());
        assert!(authorize(None, Some("pw")).is_err());
        assert!(authorize(None, None).is_err());
    }
}
