use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
};

use crate::{
    dto::roster::PlayerRecord,
    error::AppError,
    services::roster_service::{self, RosterReply},
    state::SharedState,
};

/// Header carrying the shared admin secret on write requests.
pub const ADMIN_PASSWORD_HEADER: &str = "x-admin-password";

/// Roster endpoint, also reachable under the serverless function path.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/api/players", any(roster_endpoint))
        .route("/.netlify/functions/api", any(roster_endpoint))
}

#[utoipa::path(
    method(get, post, put, delete, options),
    path = "/api/players",
    tag = "roster",
    params(("x-admin-password" = Option<String>, Header, description = "Shared admin secret, required for POST, PUT and DELETE")),
    responses(
        (status = 200, description = "GET: players sorted by tier then name; PUT: updated player; DELETE: acknowledgement; OPTIONS: empty", body = [PlayerRecord]),
        (status = 201, description = "POST: created player", body = PlayerRecord),
        (status = 400, description = "Missing or invalid body field"),
        (status = 401, description = "Incorrect or missing admin password"),
        (status = 404, description = "PUT: no player with this id"),
        (status = 405, description = "Unsupported method"),
        (status = 500, description = "Configuration or database error"),
        (status = 503, description = "Roster store not connected yet"),
    )
)]
/// Single roster endpoint dispatching on the HTTP method.
pub async fn roster_endpoint(
    State(state): State<SharedState>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    let password = headers
        .get(ADMIN_PASSWORD_HEADER)
        .and_then(|value| value.to_str().ok());

    let reply = roster_service::dispatch(&state, &method, password, &body).await?;
    Ok(reply.into_response())
}

impl IntoResponse for RosterReply {
    fn into_response(self) -> Response {
        match self {
            RosterReply::Empty => StatusCode::OK.into_response(),
            RosterReply::Players(players) => (StatusCode::OK, Json(players)).into_response(),
            RosterReply::Created(player) => (StatusCode::CREATED, Json(player)).into_response(),
            RosterReply::Updated(player) => (StatusCode::OK, Json(player)).into_response(),
            RosterReply::Deleted(ack) => (StatusCode::OK, Json(ack)).into_response(),
            RosterReply::MethodNotAllowed => {
                (StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed").into_response()
            }
        }
    }
}
