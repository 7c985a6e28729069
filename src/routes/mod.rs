use axum::{
    Router,
    http::{HeaderName, Method, header},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::state::SharedState;

/// Swagger UI.
pub mod docs;
/// Health check route.
pub mod health;
/// Roster endpoint.
pub mod roster;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router().merge(roster::router());

    let docs_router = docs::router(state.clone());

    api_router.merge(docs_router).with_state(state)
}

/// Full application: routes plus the cross-cutting CORS and tracing layers.
pub fn app(state: SharedState) -> Router<()> {
    router(state).layer(cors_layer()).layer(TraceLayer::new_for_http())
}

/// Any origin may call the API, sending the admin password header.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(roster::ADMIN_PASSWORD_HEADER),
        ])
}
