use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the roster service.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::roster::roster_endpoint,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::roster::PlayerRecord,
            crate::dto::roster::CreatePlayerRequest,
            crate::dto::roster::UpdateTierRequest,
            crate::dto::roster::DeletePlayerRequest,
            crate::dto::roster::ActionResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "roster", description = "Player roster CRUD"),
    )
)]
pub struct ApiDoc;
