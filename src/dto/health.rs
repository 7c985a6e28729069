use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Simple health response returned by the `/healthcheck` route.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Health status ("ok", "degraded" or "unconfigured").
    pub status: String,
}

impl HealthResponse {
    /// The roster store answers.
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }

    /// A store is configured but unreachable.
    pub fn degraded() -> Self {
        Self {
            status: "degraded".to_string(),
        }
    }

    /// No store connection string was provided.
    pub fn unconfigured() -> Self {
        Self {
            status: "unconfigured".to_string(),
        }
    }
}
