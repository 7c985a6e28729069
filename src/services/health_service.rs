use tracing::warn;

use crate::{dto::health::HealthResponse, error::ServiceError, state::SharedState};

/// Probe the roster store and report the resulting status.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    match state.require_roster_store().await {
        Ok(store) => match store.health_check().await {
            Ok(()) => HealthResponse::ok(),
            Err(err) => {
                warn!(error = %err, "storage health check failed");
                HealthResponse::degraded()
            }
        },
        Err(ServiceError::Configuration(reason)) => {
            warn!(%reason, "storage not configured");
            HealthResponse::unconfigured()
        }
        Err(_) => {
            warn!("storage unavailable (degraded mode)");
            HealthResponse::degraded()
        }
    }
}
