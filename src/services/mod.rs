/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Roster endpoint pipeline: authorization, validation, store access.
pub mod roster_service;
/// Background task connecting the roster store and tracking degraded mode.
pub mod storage_supervisor;
