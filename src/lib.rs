//! Library crate for tier-board, exposing the tier board model and the roster
//! service to the binaries and integration tests.

/// Tier board model and its local cache.
pub mod board;
/// Server and board configuration.
pub mod config;
/// Roster persistence.
pub mod dao;
/// HTTP payloads.
pub mod dto;
/// Service and HTTP error types.
pub mod error;
/// axum routers.
pub mod routes;
/// Request handling logic and background tasks.
pub mod services;
/// Shared application state.
pub mod state;
