/// Health check payloads.
pub mod health;
/// Roster endpoint payloads.
pub mod roster;
