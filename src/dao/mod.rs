/// Persistence model definitions.
pub mod models;
/// Roster table storage and its backends.
pub mod roster_store;
/// Storage abstraction layer for database operations.
pub mod storage;
