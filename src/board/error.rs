use std::path::PathBuf;

use thiserror::Error;

use super::Tier;

/// Failures raised by the pure board transitions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BoardError {
    /// Tier number outside of `1..=5`.
    #[error("unknown tier {0} (expected 1..=5)")]
    UnknownTier(u8),
    /// The addressed slot does not exist in the tier.
    #[error("no player at index {index} in tier {tier} (tier holds {len})")]
    IndexOutOfRange { tier: Tier, index: usize, len: usize },
    /// The player already sits somewhere on the board.
    #[error("player `{name}` is already ranked in tier {tier}")]
    DuplicatePlayer { name: String, tier: Tier },
}

/// Failures raised while reading or writing the local board cache.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Reading or writing the entry at `path` failed.
    #[error("failed to access cache entry at `{path}`")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The board could not be serialized.
    #[error("failed to encode tier board")]
    Encode(#[source] serde_json::Error),
}

/// Errors surfaced by [`super::TierStore`] operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The transition itself was rejected.
    #[error(transparent)]
    Board(#[from] BoardError),
    /// The board changed in memory but could not be persisted.
    #[error(transparent)]
    Cache(#[from] CacheError),
}
