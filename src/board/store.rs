use tracing::{debug, info, warn};

use super::{BoardCache, CACHE_KEY, CacheError, Change, StoreError, Tier, TierBoard};

/// Interactive gate asked before a player is removed.
pub trait Confirm {
    /// Return `true` to proceed with deleting `player`.
    fn confirm(&mut self, player: &str) -> bool;
}

impl<F> Confirm for F
where
    F: FnMut(&str) -> bool,
{
    fn confirm(&mut self, player: &str) -> bool {
        self(player)
    }
}

/// Question shown to the user before deleting `player`.
pub fn delete_prompt(player: &str) -> String {
    format!("Are you sure you want to delete player \"{player}\"?")
}

/// A [`TierBoard`] bound to the cache it is persisted into after every mutation.
pub struct TierStore<C> {
    board: TierBoard,
    cache: C,
    key: String,
}

impl<C: BoardCache> TierStore<C> {
    /// Load the board cached under [`CACHE_KEY`], falling back to `seed`.
    pub fn hydrate(cache: C, seed: TierBoard) -> Self {
        Self::hydrate_key(cache, CACHE_KEY, seed)
    }

    /// Same as [`TierStore::hydrate`] with a custom cache key.
    ///
    /// An unreadable or corrupt cache entry is logged and replaced by `seed`
    /// in memory; the entry itself is only overwritten by the next mutation.
    pub fn hydrate_key(cache: C, key: &str, seed: TierBoard) -> Self {
        let board = match cache.load(key) {
            Ok(Some(raw)) => match decode(&raw) {
                Ok(board) => {
                    debug!(key, players = board.len(), "hydrated tier board from cache");
                    board
                }
                Err(reason) => {
                    warn!(key, %reason, "cached tier board is corrupt; using seed roster");
                    seed
                }
            },
            Ok(None) => {
                info!(key, "no cached tier board; using seed roster");
                seed
            }
            Err(err) => {
                warn!(key, error = %err, "failed to read tier board cache; using seed roster");
                seed
            }
        };

        Self {
            board,
            cache,
            key: key.to_owned(),
        }
    }

    /// Current board.
    pub fn board(&self) -> &TierBoard {
        &self.board
    }

    /// Backing cache.
    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Serialize the whole board into the cache, overwriting the previous entry.
    pub fn persist(&mut self) -> Result<(), CacheError> {
        let raw = serde_json::to_string(&self.board).map_err(CacheError::Encode)?;
        self.cache.store(&self.key, &raw)
    }

    /// Add `name` to the top tier.
    pub fn add_player(&mut self, name: &str) -> Result<Change, StoreError> {
        let change = self.board.add(name)?;
        self.commit(change)
    }

    /// Move the player at `index` of `from` to the end of `to`.
    pub fn move_player(&mut self, from: Tier, index: usize, to: Tier) -> Result<Change, StoreError> {
        let change = self.board.move_player(from, index, to)?;
        self.commit(change)
    }

    /// Delete the player at `index` of `tier` once `confirm` agrees.
    ///
    /// Declining leaves both the board and the cache untouched.
    pub fn delete_player(
        &mut self,
        tier: Tier,
        index: usize,
        confirm: &mut impl Confirm,
    ) -> Result<Change, StoreError> {
        let Some(name) = self.board.player(tier, index) else {
            return Err(super::BoardError::IndexOutOfRange {
                tier,
                index,
                len: self.board.tier(tier).len(),
            }
            .into());
        };

        if !confirm.confirm(name) {
            debug!(player = name, "deletion cancelled");
            return Ok(Change::Unchanged);
        }

        let change = self.board.delete(tier, index)?;
        self.commit(change)
    }

    /// Replace the board with `board` and persist it.
    pub fn reset(&mut self, board: TierBoard) -> Result<(), CacheError> {
        self.board = board;
        self.persist()
    }

    fn commit(&mut self, change: Change) -> Result<Change, StoreError> {
        if change.is_mutation() {
            self.persist()?;
        }
        Ok(change)
    }
}

fn decode(raw: &str) -> Result<TierBoard, String> {
    let board: TierBoard = serde_json::from_str(raw).map_err(|err| err.to_string())?;
    board.check_unique().map_err(|err| err.to_string())?;
    Ok(board)
}
