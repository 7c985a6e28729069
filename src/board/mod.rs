//! Tier board model: five ordinal tiers holding ordered player names, the pure
//! transitions applied to them, and the cache-backed [`TierStore`] wrapper.

/// Key/value caches the board is persisted into.
pub mod cache;
mod error;
mod seed;
mod store;

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

pub use self::cache::{BoardCache, CACHE_KEY, FileCache, MemoryCache};
pub use self::error::{BoardError, CacheError, StoreError};
pub use self::seed::seed_board;
pub use self::store::{Confirm, TierStore, delete_prompt};

/// One of the five ranking buckets, `1` being the best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Tier(u8);

impl Tier {
    /// Lowest tier number (best players).
    pub const MIN: u8 = 1;
    /// Highest tier number.
    pub const MAX: u8 = 5;
    /// Tier receiving newly added players.
    pub const TOP: Tier = Tier(1);

    /// Validate a raw tier number.
    pub fn new(value: u8) -> Result<Self, BoardError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(BoardError::UnknownTier(value))
        }
    }

    /// Raw tier number.
    pub fn get(self) -> u8 {
        self.0
    }

    /// Every tier in display order.
    pub fn all() -> impl Iterator<Item = Tier> {
        (Self::MIN..=Self::MAX).map(Tier)
    }
}

impl TryFrom<u8> for Tier {
    type Error = BoardError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Tier::new(value)
    }
}

impl From<Tier> for u8 {
    fn from(value: Tier) -> Self {
        value.0
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What has to be redrawn after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderScope {
    /// No-op; nothing to redraw.
    Nothing,
    /// Only this tier changed.
    Tier(Tier),
    /// Every tier must be redrawn.
    All,
}

/// Outcome of a board transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    /// The transition was a no-op; nothing to persist or redraw.
    Unchanged,
    /// A name was appended to `tier`.
    Added {
        name: String,
        tier: Tier,
        index: usize,
    },
    /// A name left `from` and was appended to `to`.
    Moved {
        name: String,
        from: Tier,
        from_index: usize,
        to: Tier,
        to_index: usize,
    },
    /// A name was removed from `tier`.
    Deleted {
        name: String,
        tier: Tier,
        index: usize,
    },
}

impl Change {
    /// Whether the board was modified and must be persisted.
    pub fn is_mutation(&self) -> bool {
        !matches!(self, Change::Unchanged)
    }

    /// Additions only touch the tier they land in; moves and deletions shift
    /// indices on several tiers and redraw everything.
    pub fn render_scope(&self) -> RenderScope {
        match self {
            Change::Unchanged => RenderScope::Nothing,
            Change::Added { tier, .. } => RenderScope::Tier(*tier),
            Change::Moved { .. } | Change::Deleted { .. } => RenderScope::All,
        }
    }
}

/// Mapping from tier to the ordered names ranked in it.
///
/// Serialized as a JSON object keyed by the tier number as a string, e.g.
/// `{"1":["Anka"],"2":["Netto"]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TierBoard {
    tiers: BTreeMap<Tier, Vec<String>>,
}

impl TierBoard {
    /// Build a board from explicit tier contents, rejecting duplicated names.
    pub fn from_tiers<I, S>(tiers: I) -> Result<Self, BoardError>
    where
        I: IntoIterator<Item = (Tier, Vec<S>)>,
        S: Into<String>,
    {
        let mut board = TierBoard::default();
        for (tier, names) in tiers {
            board
                .tiers
                .entry(tier)
                .or_default()
                .extend(names.into_iter().map(Into::into));
        }
        board.check_unique()?;
        Ok(board)
    }

    /// Names ranked in `tier`, in display order.
    pub fn tier(&self, tier: Tier) -> &[String] {
        self.tiers.get(&tier).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Name at `index` of `tier`, if any.
    pub fn player(&self, tier: Tier, index: usize) -> Option<&str> {
        self.tier(tier).get(index).map(String::as_str)
    }

    /// Tier and position of `name`, if ranked.
    pub fn locate(&self, name: &str) -> Option<(Tier, usize)> {
        self.tiers.iter().find_map(|(tier, names)| {
            names
                .iter()
                .position(|candidate| candidate == name)
                .map(|index| (*tier, index))
        })
    }

    /// Total number of ranked players.
    pub fn len(&self) -> usize {
        self.tiers.values().map(Vec::len).sum()
    }

    /// Whether no player is ranked.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over the tiers present on the board.
    pub fn iter(&self) -> impl Iterator<Item = (Tier, &[String])> {
        self.tiers
            .iter()
            .map(|(tier, names)| (*tier, names.as_slice()))
    }

    /// Append a new player to the top tier. Blank names are ignored.
    pub fn add(&mut self, name: &str) -> Result<Change, BoardError> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(Change::Unchanged);
        }
        if let Some((tier, _)) = self.locate(name) {
            return Err(BoardError::DuplicatePlayer {
                name: name.to_owned(),
                tier,
            });
        }

        let names = self.tiers.entry(Tier::TOP).or_default();
        names.push(name.to_owned());
        Ok(Change::Added {
            name: name.to_owned(),
            tier: Tier::TOP,
            index: names.len() - 1,
        })
    }

    /// Move the player at `index` in `from` to the end of `to`.
    ///
    /// Moving within the same tier is a no-op, even for an invalid index.
    pub fn move_player(&mut self, from: Tier, index: usize, to: Tier) -> Result<Change, BoardError> {
        if from == to {
            return Ok(Change::Unchanged);
        }

        let name = self.take(from, index)?;
        let names = self.tiers.entry(to).or_default();
        names.push(name.clone());
        Ok(Change::Moved {
            name,
            from,
            from_index: index,
            to,
            to_index: names.len() - 1,
        })
    }

    /// Remove the player at `index` in `tier`.
    pub fn delete(&mut self, tier: Tier, index: usize) -> Result<Change, BoardError> {
        let name = self.take(tier, index)?;
        Ok(Change::Deleted { name, tier, index })
    }

    /// Ensure no name is ranked twice.
    pub fn check_unique(&self) -> Result<(), BoardError> {
        let mut seen = std::collections::HashSet::new();
        for (tier, names) in self.iter() {
            for name in names {
                if !seen.insert(name.as_str()) {
                    return Err(BoardError::DuplicatePlayer {
                        name: name.clone(),
                        tier,
                    });
                }
            }
        }
        Ok(())
    }

    fn take(&mut self, tier: Tier, index: usize) -> Result<String, BoardError> {
        let len = self.tier(tier).len();
        match self.tiers.get_mut(&tier) {
            Some(names) if index < names.len() => Ok(names.remove(index)),
            _ => Err(BoardError::IndexOutOfRange { tier, index, len }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tier(value: u8) -> Tier {
        Tier::new(value).unwrap()
    }

    fn sample() -> TierBoard {
        TierBoard::from_tiers([(tier(1), vec!["Anka", "Wondy"]), (tier(2), vec!["Netto"])])
            .unwrap()
    }

    #[test]
    fn tier_rejects_out_of_range_numbers() {
        assert_eq!(Tier::new(0), Err(BoardError::UnknownTier(0)));
        assert_eq!(Tier::new(6), Err(BoardError::UnknownTier(6)));
        assert_eq!(Tier::all().count(), 5);
    }

    #[test]
    fn move_then_delete_scenario() {
        let mut board = sample();

        let change = board.move_player(tier(1), 0, tier(2)).unwrap();
        assert_eq!(change.render_scope(), RenderScope::All);
        assert_eq!(board.tier(tier(1)), ["Wondy"]);
        assert_eq!(board.tier(tier(2)), ["Netto", "Anka"]);

        let change = board.delete(tier(2), 0).unwrap();
        assert_eq!(
            change,
            Change::Deleted {
                name: "Netto".into(),
                tier: tier(2),
                index: 0
            }
        );
        assert_eq!(board.tier(tier(2)), ["Anka"]);
    }

    #[test]
    fn same_tier_move_is_noop() {
        let mut board = sample();
        let before = board.clone();
        assert_eq!(
            board.move_player(tier(1), 1, tier(1)).unwrap(),
            Change::Unchanged
        );
        assert_eq!(board, before);
    }

    #[test]
    fn move_appends_to_end_and_creates_missing_tier() {
        let mut board = sample();
        let change = board.move_player(tier(1), 1, tier(5)).unwrap();
        assert_eq!(board.tier(tier(5)), ["Wondy"]);
        assert!(matches!(change, Change::Moved { to_index: 0, .. }));

        board.move_player(tier(2), 0, tier(5)).unwrap();
        assert_eq!(board.tier(tier(5)), ["Wondy", "Netto"]);
    }

    #[test]
    fn invalid_index_leaves_board_untouched() {
        let mut board = sample();
        let before = board.clone();

        let err = board.move_player(tier(2), 3, tier(1)).unwrap_err();
        assert_eq!(
            err,
            BoardError::IndexOutOfRange {
                tier: tier(2),
                index: 3,
                len: 1
            }
        );
        assert!(board.delete(tier(4), 0).is_err());
        assert_eq!(board, before);
    }

    #[test]
    fn add_trims_and_targets_top_tier() {
        let mut board = sample();
        let change = board.add("  Bonk ").unwrap();
        assert_eq!(change.render_scope(), RenderScope::Tier(Tier::TOP));
        assert_eq!(board.tier(tier(1)), ["Anka", "Wondy", "Bonk"]);
    }

    #[test]
    fn blank_add_is_ignored() {
        let mut board = sample();
        assert_eq!(board.add("   ").unwrap(), Change::Unchanged);
        assert_eq!(board.add("").unwrap(), Change::Unchanged);
        assert_eq!(board, sample());
    }

    #[test]
    fn duplicate_add_is_rejected() {
        let mut board = sample();
        let err = board.add("Netto").unwrap_err();
        assert!(matches!(err, BoardError::DuplicatePlayer { .. }));
        assert_eq!(board.len(), 3);
    }

    #[test]
    fn transitions_keep_each_name_once() {
        let mut board = seed_board();
        let total = board.len();

        board.move_player(tier(1), 2, tier(4)).unwrap();
        board.move_player(tier(4), 0, tier(3)).unwrap();
        board.add("Newcomer").unwrap();
        board.move_player(tier(1), board.tier(tier(1)).len() - 1, tier(5)).unwrap();
        board.check_unique().unwrap();
        assert_eq!(board.len(), total + 1);

        board.delete(tier(5), 0).unwrap();
        board.check_unique().unwrap();
        assert_eq!(board.len(), total);
    }

    /// Every board reachable in one add, move or delete, with the expected size.
    fn successors(board: &TierBoard) -> Vec<(TierBoard, usize)> {
        let mut next = Vec::new();
        for from in Tier::all() {
            for index in 0..board.tier(from).len() {
                for to in Tier::all() {
                    let mut moved = board.clone();
                    moved.move_player(from, index, to).unwrap();
                    next.push((moved, board.len()));
                }
                let mut deleted = board.clone();
                deleted.delete(from, index).unwrap();
                next.push((deleted, board.len() - 1));
            }
        }

        let mut added = board.clone();
        match added.add("Newcomer") {
            Ok(_) => next.push((added, board.len() + 1)),
            Err(BoardError::DuplicatePlayer { .. }) => assert_eq!(&added, board),
            Err(err) => panic!("unexpected add failure: {err}"),
        }
        next
    }

    fn names(board: &TierBoard) -> Vec<String> {
        let mut names: Vec<String> = board.iter().flat_map(|(_, names)| names.to_vec()).collect();
        names.sort();
        names
    }

    #[test]
    fn every_short_transition_sequence_keeps_names_unique() {
        let mut frontier = vec![sample()];
        let mut visited = 0;

        for _ in 0..3 {
            let mut reached = Vec::new();
            for board in &frontier {
                for (next, expected_len) in successors(board) {
                    next.check_unique().unwrap();
                    assert_eq!(next.len(), expected_len);
                    if next.len() == board.len() {
                        assert_eq!(names(&next), names(board));
                    }

                    let mut store = TierStore::hydrate(MemoryCache::new(), next.clone());
                    store.persist().unwrap();
                    let rehydrated = TierStore::hydrate(store.cache().clone(), TierBoard::default());
                    assert_eq!(rehydrated.board(), &next);

                    reached.push(next);
                }
            }
            visited += reached.len();
            frontier = reached;
        }

        assert!(visited > 1000);
    }

    #[test]
    fn serializes_with_string_tier_keys() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert_eq!(json, r#"{"1":["Anka","Wondy"],"2":["Netto"]}"#);

        let parsed: TierBoard = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, sample());
    }

    #[test]
    fn rejects_unknown_tier_keys() {
        assert!(serde_json::from_str::<TierBoard>(r#"{"7":["Ghost"]}"#).is_err());
    }
}
