use std::collections::BTreeMap;

use super::{Tier, TierBoard};

const SEED_ROSTER: [(u8, &[&str]); 5] = [
    (
        1,
        &[
            "Anka",
            "Wondy",
            "Macik",
            "Fritz",
            "Doomer",
            "Teddo",
            "DikAleks",
            "Watermark",
            "mkay",
            "gilgamesh",
            "astro",
        ],
    ),
    (
        2,
        &[
            "Netto",
            "Bonk",
            "Wes",
            "bb willetz",
            "nkvd serafin",
            "slavak, gadza, marsilion",
        ],
    ),
    (
        3,
        &[
            "Chungus Cluegi",
            "Ragnar",
            "Leonardo",
            "Godefroy",
            "Fearzing",
            "Alcor",
        ],
    ),
    (4, &["RobertDDI", "Absdulah", "bearded snake", "BigF", "proptt"]),
    (5, &["RapidSna1l", "TowarzyszSkipper"]),
];

/// Built-in roster used when neither the cache nor the config file provide one.
pub fn seed_board() -> TierBoard {
    let tiers: BTreeMap<Tier, Vec<String>> = SEED_ROSTER
        .iter()
        .map(|(tier, names)| {
            (
                Tier(*tier),
                names.iter().map(|name| (*name).to_owned()).collect(),
            )
        })
        .collect();
    TierBoard { tiers }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_covers_every_tier_without_duplicates() {
        let board = seed_board();
        assert!(Tier::all().all(|tier| !board.tier(tier).is_empty()));
        board.check_unique().unwrap();
        assert_eq!(board.len(), 30);
    }
}
