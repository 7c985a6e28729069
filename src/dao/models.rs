use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Row of the roster table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerEntity {
    /// Identifier generated when the row is inserted.
    pub id: Uuid,
    pub name: String,
    /// Tier number, `1` being the best.
    pub tier: u8,
}

/// Values supplied when inserting a player; the id is generated by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPlayerEntity {
    pub name: String,
    pub tier: u8,
}

impl NewPlayerEntity {
    /// Attach a freshly generated identifier.
    pub fn into_entity(self) -> PlayerEntity {
        PlayerEntity {
            id: Uuid::new_v4(),
            name: self.name,
            tier: self.tier,
        }
    }
}

/// Order players by tier ascending, then name ascending.
pub fn sort_roster(players: &mut [PlayerEntity]) {
    players.sort_by(|a, b| a.tier.cmp(&b.tier).then_with(|| a.name.cmp(&b.name)));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(name: &str, tier: u8) -> PlayerEntity {
        NewPlayerEntity {
            name: name.into(),
            tier,
        }
        .into_entity()
    }

    #[test]
    fn sorts_by_tier_then_name() {
        let mut players = vec![
            player("Wondy", 2),
            player("Bonk", 3),
            player("Anka", 2),
            player("Zed", 1),
        ];
        sort_roster(&mut players);

        let order: Vec<_> = players.iter().map(|p| (p.tier, p.name.as_str())).collect();
        assert_eq!(order, [(1, "Zed"), (2, "Anka"), (2, "Wondy"), (3, "Bonk")]);
    }

    #[test]
    fn generated_ids_are_unique() {
        assert_ne!(player("Anka", 1).id, player("Anka", 1).id);
    }
}
