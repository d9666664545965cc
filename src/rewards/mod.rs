//! Weighted reward tables and their resolution.
//!
//! Resolution happens in two steps:
//!
//! 1. [`resolve`] picks one [`RewardEntry`] from a table for a roll in
//!    `[0, 1)` by walking the cumulative chance sum. Tables are used exactly
//!    as written: chances are not renormalized, and a roll past the
//!    cumulative total lands on the last entry.
//! 2. [`materialize`] turns the entry into a concrete [`Outcome`] (a coin
//!    amount, a specific skin...). It is pure: ownership sets are passed in.
//!
//! Applying an outcome to persisted state lives in [`grant`].

pub mod catalog;
pub mod grant;
pub mod tables;

use rand::Rng;
use serde::{Deserialize, Serialize};

pub use grant::{apply, Grant};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
    Mythic,
}

impl Rarity {
    pub const ALL: [Rarity; 5] = [
        Rarity::Common,
        Rarity::Rare,
        Rarity::Epic,
        Rarity::Legendary,
        Rarity::Mythic,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Rarity::Common => "common",
            Rarity::Rare => "rare",
            Rarity::Epic => "epic",
            Rarity::Legendary => "legendary",
            Rarity::Mythic => "mythic",
        }
    }
}

/// What a table entry grants, before randomness is applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reward {
    /// Clicker coins, uniform in `min..=max`, through the daily cap.
    Coins { min: u64, max: u64 },
    Gems { min: u64, max: u64 },
    /// Income multiplier token, stored in the inventory as an upgrade.
    Multiplier { min: u64, max: u64 },
    /// A not-yet-owned skin from the rarity's pool.
    Skin,
    /// A not-yet-owned ability from the rarity's pool.
    Ability,
    /// A named upgrade card placed in the inventory.
    Upgrade { name: &'static str },
    /// An unopened case that opens into `table`.
    Case { table: &'static str },
    FlowPlus,
    Verification,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RewardEntry {
    pub label: &'static str,
    /// Probability in `(0, 1]`. Sums are not checked.
    pub chance: f64,
    pub rarity: Rarity,
    pub reward: Reward,
}

impl RewardEntry {
    pub const fn new(label: &'static str, chance: f64, rarity: Rarity, reward: Reward) -> Self {
        Self {
            label,
            chance,
            rarity,
            reward,
        }
    }
}

/// First entry whose running cumulative chance exceeds `roll`; the last
/// entry when none does. `None` only for an empty table.
pub fn resolve(table: &[RewardEntry], roll: f64) -> Option<&RewardEntry> {
    let mut cumulative = 0.0;
    for entry in table {
        cumulative += entry.chance;
        if roll < cumulative {
            return Some(entry);
        }
    }
    table.last()
}

/// Draw a roll and resolve it.
pub fn roll<'t, R: Rng + ?Sized>(table: &'t [RewardEntry], rng: &mut R) -> Option<&'t RewardEntry> {
    resolve(table, rng.gen::<f64>())
}

/// A concrete reward, ready to be applied.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Outcome {
    Coins { amount: u64 },
    Gems { amount: u64 },
    Multiplier { amount: u64 },
    Skin { id: String },
    Ability { id: String },
    /// Coins paid instead of a skin or ability when the pool was exhausted.
    Compensation { amount: u64 },
    Upgrade { name: String },
    Case { table: String },
    FlowPlus,
    Verification,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolved {
    pub label: String,
    pub rarity: Rarity,
    pub outcome: Outcome,
}

fn in_range<R: Rng + ?Sized>(rng: &mut R, min: u64, max: u64) -> u64 {
    if max <= min {
        min
    } else {
        rng.gen_range(min..=max)
    }
}

/// Turn a table entry into a concrete outcome.
///
/// Skins and abilities are drawn uniformly among the rarity pool's entries
/// that are not in `owned_*`; when the pool is exhausted the entry turns
/// into a fixed coin compensation.
pub fn materialize<R: Rng + ?Sized>(
    entry: &RewardEntry,
    owned_skins: &[String],
    owned_abilities: &[String],
    rng: &mut R,
) -> Resolved {
    let outcome = match entry.reward {
        Reward::Coins { min, max } => Outcome::Coins {
            amount: in_range(rng, min, max),
        },
        Reward::Gems { min, max } => Outcome::Gems {
            amount: in_range(rng, min, max),
        },
        Reward::Multiplier { min, max } => Outcome::Multiplier {
            amount: in_range(rng, min, max),
        },
        Reward::Skin => {
            let candidates: Vec<&str> = catalog::skin_pool(entry.rarity)
                .filter(|id| !owned_skins.iter().any(|o| o == id))
                .collect();
            match crate::ids::uniform(rng, &candidates) {
                Some(id) => Outcome::Skin { id: id.to_string() },
                None => Outcome::Compensation {
                    amount: catalog::skin_compensation(entry.rarity),
                },
            }
        }
        Reward::Ability => {
            let candidates: Vec<&str> = catalog::ability_pool(entry.rarity)
                .filter(|id| !owned_abilities.iter().any(|o| o == id))
                .collect();
            match crate::ids::uniform(rng, &candidates) {
                Some(id) => Outcome::Ability { id: id.to_string() },
                None => Outcome::Compensation {
                    amount: catalog::ability_compensation(entry.rarity),
                },
            }
        }
        Reward::Upgrade { name } => Outcome::Upgrade {
            name: name.to_string(),
        },
        Reward::Case { table } => Outcome::Case {
            table: table.to_string(),
        },
        Reward::FlowPlus => Outcome::FlowPlus,
        Reward::Verification => Outcome::Verification,
    };
    Resolved {
        label: entry.label.to_string(),
        rarity: entry.rarity,
        outcome,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    const TABLE: &[RewardEntry] = &[
        RewardEntry::new("a", 0.5, Rarity::Common, Reward::Coins { min: 1, max: 1 }),
        RewardEntry::new("b", 0.3, Rarity::Rare, Reward::Gems { min: 2, max: 2 }),
        RewardEntry::new("c", 0.1, Rarity::Epic, Reward::FlowPlus),
    ];

    #[test]
    fn resolve_walks_cumulative_sum() {
        assert_eq!(resolve(TABLE, 0.0).unwrap().label, "a");
        assert_eq!(resolve(TABLE, 0.4999).unwrap().label, "a");
        assert_eq!(resolve(TABLE, 0.5).unwrap().label, "b");
        assert_eq!(resolve(TABLE, 0.85).unwrap().label, "c");
    }

    #[test]
    fn roll_past_total_falls_back_to_last_entry() {
        // Chances sum to 0.9.
        assert_eq!(resolve(TABLE, 0.95).unwrap().label, "c");
    }

    #[test]
    fn empty_table_resolves_to_nothing() {
        assert!(resolve(&[], 0.1).is_none());
    }

    #[test]
    fn coins_land_in_inclusive_range() {
        let entry = RewardEntry::new("x", 1.0, Rarity::Common, Reward::Coins { min: 5, max: 7 });
        let mut rng = StdRng::seed_from_u64(9);
        let mut seen = [false; 3];
        for _ in 0..200 {
            match materialize(&entry, &[], &[], &mut rng).outcome {
                Outcome::Coins { amount } => seen[(amount - 5) as usize] = true,
                other => panic!("unexpected {other:?}"),
            }
        }
        assert_eq!(seen, [true, true, true]);
    }

    #[test]
    fn skin_picks_only_unowned() {
        let entry = RewardEntry::new("s", 1.0, Rarity::Common, Reward::Skin);
        // Common maps to the rare pool: fire, electric, winter.
        let owned = vec!["fire".to_string(), "electric".to_string()];
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..20 {
            let r = materialize(&entry, &owned, &[], &mut rng);
            assert_eq!(r.outcome, Outcome::Skin { id: "winter".into() });
        }
    }

    #[test]
    fn exhausted_pool_pays_compensation() {
        let entry = RewardEntry::new("s", 1.0, Rarity::Mythic, Reward::Skin);
        let owned: Vec<String> = ["golden", "crystal", "phoenix"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let mut rng = StdRng::seed_from_u64(1);
        let r = materialize(&entry, &owned, &[], &mut rng);
        assert_eq!(r.outcome, Outcome::Compensation { amount: 15_000 });

        let ability = RewardEntry::new("a", 1.0, Rarity::Mythic, Reward::Ability);
        let owned: Vec<String> = ["shadow_clone", "time_warp", "coin_rain", "auto_upgrade", "midas_touch"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let r = materialize(&ability, &[], &owned, &mut rng);
        assert_eq!(r.outcome, Outcome::Compensation { amount: 20_000 });
    }
}
