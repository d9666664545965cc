//! Static reward tables: shop cases, the starter pack and free cards.
//!
//! Chances are kept exactly as tuned, including the 1e-8 tails.

use serde::{Deserialize, Serialize};

use super::Rarity::{Common, Epic, Legendary, Mythic, Rare};
use super::Reward::{Ability, Coins, FlowPlus, Gems, Multiplier, Skin, Upgrade, Verification};
use super::{RewardEntry, RewardEntry as E};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Currency {
    /// Clicker coins.
    Coins,
    Gems,
}

#[derive(Debug)]
pub struct CaseDef {
    pub id: &'static str,
    pub name: &'static str,
    pub price: u64,
    pub currency: Currency,
    /// Minimum player level, 0 for none.
    pub min_level: u64,
    /// Openings allowed per UTC day.
    pub daily_limit: Option<u32>,
    pub rewards: &'static [RewardEntry],
}

impl CaseDef {
    /// Whether any entry can grant clicker coins (and so is subject to the
    /// daily cap).
    pub fn grants_coins(&self) -> bool {
        self.rewards
            .iter()
            .any(|e| matches!(e.reward, Coins { .. }))
    }
}

pub const SHOP_CASES: &[CaseDef] = &[
    CaseDef {
        id: "starter",
        name: "Starter Case",
        price: 100,
        currency: Currency::Coins,
        min_level: 0,
        daily_limit: None,
        rewards: &[
            E::new("coins", 0.9, Common, Coins { min: 50, max: 200 }),
            E::new("multiplier", 0.09, Rare, Multiplier { min: 2, max: 5 }),
            E::new("gems", 0.01, Epic, Gems { min: 1, max: 3 }),
        ],
    },
    CaseDef {
        id: "common",
        name: "Common Case",
        price: 250,
        currency: Currency::Coins,
        min_level: 0,
        daily_limit: None,
        rewards: &[
            E::new("verification", 0.000_000_01, Mythic, Verification),
            E::new("flowplus", 0.000_01, Legendary, FlowPlus),
            E::new("ability", 0.03, Epic, Ability),
            E::new("multiplier", 0.12, Rare, Multiplier { min: 3, max: 8 }),
            E::new("gems", 0.05, Epic, Gems { min: 2, max: 5 }),
            E::new("coins", 0.869_989, Common, Coins { min: 150, max: 500 }),
        ],
    },
    CaseDef {
        id: "rare",
        name: "Rare Case",
        price: 1_500,
        currency: Currency::Coins,
        min_level: 0,
        daily_limit: None,
        rewards: &[
            E::new("verification", 0.000_000_01, Mythic, Verification),
            E::new("flowplus", 0.000_05, Legendary, FlowPlus),
            E::new("ability", 0.1, Epic, Ability),
            E::new("multiplier", 0.3, Epic, Multiplier { min: 5, max: 15 }),
            E::new("gems", 0.1, Epic, Gems { min: 3, max: 8 }),
            E::new("coins", 0.699_95, Rare, Coins { min: 800, max: 3_000 }),
        ],
    },
    CaseDef {
        id: "legendary",
        name: "Legendary Case",
        price: 10_000,
        currency: Currency::Coins,
        min_level: 0,
        daily_limit: None,
        rewards: &[
            E::new("verification", 0.000_000_01, Mythic, Verification),
            E::new("flowplus", 0.000_1, Legendary, FlowPlus),
            E::new("ability", 0.18, Legendary, Ability),
            E::new("multiplier", 0.47, Legendary, Multiplier { min: 10, max: 25 }),
            E::new("gems", 0.2, Legendary, Gems { min: 5, max: 15 }),
            E::new("coins", 0.149_8, Epic, Coins { min: 5_000, max: 25_000 }),
        ],
    },
    CaseDef {
        id: "mythic",
        name: "Mythic Case",
        price: 25,
        currency: Currency::Gems,
        min_level: 50,
        daily_limit: Some(3),
        rewards: &[
            E::new("verification", 0.000_001, Mythic, Verification),
            E::new("flowplus", 0.001, Mythic, FlowPlus),
            E::new("ability", 0.3, Mythic, Ability),
            E::new("multiplier", 0.65, Mythic, Multiplier { min: 20, max: 50 }),
            E::new("gems", 0.04, Legendary, Gems { min: 10, max: 30 }),
            E::new("coins", 0.008_999, Legendary, Coins { min: 15_000, max: 75_000 }),
        ],
    },
    CaseDef {
        id: "winter",
        name: "Winter Case",
        price: 500,
        currency: Currency::Coins,
        min_level: 0,
        daily_limit: Some(10),
        rewards: &[
            E::new("ability", 0.45, Rare, Ability),
            E::new("multiplier", 0.1, Rare, Multiplier { min: 3, max: 12 }),
            E::new("gems", 0.05, Epic, Gems { min: 2, max: 8 }),
            E::new("coins", 0.4, Rare, Coins { min: 300, max: 1_200 }),
        ],
    },
    CaseDef {
        id: "shadow",
        name: "Shadow Case",
        price: 50,
        currency: Currency::Gems,
        min_level: 75,
        daily_limit: Some(5),
        rewards: &[
            E::new("ability", 0.6, Epic, Ability),
            E::new("multiplier", 0.2, Legendary, Multiplier { min: 15, max: 40 }),
            E::new("gems", 0.15, Legendary, Gems { min: 8, max: 25 }),
            E::new("coins", 0.05, Legendary, Coins { min: 10_000, max: 50_000 }),
        ],
    },
    CaseDef {
        id: "neon",
        name: "Neon Case",
        price: 750,
        currency: Currency::Coins,
        min_level: 0,
        daily_limit: None,
        rewards: &[
            E::new("ability", 0.45, Rare, Ability),
            E::new("multiplier", 0.15, Epic, Multiplier { min: 5, max: 18 }),
            E::new("gems", 0.1, Rare, Gems { min: 3, max: 10 }),
            E::new("coins", 0.3, Rare, Coins { min: 400, max: 1_800 }),
        ],
    },
    CaseDef {
        id: "premium",
        name: "Premium Case",
        price: 5_000,
        currency: Currency::Coins,
        min_level: 30,
        daily_limit: None,
        rewards: &[
            E::new("ability", 0.55, Epic, Ability),
            E::new("multiplier", 0.2, Epic, Multiplier { min: 8, max: 22 }),
            E::new("gems", 0.15, Epic, Gems { min: 4, max: 12 }),
            E::new("coins", 0.1, Epic, Coins { min: 2_500, max: 8_000 }),
        ],
    },
    CaseDef {
        id: "heart",
        name: "Heart Case",
        price: 400,
        currency: Currency::Coins,
        min_level: 0,
        daily_limit: Some(15),
        rewards: &[
            E::new("ability", 0.4, Rare, Ability),
            E::new("multiplier", 0.1, Rare, Multiplier { min: 4, max: 14 }),
            E::new("gems", 0.05, Epic, Gems { min: 2, max: 6 }),
            E::new("coins", 0.45, Common, Coins { min: 200, max: 800 }),
        ],
    },
    CaseDef {
        id: "cosmic",
        name: "Cosmic Case",
        price: 80,
        currency: Currency::Gems,
        min_level: 100,
        daily_limit: Some(2),
        rewards: &[
            E::new("verification", 0.000_005, Mythic, Verification),
            E::new("flowplus", 0.000_5, Mythic, FlowPlus),
            E::new("ability", 0.75, Mythic, Ability),
            E::new("multiplier", 0.2, Mythic, Multiplier { min: 25, max: 75 }),
            E::new("gems", 0.04, Legendary, Gems { min: 15, max: 50 }),
            E::new("coins", 0.004_995, Legendary, Coins { min: 25_000, max: 100_000 }),
        ],
    },
];

/// Contents of the starter case handed out with a fresh inventory.
pub const STARTER_PACK: &[RewardEntry] = &[
    E::new("coins_100", 0.4, Common, Coins { min: 100, max: 100 }),
    E::new("coins_250", 0.3, Common, Coins { min: 250, max: 250 }),
    E::new("gems_10", 0.2, Rare, Gems { min: 10, max: 10 }),
    E::new("skin_common", 0.08, Rare, Skin),
    E::new("gems_50", 0.02, Epic, Gems { min: 50, max: 50 }),
];

/// Inventory case kind for the starter pack.
pub const STARTER_PACK_ID: &str = "starter_pack";

/// Free hourly cards. Weights 40/30/20/10 per rarity over four cards each,
/// expressed as probabilities.
pub const CARDS: &[RewardEntry] = &[
    E::new("coins_50", 0.1, Common, Coins { min: 50, max: 50 }),
    E::new("coins_150", 0.1, Common, Coins { min: 150, max: 150 }),
    E::new("coins_500", 0.075, Rare, Coins { min: 500, max: 500 }),
    E::new("gems_5", 0.075, Rare, Gems { min: 5, max: 5 }),
    E::new("gems_15", 0.05, Epic, Gems { min: 15, max: 15 }),
    E::new("gems_50", 0.025, Legendary, Gems { min: 50, max: 50 }),
    E::new("skin_basic", 0.1, Common, Skin),
    E::new("skin_cool", 0.075, Rare, Skin),
    E::new("skin_epic", 0.05, Epic, Skin),
    E::new("skin_legendary", 0.025, Legendary, Skin),
    E::new("ability_speed", 0.075, Rare, Ability),
    E::new("ability_luck", 0.05, Epic, Ability),
    E::new("ability_multi", 0.025, Legendary, Ability),
    E::new("upgrade_click", 0.1, Common, Upgrade { name: "upgrade_click" }),
    E::new("upgrade_auto", 0.05, Epic, Upgrade { name: "upgrade_auto" }),
    E::new("upgrade_bonus", 0.025, Legendary, Upgrade { name: "upgrade_bonus" }),
];

pub fn shop_case(id: &str) -> Option<&'static CaseDef> {
    SHOP_CASES.iter().find(|c| c.id == id)
}

/// The reward table an inventory case of kind `id` opens into.
pub fn case_table(id: &str) -> Option<&'static [RewardEntry]> {
    if id == STARTER_PACK_ID {
        Some(STARTER_PACK)
    } else {
        shop_case(id).map(|c| c.rewards)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rewards::resolve;

    #[test]
    fn eleven_shop_cases() {
        assert_eq!(SHOP_CASES.len(), 11);
        let mut ids: Vec<_> = SHOP_CASES.iter().map(|c| c.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 11);
    }

    #[test]
    fn legendary_table_near_one_roll_hits_last_entry() {
        let table = shop_case("legendary").unwrap().rewards;
        let entry = resolve(table, 0.999_999_999).unwrap();
        assert!(std::ptr::eq(entry, table.last().unwrap()));
        assert_eq!(entry.label, "coins");
    }

    #[test]
    fn tail_entries_are_first_and_tiny() {
        let table = shop_case("common").unwrap().rewards;
        assert_eq!(table[0].label, "verification");
        assert_eq!(table[0].chance, 1e-8);
        assert_eq!(resolve(table, 0.0).unwrap().label, "verification");
        assert_eq!(resolve(table, 1e-8).unwrap().label, "flowplus");
    }

    #[test]
    fn card_weights_sum_to_one() {
        let total: f64 = CARDS.iter().map(|c| c.chance).sum();
        assert!((total - 1.0).abs() < 1e-9);
        assert_eq!(CARDS.len(), 16);
    }

    #[test]
    fn case_table_lookup() {
        assert_eq!(case_table(STARTER_PACK_ID).unwrap().len(), 5);
        assert!(case_table("rare").is_some());
        assert!(case_table("nope").is_none());
    }

    #[test]
    fn gem_cases_have_gates() {
        for id in ["mythic", "shadow", "cosmic"] {
            let c = shop_case(id).unwrap();
            assert_eq!(c.currency, Currency::Gems);
            assert!(c.min_level > 0);
            assert!(c.daily_limit.is_some());
        }
        assert!(shop_case("rare").unwrap().grants_coins());
    }
}
