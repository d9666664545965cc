//! Skin and ability catalogs, and how table rarities map onto them.

use super::Rarity;

/// Skins obtainable from cases and cards. `default` is owned from the
/// start and never drawn.
pub const SKINS: &[(&str, Rarity)] = &[
    ("fire", Rarity::Rare),
    ("electric", Rarity::Rare),
    ("winter", Rarity::Rare),
    ("cosmic", Rarity::Epic),
    ("royal", Rarity::Epic),
    ("ice", Rarity::Epic),
    ("nature", Rarity::Epic),
    ("neon", Rarity::Epic),
    ("diamond", Rarity::Legendary),
    ("rainbow", Rarity::Legendary),
    ("shadow", Rarity::Legendary),
    ("dark", Rarity::Legendary),
    ("plasma", Rarity::Legendary),
    ("golden", Rarity::Mythic),
    ("crystal", Rarity::Mythic),
    ("phoenix", Rarity::Mythic),
];

/// Abilities obtainable from cases and cards. Only those with an entry in
/// [`crate::abilities::DEFINITIONS`] can be activated; the rest are
/// collectibles.
pub const ABILITIES: &[(&str, Rarity)] = &[
    ("double_coins", Rarity::Rare),
    ("ice_freeze", Rarity::Rare),
    ("auto_burst", Rarity::Epic),
    ("critical_boost", Rarity::Epic),
    ("coin_rain", Rarity::Legendary),
    ("auto_upgrade", Rarity::Legendary),
    ("midas_touch", Rarity::Legendary),
    ("shadow_clone", Rarity::Mythic),
    ("time_warp", Rarity::Mythic),
];

/// Catalog rarities a skin entry of the given rarity may yield.
pub fn skin_rarities(rarity: Rarity) -> &'static [Rarity] {
    match rarity {
        Rarity::Common => &[Rarity::Rare],
        Rarity::Rare => &[Rarity::Rare, Rarity::Epic],
        Rarity::Epic => &[Rarity::Epic, Rarity::Legendary],
        Rarity::Legendary => &[Rarity::Legendary, Rarity::Mythic],
        Rarity::Mythic => &[Rarity::Mythic],
    }
}

/// Catalog rarities an ability entry of the given rarity may yield.
/// Common entries draw from the whole catalog.
pub fn ability_rarities(rarity: Rarity) -> &'static [Rarity] {
    match rarity {
        Rarity::Common => &Rarity::ALL,
        Rarity::Rare => &[Rarity::Rare],
        Rarity::Epic => &[Rarity::Rare, Rarity::Epic],
        Rarity::Legendary => &[Rarity::Epic, Rarity::Legendary],
        Rarity::Mythic => &[Rarity::Legendary, Rarity::Mythic],
    }
}

pub fn skin_pool(rarity: Rarity) -> impl Iterator<Item = &'static str> {
    let allowed = skin_rarities(rarity);
    SKINS
        .iter()
        .filter(move |(_, r)| allowed.contains(r))
        .map(|(id, _)| *id)
}

pub fn ability_pool(rarity: Rarity) -> impl Iterator<Item = &'static str> {
    let allowed = ability_rarities(rarity);
    ABILITIES
        .iter()
        .filter(move |(_, r)| allowed.contains(r))
        .map(|(id, _)| *id)
}

/// Coins paid when a skin entry finds nothing left to give.
pub fn skin_compensation(rarity: Rarity) -> u64 {
    match rarity {
        Rarity::Mythic => 15_000,
        Rarity::Legendary => 7_500,
        Rarity::Epic => 3_000,
        Rarity::Rare => 1_000,
        Rarity::Common => 500,
    }
}

/// Coins paid when an ability entry finds nothing left to give.
pub fn ability_compensation(rarity: Rarity) -> u64 {
    match rarity {
        Rarity::Mythic => 20_000,
        Rarity::Legendary => 10_000,
        Rarity::Epic => 5_000,
        Rarity::Rare => 2_500,
        Rarity::Common => 1_000,
    }
}

pub fn is_known_skin(id: &str) -> bool {
    id == "default" || SKINS.iter().any(|(s, _)| *s == id)
}
