//! Persisted key names.
//!
//! The key space is flat. Per-account values (gems, bank balances, the
//! inventory) are JSON objects keyed by account id under a single key.

// Clicker
pub const COINS: &str = "clickerCoins";
pub const LEVEL: &str = "clickerLevel";
pub const POWER: &str = "clickerPower";
pub const TOTAL_CLICKS: &str = "clickerTotalClicks";
pub const PLAY_TIME: &str = "clickerPlayTime";
pub const SKIN: &str = "clickerSkin";
pub const ACHIEVEMENTS: &str = "clickerAchievements";
pub const CRITICAL: &str = "clickerCritical";
pub const SPEED: &str = "clickerSpeed";
pub const ABILITIES_USED: &str = "clickerAbilitiesUsed";
pub const OWNED_SKINS: &str = "clickerOwnedSkins";
pub const OWNED_ABILITIES: &str = "clickerOwnedAbilities";
pub const ACTIVE_ABILITIES: &str = "clickerActiveAbilities";
pub const ABILITY_COOLDOWNS: &str = "clickerAbilityCooldowns";
pub const TUTORIAL_COMPLETED: &str = "clickerTutorialCompleted";
pub const LAST_GOLDEN_CLICK: &str = "clickerLastGoldenClick";

// Daily cap
pub const DAILY_COINS: &str = "clickerDailyCoins";
pub const LAST_DAILY_RESET: &str = "clickerLastDailyReset";

// Cases
pub const DAILY_CASE_OPENINGS: &str = "dailyCaseOpenings";
pub const CASE_OPENINGS_DAY: &str = "lastDailyReset";
pub const FLOW_PLUS: &str = "flowPlusOwned";
pub const VERIFIED: &str = "accountVerified";

// Per-account maps
pub const GEMS: &str = "db.gems";
pub const BALANCES: &str = "db.balances";
pub const INVENTORY: &str = "db.inventory";
pub const LAST_CARD_TIME: &str = "db.lastCardTime";

// Bank
pub const ACCOUNTS: &str = "db.accounts";
pub const WALLET_INDEX: &str = "db.walletIndex";
pub const TRANSACTIONS: &str = "db.transactions";
pub const WALLETS: &str = "bankWallets";
pub const ACTIVE_WALLET: &str = "bankActiveWalletId";
pub const SESSION: &str = "fb_session";

// Aggregate
pub const SAVE_DATA: &str = "game_save_data";

/// Every key the engine owns. A restore rewrites this whole set.
pub const ALL: &[&str] = &[
    COINS,
    LEVEL,
    POWER,
    TOTAL_CLICKS,
    PLAY_TIME,
    SKIN,
    ACHIEVEMENTS,
    CRITICAL,
    SPEED,
    ABILITIES_USED,
    OWNED_SKINS,
    OWNED_ABILITIES,
    ACTIVE_ABILITIES,
    ABILITY_COOLDOWNS,
    TUTORIAL_COMPLETED,
    LAST_GOLDEN_CLICK,
    DAILY_COINS,
    LAST_DAILY_RESET,
    DAILY_CASE_OPENINGS,
    CASE_OPENINGS_DAY,
    FLOW_PLUS,
    VERIFIED,
    GEMS,
    BALANCES,
    INVENTORY,
    LAST_CARD_TIME,
    ACCOUNTS,
    WALLET_INDEX,
    TRANSACTIONS,
    WALLETS,
    ACTIVE_WALLET,
    SESSION,
    SAVE_DATA,
];

/// Bank records that survive `reset_all`. Balances are not among them.
pub const BANK: &[&str] = &[ACCOUNTS, WALLET_INDEX, TRANSACTIONS, WALLETS, ACTIVE_WALLET, SESSION];
