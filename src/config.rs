//! Tunable constants.
//!
//! The shipped values are the `Default` impl. A host can override any subset
//! by passing a JSON document to [`GameConfig::from_json`]; fields it leaves
//! out keep their defaults.

use serde::{Deserialize, Serialize};

use crate::time::{Millis, DAY_MS, HOUR_MS, MINUTE_MS, SECOND_MS};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Maximum coins creditable within one daily window.
    pub daily_coin_limit: u64,
    /// Length of the daily window.
    pub daily_window_ms: Millis,

    /// Minimum gap between two free card draws.
    pub card_interval_ms: Millis,

    /// Scheduler resolution. Ability expiry and countdowns are accurate to
    /// within one tick.
    pub tick_ms: Millis,
    pub autosave_interval_ms: Millis,
    /// Automatic clicks fired by `auto_burst` (150 ms ≈ 6.7 clicks/s).
    pub burst_interval_ms: Millis,

    /// Per-transfer cap as a percentage of the sender's balance.
    pub transfer_cap_percent: u64,
    /// Transfers strictly above this amount earn cashback.
    pub cashback_threshold: u64,
    pub cashback_percent: u64,

    pub starter_gems: u64,
    pub starter_balance: u64,
    pub starter_coin_parcel: u64,
    pub starter_cases: u32,

    /// How long a word-phrase login stays valid.
    pub session_ttl_ms: Millis,

    /// Clicks in the trailing second above which clicks are throttled.
    pub max_clicks_per_second: usize,

    pub golden_click_interval_ms: Millis,
    pub golden_click_window_ms: Millis,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            daily_coin_limit: 10_000,
            daily_window_ms: DAY_MS,
            card_interval_ms: HOUR_MS,
            tick_ms: SECOND_MS,
            autosave_interval_ms: 30 * SECOND_MS,
            burst_interval_ms: 150,
            transfer_cap_percent: 10,
            cashback_threshold: 10_000,
            cashback_percent: 10,
            starter_gems: 10,
            starter_balance: 500,
            starter_coin_parcel: 1_000,
            starter_cases: 2,
            session_ttl_ms: 30 * DAY_MS,
            max_clicks_per_second: 40,
            golden_click_interval_ms: 10 * MINUTE_MS,
            golden_click_window_ms: 30 * SECOND_MS,
        }
    }
}

impl GameConfig {
    /// Parse a (possibly partial) JSON override document.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}
