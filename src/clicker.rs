//! The clicker game: clicks, upgrades, skins, golden clicks and the passive
//! income paths driven by abilities.
//!
//! All income is credited through [`Ledger::credit`]. Level is derived from
//! the coin balance and only ever goes up.

use std::collections::VecDeque;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::abilities::{Abilities, EffectModifiers};
use crate::achievements::{Achievements, Stats, Unlock};
use crate::collection::Collection;
use crate::config::GameConfig;
use crate::error::{GameError, GameResult};
use crate::inventory::{Inventory, InventoryItem, NewItem};
use crate::ledger::{floor_amount, Credit, CreditSource, Ledger};
use crate::rewards::{catalog, Rarity};
use crate::storage::{keys, Storage, Store};
use crate::time::{Millis, SECOND_MS};

/// Upgrade price multipliers by current level; the last one repeats.
pub const PRICE_MULTIPLIERS: [u64; 7] = [5, 10, 15, 25, 50, 150, 700];

/// Coins per level step.
pub const COINS_PER_LEVEL: u64 = 500;

pub const CRIT_CHANCE_PER_LEVEL: f64 = 0.03;
pub const CRIT_MULTIPLIER: f64 = 3.0;
pub const COIN_RAIN_FACTOR: f64 = 0.5;

/// Skins sold for clicker coins.
pub const SHOP_SKINS: &[(&str, u64)] = &[
    ("default", 0),
    ("fire", 1_500),
    ("electric", 3_000),
    ("cosmic", 6_000),
    ("royal", 15_000),
    ("diamond", 30_000),
    ("rainbow", 50_000),
    ("shadow", 25_000),
    ("ice", 18_000),
    ("nature", 22_000),
];

/// Cases a golden click can drop, with the rarity the item carries.
const GOLDEN_CASES: &[(&str, Rarity)] = &[
    ("common", Rarity::Common),
    ("rare", Rarity::Rare),
    ("premium", Rarity::Epic),
    ("legendary", Rarity::Legendary),
];

pub fn level_for_coins(coins: u64) -> u64 {
    coins / COINS_PER_LEVEL + 1
}

/// Income multiplier from level: +0.2 per ten levels.
pub fn level_multiplier(level: u64) -> f64 {
    1.0 + (level / 10) as f64 * 0.2
}

fn price_multiplier(index: u64) -> u64 {
    let last = PRICE_MULTIPLIERS.len() - 1;
    PRICE_MULTIPLIERS[index.min(last as u64) as usize]
}

/// Price of the next click power level.
pub fn click_power_cost(power: u64, cost_factor: f64) -> u64 {
    let base = power.saturating_mul(price_multiplier(power.saturating_sub(1)));
    floor_amount(base as f64 * cost_factor)
}

/// Price of the next critical level.
pub fn critical_cost(critical: u64, cost_factor: f64) -> u64 {
    let base = critical.saturating_add(1).saturating_mul(price_multiplier(critical));
    floor_amount(base as f64 * cost_factor)
}

/// Advisory click-rate limiter. Counts clicks in the trailing second; not
/// persisted.
#[derive(Debug, Default)]
pub struct ClickPacer {
    recent: VecDeque<Millis>,
}

impl ClickPacer {
    const HISTORY: usize = 50;

    pub fn new() -> Self {
        Self::default()
    }

    /// Record a click and report whether it may proceed.
    pub fn admit(&mut self, now: Millis, limit: usize) -> bool {
        let horizon = now.saturating_sub(SECOND_MS);
        while self.recent.front().is_some_and(|&t| t <= horizon) {
            self.recent.pop_front();
        }
        let prior = self.recent.len();
        self.recent.push_back(now);
        if self.recent.len() > Self::HISTORY {
            self.recent.pop_front();
        }
        prior < limit
    }

    pub fn clicks_last_second(&self) -> usize {
        self.recent.len()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoldenClick {
    pub spawned_at: Millis,
    pub claimed: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum GoldenReward {
    Coins(Credit),
    Case(InventoryItem),
}

#[derive(Clone, Debug, PartialEq)]
pub enum ClickOutcome {
    /// Too many clicks in the last second; nothing happened.
    Throttled,
    Golden(GoldenReward),
    Coins {
        /// Coins the click was worth before the daily cap.
        power: u64,
        critical: bool,
        credit: Credit,
        unlocked: Vec<Unlock>,
    },
}

pub struct Clicker<'a, S> {
    store: &'a Store<S>,
    config: &'a GameConfig,
}

impl<'a, S: Storage> Clicker<'a, S> {
    pub fn new(store: &'a Store<S>, config: &'a GameConfig) -> Self {
        Self { store, config }
    }

    fn ledger(&self) -> Ledger<'a, S> {
        Ledger::new(self.store, self.config)
    }

    fn abilities(&self) -> Abilities<'a, S> {
        Abilities::new(self.store, self.config)
    }

    // ── Stats ─────────────────────────────────────────────────

    pub fn power(&self) -> u64 {
        self.store.read(keys::POWER, 1u64).max(1)
    }

    pub fn critical(&self) -> u64 {
        self.store.read(keys::CRITICAL, 0)
    }

    pub fn total_clicks(&self) -> u64 {
        self.store.read(keys::TOTAL_CLICKS, 0)
    }

    pub fn play_time(&self) -> u64 {
        self.store.read(keys::PLAY_TIME, 0)
    }

    pub fn level(&self) -> u64 {
        self.store.read(keys::LEVEL, 1u64).max(1)
    }

    pub fn multiplier(&self) -> f64 {
        level_multiplier(self.level())
    }

    pub fn stats(&self) -> Stats {
        Stats {
            coins: self.ledger().coins(),
            total_clicks: self.total_clicks(),
            click_power: self.power(),
            level: self.level(),
            play_time: self.play_time(),
            daily_coins: self.ledger().daily_earned(),
            critical: self.critical(),
            abilities_used: self.abilities().times_used(),
            skins_owned: Collection::new(self.store).owned_skins().len() as u64,
        }
    }

    /// Raise the stored level if the coin balance has outgrown it.
    pub fn refresh_level(&self) -> GameResult<u64> {
        let level = self.level();
        let derived = level_for_coins(self.ledger().coins());
        if derived > level {
            self.store.write(keys::LEVEL, &derived)?;
            tracing::debug!(level = derived, "level up");
            return Ok(derived);
        }
        Ok(level)
    }

    /// Re-derive the level and unlock any newly met achievements.
    pub fn settle(&self, now: Millis) -> GameResult<Vec<Unlock>> {
        self.refresh_level()?;
        let unlocked = Achievements::new(self.store, self.config).check(&self.stats(), now)?;
        if !unlocked.is_empty() {
            self.refresh_level()?;
        }
        Ok(unlocked)
    }

    // ── Clicking ──────────────────────────────────────────────

    fn crit_chance(&self, m: &EffectModifiers) -> f64 {
        self.critical() as f64 * CRIT_CHANCE_PER_LEVEL + m.crit_bonus
    }

    /// Coins one click is worth right now, before the daily cap.
    fn roll_click<R: Rng + ?Sized>(&self, now: Millis, rng: &mut R) -> (u64, bool) {
        let m = self.abilities().modifiers(now);
        let critical = rng.gen::<f64>() < self.crit_chance(&m);
        let mut value = self.power() as f64 * self.multiplier() * m.coin_multiplier;
        if critical {
            value *= CRIT_MULTIPLIER;
        }
        (floor_amount(value), critical)
    }

    fn count_click(&self) -> GameResult<()> {
        self.store
            .write(keys::TOTAL_CLICKS, &self.total_clicks().saturating_add(1))?;
        Ok(())
    }

    pub fn click<R: Rng + ?Sized>(
        &self,
        now: Millis,
        pacer: &mut ClickPacer,
        rng: &mut R,
    ) -> GameResult<ClickOutcome> {
        if !pacer.admit(now, self.config.max_clicks_per_second) {
            tracing::debug!(rate = pacer.clicks_last_second(), "click throttled");
            return Ok(ClickOutcome::Throttled);
        }

        if self.golden_active(now) {
            return self.claim_golden(now, rng).map(ClickOutcome::Golden);
        }

        let (power, critical) = self.roll_click(now, rng);
        let credit = self.ledger().credit(power, CreditSource::Click, now)?;
        if credit.granted > 0 || power == 0 {
            self.count_click()?;
        }
        let unlocked = self.settle(now)?;
        Ok(ClickOutcome::Coins {
            power,
            critical,
            credit,
            unlocked,
        })
    }

    /// One automatic click from `auto_burst`. Does nothing unless the
    /// ability is active.
    pub fn burst_click<R: Rng + ?Sized>(&self, now: Millis, rng: &mut R) -> GameResult<Option<Credit>> {
        if !self.abilities().modifiers(now).auto_burst {
            return Ok(None);
        }
        if self.ledger().headroom() == 0 && !self.ledger().reset_daily_if_elapsed(now)? {
            return Ok(None);
        }
        let (power, _) = self.roll_click(now, rng);
        let credit = self.ledger().credit(power, CreditSource::Burst, now)?;
        self.count_click()?;
        Ok(Some(credit))
    }

    /// Per-second trickle from `coin_rain`.
    pub fn coin_rain(&self, now: Millis) -> GameResult<Option<Credit>> {
        if !self.abilities().modifiers(now).coin_rain {
            return Ok(None);
        }
        let amount = floor_amount(self.power() as f64 * self.multiplier() * COIN_RAIN_FACTOR);
        self.ledger()
            .credit(amount, CreditSource::CoinRain, now)
            .map(Some)
    }

    pub fn tick_play_time(&self) -> GameResult<u64> {
        let next = self.play_time().saturating_add(1);
        self.store.write(keys::PLAY_TIME, &next)?;
        Ok(next)
    }

    // ── Golden click ──────────────────────────────────────────

    pub fn golden_state(&self) -> Option<GoldenClick> {
        self.store.read(keys::LAST_GOLDEN_CLICK, None)
    }

    pub fn golden_active(&self, now: Millis) -> bool {
        self.golden_state().is_some_and(|g| {
            !g.claimed && now < g.spawned_at.saturating_add(self.config.golden_click_window_ms)
        })
    }

    /// Spawn a golden click once the interval has passed since the last
    /// one. The very first call only starts the timer. Returns `true` when
    /// a golden click became available.
    pub fn refresh_golden(&self, now: Millis) -> GameResult<bool> {
        match self.golden_state() {
            None => {
                let idle = GoldenClick {
                    spawned_at: now,
                    claimed: true,
                };
                self.store.write(keys::LAST_GOLDEN_CLICK, &idle)?;
                Ok(false)
            }
            Some(g) if now.saturating_sub(g.spawned_at) >= self.config.golden_click_interval_ms => {
                let fresh = GoldenClick {
                    spawned_at: now,
                    claimed: false,
                };
                self.store.write(keys::LAST_GOLDEN_CLICK, &fresh)?;
                tracing::info!(now, "golden click available");
                Ok(true)
            }
            Some(_) => Ok(false),
        }
    }

    fn claim_golden<R: Rng + ?Sized>(&self, now: Millis, rng: &mut R) -> GameResult<GoldenReward> {
        if let Some(mut g) = self.golden_state() {
            g.claimed = true;
            self.store.write(keys::LAST_GOLDEN_CLICK, &g)?;
        }
        if rng.gen_bool(0.7) {
            let amount = rng.gen_range(1_000..=5_000);
            let credit = self.ledger().credit(amount, CreditSource::GoldenClick, now)?;
            Ok(GoldenReward::Coins(credit))
        } else {
            let (table, rarity) = GOLDEN_CASES[rng.gen_range(0..GOLDEN_CASES.len())];
            let item = Inventory::new(self.store).add(NewItem::case(table, rarity), now, rng)?;
            Ok(GoldenReward::Case(item))
        }
    }

    // ── Purchases ─────────────────────────────────────────────

    pub fn click_power_cost(&self, now: Millis) -> u64 {
        let factor = self.abilities().modifiers(now).upgrade_cost_factor;
        click_power_cost(self.power(), factor)
    }

    pub fn critical_cost(&self, now: Millis) -> u64 {
        let factor = self.abilities().modifiers(now).upgrade_cost_factor;
        critical_cost(self.critical(), factor)
    }

    /// Buy one click power level. Returns the new power.
    pub fn buy_click_power(&self, now: Millis) -> GameResult<u64> {
        let cost = self.click_power_cost(now);
        self.ledger().debit(cost)?;
        let next = self.power().saturating_add(1);
        self.store.write(keys::POWER, &next)?;
        tracing::info!(power = next, cost, "click power upgraded");
        Ok(next)
    }

    /// Buy one critical level. Returns the new level.
    pub fn buy_critical(&self, now: Millis) -> GameResult<u64> {
        let cost = self.critical_cost(now);
        self.ledger().debit(cost)?;
        let next = self.critical().saturating_add(1);
        self.store.write(keys::CRITICAL, &next)?;
        tracing::info!(critical = next, cost, "critical upgraded");
        Ok(next)
    }

    pub fn buy_skin(&self, id: &str) -> GameResult<()> {
        let price = SHOP_SKINS
            .iter()
            .find(|(s, _)| *s == id)
            .map(|(_, p)| *p)
            .ok_or_else(|| GameError::UnknownSkin(id.to_string()))?;
        let collection = Collection::new(self.store);
        if collection.owns_skin(id) {
            return Err(GameError::AlreadyOwned(id.to_string()));
        }
        self.ledger().debit(price)?;
        collection.grant_skin(id)?;
        Ok(())
    }

    pub fn select_skin(&self, id: &str) -> GameResult<()> {
        if !catalog::is_known_skin(id) {
            return Err(GameError::UnknownSkin(id.to_string()));
        }
        let collection = Collection::new(self.store);
        if !collection.owns_skin(id) {
            return Err(GameError::NotOwned(id.to_string()));
        }
        collection.select_skin(id)
    }

    pub fn tutorial_completed(&self) -> bool {
        self.store.read(keys::TUTORIAL_COMPLETED, false)
    }

    pub fn complete_tutorial(&self) -> GameResult<()> {
        self.store.write(keys::TUTORIAL_COMPLETED, &true)?;
        Ok(())
    }
}
