//! Timed abilities: activation, active windows and cooldowns.
//!
//! Both windows are stored as absolute timestamps. The cooldown starts at
//! activation, independently of the active window, so an ability whose
//! effect has already worn off can still be on cooldown.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::collection::Collection;
use crate::config::GameConfig;
use crate::error::{GameError, GameResult};
use crate::ledger::Ledger;
use crate::storage::{keys, Storage, Store};
use crate::time::{Millis, SECOND_MS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AbilityDef {
    pub id: &'static str,
    pub duration_ms: Millis,
    pub cooldown_ms: Millis,
    /// Shop price in clicker coins.
    pub price: u64,
}

/// Activatable abilities. Other catalog abilities are collectibles.
pub const DEFINITIONS: &[AbilityDef] = &[
    AbilityDef {
        id: DOUBLE_COINS,
        duration_ms: 60 * SECOND_MS,
        cooldown_ms: 300 * SECOND_MS,
        price: 2_500,
    },
    AbilityDef {
        id: AUTO_BURST,
        duration_ms: 30 * SECOND_MS,
        cooldown_ms: 450 * SECOND_MS,
        price: 5_000,
    },
    AbilityDef {
        id: CRITICAL_BOOST,
        duration_ms: 90 * SECOND_MS,
        cooldown_ms: 600 * SECOND_MS,
        price: 8_000,
    },
    AbilityDef {
        id: COIN_RAIN,
        duration_ms: 45 * SECOND_MS,
        cooldown_ms: 900 * SECOND_MS,
        price: 12_000,
    },
    AbilityDef {
        id: AUTO_UPGRADE,
        duration_ms: 120 * SECOND_MS,
        cooldown_ms: 1_200 * SECOND_MS,
        price: 20_000,
    },
];

pub const DOUBLE_COINS: &str = "double_coins";
pub const AUTO_BURST: &str = "auto_burst";
pub const CRITICAL_BOOST: &str = "critical_boost";
pub const COIN_RAIN: &str = "coin_rain";
pub const AUTO_UPGRADE: &str = "auto_upgrade";

pub fn definition(id: &str) -> Option<&'static AbilityDef> {
    DEFINITIONS.iter().find(|d| d.id == id)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveEffect {
    pub end_time: Millis,
    pub active: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Activation {
    pub ends_at: Millis,
    pub available_at: Millis,
}

/// Effects of the currently active abilities, folded together.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EffectModifiers {
    /// Product of every active coin multiplier.
    pub coin_multiplier: f64,
    /// Added to the base critical chance.
    pub crit_bonus: f64,
    /// Applied to upgrade prices.
    pub upgrade_cost_factor: f64,
    pub auto_burst: bool,
    pub coin_rain: bool,
}

impl Default for EffectModifiers {
    fn default() -> Self {
        Self {
            coin_multiplier: 1.0,
            crit_bonus: 0.0,
            upgrade_cost_factor: 1.0,
            auto_burst: false,
            coin_rain: false,
        }
    }
}

/// Result of one scheduler tick.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Abilities whose active window closed on this tick.
    pub expired: Vec<String>,
    /// Abilities that came off cooldown on this tick.
    pub ready: Vec<String>,
}

pub struct Abilities<'a, S> {
    store: &'a Store<S>,
    config: &'a GameConfig,
}

impl<'a, S: Storage> Abilities<'a, S> {
    pub fn new(store: &'a Store<S>, config: &'a GameConfig) -> Self {
        Self { store, config }
    }

    pub fn active_effects(&self) -> BTreeMap<String, ActiveEffect> {
        self.store.read_or_default(keys::ACTIVE_ABILITIES)
    }

    pub fn cooldowns(&self) -> BTreeMap<String, Millis> {
        self.store.read_or_default(keys::ABILITY_COOLDOWNS)
    }

    pub fn times_used(&self) -> u64 {
        self.store.read(keys::ABILITIES_USED, 0)
    }

    pub fn is_active(&self, id: &str, now: Millis) -> bool {
        self.active_effects()
            .get(id)
            .is_some_and(|e| e.active && now < e.end_time)
    }

    pub fn active_ids(&self, now: Millis) -> Vec<String> {
        self.active_effects()
            .into_iter()
            .filter(|(_, e)| e.active && now < e.end_time)
            .map(|(id, _)| id)
            .collect()
    }

    /// Milliseconds until `id` can be activated again, zero when ready.
    pub fn cooldown_remaining(&self, id: &str, now: Millis) -> Millis {
        self.cooldowns()
            .get(id)
            .map_or(0, |at| at.saturating_sub(now))
    }

    /// Buy an activatable ability with clicker coins.
    pub fn buy(&self, id: &str) -> GameResult<()> {
        let def = definition(id).ok_or_else(|| GameError::UnknownAbility(id.to_string()))?;
        let collection = Collection::new(self.store);
        if collection.owns_ability(id) {
            return Err(GameError::AlreadyOwned(id.to_string()));
        }
        Ledger::new(self.store, self.config).debit(def.price)?;
        collection.grant_ability(id)?;
        tracing::info!(ability = id, price = def.price, "ability bought");
        Ok(())
    }

    /// Start an ability's active window and its cooldown.
    pub fn activate(&self, id: &str, now: Millis) -> GameResult<Activation> {
        let def = definition(id).ok_or_else(|| GameError::UnknownAbility(id.to_string()))?;
        if !Collection::new(self.store).owns_ability(id) {
            return Err(GameError::NotOwned(id.to_string()));
        }
        let remaining = self.cooldown_remaining(id, now);
        if remaining > 0 {
            return Err(GameError::OnCooldown {
                ability: id.to_string(),
                remaining_ms: remaining,
            });
        }

        let activation = Activation {
            ends_at: now + def.duration_ms,
            available_at: now + def.cooldown_ms,
        };

        let mut effects = self.active_effects();
        effects.insert(
            id.to_string(),
            ActiveEffect {
                end_time: activation.ends_at,
                active: true,
            },
        );
        let mut cooldowns = self.cooldowns();
        cooldowns.insert(id.to_string(), activation.available_at);

        self.store.write(keys::ACTIVE_ABILITIES, &effects)?;
        self.store.write(keys::ABILITY_COOLDOWNS, &cooldowns)?;
        self.store
            .write(keys::ABILITIES_USED, &(self.times_used() + 1))?;

        tracing::info!(
            ability = id,
            ends_at = activation.ends_at,
            available_at = activation.available_at,
            "ability activated"
        );
        Ok(activation)
    }

    /// Close elapsed active windows (each exactly once) and drop elapsed
    /// cooldowns.
    pub fn tick(&self, now: Millis) -> GameResult<TickReport> {
        let mut report = TickReport::default();

        let mut effects = self.active_effects();
        for (id, effect) in effects.iter_mut() {
            if effect.active && now >= effect.end_time {
                effect.active = false;
                report.expired.push(id.clone());
            }
        }
        if !report.expired.is_empty() {
            self.store.write(keys::ACTIVE_ABILITIES, &effects)?;
            for id in &report.expired {
                tracing::info!(ability = %id, "ability expired");
            }
        }

        let mut cooldowns = self.cooldowns();
        cooldowns.retain(|id, at| {
            if now >= *at {
                report.ready.push(id.clone());
                false
            } else {
                true
            }
        });
        if !report.ready.is_empty() {
            self.store.write(keys::ABILITY_COOLDOWNS, &cooldowns)?;
        }

        Ok(report)
    }

    pub fn modifiers(&self, now: Millis) -> EffectModifiers {
        let mut m = EffectModifiers::default();
        for id in self.active_ids(now) {
            match id.as_str() {
                DOUBLE_COINS => m.coin_multiplier *= 2.0,
                AUTO_UPGRADE => {
                    m.coin_multiplier *= 1.5;
                    m.upgrade_cost_factor *= 0.5;
                }
                CRITICAL_BOOST => m.crit_bonus += 0.5,
                AUTO_BURST => m.auto_burst = true,
                COIN_RAIN => m.coin_rain = true,
                _ => {}
            }
        }
        m
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    const T0: Millis = 1_000_000;

    fn owned(store: &Store<MemoryStorage>, ids: &[&str]) {
        let c = Collection::new(store);
        for id in ids {
            c.grant_ability(id).unwrap();
        }
    }

    #[test]
    fn activate_requires_ownership() {
        let store = Store::new(MemoryStorage::new());
        let config = GameConfig::default();
        let a = Abilities::new(&store, &config);
        assert_eq!(
            a.activate(DOUBLE_COINS, T0),
            Err(GameError::NotOwned(DOUBLE_COINS.into()))
        );
        assert!(matches!(
            a.activate("time_warp", T0),
            Err(GameError::UnknownAbility(_))
        ));
    }

    #[test]
    fn cooldown_outlives_active_window() {
        let store = Store::new(MemoryStorage::new());
        let config = GameConfig::default();
        owned(&store, &[DOUBLE_COINS]);
        let a = Abilities::new(&store, &config);

        let act = a.activate(DOUBLE_COINS, T0).unwrap();
        assert_eq!(act.ends_at, T0 + 60_000);
        assert_eq!(act.available_at, T0 + 300_000);
        assert!(a.is_active(DOUBLE_COINS, T0 + 1));

        // Effect over, cooldown still running.
        let report = a.tick(T0 + 61_000).unwrap();
        assert_eq!(report.expired, vec![DOUBLE_COINS.to_string()]);
        assert!(!a.is_active(DOUBLE_COINS, T0 + 61_000));
        assert_eq!(
            a.activate(DOUBLE_COINS, T0 + 61_000),
            Err(GameError::OnCooldown {
                ability: DOUBLE_COINS.into(),
                remaining_ms: 239_000
            })
        );

        let report = a.tick(T0 + 300_000).unwrap();
        assert_eq!(report.ready, vec![DOUBLE_COINS.to_string()]);
        assert!(a.cooldowns().is_empty());
        assert!(a.activate(DOUBLE_COINS, T0 + 300_000).is_ok());
        assert_eq!(a.times_used(), 2);
    }

    #[test]
    fn expiry_reported_exactly_once() {
        let store = Store::new(MemoryStorage::new());
        let config = GameConfig::default();
        owned(&store, &[AUTO_BURST]);
        let a = Abilities::new(&store, &config);
        a.activate(AUTO_BURST, T0).unwrap();
        assert!(a.tick(T0 + 29_999).unwrap().expired.is_empty());
        assert_eq!(a.tick(T0 + 30_000).unwrap().expired.len(), 1);
        assert!(a.tick(T0 + 31_000).unwrap().expired.is_empty());
    }

    #[test]
    fn modifiers_compose_multiplicatively() {
        let store = Store::new(MemoryStorage::new());
        let config = GameConfig::default();
        owned(&store, &[DOUBLE_COINS, AUTO_UPGRADE, CRITICAL_BOOST]);
        let a = Abilities::new(&store, &config);
        assert_eq!(a.modifiers(T0), EffectModifiers::default());
        a.activate(DOUBLE_COINS, T0).unwrap();
        a.activate(AUTO_UPGRADE, T0).unwrap();
        a.activate(CRITICAL_BOOST, T0).unwrap();
        let m = a.modifiers(T0 + 10);
        assert_eq!(m.coin_multiplier, 3.0);
        assert_eq!(m.upgrade_cost_factor, 0.5);
        assert_eq!(m.crit_bonus, 0.5);
        // double_coins ends first.
        let m = a.modifiers(T0 + 60_000);
        assert_eq!(m.coin_multiplier, 1.5);
    }

    #[test]
    fn buy_debits_coins_once() {
        let store = Store::new(MemoryStorage::new());
        let config = GameConfig::default();
        let ledger = Ledger::new(&store, &config);
        ledger.set_coins(6_000).unwrap();
        let a = Abilities::new(&store, &config);
        a.buy(DOUBLE_COINS).unwrap();
        assert_eq!(ledger.coins(), 3_500);
        assert_eq!(
            a.buy(DOUBLE_COINS),
            Err(GameError::AlreadyOwned(DOUBLE_COINS.into()))
        );
        assert!(matches!(
            a.buy(AUTO_BURST),
            Err(GameError::InsufficientFunds { .. })
        ));
        assert_eq!(ledger.coins(), 3_500);
    }
}
