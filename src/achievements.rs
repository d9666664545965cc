//! One-time achievements and their coin rewards.

use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::error::GameResult;
use crate::ledger::{Credit, CreditSource, Ledger};
use crate::storage::{keys, Storage, Store};
use crate::time::Millis;

/// Snapshot of the numbers achievements are judged on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub coins: u64,
    pub total_clicks: u64,
    pub click_power: u64,
    pub level: u64,
    /// Seconds.
    pub play_time: u64,
    pub daily_coins: u64,
    pub critical: u64,
    pub abilities_used: u64,
    pub skins_owned: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Requirement {
    TotalClicks(u64),
    Coins(u64),
    ClickPower(u64),
    Level(u64),
    PlayTime(u64),
    Critical(u64),
    SkinsOwned(u64),
    AbilitiesUsed(u64),
    DailyCoins(u64),
}

impl Requirement {
    pub fn is_met(self, s: &Stats) -> bool {
        match self {
            Requirement::TotalClicks(n) => s.total_clicks >= n,
            Requirement::Coins(n) => s.coins >= n,
            Requirement::ClickPower(n) => s.click_power >= n,
            Requirement::Level(n) => s.level >= n,
            Requirement::PlayTime(n) => s.play_time >= n,
            Requirement::Critical(n) => s.critical >= n,
            Requirement::SkinsOwned(n) => s.skins_owned >= n,
            Requirement::AbilitiesUsed(n) => s.abilities_used >= n,
            Requirement::DailyCoins(n) => s.daily_coins >= n,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Achievement {
    pub id: &'static str,
    pub requirement: Requirement,
    pub reward: u64,
}

const fn a(id: &'static str, requirement: Requirement, reward: u64) -> Achievement {
    Achievement {
        id,
        requirement,
        reward,
    }
}

pub const ACHIEVEMENTS: &[Achievement] = &[
    a("first_click", Requirement::TotalClicks(1), 25),
    a("hundred_coins", Requirement::Coins(100), 100),
    a("thousand_coins", Requirement::Coins(1_000), 500),
    a("mega_saver", Requirement::Coins(10_000), 2_500),
    a("ultra_rich", Requirement::Coins(100_000), 25_000),
    a("power_clicker", Requirement::ClickPower(10), 300),
    a("super_power", Requirement::ClickPower(50), 1_500),
    a("click_marathon", Requirement::TotalClicks(5_000), 1_200),
    a("click_legend", Requirement::TotalClicks(50_000), 8_000),
    a("level_master", Requirement::Level(100), 10_000),
    a("time_traveler", Requirement::PlayTime(7_200), 3_000),
    a("dedicated_player", Requirement::PlayTime(36_000), 15_000),
    a("critical_master", Requirement::Critical(25), 4_000),
    a("skin_collector", Requirement::SkinsOwned(8), 6_000),
    a("ability_master", Requirement::AbilitiesUsed(200), 10_000),
    a("daily_grinder", Requirement::DailyCoins(100_000), 15_000),
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Unlock {
    pub id: &'static str,
    pub credit: Credit,
}

pub struct Achievements<'a, S> {
    store: &'a Store<S>,
    config: &'a GameConfig,
}

impl<'a, S: Storage> Achievements<'a, S> {
    pub fn new(store: &'a Store<S>, config: &'a GameConfig) -> Self {
        Self { store, config }
    }

    pub fn unlocked(&self) -> Vec<String> {
        self.store.read_or_default(keys::ACHIEVEMENTS)
    }

    /// Unlock every achievement `stats` now satisfies. Each id unlocks at
    /// most once; its reward goes through the daily cap.
    pub fn check(&self, stats: &Stats, now: Millis) -> GameResult<Vec<Unlock>> {
        let mut unlocked = self.unlocked();
        let fresh: Vec<&Achievement> = ACHIEVEMENTS
            .iter()
            .filter(|a| !unlocked.iter().any(|u| u == a.id) && a.requirement.is_met(stats))
            .collect();
        if fresh.is_empty() {
            return Ok(Vec::new());
        }

        // Persist the ids before paying out.
        unlocked.extend(fresh.iter().map(|a| a.id.to_string()));
        self.store.write(keys::ACHIEVEMENTS, &unlocked)?;

        let ledger = Ledger::new(self.store, self.config);
        let mut out = Vec::with_capacity(fresh.len());
        for achievement in fresh {
            let credit = ledger.credit(achievement.reward, CreditSource::Achievement, now)?;
            tracing::info!(id = achievement.id, granted = credit.granted, "achievement unlocked");
            out.push(Unlock {
                id: achievement.id,
                credit,
            });
        }
        Ok(out)
    }
}
