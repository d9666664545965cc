//! Opening cases: bought from the shop or held in the inventory.

use std::collections::BTreeMap;

use rand::Rng;

use crate::clicker::Clicker;
use crate::collection::Collection;
use crate::config::GameConfig;
use crate::error::{GameError, GameResult};
use crate::inventory::{Inventory, ItemKind};
use crate::ledger::{CreditSource, Ledger};
use crate::rewards::tables::{self, CaseDef, Currency};
use crate::rewards::{self, Grant, Resolved};
use crate::storage::{keys, Storage, Store};
use crate::time::{day_index, Millis};

pub struct Cases<'a, S> {
    store: &'a Store<S>,
    config: &'a GameConfig,
}

impl<'a, S: Storage> Cases<'a, S> {
    pub fn new(store: &'a Store<S>, config: &'a GameConfig) -> Self {
        Self { store, config }
    }

    /// Per-case opening counts for the UTC day containing `now`.
    pub fn openings_today(&self, now: Millis) -> BTreeMap<String, u32> {
        let day: Option<u64> = self.store.read(keys::CASE_OPENINGS_DAY, None);
        if day == Some(day_index(now)) {
            self.store.read_or_default(keys::DAILY_CASE_OPENINGS)
        } else {
            BTreeMap::new()
        }
    }

    fn count_opening(&self, case_id: &str, now: Millis) -> GameResult<()> {
        let mut openings = self.openings_today(now);
        *openings.entry(case_id.to_string()).or_insert(0) += 1;
        self.store.write(keys::DAILY_CASE_OPENINGS, &openings)?;
        self.store.write(keys::CASE_OPENINGS_DAY, &day_index(now))?;
        Ok(())
    }

    fn resolve<R: Rng + ?Sized>(&self, table: &[rewards::RewardEntry], rng: &mut R) -> Option<Resolved> {
        let entry = rewards::roll(table, rng)?;
        let collection = Collection::new(self.store);
        Some(rewards::materialize(
            entry,
            &collection.owned_skins(),
            &collection.owned_abilities(),
            rng,
        ))
    }

    /// Buy and open a shop case.
    ///
    /// Gates run in order (level, daily limit, funds) and nothing is
    /// charged unless all pass.
    pub fn open<R: Rng + ?Sized>(&self, case_id: &str, now: Millis, rng: &mut R) -> GameResult<Grant> {
        let case = tables::shop_case(case_id)
            .ok_or_else(|| GameError::UnknownCase(case_id.to_string()))?;

        let level = Clicker::new(self.store, self.config).level();
        if level < case.min_level {
            return Err(GameError::LevelTooLow {
                required: case.min_level,
                current: level,
            });
        }

        if let Some(limit) = case.daily_limit {
            let opened = self.openings_today(now).get(case.id).copied().unwrap_or(0);
            if opened >= limit {
                return Err(GameError::CaseDailyLimit {
                    case_id: case.id.to_string(),
                    limit,
                });
            }
        }

        let ledger = Ledger::new(self.store, self.config);
        if case.grants_coins() {
            ledger.reset_daily_if_elapsed(now)?;
            if ledger.headroom() == 0 {
                tracing::warn!(case = case.id, "daily coin cap reached; coin rewards will not be credited");
            }
        }
        self.charge(case, &ledger)?;

        let resolved = self
            .resolve(case.rewards, rng)
            .ok_or_else(|| GameError::UnknownCase(case_id.to_string()))?;
        if case.daily_limit.is_some() {
            self.count_opening(case.id, now)?;
        }
        tracing::info!(case = case.id, reward = %resolved.label, "case opened");
        rewards::apply(self.store, self.config, resolved, CreditSource::Case, now, rng)
    }

    fn charge(&self, case: &CaseDef, ledger: &Ledger<'_, S>) -> GameResult<()> {
        match case.currency {
            Currency::Coins => ledger.debit(case.price).map(|_| ()),
            Currency::Gems => ledger.debit_gems(case.price).map(|_| ()),
        }
    }

    /// Resolve `n` openings without touching any state.
    pub fn simulate<R: Rng + ?Sized>(&self, case_id: &str, n: usize, rng: &mut R) -> GameResult<Vec<Resolved>> {
        let case = tables::shop_case(case_id)
            .ok_or_else(|| GameError::UnknownCase(case_id.to_string()))?;
        Ok((0..n).filter_map(|_| self.resolve(case.rewards, rng)).collect())
    }

    /// Open a case held in the inventory. The item is removed before the
    /// reward is applied.
    pub fn open_item<R: Rng + ?Sized>(&self, item_id: &str, now: Millis, rng: &mut R) -> GameResult<Grant> {
        let inventory = Inventory::new(self.store);
        let item = inventory
            .get(item_id)
            .ok_or_else(|| GameError::ItemNotFound(item_id.to_string()))?;
        if item.kind != ItemKind::Case {
            return Err(GameError::NotACase(item_id.to_string()));
        }
        let table = tables::case_table(&item.name)
            .ok_or_else(|| GameError::UnknownCase(item.name.clone()))?;

        inventory.take(item_id)?;
        let resolved = self
            .resolve(table, rng)
            .ok_or_else(|| GameError::UnknownCase(item.name.clone()))?;
        tracing::info!(item = item_id, case = %item.name, reward = %resolved.label, "inventory case opened");
        rewards::apply(self.store, self.config, resolved, CreditSource::Case, now, rng)
    }
}
