//! Resource ledger: clicker coins, gems, bank balances and the daily cap.
//!
//! Every path that grants clicker coins (clicks, bursts, coin rain, case and
//! card rewards, achievements, golden clicks, duplicate compensation) goes
//! through [`Ledger::credit`], so the cap is enforced in exactly one place.
//! Debits never go below zero.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::error::{GameError, GameResult};
use crate::storage::{keys, Storage, Store};
use crate::time::Millis;

/// The implicit local account every device starts with.
pub const GUEST_ACCOUNT: &str = "guest";

/// Where a coin grant came from. Only used for logging.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CreditSource {
    Click,
    Burst,
    CoinRain,
    GoldenClick,
    Case,
    Card,
    Achievement,
    Compensation,
}

/// How much of a requested grant survived the daily cap.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CreditStatus {
    Full,
    /// Truncated to the remaining headroom.
    Partial,
    /// Nothing granted; the cap was already reached.
    LimitReached,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Credit {
    pub requested: u64,
    pub granted: u64,
    pub status: CreditStatus,
}

/// Floor a possibly fractional amount to a non-negative integer.
/// NaN and negative values become zero.
pub fn floor_amount(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value.floor() as u64
    } else if value == f64::INFINITY {
        u64::MAX
    } else {
        0
    }
}

/// Borrowing view over the persisted resource keys. Cheap to construct;
/// every mutation is written through immediately.
pub struct Ledger<'a, S> {
    store: &'a Store<S>,
    config: &'a GameConfig,
}

impl<'a, S: Storage> Ledger<'a, S> {
    pub fn new(store: &'a Store<S>, config: &'a GameConfig) -> Self {
        Self { store, config }
    }

    // ── Clicker coins ─────────────────────────────────────────

    pub fn coins(&self) -> u64 {
        self.store.read(keys::COINS, 0)
    }

    pub fn set_coins(&self, value: u64) -> GameResult<()> {
        self.store.write(keys::COINS, &value)?;
        Ok(())
    }

    pub fn daily_earned(&self) -> u64 {
        self.store.read(keys::DAILY_COINS, 0)
    }

    pub fn last_daily_reset(&self) -> Millis {
        self.store.read(keys::LAST_DAILY_RESET, 0)
    }

    /// Coins still creditable in the current window.
    pub fn headroom(&self) -> u64 {
        self.config
            .daily_coin_limit
            .saturating_sub(self.daily_earned())
    }

    /// Zero the daily counter once a full window has passed since the last
    /// reset. Returns `true` when a reset happened.
    pub fn reset_daily_if_elapsed(&self, now: Millis) -> GameResult<bool> {
        let last = self.last_daily_reset();
        if now.saturating_sub(last) < self.config.daily_window_ms {
            return Ok(false);
        }
        self.store.write(keys::DAILY_COINS, &0u64)?;
        self.store.write(keys::LAST_DAILY_RESET, &now)?;
        tracing::info!(now, "daily coin window reset");
        Ok(true)
    }

    /// Grant clicker coins subject to the daily cap.
    ///
    /// The grant is truncated to the remaining headroom; the returned
    /// [`Credit`] reports how much actually landed.
    pub fn credit(&self, amount: u64, source: CreditSource, now: Millis) -> GameResult<Credit> {
        self.reset_daily_if_elapsed(now)?;

        let daily = self.daily_earned();
        let headroom = self.config.daily_coin_limit.saturating_sub(daily);
        let granted = amount.min(headroom);
        let status = if headroom == 0 {
            CreditStatus::LimitReached
        } else if granted == amount {
            CreditStatus::Full
        } else {
            CreditStatus::Partial
        };

        if granted > 0 {
            let coins = self.coins().saturating_add(granted);
            self.store
                .atomically(&[keys::COINS, keys::DAILY_COINS], |store| {
                    store.write(keys::COINS, &coins)?;
                    store.write(keys::DAILY_COINS, &(daily + granted))
                })?;
        }

        match status {
            CreditStatus::Full => {
                tracing::debug!(?source, granted, "coins credited");
            }
            CreditStatus::Partial => {
                tracing::info!(?source, requested = amount, granted, "daily cap truncated grant");
            }
            CreditStatus::LimitReached => {
                tracing::info!(?source, requested = amount, "daily cap reached, nothing granted");
            }
        }

        Ok(Credit {
            requested: amount,
            granted,
            status,
        })
    }

    /// Spend clicker coins. Returns the new balance.
    pub fn debit(&self, amount: u64) -> GameResult<u64> {
        let coins = self.coins();
        if amount > coins {
            return Err(GameError::InsufficientFunds {
                required: amount,
                available: coins,
            });
        }
        let rest = coins - amount;
        self.set_coins(rest)?;
        Ok(rest)
    }

    // ── Gems ──────────────────────────────────────────────────

    fn gem_map(&self) -> BTreeMap<String, u64> {
        self.store.read_or_default(keys::GEMS)
    }

    pub fn gems(&self) -> u64 {
        self.gem_map().get(GUEST_ACCOUNT).copied().unwrap_or(0)
    }

    pub fn set_gems(&self, value: u64) -> GameResult<()> {
        let mut map = self.gem_map();
        map.insert(GUEST_ACCOUNT.to_string(), value);
        self.store.write(keys::GEMS, &map)?;
        Ok(())
    }

    pub fn add_gems(&self, delta: u64) -> GameResult<u64> {
        let next = self.gems().saturating_add(delta);
        self.set_gems(next)?;
        Ok(next)
    }

    pub fn debit_gems(&self, amount: u64) -> GameResult<u64> {
        let gems = self.gems();
        if amount > gems {
            return Err(GameError::InsufficientFunds {
                required: amount,
                available: gems,
            });
        }
        self.set_gems(gems - amount)?;
        Ok(gems - amount)
    }

    // ── Bank balances ─────────────────────────────────────────

    /// Every account's bank balance.
    pub fn balances(&self) -> BTreeMap<String, u64> {
        self.store.read_or_default(keys::BALANCES)
    }

    /// Replace every bank balance in one write.
    pub fn write_balances(&self, balances: &BTreeMap<String, u64>) -> GameResult<()> {
        self.store.write(keys::BALANCES, balances)?;
        Ok(())
    }

    pub fn balance(&self, account: &str) -> u64 {
        self.balances().get(account).copied().unwrap_or(0)
    }

    pub fn set_balance(&self, account: &str, value: u64) -> GameResult<()> {
        let mut map = self.balances();
        map.insert(account.to_string(), value);
        self.store.write(keys::BALANCES, &map)?;
        Ok(())
    }

    pub fn add_balance(&self, account: &str, delta: u64) -> GameResult<u64> {
        let next = self.balance(account).saturating_add(delta);
        self.set_balance(account, next)?;
        Ok(next)
    }

    pub fn debit_balance(&self, account: &str, amount: u64) -> GameResult<u64> {
        let balance = self.balance(account);
        if amount > balance {
            return Err(GameError::InsufficientFunds {
                required: amount,
                available: balance,
            });
        }
        self.set_balance(account, balance - amount)?;
        Ok(balance - amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use crate::time::DAY_MS;

    const NOW: Millis = 1_700_000_000_000;

    fn setup() -> (Store<MemoryStorage>, GameConfig) {
        (Store::new(MemoryStorage::new()), GameConfig::default())
    }

    #[test]
    fn credit_truncates_at_daily_cap() {
        let (store, config) = setup();
        let ledger = Ledger::new(&store, &config);
        let a = ledger.credit(7_000, CreditSource::Case, NOW).unwrap();
        assert_eq!(a.granted, 7_000);
        assert_eq!(a.status, CreditStatus::Full);
        let b = ledger.credit(5_000, CreditSource::Card, NOW).unwrap();
        assert_eq!(b.granted, 3_000);
        assert_eq!(b.status, CreditStatus::Partial);
        let c = ledger.credit(1, CreditSource::Click, NOW).unwrap();
        assert_eq!(c.granted, 0);
        assert_eq!(c.status, CreditStatus::LimitReached);
        assert_eq!(ledger.coins(), 10_000);
        assert_eq!(ledger.daily_earned(), 10_000);
    }

    #[test]
    fn zero_credit_reports_cap() {
        let (store, config) = setup();
        let ledger = Ledger::new(&store, &config);
        assert_eq!(
            ledger.credit(0, CreditSource::CoinRain, NOW).unwrap().status,
            CreditStatus::Full
        );
        ledger.credit(10_000, CreditSource::Click, NOW).unwrap();
        let c = ledger.credit(0, CreditSource::CoinRain, NOW).unwrap();
        assert_eq!(c.granted, 0);
        assert_eq!(c.status, CreditStatus::LimitReached);
    }

    #[test]
    fn cap_resets_after_window() {
        let (store, config) = setup();
        let ledger = Ledger::new(&store, &config);
        ledger.credit(10_000, CreditSource::Click, NOW).unwrap();
        assert_eq!(ledger.headroom(), 0);

        assert!(!ledger.reset_daily_if_elapsed(NOW + DAY_MS - 1).unwrap());
        let c = ledger.credit(500, CreditSource::Click, NOW + DAY_MS).unwrap();
        assert_eq!(c.granted, 500);
        assert_eq!(ledger.last_daily_reset(), NOW + DAY_MS);
        assert_eq!(ledger.daily_earned(), 500);
        assert_eq!(ledger.coins(), 10_500);
    }

    #[test]
    fn debit_never_goes_negative() {
        let (store, config) = setup();
        let ledger = Ledger::new(&store, &config);
        ledger.set_coins(100).unwrap();
        assert_eq!(
            ledger.debit(101),
            Err(GameError::InsufficientFunds {
                required: 101,
                available: 100
            })
        );
        assert_eq!(ledger.coins(), 100);
        assert_eq!(ledger.debit(100).unwrap(), 0);
    }

    #[test]
    fn spending_does_not_restore_headroom() {
        let (store, config) = setup();
        let ledger = Ledger::new(&store, &config);
        ledger.credit(9_000, CreditSource::Click, NOW).unwrap();
        ledger.debit(9_000).unwrap();
        let c = ledger.credit(5_000, CreditSource::Click, NOW).unwrap();
        assert_eq!(c.granted, 1_000);
    }

    #[test]
    fn gems_and_balances_are_independent() {
        let (store, config) = setup();
        let ledger = Ledger::new(&store, &config);
        ledger.add_gems(10).unwrap();
        ledger.set_balance(GUEST_ACCOUNT, 500).unwrap();
        ledger.add_balance("other", 20).unwrap();
        assert_eq!(ledger.gems(), 10);
        assert_eq!(ledger.balance(GUEST_ACCOUNT), 500);
        assert_eq!(ledger.balance("other"), 20);
        assert!(ledger.debit_gems(11).is_err());
        assert_eq!(ledger.debit_balance("other", 20).unwrap(), 0);
    }

    #[test]
    fn floor_amount_handles_fractions_and_garbage() {
        assert_eq!(floor_amount(12.9), 12);
        assert_eq!(floor_amount(-3.0), 0);
        assert_eq!(floor_amount(f64::NAN), 0);
        assert_eq!(floor_amount(0.999), 0);
    }
}
