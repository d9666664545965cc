//! The engine facade.
//!
//! [`Engine`] owns the store, the clock, the random source and the periodic
//! scheduler. Hosts call the operation methods in response to user input and
//! call [`Engine::pump`] from their timer callback; `pump` runs whatever
//! periodic work is due and reports what happened.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::abilities::{Abilities, Activation};
use crate::bank::{Bank, Session, Transaction, Wallet, WalletSkin};
use crate::cards::Cards;
use crate::cases::Cases;
use crate::clicker::{ClickOutcome, ClickPacer, Clicker};
use crate::collection::Collection;
use crate::config::GameConfig;
use crate::error::GameResult;
use crate::inventory::Inventory;
use crate::ledger::{Credit, CreditSource, Ledger};
use crate::rewards::{Grant, Resolved};
use crate::save::{self, SaveSnapshot};
use crate::scheduler::Scheduler;
use crate::storage::{Storage, Store};
use crate::time::{Clock, Millis, MINUTE_MS};

/// Periodic work driven by [`Engine::pump`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Job {
    /// Close expired ability windows and clear elapsed cooldowns.
    AbilityTick,
    DailyReset,
    /// Play-time counter, coin rain and achievement checks.
    PassiveIncome,
    GoldenClick,
    AutoBurst,
    Autosave,
}

/// Something the host may want to show.
#[derive(Clone, Debug, PartialEq)]
pub enum Notification {
    AbilityExpired(String),
    AbilityReady(String),
    DailyReset,
    GoldenClickAvailable,
    CoinRain(Credit),
    AutoBurst(Credit),
    AchievementUnlocked { id: &'static str, credit: Credit },
    Autosaved { at: Millis },
}

pub struct Engine<S, C> {
    store: Store<S>,
    clock: C,
    config: GameConfig,
    rng: StdRng,
    scheduler: Scheduler<Job>,
    pacer: ClickPacer,
}

impl<S: Storage, C: Clock> Engine<S, C> {
    /// Build an engine with an entropy-seeded random source and hand out the
    /// starter items if the inventory is empty.
    pub fn new(backend: S, clock: C, config: GameConfig) -> GameResult<Self> {
        Self::with_rng(backend, clock, config, StdRng::from_entropy())
    }

    /// Same as [`Engine::new`] with a caller-supplied random source.
    pub fn with_rng(backend: S, clock: C, config: GameConfig, rng: StdRng) -> GameResult<Self> {
        let mut scheduler = Scheduler::new();
        scheduler.register(Job::AbilityTick, config.tick_ms);
        scheduler.register(Job::DailyReset, MINUTE_MS);
        scheduler.register(Job::PassiveIncome, config.tick_ms);
        scheduler.register(Job::GoldenClick, config.tick_ms);
        scheduler.register(Job::AutoBurst, config.burst_interval_ms);

        let mut engine = Self {
            store: Store::new(backend),
            clock,
            config,
            rng,
            scheduler,
            pacer: ClickPacer::new(),
        };
        let now = engine.now();
        engine.grant_starter_items_if_empty()?;
        engine.scheduler.advance(now);
        Ledger::new(&engine.store, &engine.config).reset_daily_if_elapsed(now)?;
        tracing::info!(now, "engine started");
        Ok(engine)
    }

    pub fn now(&self) -> Millis {
        self.clock.now_ms()
    }

    pub fn store(&self) -> &Store<S> {
        &self.store
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    // ── Views ─────────────────────────────────────────────────

    pub fn ledger(&self) -> Ledger<'_, S> {
        Ledger::new(&self.store, &self.config)
    }

    pub fn clicker(&self) -> Clicker<'_, S> {
        Clicker::new(&self.store, &self.config)
    }

    pub fn abilities(&self) -> Abilities<'_, S> {
        Abilities::new(&self.store, &self.config)
    }

    pub fn collection(&self) -> Collection<'_, S> {
        Collection::new(&self.store)
    }

    pub fn inventory(&self) -> Inventory<'_, S> {
        Inventory::new(&self.store)
    }

    pub fn cases(&self) -> Cases<'_, S> {
        Cases::new(&self.store, &self.config)
    }

    pub fn cards(&self) -> Cards<'_, S> {
        Cards::new(&self.store, &self.config)
    }

    pub fn bank(&self) -> Bank<'_, S> {
        Bank::new(&self.store, &self.config)
    }

    // ── Periodic work ─────────────────────────────────────────

    /// Run every job that has come due since the last call.
    ///
    /// A failing job is logged and skipped; the others still run.
    pub fn pump(&mut self) -> Vec<Notification> {
        let now = self.now();
        let mut out = Vec::new();
        for job in self.scheduler.advance(now) {
            match self.run_job(job, now) {
                Ok(notes) => out.extend(notes),
                Err(e) => tracing::warn!(?job, error = %e, "scheduled job failed"),
            }
        }
        out
    }

    fn run_job(&mut self, job: Job, now: Millis) -> GameResult<Vec<Notification>> {
        let mut out = Vec::new();
        match job {
            Job::AbilityTick => {
                let report = self.abilities().tick(now)?;
                out.extend(report.expired.into_iter().map(Notification::AbilityExpired));
                out.extend(report.ready.into_iter().map(Notification::AbilityReady));
            }
            Job::DailyReset => {
                if self.ledger().reset_daily_if_elapsed(now)? {
                    out.push(Notification::DailyReset);
                }
            }
            Job::PassiveIncome => {
                let clicker = self.clicker();
                clicker.tick_play_time()?;
                if let Some(credit) = clicker.coin_rain(now)? {
                    out.push(Notification::CoinRain(credit));
                }
                out.extend(
                    clicker
                        .settle(now)?
                        .into_iter()
                        .map(|u| Notification::AchievementUnlocked {
                            id: u.id,
                            credit: u.credit,
                        }),
                );
            }
            Job::GoldenClick => {
                if self.clicker().refresh_golden(now)? {
                    out.push(Notification::GoldenClickAvailable);
                }
            }
            Job::AutoBurst => {
                let clicker = Clicker::new(&self.store, &self.config);
                if let Some(credit) = clicker.burst_click(now, &mut self.rng)? {
                    out.push(Notification::AutoBurst(credit));
                }
            }
            Job::Autosave => {
                save::persist(&self.store, now)?;
                out.push(Notification::Autosaved { at: now });
            }
        }
        Ok(out)
    }

    /// Start periodic autosave. Enabling twice keeps a single timer.
    pub fn enable_autosave(&mut self) -> bool {
        let added = self
            .scheduler
            .register(Job::Autosave, self.config.autosave_interval_ms);
        if added {
            tracing::info!(interval_ms = self.config.autosave_interval_ms, "autosave enabled");
        }
        added
    }

    pub fn disable_autosave(&mut self) -> bool {
        self.scheduler.cancel(Job::Autosave)
    }

    pub fn autosave_enabled(&self) -> bool {
        self.scheduler.is_registered(Job::Autosave)
    }

    // ── Clicker ───────────────────────────────────────────────

    pub fn click(&mut self) -> GameResult<ClickOutcome> {
        let now = self.now();
        Clicker::new(&self.store, &self.config).click(now, &mut self.pacer, &mut self.rng)
    }

    /// Credit coins through the daily cap.
    pub fn credit_coins(&self, amount: u64, source: CreditSource) -> GameResult<Credit> {
        self.ledger().credit(amount, source, self.now())
    }

    pub fn buy_click_power(&self) -> GameResult<u64> {
        self.clicker().buy_click_power(self.now())
    }

    pub fn buy_critical(&self) -> GameResult<u64> {
        self.clicker().buy_critical(self.now())
    }

    pub fn buy_skin(&self, id: &str) -> GameResult<()> {
        self.clicker().buy_skin(id)
    }

    pub fn select_skin(&self, id: &str) -> GameResult<()> {
        self.clicker().select_skin(id)
    }

    pub fn buy_ability(&self, id: &str) -> GameResult<()> {
        self.abilities().buy(id)
    }

    pub fn activate_ability(&self, id: &str) -> GameResult<Activation> {
        self.abilities().activate(id, self.now())
    }

    // ── Cases, cards, inventory ───────────────────────────────

    pub fn open_case(&mut self, case_id: &str) -> GameResult<Grant> {
        let now = self.now();
        Cases::new(&self.store, &self.config).open(case_id, now, &mut self.rng)
    }

    /// Resolve `n` openings without touching state.
    pub fn simulate_case(&mut self, case_id: &str, n: usize) -> GameResult<Vec<Resolved>> {
        Cases::new(&self.store, &self.config).simulate(case_id, n, &mut self.rng)
    }

    pub fn open_case_item(&mut self, item_id: &str) -> GameResult<Grant> {
        let now = self.now();
        Cases::new(&self.store, &self.config).open_item(item_id, now, &mut self.rng)
    }

    pub fn redeem_coins(&self, item_id: &str) -> GameResult<u64> {
        self.inventory().redeem_coins(item_id, &self.ledger())
    }

    pub fn draw_card(&mut self) -> GameResult<Grant> {
        let now = self.now();
        Cards::new(&self.store, &self.config).draw(now, &mut self.rng)
    }

    pub fn grant_starter_items_if_empty(&mut self) -> GameResult<bool> {
        let now = self.now();
        save::grant_starter_items_if_empty(&self.store, &self.config, now, &mut self.rng)
    }

    // ── Bank ──────────────────────────────────────────────────

    pub fn create_wallet(&mut self, account: &str) -> GameResult<Wallet> {
        let now = self.now();
        Bank::new(&self.store, &self.config).create_wallet(account, now, &mut self.rng)
    }

    pub fn change_wallet_skin(&self, wallet_id: &str, skin: WalletSkin) -> GameResult<()> {
        self.bank().change_skin(wallet_id, skin)
    }

    pub fn login_with_words<W: AsRef<str>>(&self, phrase: &[W]) -> GameResult<Session> {
        self.bank().login_with_words(phrase, self.now())
    }

    pub fn current_account(&self) -> Option<String> {
        self.bank().current_account(self.now())
    }

    pub fn logout(&self) {
        self.bank().logout();
    }

    pub fn transfer(
        &mut self,
        sender: &str,
        recipient_wallet: &str,
        amount: f64,
    ) -> GameResult<Transaction> {
        let now = self.now();
        Bank::new(&self.store, &self.config).transfer(
            sender,
            recipient_wallet,
            amount,
            now,
            &mut self.rng,
        )
    }

    // ── Save data ─────────────────────────────────────────────

    pub fn snapshot(&self) -> SaveSnapshot {
        save::snapshot(&self.store, self.now())
    }

    pub fn restore(&self, data: &SaveSnapshot) -> GameResult<()> {
        save::restore(&self.store, data)
    }

    pub fn export_text(&self) -> GameResult<String> {
        save::export_text(&self.store, self.now())
    }

    pub fn import_text(&self, text: &str) -> GameResult<SaveSnapshot> {
        save::import_text(&self.store, text)
    }

    pub fn reset_all(&mut self) -> GameResult<()> {
        let now = self.now();
        save::reset_all(&self.store, &self.config, now, &mut self.rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abilities::DOUBLE_COINS;
    use crate::error::GameError;
    use crate::ledger::GUEST_ACCOUNT;
    use crate::storage::MemoryStorage;
    use crate::time::{ManualClock, DAY_MS, SECOND_MS};

    const T0: Millis = 1_700_000_000_000;

    fn engine(clock: &ManualClock) -> Engine<MemoryStorage, &ManualClock> {
        Engine::with_rng(
            MemoryStorage::new(),
            clock,
            GameConfig::default(),
            StdRng::seed_from_u64(11),
        )
        .unwrap()
    }

    #[test]
    fn boot_grants_starter_items_once() {
        let clock = ManualClock::new(T0);
        let mut e = engine(&clock);
        assert_eq!(e.inventory().items().len(), 3);
        assert_eq!(e.ledger().gems(), 10);
        assert!(!e.grant_starter_items_if_empty().unwrap());
        assert_eq!(e.inventory().items().len(), 3);
    }

    #[test]
    fn autosave_enable_is_idempotent() {
        let clock = ManualClock::new(T0);
        let mut e = engine(&clock);
        assert!(e.enable_autosave());
        assert!(!e.enable_autosave());

        clock.advance(30 * SECOND_MS);
        let saves = e
            .pump()
            .into_iter()
            .filter(|n| matches!(n, Notification::Autosaved { .. }))
            .count();
        assert_eq!(saves, 1);

        assert!(e.disable_autosave());
        assert!(!e.autosave_enabled());
        clock.advance(30 * SECOND_MS);
        assert!(!e
            .pump()
            .iter()
            .any(|n| matches!(n, Notification::Autosaved { .. })));
    }

    #[test]
    fn pump_reports_ability_expiry_then_readiness() {
        let clock = ManualClock::new(T0);
        let mut e = engine(&clock);
        e.ledger().set_coins(10_000).unwrap();
        e.buy_ability(DOUBLE_COINS).unwrap();
        e.activate_ability(DOUBLE_COINS).unwrap();

        clock.advance(60 * SECOND_MS);
        let notes = e.pump();
        assert!(notes.contains(&Notification::AbilityExpired(DOUBLE_COINS.to_string())));
        assert!(matches!(
            e.activate_ability(DOUBLE_COINS),
            Err(GameError::OnCooldown { .. })
        ));

        clock.advance(4 * 60 * SECOND_MS);
        let notes = e.pump();
        assert!(notes.contains(&Notification::AbilityReady(DOUBLE_COINS.to_string())));
        assert!(e.activate_ability(DOUBLE_COINS).is_ok());
    }

    #[test]
    fn daily_reset_fires_after_window() {
        let clock = ManualClock::new(T0);
        let mut e = engine(&clock);
        let first = e.credit_coins(7_000, CreditSource::Click).unwrap();
        assert_eq!(first.granted, 7_000);
        let second = e.credit_coins(5_000, CreditSource::Click).unwrap();
        assert_eq!(second.granted, 3_000);

        clock.advance(DAY_MS);
        assert!(e.pump().contains(&Notification::DailyReset));
        assert_eq!(e.ledger().daily_earned(), 0);
    }

    #[test]
    fn golden_click_spawns_on_interval() {
        let clock = ManualClock::new(T0);
        let mut e = engine(&clock);
        clock.advance(SECOND_MS);
        e.pump();
        assert!(!e.clicker().golden_active(clock.now_ms()));

        clock.advance(10 * MINUTE_MS);
        assert!(e.pump().contains(&Notification::GoldenClickAvailable));
        assert!(e.clicker().golden_active(clock.now_ms()));
    }

    #[test]
    fn transfer_through_facade() {
        let clock = ManualClock::new(T0);
        let mut e = engine(&clock);
        let account = e.bank().create_account(T0, &mut StdRng::seed_from_u64(2)).unwrap();
        let wallet = e.create_wallet(&account.id).unwrap();
        let tx = e.transfer(GUEST_ACCOUNT, &wallet.id, 50.0).unwrap();
        assert_eq!(tx.amount, 50);
        assert_eq!(e.ledger().balance(GUEST_ACCOUNT), 450);
        assert_eq!(e.ledger().balance(&account.id), 50);
    }
}
