//! Local mock bank: accounts, wallets, word-phrase login and transfers.
//!
//! Everything lives on this device. A recipient can only be paid if their
//! wallet was created here, since the wallet index is local.

pub mod session;
pub mod transfer;
pub mod wallet;

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::error::{GameError, GameResult};
use crate::ids;
use crate::ledger::{floor_amount, Ledger, GUEST_ACCOUNT};
use crate::storage::{keys, Storage, Store};
use crate::time::Millis;

pub use session::Session;
pub use transfer::{cashback, transfer_cap, Transaction};
pub use wallet::{Wallet, WalletSkin};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub created_at: Millis,
}

pub struct Bank<'a, S> {
    store: &'a Store<S>,
    config: &'a GameConfig,
}

impl<'a, S: Storage> Bank<'a, S> {
    pub fn new(store: &'a Store<S>, config: &'a GameConfig) -> Self {
        Self { store, config }
    }

    fn ledger(&self) -> Ledger<'a, S> {
        Ledger::new(self.store, self.config)
    }

    // ── Accounts ──────────────────────────────────────────────

    /// Every local account. The guest account is always first.
    pub fn accounts(&self) -> Vec<Account> {
        let mut accounts: Vec<Account> = self.store.read_or_default(keys::ACCOUNTS);
        if !accounts.iter().any(|a| a.id == GUEST_ACCOUNT) {
            accounts.insert(
                0,
                Account {
                    id: GUEST_ACCOUNT.to_string(),
                    created_at: 0,
                },
            );
        }
        accounts
    }

    pub fn create_account<R: Rng + ?Sized>(&self, now: Millis, rng: &mut R) -> GameResult<Account> {
        let account = Account {
            id: ids::item_id(rng),
            created_at: now,
        };
        let mut stored: Vec<Account> = self.store.read_or_default(keys::ACCOUNTS);
        stored.push(account.clone());
        self.store.write(keys::ACCOUNTS, &stored)?;
        self.ledger().add_balance(&account.id, 0)?;
        tracing::info!(account = %account.id, "account created");
        Ok(account)
    }

    pub fn balance(&self, account: &str) -> u64 {
        self.ledger().balance(account)
    }

    // ── Wallets ───────────────────────────────────────────────

    fn all_wallets(&self) -> Vec<Wallet> {
        self.store.read_or_default(keys::WALLETS)
    }

    fn wallet_index(&self) -> BTreeMap<String, String> {
        self.store.read_or_default(keys::WALLET_INDEX)
    }

    pub fn wallets(&self, account: &str) -> Vec<Wallet> {
        self.all_wallets()
            .into_iter()
            .filter(|w| w.owner == account)
            .collect()
    }

    pub fn wallet(&self, wallet_id: &str) -> Option<Wallet> {
        self.all_wallets().into_iter().find(|w| w.id == wallet_id)
    }

    /// Account owning `wallet_id`, if the wallet is known on this device.
    pub fn find_account_by_wallet(&self, wallet_id: &str) -> Option<String> {
        self.wallet_index().remove(wallet_id)
    }

    /// Create a wallet for `account` and make it the active one.
    pub fn create_wallet<R: Rng + ?Sized>(
        &self,
        account: &str,
        now: Millis,
        rng: &mut R,
    ) -> GameResult<Wallet> {
        let wallet = Wallet::generate(account, now, rng);
        let mut wallets = self.all_wallets();
        wallets.push(wallet.clone());
        self.store.write(keys::WALLETS, &wallets)?;

        let mut index = self.wallet_index();
        index.insert(wallet.id.clone(), account.to_string());
        self.store.write(keys::WALLET_INDEX, &index)?;

        self.store.write(keys::ACTIVE_WALLET, &wallet.id)?;
        tracing::info!(account, wallet = %wallet.id, "wallet created");
        Ok(wallet)
    }

    /// The account's first wallet, created on demand.
    pub fn ensure_wallet<R: Rng + ?Sized>(
        &self,
        account: &str,
        now: Millis,
        rng: &mut R,
    ) -> GameResult<Wallet> {
        match self.wallets(account).into_iter().next() {
            Some(w) => Ok(w),
            None => self.create_wallet(account, now, rng),
        }
    }

    /// The active wallet. Falls back to the first wallet when the pointer
    /// is missing or stale.
    pub fn active_wallet(&self) -> Option<Wallet> {
        let wallets = self.all_wallets();
        let active: Option<String> = self.store.read(keys::ACTIVE_WALLET, None);
        active
            .and_then(|id| wallets.iter().find(|w| w.id == id).cloned())
            .or_else(|| wallets.into_iter().next())
    }

    pub fn set_active_wallet(&self, wallet_id: &str) -> GameResult<()> {
        if self.wallet(wallet_id).is_none() {
            return Err(GameError::UnknownWallet(wallet_id.to_string()));
        }
        self.store.write(keys::ACTIVE_WALLET, wallet_id)?;
        Ok(())
    }

    pub fn change_skin(&self, wallet_id: &str, skin: WalletSkin) -> GameResult<()> {
        let mut wallets = self.all_wallets();
        let wallet = wallets
            .iter_mut()
            .find(|w| w.id == wallet_id)
            .ok_or_else(|| GameError::UnknownWallet(wallet_id.to_string()))?;
        wallet.skin = skin;
        self.store.write(keys::WALLETS, &wallets)?;
        Ok(())
    }

    // ── Session ───────────────────────────────────────────────

    /// Log in with a wallet's secret words (any order). Starts a session
    /// for the owning account and activates the wallet.
    pub fn login_with_words<W: AsRef<str>>(&self, phrase: &[W], now: Millis) -> GameResult<Session> {
        let wallet = self
            .all_wallets()
            .into_iter()
            .find(|w| w.matches_phrase(phrase))
            .ok_or(GameError::InvalidPhrase)?;
        self.store.write(keys::ACTIVE_WALLET, &wallet.id)?;
        session::start(self.store, &wallet.owner, now, self.config.session_ttl_ms)
    }

    pub fn current_account(&self, now: Millis) -> Option<String> {
        session::current(self.store, now)
    }

    pub fn logout(&self) {
        session::end(self.store);
        tracing::info!("logged out");
    }

    // ── Transfers ─────────────────────────────────────────────

    pub fn transactions(&self) -> Vec<Transaction> {
        self.store.read_or_default(keys::TRANSACTIONS)
    }

    /// Transactions `account` sent or received, newest first.
    pub fn transactions_for(&self, account: &str) -> Vec<Transaction> {
        let involved = self
            .transactions()
            .into_iter()
            .filter(|t| t.from_user_id == account || t.to_user_id == account)
            .collect();
        transfer::newest_first(involved)
    }

    fn sender_wallet_id(&self, sender: &str) -> String {
        self.active_wallet()
            .filter(|w| w.owner == sender)
            .or_else(|| self.wallets(sender).into_iter().next())
            .map(|w| w.id)
            .unwrap_or_default()
    }

    /// Move `amount` (floored) from `sender` to the owner of
    /// `recipient_wallet`.
    ///
    /// Every check runs before any balance changes: amount of at least 1,
    /// the per-transfer cap (recomputed from the current balance), funds,
    /// then recipient resolution. Both sides land together or not at all.
    pub fn transfer<R: Rng + ?Sized>(
        &self,
        sender: &str,
        recipient_wallet: &str,
        amount: f64,
        now: Millis,
        rng: &mut R,
    ) -> GameResult<Transaction> {
        let amount = floor_amount(amount);
        if amount < 1 {
            return Err(GameError::InvalidTransferAmount);
        }

        let ledger = self.ledger();
        let balance = ledger.balance(sender);
        let cap = transfer_cap(balance, self.config);
        if amount > cap {
            return Err(GameError::TransferCapExceeded { amount, cap });
        }
        if amount > balance {
            return Err(GameError::InsufficientFunds {
                required: amount,
                available: balance,
            });
        }
        let recipient = self
            .find_account_by_wallet(recipient_wallet)
            .ok_or_else(|| GameError::RecipientUnresolvable(recipient_wallet.to_string()))?;

        let cashback = cashback(amount, self.config);
        let mut balances = ledger.balances();
        let sender_entry = balances.entry(sender.to_string()).or_insert(0);
        *sender_entry = sender_entry.saturating_sub(amount);
        let recipient_entry = balances.entry(recipient.clone()).or_insert(0);
        *recipient_entry = recipient_entry.saturating_add(amount);
        let sender_entry = balances.entry(sender.to_string()).or_insert(0);
        *sender_entry = sender_entry.saturating_add(cashback);

        let tx = Transaction {
            id: ids::item_id(rng),
            from_user_id: sender.to_string(),
            to_user_id: recipient,
            from_wallet_id: self.sender_wallet_id(sender),
            to_wallet_id: recipient_wallet.to_string(),
            amount,
            created_at: now,
            cashback,
        };
        let mut txs = self.transactions();
        txs.push(tx.clone());

        // One balances write; a failed log append undoes it.
        self.store
            .atomically(&[keys::BALANCES, keys::TRANSACTIONS], |store| {
                store.write(keys::BALANCES, &balances)?;
                store.write(keys::TRANSACTIONS, &txs)
            })?;
        tracing::info!(
            from = %tx.from_user_id,
            to = %tx.to_user_id,
            amount,
            cashback,
            "transfer completed"
        );
        Ok(tx)
    }
}
