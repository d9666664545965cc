//! Balance transfers between wallets and the transaction log.

use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::time::Millis;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub from_user_id: String,
    pub to_user_id: String,
    pub from_wallet_id: String,
    pub to_wallet_id: String,
    pub amount: u64,
    pub created_at: Millis,
    /// Returned to the sender; zero below the threshold.
    pub cashback: u64,
}

/// Largest single transfer allowed from `balance`.
pub fn transfer_cap(balance: u64, config: &GameConfig) -> u64 {
    balance.saturating_mul(config.transfer_cap_percent) / 100
}

/// Cashback for a transfer of `amount`.
pub fn cashback(amount: u64, config: &GameConfig) -> u64 {
    if amount > config.cashback_threshold {
        amount.saturating_mul(config.cashback_percent) / 100
    } else {
        0
    }
}

/// Newest first. Ties keep the later-appended entry first.
pub fn newest_first(mut txs: Vec<Transaction>) -> Vec<Transaction> {
    txs.reverse();
    txs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    txs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cap_is_ten_percent_floored() {
        let c = GameConfig::default();
        assert_eq!(transfer_cap(1_000, &c), 100);
        assert_eq!(transfer_cap(900, &c), 90);
        assert_eq!(transfer_cap(9, &c), 0);
        assert_eq!(transfer_cap(1_999, &c), 199);
    }

    #[test]
    fn cashback_strictly_above_threshold() {
        let c = GameConfig::default();
        assert_eq!(cashback(10_000, &c), 0);
        assert_eq!(cashback(10_001, &c), 1_000);
        assert_eq!(cashback(25_555, &c), 2_555);
    }
}
