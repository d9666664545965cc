//! 初期インベントリの付与。
//!
//! インベントリが空のときだけ付与する。空かどうかが唯一の冪等キーなので、
//! 全アイテムを使い切った後に呼ばれると再付与される。

use rand::Rng;

use crate::config::GameConfig;
use crate::error::GameResult;
use crate::inventory::{Inventory, NewItem};
use crate::ledger::{Ledger, GUEST_ACCOUNT};
use crate::rewards::tables::STARTER_PACK_ID;
use crate::rewards::Rarity;
use crate::storage::{Storage, Store};
use crate::time::Millis;

/// Returns `true` when the starter items were granted.
pub fn grant_starter_items_if_empty<S: Storage, R: Rng + ?Sized>(
    store: &Store<S>,
    config: &GameConfig,
    now: Millis,
    rng: &mut R,
) -> GameResult<bool> {
    let inventory = Inventory::new(store);
    if !inventory.is_empty() {
        return Ok(false);
    }

    for _ in 0..config.starter_cases {
        inventory.add(NewItem::case(STARTER_PACK_ID, Rarity::Common), now, rng)?;
    }
    inventory.add(NewItem::coins(config.starter_coin_parcel), now, rng)?;

    let ledger = Ledger::new(store, config);
    ledger.set_gems(config.starter_gems)?;
    ledger.set_balance(GUEST_ACCOUNT, config.starter_balance)?;

    tracing::info!(
        cases = config.starter_cases,
        parcel = config.starter_coin_parcel,
        "starter items granted"
    );
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::ItemKind;
    use crate::storage::MemoryStorage;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn grants_once_while_inventory_holds_items() {
        let store = Store::new(MemoryStorage::new());
        let config = GameConfig::default();
        let mut rng = StdRng::seed_from_u64(1);

        assert!(grant_starter_items_if_empty(&store, &config, 10, &mut rng).unwrap());
        assert!(!grant_starter_items_if_empty(&store, &config, 20, &mut rng).unwrap());

        let items = Inventory::new(&store).items();
        assert_eq!(items.len(), 3);
        let cases = items.iter().filter(|i| i.kind == ItemKind::Case).count();
        assert_eq!(cases, 2);
        let parcel = items.iter().find(|i| i.kind == ItemKind::Coins).unwrap();
        assert_eq!(parcel.amount, Some(1_000));

        let ledger = Ledger::new(&store, &config);
        assert_eq!(ledger.gems(), 10);
        assert_eq!(ledger.balance(GUEST_ACCOUNT), 500);
    }

    #[test]
    fn empty_inventory_triggers_regrant() {
        let store = Store::new(MemoryStorage::new());
        let config = GameConfig::default();
        let mut rng = StdRng::seed_from_u64(2);

        grant_starter_items_if_empty(&store, &config, 10, &mut rng).unwrap();
        let inventory = Inventory::new(&store);
        for item in inventory.items() {
            inventory.remove(&item.id).unwrap();
        }
        assert!(grant_starter_items_if_empty(&store, &config, 30, &mut rng).unwrap());
        assert_eq!(inventory.items().len(), 3);
    }
}
