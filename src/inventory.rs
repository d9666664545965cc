//! The guest account's item list.
//!
//! Items are discrete entries with a stable id. Consuming an item always
//! removes it from storage *before* anything is granted, so an interrupted
//! open can lose a reward but never duplicate one.

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{GameError, GameResult};
use crate::ids;
use crate::ledger::{Ledger, GUEST_ACCOUNT};
use crate::rewards::Rarity;
use crate::storage::{keys, Storage, Store};
use crate::time::Millis;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Case,
    Skin,
    Coins,
    Ability,
    Upgrade,
    Card,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    /// Display name. For cases, the table it opens into.
    pub name: String,
    pub rarity: Rarity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<u64>,
    pub obtained_at: Millis,
}

/// An item before it is given an id and timestamp.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewItem {
    pub kind: ItemKind,
    pub name: String,
    pub rarity: Rarity,
    pub amount: Option<u64>,
}

impl NewItem {
    pub fn case(table: &str, rarity: Rarity) -> Self {
        Self {
            kind: ItemKind::Case,
            name: table.to_string(),
            rarity,
            amount: None,
        }
    }

    pub fn coins(amount: u64) -> Self {
        Self {
            kind: ItemKind::Coins,
            name: "coins".to_string(),
            rarity: Rarity::Common,
            amount: Some(amount),
        }
    }
}

pub struct Inventory<'a, S> {
    store: &'a Store<S>,
}

impl<'a, S: Storage> Inventory<'a, S> {
    pub fn new(store: &'a Store<S>) -> Self {
        Self { store }
    }

    fn all_accounts(&self) -> BTreeMap<String, Vec<InventoryItem>> {
        self.store.read_or_default(keys::INVENTORY)
    }

    pub fn items(&self) -> Vec<InventoryItem> {
        self.all_accounts()
            .remove(GUEST_ACCOUNT)
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }

    pub fn get(&self, id: &str) -> Option<InventoryItem> {
        self.items().into_iter().find(|i| i.id == id)
    }

    /// Replace the whole item list.
    pub fn replace(&self, items: Vec<InventoryItem>) -> GameResult<()> {
        let mut all = self.all_accounts();
        all.insert(GUEST_ACCOUNT.to_string(), items);
        self.store.write(keys::INVENTORY, &all)?;
        Ok(())
    }

    pub fn add<R: Rng + ?Sized>(
        &self,
        item: NewItem,
        now: Millis,
        rng: &mut R,
    ) -> GameResult<InventoryItem> {
        let item = InventoryItem {
            id: ids::item_id(rng),
            kind: item.kind,
            name: item.name,
            rarity: item.rarity,
            amount: item.amount,
            obtained_at: now,
        };
        let mut items = self.items();
        items.push(item.clone());
        self.replace(items)?;
        tracing::debug!(id = %item.id, kind = ?item.kind, name = %item.name, "item added");
        Ok(item)
    }

    /// Remove an item by id. Removing an unknown id is a no-op.
    pub fn remove(&self, id: &str) -> GameResult<()> {
        let mut items = self.items();
        let before = items.len();
        items.retain(|i| i.id != id);
        if items.len() != before {
            self.replace(items)?;
        }
        Ok(())
    }

    /// Remove an item and hand it back.
    pub fn take(&self, id: &str) -> GameResult<InventoryItem> {
        let mut items = self.items();
        let pos = items
            .iter()
            .position(|i| i.id == id)
            .ok_or_else(|| GameError::ItemNotFound(id.to_string()))?;
        let item = items.remove(pos);
        self.replace(items)?;
        Ok(item)
    }

    /// Move a coin parcel's amount to the guest bank balance, then drop the
    /// parcel. Returns the amount moved.
    pub fn redeem_coins(&self, id: &str, ledger: &Ledger<'_, S>) -> GameResult<u64> {
        let item = self
            .get(id)
            .ok_or_else(|| GameError::ItemNotFound(id.to_string()))?;
        if item.kind != ItemKind::Coins {
            return Err(GameError::NotACoinParcel(id.to_string()));
        }
        let amount = item.amount.unwrap_or(0);
        ledger.add_balance(GUEST_ACCOUNT, amount)?;
        self.remove(id)?;
        tracing::info!(id, amount, "coin parcel redeemed");
        Ok(amount)
    }
}
