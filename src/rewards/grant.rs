//! Applying a resolved reward to persisted state.

use rand::Rng;

use super::{Outcome, Resolved};
use crate::collection::Collection;
use crate::config::GameConfig;
use crate::error::GameResult;
use crate::inventory::{Inventory, InventoryItem, ItemKind, NewItem};
use crate::ledger::{Credit, CreditSource, Ledger};
use crate::storage::{Storage, Store};
use crate::time::Millis;

/// What applying a reward actually did.
#[derive(Clone, Debug, PartialEq)]
pub struct Grant {
    pub resolved: Resolved,
    /// Set for coin outcomes: how much survived the daily cap.
    pub credit: Option<Credit>,
    /// Set when the reward was stored as an inventory item.
    pub item: Option<InventoryItem>,
}

/// Apply `resolved` once. It is consumed, so the same resolution cannot be
/// applied twice.
pub fn apply<S: Storage, R: Rng + ?Sized>(
    store: &Store<S>,
    config: &GameConfig,
    resolved: Resolved,
    source: CreditSource,
    now: Millis,
    rng: &mut R,
) -> GameResult<Grant> {
    let ledger = Ledger::new(store, config);
    let collection = Collection::new(store);
    let mut credit = None;
    let mut item = None;

    match &resolved.outcome {
        Outcome::Coins { amount } => {
            credit = Some(ledger.credit(*amount, source, now)?);
        }
        Outcome::Compensation { amount } => {
            credit = Some(ledger.credit(*amount, CreditSource::Compensation, now)?);
        }
        Outcome::Gems { amount } => {
            ledger.add_gems(*amount)?;
        }
        Outcome::Multiplier { amount } => {
            let new = NewItem {
                kind: ItemKind::Upgrade,
                name: "multiplier".to_string(),
                rarity: resolved.rarity,
                amount: Some(*amount),
            };
            item = Some(Inventory::new(store).add(new, now, rng)?);
        }
        Outcome::Upgrade { name } => {
            let new = NewItem {
                kind: ItemKind::Card,
                name: name.clone(),
                rarity: resolved.rarity,
                amount: Some(1),
            };
            item = Some(Inventory::new(store).add(new, now, rng)?);
        }
        Outcome::Case { table } => {
            let new = NewItem::case(table, resolved.rarity);
            item = Some(Inventory::new(store).add(new, now, rng)?);
        }
        Outcome::Skin { id } => {
            collection.grant_skin(id)?;
        }
        Outcome::Ability { id } => {
            collection.grant_ability(id)?;
        }
        Outcome::FlowPlus => collection.set_flow_plus()?,
        Outcome::Verification => collection.set_verified()?,
    }

    tracing::info!(
        label = %resolved.label,
        rarity = resolved.rarity.name(),
        outcome = ?resolved.outcome,
        "reward granted"
    );

    Ok(Grant {
        resolved,
        credit,
        item,
    })
}
