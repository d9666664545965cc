//! The free hourly card draw.

use rand::Rng;

use crate::collection::Collection;
use crate::config::GameConfig;
use crate::error::{GameError, GameResult};
use crate::ledger::CreditSource;
use crate::rewards::{self, tables, Grant};
use crate::storage::{keys, Storage, Store};
use crate::time::Millis;

pub struct Cards<'a, S> {
    store: &'a Store<S>,
    config: &'a GameConfig,
}

impl<'a, S: Storage> Cards<'a, S> {
    pub fn new(store: &'a Store<S>, config: &'a GameConfig) -> Self {
        Self { store, config }
    }

    pub fn last_draw(&self) -> Millis {
        self.store.read(keys::LAST_CARD_TIME, 0)
    }

    /// Milliseconds until the next draw, zero when one is available.
    pub fn remaining(&self, now: Millis) -> Millis {
        let next = self.last_draw().saturating_add(self.config.card_interval_ms);
        next.saturating_sub(now)
    }

    pub fn can_draw(&self, now: Millis) -> bool {
        self.remaining(now) == 0
    }

    /// Draw a card and apply its reward.
    pub fn draw<R: Rng + ?Sized>(&self, now: Millis, rng: &mut R) -> GameResult<Grant> {
        let remaining = self.remaining(now);
        if remaining > 0 {
            return Err(GameError::CardNotReady {
                remaining_ms: remaining,
            });
        }
        let entry = rewards::roll(tables::CARDS, rng)
            .ok_or_else(|| GameError::InvalidFormat("empty card table".to_string()))?;
        let collection = Collection::new(self.store);
        let resolved = rewards::materialize(
            entry,
            &collection.owned_skins(),
            &collection.owned_abilities(),
            rng,
        );
        self.store.write(keys::LAST_CARD_TIME, &now)?;
        tracing::info!(card = entry.label, "card drawn");
        rewards::apply(self.store, self.config, resolved, CreditSource::Card, now, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use crate::time::HOUR_MS;
    use rand::{rngs::StdRng, SeedableRng};

    const T0: Millis = 1_700_000_000_000;

    #[test]
    fn hourly_gate() {
        let store = Store::new(MemoryStorage::new());
        let config = GameConfig::default();
        let cards = Cards::new(&store, &config);
        let mut rng = StdRng::seed_from_u64(3);

        assert!(cards.can_draw(T0));
        let grant = cards.draw(T0, &mut rng).unwrap();
        assert!(tables::CARDS.iter().any(|c| c.label == grant.resolved.label));
        assert_eq!(cards.last_draw(), T0);

        assert_eq!(
            cards.draw(T0 + HOUR_MS - 1, &mut rng).unwrap_err(),
            GameError::CardNotReady { remaining_ms: 1 }
        );
        assert!(cards.draw(T0 + HOUR_MS, &mut rng).is_ok());
    }

    #[test]
    fn every_card_reachable() {
        let store = Store::new(MemoryStorage::new());
        let config = GameConfig {
            card_interval_ms: 0,
            ..GameConfig::default()
        };
        let cards = Cards::new(&store, &config);
        let mut rng = StdRng::seed_from_u64(8);
        let mut seen = std::collections::BTreeSet::new();
        for i in 0..2_000 {
            seen.insert(cards.draw(T0 + i, &mut rng).unwrap().resolved.label);
        }
        assert_eq!(seen.len(), tables::CARDS.len());
    }
}
