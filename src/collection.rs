//! Owned skins, owned abilities and the one-off account flags.

use crate::error::GameResult;
use crate::storage::{keys, Storage, Store};

pub const DEFAULT_SKIN: &str = "default";

pub struct Collection<'a, S> {
    store: &'a Store<S>,
}

impl<'a, S: Storage> Collection<'a, S> {
    pub fn new(store: &'a Store<S>) -> Self {
        Self { store }
    }

    /// Owned skin ids. `default` is always present.
    pub fn owned_skins(&self) -> Vec<String> {
        let mut skins: Vec<String> = self
            .store
            .read(keys::OWNED_SKINS, vec![DEFAULT_SKIN.to_string()]);
        if !skins.iter().any(|s| s == DEFAULT_SKIN) {
            skins.insert(0, DEFAULT_SKIN.to_string());
        }
        skins
    }

    pub fn owns_skin(&self, id: &str) -> bool {
        self.owned_skins().iter().any(|s| s == id)
    }

    /// Add a skin. Returns `false` if it was already owned.
    pub fn grant_skin(&self, id: &str) -> GameResult<bool> {
        let mut skins = self.owned_skins();
        if skins.iter().any(|s| s == id) {
            return Ok(false);
        }
        skins.push(id.to_string());
        self.store.write(keys::OWNED_SKINS, &skins)?;
        tracing::debug!(skin = id, "skin unlocked");
        Ok(true)
    }

    pub fn selected_skin(&self) -> String {
        self.store.read(keys::SKIN, DEFAULT_SKIN.to_string())
    }

    pub fn select_skin(&self, id: &str) -> GameResult<()> {
        self.store.write(keys::SKIN, id)?;
        Ok(())
    }

    pub fn owned_abilities(&self) -> Vec<String> {
        self.store.read_or_default(keys::OWNED_ABILITIES)
    }

    pub fn owns_ability(&self, id: &str) -> bool {
        self.owned_abilities().iter().any(|a| a == id)
    }

    /// Add an ability. Returns `false` if it was already owned.
    pub fn grant_ability(&self, id: &str) -> GameResult<bool> {
        let mut owned = self.owned_abilities();
        if owned.iter().any(|a| a == id) {
            return Ok(false);
        }
        owned.push(id.to_string());
        self.store.write(keys::OWNED_ABILITIES, &owned)?;
        tracing::debug!(ability = id, "ability unlocked");
        Ok(true)
    }

    pub fn has_flow_plus(&self) -> bool {
        self.store.read(keys::FLOW_PLUS, false)
    }

    pub fn set_flow_plus(&self) -> GameResult<()> {
        self.store.write(keys::FLOW_PLUS, &true)?;
        Ok(())
    }

    pub fn is_verified(&self) -> bool {
        self.store.read(keys::VERIFIED, false)
    }

    pub fn set_verified(&self) -> GameResult<()> {
        self.store.write(keys::VERIFIED, &true)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[test]
    fn default_skin_always_owned() {
        let store = Store::new(MemoryStorage::new());
        let c = Collection::new(&store);
        assert_eq!(c.owned_skins(), vec!["default".to_string()]);
        store.write(keys::OWNED_SKINS, &vec!["fire"]).unwrap();
        assert!(c.owns_skin("default"));
        assert!(c.owns_skin("fire"));
    }

    #[test]
    fn grants_are_set_like() {
        let store = Store::new(MemoryStorage::new());
        let c = Collection::new(&store);
        assert!(c.grant_skin("neon").unwrap());
        assert!(!c.grant_skin("neon").unwrap());
        assert!(c.grant_ability("time_warp").unwrap());
        assert!(!c.grant_ability("time_warp").unwrap());
        assert_eq!(c.owned_abilities(), vec!["time_warp".to_string()]);
    }

    #[test]
    fn flags_persist() {
        let store = Store::new(MemoryStorage::new());
        let c = Collection::new(&store);
        assert!(!c.has_flow_plus());
        c.set_flow_plus().unwrap();
        c.set_verified().unwrap();
        assert!(Collection::new(&store).has_flow_plus());
        assert!(Collection::new(&store).is_verified());
    }
}
