//! The game state store.
//!
//! [`GameStore`] owns the single [`GameState`] of a player. Loading never
//! fails: a missing, corrupt or unrecognisable save yields a fresh state.
//! Every mutation is persisted immediately; write failures are logged and
//! the in-memory state stays authoritative.

use vetlogic_engine::{GameRules, energy, initial_state};
use vetlogic_types::{GameState, GameStatePatch};

use crate::migration::migrate;
use crate::storage::SaveStorage;

/// Default storage key for the save blob.
pub const DEFAULT_SAVE_KEY: &str = "vet-tycoon-state";

/// How the current state came to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Rehydrated from a persisted save.
    Restored,
    /// No save existed.
    Fresh,
    /// A save existed but could not be used.
    Recovered,
}

/// Owns and persists one player's state.
#[derive(Debug)]
pub struct GameStore<S> {
    storage: S,
    key: String,
    rules: GameRules,
    state: GameState,
    outcome: LoadOutcome,
}

impl<S: SaveStorage> GameStore<S> {
    /// Load the save under `key`, migrating it forward.
    pub fn load(storage: S, key: impl Into<String>, rules: GameRules) -> Self {
        let key = key.into();
        let (state, outcome) = match storage.read(&key) {
            Ok(Some(raw)) => match migrate(&raw, &rules) {
                Ok(state) => {
                    tracing::info!(key = %key, rank = %state.rank, money = state.money, "save restored");
                    (state, LoadOutcome::Restored)
                }
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "save unusable, starting fresh");
                    (initial_state(&rules), LoadOutcome::Recovered)
                }
            },
            Ok(None) => {
                tracing::info!(key = %key, "no save found, starting fresh");
                (initial_state(&rules), LoadOutcome::Fresh)
            }
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "save unreadable, starting fresh");
                (initial_state(&rules), LoadOutcome::Recovered)
            }
        };
        Self {
            storage,
            key,
            rules,
            state,
            outcome,
        }
    }

    /// The current state.
    pub const fn state(&self) -> &GameState {
        &self.state
    }

    /// The rules the store was loaded with.
    pub const fn rules(&self) -> &GameRules {
        &self.rules
    }

    /// How the state was obtained at load time.
    pub const fn outcome(&self) -> LoadOutcome {
        self.outcome
    }

    /// Persist the current state. Failures are logged, never returned.
    pub fn save(&self) {
        let json = match serde_json::to_string(&self.state) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "failed to serialize save");
                return;
            }
        };
        if let Err(e) = self.storage.write(&self.key, &json) {
            tracing::warn!(key = %self.key, error = %e, "failed to write save");
        }
    }

    /// Shallow-merge `patch` into the state and persist.
    pub fn update(&mut self, patch: GameStatePatch) -> &GameState {
        let current = std::mem::replace(&mut self.state, initial_state(&self.rules));
        self.state = patch.apply_to(current);
        self.save();
        &self.state
    }

    /// Replace the state through a fallible reducer and persist.
    ///
    /// On error the state is left untouched and nothing is written.
    pub fn apply<E>(
        &mut self,
        reducer: impl FnOnce(GameState) -> Result<GameState, E>,
    ) -> Result<&GameState, E> {
        self.state = reducer(self.state.clone())?;
        self.save();
        Ok(&self.state)
    }

    /// Restore defaults and drop the persisted save.
    pub fn reset(&mut self) -> &GameState {
        if let Err(e) = self.storage.remove(&self.key) {
            tracing::warn!(key = %self.key, error = %e, "failed to remove save");
        }
        self.state = initial_state(&self.rules);
        self.save();
        tracing::info!(key = %self.key, "game reset");
        &self.state
    }

    /// Regenerate energy by `amount`, clamped to the ceiling. Returns the
    /// new energy. Nothing is written when energy is already full.
    pub fn regen_tick(&mut self, amount: u32) -> u32 {
        let before = self.state.energy;
        let after = energy::regenerate(before, self.state.max_energy, amount);
        if after != before {
            self.state.energy = after;
            self.save();
        }
        after
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use vetlogic_types::Rank;

    use super::*;
    use crate::storage::MemoryStorage;

    fn fresh() -> GameStore<Arc<MemoryStorage>> {
        GameStore::load(
            Arc::new(MemoryStorage::new()),
            DEFAULT_SAVE_KEY,
            GameRules::default(),
        )
    }

    #[test]
    fn missing_save_starts_fresh() {
        let store = fresh();
        assert_eq!(store.outcome(), LoadOutcome::Fresh);
        assert_eq!(store.state().money, 5000);
    }

    #[test]
    fn corrupt_save_recovers() {
        let storage = MemoryStorage::with_entry(DEFAULT_SAVE_KEY, "{oops");
        let store = GameStore::load(storage, DEFAULT_SAVE_KEY, GameRules::default());
        assert_eq!(store.outcome(), LoadOutcome::Recovered);
        assert_eq!(*store.state(), initial_state(&GameRules::default()));
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn update_persists_immediately() {
        let storage = Arc::new(MemoryStorage::new());
        let mut store = GameStore::load(Arc::clone(&storage), DEFAULT_SAVE_KEY, GameRules::default());
        store.update(GameStatePatch {
            money: Some(77),
            rank: Some(Rank::Intern),
            ..GameStatePatch::default()
        });

        let reloaded = GameStore::load(storage, DEFAULT_SAVE_KEY, GameRules::default());
        assert_eq!(reloaded.outcome(), LoadOutcome::Restored);
        assert_eq!(reloaded.state().money, 77);
        assert_eq!(reloaded.state().rank, Rank::Intern);
    }

    #[test]
    fn failed_reducer_leaves_state() {
        let mut store = fresh();
        let before = store.state().clone();
        let result: Result<&GameState, &str> = store.apply(|_| Err("nope"));
        assert!(result.is_err());
        assert_eq!(*store.state(), before);
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn reset_restores_defaults() {
        let storage = Arc::new(MemoryStorage::new());
        let mut store = GameStore::load(Arc::clone(&storage), DEFAULT_SAVE_KEY, GameRules::default());
        store.update(GameStatePatch {
            money: Some(1),
            ..GameStatePatch::default()
        });
        store.reset();
        assert_eq!(store.state().money, 5000);
        let raw = storage.read(DEFAULT_SAVE_KEY).unwrap().unwrap();
        assert!(raw.contains("\"money\":5000"));
    }

    #[test]
    fn regen_never_exceeds_max() {
        let mut store = fresh();
        store.update(GameStatePatch {
            energy: Some(99),
            ..GameStatePatch::default()
        });
        assert_eq!(store.regen_tick(1), 100);
        assert_eq!(store.regen_tick(1), 100);
        assert_eq!(store.state().energy, store.state().max_energy);
    }
}
