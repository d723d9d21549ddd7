//! Save storage and state persistence for `VetLogic`.
//!
//! The store owns the player's [`GameState`](vetlogic_types::GameState),
//! rehydrates it with forward migration at start-up, persists it after
//! every change, and runs the energy regeneration timer.
//!
//! # Modules
//!
//! - [`error`] -- Storage and migration errors
//! - [`migration`] -- Additive upgrade of old saves
//! - [`regen`] -- Background energy regeneration task
//! - [`storage`] -- Key-value backends ([`FileStorage`], [`MemoryStorage`])
//! - [`store`] -- The [`GameStore`] aggregate owner

pub mod error;
pub mod migration;
pub mod regen;
pub mod storage;
pub mod store;

pub use error::{MigrationError, StoreError};
pub use migration::migrate;
pub use regen::{RegenHandle, SharedStore, spawn_energy_regen};
pub use storage::{FileStorage, MemoryStorage, SaveStorage};
pub use store::{DEFAULT_SAVE_KEY, GameStore, LoadOutcome};
